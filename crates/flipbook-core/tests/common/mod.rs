#![allow(dead_code)]

use flipbook_core::*;
use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Blocks renders until released
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    signal: Condvar,
}

impl Gate {
    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.signal.wait(open).unwrap();
        }
    }

    pub fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.signal.notify_all();
    }
}

/// Releases the gate when dropped, so a failing test cannot leave renders blocked
pub struct GateGuard(pub Arc<Gate>);

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// In-memory document source with scriptable failures
#[derive(Clone, Default)]
pub struct FakeSource {
    pub page_count: usize,
    pub fail_open: bool,
    /// `open` waits on `gate`
    pub gated_open: bool,
    pub failing_pages: HashSet<usize>,
    /// Renders of these pages wait on `gate`
    pub gated_pages: HashSet<usize>,
    /// Only gate renders at this zoom (all zooms when None)
    pub gated_zoom: Option<ZoomLevel>,
    pub gate: Arc<Gate>,
    pub renders: Arc<Mutex<Vec<(usize, ZoomLevel)>>>,
}

impl FakeSource {
    pub fn with_pages(page_count: usize) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }

    pub fn failing(mut self, index: usize) -> Self {
        self.failing_pages.insert(index);
        self
    }

    pub fn gated(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.gated_pages.extend(pages);
        self
    }

    pub fn gated_open(mut self) -> Self {
        self.gated_open = true;
        self
    }

    pub fn gated_at(mut self, zoom: ZoomLevel) -> Self {
        self.gated_zoom = Some(zoom);
        self
    }

    pub fn guard(&self) -> GateGuard {
        GateGuard(self.gate.clone())
    }

    pub fn render_log(&self) -> Vec<(usize, ZoomLevel)> {
        self.renders.lock().unwrap().clone()
    }
}

pub struct FakeDocument {
    source: FakeSource,
}

impl DocumentSource for FakeSource {
    type Document = FakeDocument;

    fn open(&self, _reference: &DocumentRef) -> Result<FakeDocument> {
        if self.gated_open {
            self.gate.wait();
        }
        if self.fail_open {
            return Err(ViewerError::DocumentOpen("not a PDF".to_string()));
        }
        Ok(FakeDocument {
            source: self.clone(),
        })
    }
}

impl PageSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.source.page_count
    }

    fn render_page(&self, index: usize, zoom: ZoomLevel) -> Result<RenderedPage> {
        let gated_zoom = self.source.gated_zoom.is_none_or(|gated| gated == zoom);
        if gated_zoom && self.source.gated_pages.contains(&index) {
            self.source.gate.wait();
        }
        self.source.renders.lock().unwrap().push((index, zoom));

        if self.source.failing_pages.contains(&index) {
            return Err(ViewerError::PageRender {
                index,
                message: "corrupt content stream".to_string(),
            });
        }
        // Encode the page index in the first pixel so tests can tell pages apart
        Ok(RenderedPage::filled(
            2,
            3,
            zoom,
            [index as u8, 0, 0, 255],
        ))
    }
}

pub fn test_ref() -> DocumentRef {
    DocumentRef::from_bytes(b"%PDF-1.4 fake".to_vec())
}

#[derive(Default)]
pub struct RecordingSurface {
    pub requests: Vec<FlipRequest>,
}

impl PresentationSurface for RecordingSurface {
    fn flip_next(&mut self) {
        self.requests.push(FlipRequest::Next);
    }

    fn flip_prev(&mut self) {
        self.requests.push(FlipRequest::Prev);
    }

    fn flip_to(&mut self, index: usize) {
        self.requests.push(FlipRequest::To(index));
    }
}

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Run a viewer future with a timeout so a broken pass fails the test instead of hanging
pub async fn within<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(TIMEOUT, future)
        .await
        .expect("viewer did not reach the expected state in time")
}
