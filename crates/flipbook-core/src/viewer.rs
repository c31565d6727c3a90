use crate::loader::{LoaderConfig, LoaderHandle, spawn_loader};
use crate::messages::{Generation, LoaderEvent, PassKind, Ticket};
use crate::options::ViewerOptions;
use crate::slots::{PageSlot, PageSlots};
use crate::source::DocumentSource;
use crate::state::ViewerState;
use crate::surface::{self, FullscreenHost, PresentationSurface, SurfacePage};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Milestones the latest generation has reached
#[derive(Debug, Clone, Default)]
struct PassProgress {
    generation: Generation,
    ready: bool,
    settled: bool,
    closed: bool,
    failure: Option<String>,
}

impl PassProgress {
    fn record(&mut self, event: &LoaderEvent) {
        if event.generation() != self.generation {
            *self = PassProgress {
                generation: event.generation(),
                ..Default::default()
            };
        }
        match event {
            LoaderEvent::Ready { .. } => self.ready = true,
            LoaderEvent::Settled { .. } => self.settled = true,
            LoaderEvent::Closed { .. } => self.closed = true,
            LoaderEvent::OpenFailed { message, .. } => self.failure = Some(message.clone()),
            _ => {}
        }
    }
}

/// Front-end side of the viewer.
///
/// Owns the user-visible state and a mirror of the loader's page slots, both
/// updated only by folding loader events in channel order.
pub struct Viewer {
    options: ViewerOptions,
    state: ViewerState,
    slots: PageSlots,
    cover: Option<Arc<RenderedPage>>,
    loader: LoaderHandle,
    events: mpsc::UnboundedReceiver<LoaderEvent>,
    /// Last command ticket sent and last one the loader confirmed
    sent: Ticket,
    accepted: Ticket,
    progress: PassProgress,
}

impl Viewer {
    /// Create a viewer and spawn its loader on the current tokio runtime
    pub fn new<S: DocumentSource>(source: S, options: ViewerOptions) -> Result<Self> {
        options.validate()?;
        let (loader, events) = spawn_loader(source, LoaderConfig::from(&options));
        let mut viewer = Self::with_loader(loader, events, options);
        viewer.load_cover_image();
        Ok(viewer)
    }

    pub fn with_loader(
        loader: LoaderHandle,
        events: mpsc::UnboundedReceiver<LoaderEvent>,
        options: ViewerOptions,
    ) -> Self {
        Self {
            state: ViewerState::new(options.zoom.initial()),
            slots: PageSlots::new(),
            cover: None,
            loader,
            events,
            options,
            sent: 0,
            accepted: 0,
            progress: PassProgress::default(),
        }
    }

    fn load_cover_image(&mut self) {
        let Some(path) = self.options.cover_image.clone() else {
            return;
        };
        let loaded = std::fs::read(&path)
            .map_err(ViewerError::from)
            .and_then(|bytes| RenderedPage::decode(&bytes, self.state.zoom));
        match loaded {
            Ok(page) => self.cover = Some(Arc::new(page)),
            Err(e) => log::warn!("Could not load cover image {}: {}", path.display(), e),
        }
    }

    pub fn set_cover(&mut self, cover: Option<RenderedPage>) {
        self.cover = cover.map(Arc::new);
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn slots(&self) -> &PageSlots {
        &self.slots
    }

    pub fn open(&mut self, reference: DocumentRef) {
        self.state.loading = true;
        self.state.error = None;
        self.sent = self.loader.open(reference, self.state.zoom);
    }

    pub fn close(&mut self) {
        self.sent = self.loader.close();
    }

    pub fn next_page(&mut self, surface: &mut dyn PresentationSurface) {
        if let Some(request) = self.state.next_page() {
            surface.apply(request);
        }
    }

    pub fn prev_page(&mut self, surface: &mut dyn PresentationSurface) {
        if let Some(request) = self.state.prev_page() {
            surface.apply(request);
        }
    }

    pub fn go_to_home(&mut self, surface: &mut dyn PresentationSurface) {
        if let Some(request) = self.state.go_to_home() {
            surface.apply(request);
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(zoom) = self.state.zoom_in(&self.options.zoom) {
            log::info!("Zoom in to {}", zoom);
            self.sent = self.loader.rescale(zoom);
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(zoom) = self.state.zoom_out(&self.options.zoom) {
            log::info!("Zoom out to {}", zoom);
            self.sent = self.loader.rescale(zoom);
        }
    }

    pub fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) -> bool {
        surface::toggle_fullscreen(host)
    }

    pub fn on_external_page_change(&mut self, index: usize) {
        self.state.set_current_page(index);
    }

    pub fn page_label(&self) -> String {
        self.state.page_label()
    }

    /// Ordered page sequence for the presentation surface
    pub fn pages(&self) -> Vec<SurfacePage<'_>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| match (index, &self.cover, slot) {
                (0, Some(cover), _) if self.options.show_cover => SurfacePage::Cover(cover),
                (_, _, PageSlot::Ready(page)) => SurfacePage::Page(page),
                (_, _, PageSlot::Failed(message)) => SurfacePage::Failed(message),
                (_, _, PageSlot::Pending) => SurfacePage::Loading,
            })
            .collect()
    }

    /// True while a pass is running or any slot is still pending
    pub fn has_pending_work(&self) -> bool {
        self.state.loading || !self.slots.is_settled()
    }

    /// Apply every event already queued; returns how many were applied
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.apply(&event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next loader event and apply it
    pub async fn next_event(&mut self) -> Option<LoaderEvent> {
        let event = self.events.recv().await?;
        self.apply(&event);
        Some(event)
    }

    /// Wait until the pass started by the latest command marks the book ready
    pub async fn wait_until_ready(&mut self) -> Result<()> {
        self.wait_for(|progress| progress.ready).await
    }

    /// Wait until every page of the pass started by the latest command has settled
    pub async fn wait_until_settled(&mut self) -> Result<()> {
        self.wait_for(|progress| progress.settled).await
    }

    /// Events ahead of the latest command's acknowledgement are applied
    /// but never end the wait. A closed document has nothing left to wait for.
    async fn wait_for(&mut self, done: impl Fn(&PassProgress) -> bool) -> Result<()> {
        loop {
            if self.accepted >= self.sent {
                if let Some(message) = &self.progress.failure {
                    return Err(ViewerError::DocumentOpen(message.clone()));
                }
                if self.progress.closed || done(&self.progress) {
                    return Ok(());
                }
            }
            if self.next_event().await.is_none() {
                return Err(ViewerError::LoaderStopped);
            }
        }
    }

    fn apply(&mut self, event: &LoaderEvent) -> bool {
        if !self.state.apply(event) {
            log::debug!("Ignoring stale loader event: {:?}", event);
            return false;
        }
        self.progress.record(event);

        match event {
            LoaderEvent::Accepted { ticket, .. } => {
                self.accepted = self.accepted.max(*ticket);
            }
            LoaderEvent::Opening { .. }
            | LoaderEvent::OpenFailed { .. }
            | LoaderEvent::Closed { .. } => self.slots.reset(),
            LoaderEvent::Opened { page_count, .. } => self.slots.allocate(*page_count),
            LoaderEvent::PassStarted {
                kind: PassKind::Reload,
                ..
            } => self.slots.allocate(self.slots.len()),
            LoaderEvent::PageRendered { index, page, .. } => {
                self.slots.set(*index, PageSlot::Ready(page.clone()));
            }
            LoaderEvent::PageFailed { index, message, .. } => {
                self.slots.set(*index, PageSlot::Failed(message.clone()));
            }
            LoaderEvent::PassStarted { .. } | LoaderEvent::Ready { .. } | LoaderEvent::Settled { .. } => {}
        }
        true
    }
}
