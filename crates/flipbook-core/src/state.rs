use crate::messages::{Generation, LoaderEvent, PassKind};
use crate::options::ZoomConfig;
use crate::surface::FlipRequest;
use crate::types::{OPEN_ERROR_MESSAGE, ZoomLevel};

/// What the user sees: position, zoom and loading lifecycle
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub current_page: usize,
    pub page_count: usize,
    pub zoom: ZoomLevel,
    pub loading: bool,
    pub book_ready: bool,
    pub error: Option<String>,
    /// Latest pass this state has seen
    pub generation: Generation,
}

impl ViewerState {
    pub fn new(zoom: ZoomLevel) -> Self {
        Self {
            current_page: 0,
            page_count: 0,
            zoom,
            loading: false,
            book_ready: false,
            error: None,
            generation: 0,
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page + 1 >= self.page_count
    }

    pub fn next_page(&mut self) -> Option<FlipRequest> {
        if self.page_count == 0 || self.is_last_page() {
            return None;
        }
        self.current_page += 1;
        Some(FlipRequest::Next)
    }

    pub fn prev_page(&mut self) -> Option<FlipRequest> {
        if self.current_page == 0 {
            return None;
        }
        self.current_page -= 1;
        Some(FlipRequest::Prev)
    }

    pub fn go_to_home(&mut self) -> Option<FlipRequest> {
        if self.page_count == 0 {
            return None;
        }
        self.current_page = 0;
        Some(FlipRequest::To(0))
    }

    /// Returns the new zoom when it changed
    pub fn zoom_in(&mut self, config: &ZoomConfig) -> Option<ZoomLevel> {
        self.set_zoom(config.zoom_in(self.zoom))
    }

    /// Returns the new zoom when it changed
    pub fn zoom_out(&mut self, config: &ZoomConfig) -> Option<ZoomLevel> {
        self.set_zoom(config.zoom_out(self.zoom))
    }

    fn set_zoom(&mut self, zoom: ZoomLevel) -> Option<ZoomLevel> {
        if zoom == self.zoom {
            return None;
        }
        self.zoom = zoom;
        Some(zoom)
    }

    /// Page change reported by the presentation surface
    pub fn set_current_page(&mut self, index: usize) {
        self.current_page = index.min(self.page_count.saturating_sub(1));
    }

    pub fn page_label(&self) -> String {
        if self.page_count == 0 {
            format!("{} / ?", self.current_page + 1)
        } else {
            format!("{} / {}", self.current_page + 1, self.page_count)
        }
    }

    /// Fold a loader event into the state; returns false for stale events
    pub fn apply(&mut self, event: &LoaderEvent) -> bool {
        if event.generation() < self.generation {
            return false;
        }
        self.generation = event.generation();

        match event {
            LoaderEvent::Opening { .. } => {
                self.current_page = 0;
                self.page_count = 0;
                self.loading = true;
                self.book_ready = false;
                self.error = None;
            }
            LoaderEvent::OpenFailed { .. } => {
                self.loading = false;
                self.book_ready = false;
                self.error = Some(OPEN_ERROR_MESSAGE.to_string());
            }
            LoaderEvent::Opened { page_count, .. } => {
                self.page_count = *page_count;
                self.set_current_page(self.current_page);
            }
            LoaderEvent::PassStarted { kind, .. } => {
                if *kind == PassKind::Reload {
                    self.loading = true;
                    self.book_ready = false;
                }
            }
            // Background pages may still be pending; Settled ends loading
            LoaderEvent::Ready { .. } => {
                self.book_ready = true;
            }
            LoaderEvent::Settled { .. } => {
                self.loading = false;
            }
            LoaderEvent::Closed { .. } => {
                self.current_page = 0;
                self.page_count = 0;
                self.loading = false;
                self.book_ready = false;
                self.error = None;
            }
            LoaderEvent::Accepted { .. }
            | LoaderEvent::PageRendered { .. }
            | LoaderEvent::PageFailed { .. } => {}
        }
        true
    }
}
