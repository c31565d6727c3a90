use crate::types::{DocumentRef, RenderedPage, ZoomLevel};
use std::sync::Arc;

/// Identifies one load or reload pass; results from older passes are dropped
pub type Generation = u64;

/// Sequence number of a command, echoed back once the loader has handled it
pub type Ticket = u64;

/// Commands sent from the viewer to the loader
#[derive(Debug)]
pub enum LoaderCommand {
    Open {
        ticket: Ticket,
        reference: DocumentRef,
        zoom: ZoomLevel,
    },
    /// Re-render every page at a new zoom
    Rescale {
        ticket: Ticket,
        zoom: ZoomLevel,
    },
    Close {
        ticket: Ticket,
    },
}

/// Which kind of pass produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Prefix first, then the rest in the background
    Initial,
    /// Full re-render after a zoom change
    Reload,
}

/// Updates sent from the loader to the viewer
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// A command was handled; everything after it belongs to `generation` or later
    Accepted {
        generation: Generation,
        ticket: Ticket,
    },
    Opening {
        generation: Generation,
    },
    OpenFailed {
        generation: Generation,
        message: String,
    },
    Opened {
        generation: Generation,
        page_count: usize,
    },
    PassStarted {
        generation: Generation,
        kind: PassKind,
        zoom: ZoomLevel,
    },
    PageRendered {
        generation: Generation,
        index: usize,
        page: Arc<RenderedPage>,
    },
    PageFailed {
        generation: Generation,
        index: usize,
        message: String,
    },
    /// The surface can be shown
    Ready {
        generation: Generation,
    },
    /// Every slot of the pass holds a bitmap or a failure marker
    Settled {
        generation: Generation,
    },
    Closed {
        generation: Generation,
    },
}

impl LoaderEvent {
    pub fn generation(&self) -> Generation {
        match self {
            LoaderEvent::Accepted { generation, .. }
            | LoaderEvent::Opening { generation }
            | LoaderEvent::OpenFailed { generation, .. }
            | LoaderEvent::Opened { generation, .. }
            | LoaderEvent::PassStarted { generation, .. }
            | LoaderEvent::PageRendered { generation, .. }
            | LoaderEvent::PageFailed { generation, .. }
            | LoaderEvent::Ready { generation }
            | LoaderEvent::Settled { generation }
            | LoaderEvent::Closed { generation } => *generation,
        }
    }
}
