//! Page-flip PDF viewer core: progressive page loading, render caching and
//! viewer state, with the rasterizer and presentation surface as pluggable
//! collaborators.

mod cache;
pub mod layout;
pub mod loader;
mod messages;
mod options;
#[cfg(feature = "pdfium")]
pub mod pdfium;
mod slots;
mod source;
mod state;
mod surface;
mod types;
mod viewer;

pub use cache::{CacheKey, RenderCache};
pub use loader::{LoaderConfig, LoaderHandle, loader_task, spawn_loader};
pub use messages::*;
pub use options::*;
#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumDocument, PdfiumSource, init_pdfium};
pub use slots::{PageSlot, PageSlots};
pub use source::{DocumentSource, PageSource};
pub use state::ViewerState;
pub use surface::{FlipRequest, FullscreenHost, PresentationSurface, SurfacePage, toggle_fullscreen};
pub use types::*;
pub use viewer::Viewer;
