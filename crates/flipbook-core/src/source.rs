//! Collaborator interface for the document rasterization library.
//!
//! Both operations block; the loader moves them onto tokio's blocking pool.

use crate::types::*;

/// Opens document handles from references
pub trait DocumentSource: Send + Sync + 'static {
    type Document: PageSource;

    fn open(&self, reference: &DocumentRef) -> Result<Self::Document>;
}

/// An opened document that can rasterize its pages
pub trait PageSource: Send + Sync + 'static {
    fn page_count(&self) -> usize;

    /// Rasterize one page at `zoom`
    fn render_page(&self, index: usize, zoom: ZoomLevel) -> Result<RenderedPage>;
}
