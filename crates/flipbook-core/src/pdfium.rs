use crate::source::{DocumentSource, PageSource};
use crate::types::*;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Environment variable that points at a directory containing libpdfium
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Pdfium must not be entered from two threads at once
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

fn pdfium_lock() -> MutexGuard<'static, ()> {
    PDFIUM_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize Pdfium, trying an explicit directory first, then the vendored
/// library, then falling back to the system library
pub fn init_pdfium(lib_dir: Option<&Path>) -> std::result::Result<Pdfium, PdfiumError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = lib_dir {
        candidates.push(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        candidates.push(PathBuf::from(dir));
    }
    // When running from cargo, the working directory is the workspace root
    if let Ok(mut vendor) = std::env::current_dir() {
        vendor.push("vendor/pdfium/lib");
        candidates.push(vendor);
    }

    for dir in candidates.iter().filter(|dir| dir.exists()) {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Document source backed by pdfium
#[derive(Debug, Clone, Default)]
pub struct PdfiumSource {
    lib_dir: Option<PathBuf>,
}

impl PdfiumSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library_dir(lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            lib_dir: Some(lib_dir.into()),
        }
    }
}

/// Handle to a document opened through pdfium.
///
/// Pdfium documents borrow the library binding and cannot cross threads, so
/// the handle keeps the raw bytes and reloads them for each render. Renders
/// are serialized on a process-wide lock.
pub struct PdfiumDocument {
    bytes: Arc<[u8]>,
    page_count: usize,
    lib_dir: Option<PathBuf>,
}

impl DocumentSource for PdfiumSource {
    type Document = PdfiumDocument;

    fn open(&self, reference: &DocumentRef) -> Result<PdfiumDocument> {
        let bytes = reference
            .read_bytes()
            .map_err(|e| ViewerError::DocumentOpen(e.to_string()))?;

        let _lock = pdfium_lock();
        let pdfium = init_pdfium(self.lib_dir.as_deref())
            .map_err(|e| ViewerError::DocumentOpen(format!("pdfium unavailable: {}", e)))?;
        let document = pdfium
            .load_pdf_from_byte_slice(&bytes, None)
            .map_err(|e| ViewerError::DocumentOpen(e.to_string()))?;
        let page_count = document.pages().len() as usize;

        log::info!(
            "Opened {} ({} pages)",
            reference.display_name(),
            page_count
        );

        Ok(PdfiumDocument {
            bytes: bytes.clone(),
            page_count,
            lib_dir: self.lib_dir.clone(),
        })
    }
}

impl PageSource for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, index: usize, zoom: ZoomLevel) -> Result<RenderedPage> {
        let render_error = |message: String| ViewerError::PageRender { index, message };

        let _lock = pdfium_lock();
        let pdfium = init_pdfium(self.lib_dir.as_deref()).map_err(|e| render_error(e.to_string()))?;
        let document = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| render_error(e.to_string()))?;
        let page_index = index
            .try_into()
            .map_err(|_| render_error("page index out of range".to_string()))?;
        let page = document
            .pages()
            .get(page_index)
            .map_err(|e| render_error(e.to_string()))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(zoom.scale());
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| render_error(e.to_string()))?;

        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let rgba = bitmap.as_rgba_bytes().to_vec();

        RenderedPage::new(width, height, zoom, rgba)
    }
}
