use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to open document: {0}")]
    DocumentOpen(String),
    #[error("Failed to render page {index}: {message}")]
    PageRender { index: usize, message: String },
    #[error("Fullscreen request failed: {0}")]
    Fullscreen(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid bitmap: {0}")]
    Bitmap(String),
    #[error("Loader task has stopped")]
    LoaderStopped,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Message shown to the user when a document cannot be opened.
pub const OPEN_ERROR_MESSAGE: &str = "Unable to load the PDF. Please check the file and try again.";

/// Where a document comes from
#[derive(Clone)]
pub enum DocumentRef {
    /// A file on disk
    Path(PathBuf),
    /// An in-memory blob supplied by the embedding application
    Bytes(Arc<[u8]>),
}

impl DocumentRef {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        DocumentRef::Bytes(Arc::from(bytes.into()))
    }

    /// Read the referenced document into memory
    pub fn read_bytes(&self) -> Result<Arc<[u8]>> {
        match self {
            DocumentRef::Path(path) => Ok(Arc::from(std::fs::read(path)?)),
            DocumentRef::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            DocumentRef::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            DocumentRef::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRef::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DocumentRef::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
        }
    }
}

impl From<PathBuf> for DocumentRef {
    fn from(path: PathBuf) -> Self {
        DocumentRef::Path(path)
    }
}

/// Zoom level stored as a whole percentage (150 = 1.5x).
///
/// Integer storage keeps zoom steps exact, so stepping in and back out lands
/// on the same value and the level can be used as part of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ZoomLevel(pub u32);

impl ZoomLevel {
    pub fn from_percent(percent: u32) -> Self {
        ZoomLevel(percent)
    }

    pub fn percent(self) -> u32 {
        self.0
    }

    /// Scale factor handed to the rasterizer
    pub fn scale(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        ZoomLevel(150)
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A rasterized page bitmap (RGBA8, row-major, no padding)
#[derive(Clone, PartialEq)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    /// Zoom the bitmap was produced at
    pub zoom: ZoomLevel,
    pub rgba: Vec<u8>,
}

impl RenderedPage {
    pub fn new(width: u32, height: u32, zoom: ZoomLevel, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ViewerError::Bitmap(format!(
                "size mismatch: {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            zoom,
            rgba,
        })
    }

    /// Placeholder-friendly page filled with a single colour
    pub fn filled(width: u32, height: u32, zoom: ZoomLevel, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            zoom,
            rgba,
        }
    }

    pub fn to_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
    }

    /// Encode as PNG, the transportable representation of a page
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = self.to_image().ok_or_else(|| {
            ViewerError::Bitmap(format!(
                "buffer does not match {}x{}",
                self.width, self.height
            ))
        })?;
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Decode any supported image (PNG or JPEG), e.g. a cover image
    pub fn decode(bytes: &[u8], zoom: ZoomLevel) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            zoom,
            rgba: image.into_raw(),
        })
    }
}

impl fmt::Debug for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedPage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("zoom", &self.zoom)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_scale() {
        assert_eq!(ZoomLevel(150).scale(), 1.5);
        assert_eq!(ZoomLevel(80).scale(), 0.8);
        assert_eq!(ZoomLevel::default().to_string(), "150%");
    }

    #[test]
    fn test_rendered_page_rejects_short_buffer() {
        let result = RenderedPage::new(2, 2, ZoomLevel(100), vec![0; 15]);
        assert!(matches!(result, Err(ViewerError::Bitmap(_))));
    }

    #[test]
    fn test_png_encode_decode() {
        let page = RenderedPage::filled(3, 2, ZoomLevel(120), [10, 20, 30, 255]);
        let png = page.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = RenderedPage::decode(&png, ZoomLevel(120)).unwrap();
        assert_eq!(decoded, page);
    }

    #[test]
    fn test_document_ref_bytes() {
        let doc = DocumentRef::from_bytes(b"%PDF-1.4".to_vec());
        assert_eq!(&*doc.read_bytes().unwrap(), b"%PDF-1.4");
        assert_eq!(doc.display_name(), "<8 bytes in memory>");
    }

    #[test]
    fn test_document_ref_missing_file() {
        let doc = DocumentRef::Path(PathBuf::from("/definitely/not/here.pdf"));
        assert!(matches!(doc.read_bytes(), Err(ViewerError::Io(_))));
        assert_eq!(doc.display_name(), "here.pdf");
    }
}
