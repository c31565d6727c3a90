use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Zoom bounds and step, in whole percent
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoomConfig {
    pub initial_percent: u32,
    pub step_percent: u32,
    pub min_percent: u32,
    pub max_percent: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_percent: 150,
            step_percent: 20,
            min_percent: 80,
            max_percent: 300,
        }
    }
}

impl ZoomConfig {
    pub fn initial(&self) -> ZoomLevel {
        self.clamp(ZoomLevel(self.initial_percent))
    }

    pub fn clamp(&self, zoom: ZoomLevel) -> ZoomLevel {
        ZoomLevel(zoom.0.clamp(self.min_percent, self.max_percent))
    }

    pub fn zoom_in(&self, zoom: ZoomLevel) -> ZoomLevel {
        self.clamp(ZoomLevel(zoom.0.saturating_add(self.step_percent)))
    }

    pub fn zoom_out(&self, zoom: ZoomLevel) -> ZoomLevel {
        self.clamp(ZoomLevel(zoom.0.saturating_sub(self.step_percent)))
    }
}

/// Sizing of the presentation surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceOptions {
    /// Preferred share of the viewport used by the book
    pub viewport_ratio: f32,
    /// Hard upper share of the viewport
    pub max_viewport_ratio: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub min_width: f32,
    pub min_height: f32,
    /// Show single pages when the book is taller than wide
    pub use_portrait: bool,
    pub flipping_time_ms: u64,
    pub resize_debounce_ms: u64,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            viewport_ratio: 0.9,
            max_viewport_ratio: 0.95,
            max_width: 1200.0,
            max_height: 2500.0,
            min_width: 400.0,
            min_height: 600.0,
            use_portrait: true,
            flipping_time_ms: 1200,
            resize_debounce_ms: 100,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewerOptions {
    /// Show the first page alone, as a book cover
    pub show_cover: bool,
    /// Image shown instead of page 0
    pub cover_image: Option<PathBuf>,

    // Loading
    pub initial_pages_to_load: usize,
    pub max_concurrent_renders: usize,

    // Caching
    pub cache_enabled: bool,
    pub cache_capacity: usize,

    pub zoom: ZoomConfig,
    pub surface: SurfaceOptions,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            show_cover: true,
            cover_image: None,
            initial_pages_to_load: 3,
            max_concurrent_renders: 2,
            cache_enabled: true,
            cache_capacity: 128,
            zoom: ZoomConfig::default(),
            surface: SurfaceOptions::default(),
        }
    }
}

impl ViewerOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ViewerError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ViewerError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.initial_pages_to_load == 0 {
            return Err(ViewerError::Config(
                "initial_pages_to_load must be at least 1".to_string(),
            ));
        }

        if self.max_concurrent_renders == 0 {
            return Err(ViewerError::Config(
                "max_concurrent_renders must be at least 1".to_string(),
            ));
        }

        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(ViewerError::Config(
                "cache_capacity must be at least 1 when the cache is enabled".to_string(),
            ));
        }

        let zoom = &self.zoom;
        if zoom.step_percent == 0 {
            return Err(ViewerError::Config("Zoom step must be positive".to_string()));
        }
        if zoom.min_percent == 0 || zoom.min_percent > zoom.max_percent {
            return Err(ViewerError::Config(format!(
                "Invalid zoom range {}%..{}%",
                zoom.min_percent, zoom.max_percent
            )));
        }
        if !(zoom.min_percent..=zoom.max_percent).contains(&zoom.initial_percent) {
            return Err(ViewerError::Config(format!(
                "Initial zoom {}% is outside {}%..{}%",
                zoom.initial_percent, zoom.min_percent, zoom.max_percent
            )));
        }

        let surface = &self.surface;
        if !(surface.viewport_ratio > 0.0 && surface.viewport_ratio <= surface.max_viewport_ratio)
            || surface.max_viewport_ratio > 1.0
        {
            return Err(ViewerError::Config(
                "Viewport ratios must satisfy 0 < viewport_ratio <= max_viewport_ratio <= 1"
                    .to_string(),
            ));
        }
        if surface.min_width > surface.max_width || surface.min_height > surface.max_height {
            return Err(ViewerError::Config(
                "Surface minimum size exceeds maximum size".to_string(),
            ));
        }

        Ok(())
    }
}
