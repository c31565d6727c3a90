//! Collaborator interfaces for the presentation surface and the host environment

use crate::types::{Result, RenderedPage};
use std::sync::Arc;

/// Navigation forwarded to the presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipRequest {
    Next,
    Prev,
    To(usize),
}

/// A widget that shows the page sequence and animates flips.
///
/// Page changes initiated by the widget itself (gestures, clicks) are reported
/// back through `Viewer::on_external_page_change`.
pub trait PresentationSurface {
    fn flip_next(&mut self);
    fn flip_prev(&mut self);
    fn flip_to(&mut self, index: usize);

    fn apply(&mut self, request: FlipRequest) {
        match request {
            FlipRequest::Next => self.flip_next(),
            FlipRequest::Prev => self.flip_prev(),
            FlipRequest::To(index) => self.flip_to(index),
        }
    }
}

/// Fullscreen control offered by the hosting window
pub trait FullscreenHost {
    fn is_supported(&self) -> bool;
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&mut self) -> Result<()>;
    fn exit_fullscreen(&mut self) -> Result<()>;
}

/// Enter or leave fullscreen. Failures are logged, never propagated.
///
/// Returns true when the host accepted a request.
pub fn toggle_fullscreen(host: &mut dyn FullscreenHost) -> bool {
    if !host.is_supported() {
        log::warn!("Fullscreen mode is not supported by this host");
        return false;
    }

    let result = if host.is_fullscreen() {
        host.exit_fullscreen()
    } else {
        host.request_fullscreen()
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error while toggling fullscreen: {}", e);
            false
        }
    }
}

/// What the surface should draw at one position of the sequence
#[derive(Debug, Clone, Copy)]
pub enum SurfacePage<'a> {
    Cover(&'a Arc<RenderedPage>),
    Page(&'a Arc<RenderedPage>),
    Loading,
    /// Rasterization failed; draw a placeholder
    Failed(&'a str),
}

impl<'a> SurfacePage<'a> {
    pub fn bitmap(&self) -> Option<&'a Arc<RenderedPage>> {
        match *self {
            SurfacePage::Cover(page) | SurfacePage::Page(page) => Some(page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ViewerError;

    struct FakeHost {
        supported: bool,
        fullscreen: bool,
        reject: bool,
        requests: usize,
    }

    impl FullscreenHost for FakeHost {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn request_fullscreen(&mut self) -> Result<()> {
            self.requests += 1;
            if self.reject {
                return Err(ViewerError::Fullscreen("denied".into()));
            }
            self.fullscreen = true;
            Ok(())
        }

        fn exit_fullscreen(&mut self) -> Result<()> {
            self.requests += 1;
            self.fullscreen = false;
            Ok(())
        }
    }

    fn host() -> FakeHost {
        FakeHost {
            supported: true,
            fullscreen: false,
            reject: false,
            requests: 0,
        }
    }

    #[test]
    fn test_toggle_enters_and_exits() {
        let mut host = host();
        assert!(toggle_fullscreen(&mut host));
        assert!(host.fullscreen);
        assert!(toggle_fullscreen(&mut host));
        assert!(!host.fullscreen);
        assert_eq!(host.requests, 2);
    }

    #[test]
    fn test_toggle_unsupported_is_noop() {
        let mut host = FakeHost {
            supported: false,
            ..host()
        };
        assert!(!toggle_fullscreen(&mut host));
        assert_eq!(host.requests, 0);
    }

    #[test]
    fn test_toggle_rejection_is_contained() {
        let mut host = FakeHost {
            reject: true,
            ..host()
        };
        assert!(!toggle_fullscreen(&mut host));
        assert!(!host.fullscreen);
    }
}
