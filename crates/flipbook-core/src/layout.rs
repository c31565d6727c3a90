//! Presentation surface geometry: book size, spreads and resize debouncing

use crate::options::SurfaceOptions;
use std::time::{Duration, Instant};

/// Size of the book on screen, derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookSize {
    pub width: f32,
    pub height: f32,
    /// One page at a time instead of two
    pub portrait: bool,
}

impl BookSize {
    pub fn fit(viewport: (f32, f32), options: &SurfaceOptions) -> Self {
        let (viewport_width, viewport_height) = viewport;
        let width = clamp_upper_wins(
            (viewport_width * options.viewport_ratio).min(options.max_width),
            options.min_width,
            viewport_width * options.max_viewport_ratio,
        );
        let height = clamp_upper_wins(
            (viewport_height * options.viewport_ratio).min(options.max_height),
            options.min_height,
            viewport_height * options.max_viewport_ratio,
        );

        Self {
            width,
            height,
            portrait: options.use_portrait && width < height,
        }
    }

    /// Width of a single page
    pub fn page_width(&self) -> f32 {
        if self.portrait {
            self.width
        } else {
            self.width / 2.0
        }
    }
}

// A viewport smaller than the minimum still bounds the book
fn clamp_upper_wins(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max).max(0.0)
}

/// Largest size with the bitmap's aspect ratio that fits inside a box
pub fn fit_within(image: (f32, f32), bounds: (f32, f32)) -> (f32, f32) {
    let (image_width, image_height) = image;
    let (max_width, max_height) = bounds;
    if image_width <= 0.0 || image_height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / image_width).min(max_height / image_height);
    (image_width * scale, image_height * scale)
}

/// Pages visible together on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    Empty,
    /// Portrait mode: one page fills the book
    Single(usize),
    /// Landscape mode: facing pages, either side may be blank
    Pair {
        left: Option<usize>,
        right: Option<usize>,
    },
}

impl Spread {
    pub fn containing(index: usize, page_count: usize, show_cover: bool, portrait: bool) -> Self {
        if page_count == 0 {
            return Spread::Empty;
        }
        let index = index.min(page_count - 1);

        if portrait {
            return Spread::Single(index);
        }

        if show_cover && index == 0 {
            return Spread::Pair {
                left: None,
                right: Some(0),
            };
        }

        let left = if show_cover {
            // Spreads are (1, 2), (3, 4), ...
            index - (index + 1) % 2
        } else {
            index - index % 2
        };
        let right = Some(left + 1).filter(|&right| right < page_count);

        Spread::Pair {
            left: Some(left),
            right,
        }
    }

    pub fn first(&self) -> Option<usize> {
        match *self {
            Spread::Empty => None,
            Spread::Single(index) => Some(index),
            Spread::Pair { left, right } => left.or(right),
        }
    }

    pub fn last(&self) -> Option<usize> {
        match *self {
            Spread::Empty => None,
            Spread::Single(index) => Some(index),
            Spread::Pair { left, right } => right.or(left),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        match *self {
            Spread::Empty => false,
            Spread::Single(page) => page == index,
            Spread::Pair { left, right } => left == Some(index) || right == Some(index),
        }
    }
}

/// Coalesces bursts of viewport resize events
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    current: (f32, f32),
    pending: Option<((f32, f32), Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration, initial: (f32, f32)) -> Self {
        Self {
            delay,
            current: initial,
            pending: None,
        }
    }

    /// Record a resize event; restarts the quiet period
    pub fn record(&mut self, size: (f32, f32), now: Instant) {
        if self.pending.is_none() && size == self.current {
            return;
        }
        if let Some((pending, _)) = self.pending {
            if pending == size {
                return;
            }
        }
        self.pending = Some((size, now));
    }

    /// Returns the new size once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<(f32, f32)> {
        let (size, since) = self.pending?;
        if now.duration_since(since) < self.delay {
            return None;
        }
        self.pending = None;
        if size == self.current {
            return None;
        }
        self.current = size;
        Some(size)
    }

    /// Time left before a pending size is applied
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, since)| self.delay.saturating_sub(now.duration_since(since)))
    }
}
