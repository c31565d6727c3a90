use crate::textures::PageTextures;
use eframe::egui;
use flipbook_core::layout::{BookSize, Spread, fit_within};
use flipbook_core::{PresentationSurface, SurfacePage};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Left,
    Right,
}

struct Turn {
    from: Spread,
    forward: bool,
    started: Instant,
}

/// Page-flip widget: shows one spread and animates turns between spreads
pub struct FlipBook {
    current: usize,
    page_count: usize,
    show_cover: bool,
    portrait: bool,
    flipping_time: Duration,
    turn: Option<Turn>,
    page_change: Option<usize>,
}

impl FlipBook {
    pub fn new(show_cover: bool, flipping_time: Duration) -> Self {
        Self {
            current: 0,
            page_count: 0,
            show_cover,
            portrait: false,
            flipping_time,
            turn: None,
            page_change: None,
        }
    }

    fn spread(&self) -> Spread {
        Spread::containing(self.current, self.page_count, self.show_cover, self.portrait)
    }

    /// Jump to the viewer's page when it is no longer on screen
    pub fn sync(&mut self, page_count: usize, current_page: usize, portrait: bool) {
        self.page_count = page_count;
        self.portrait = portrait;
        if !self.spread().contains(current_page) {
            self.current = current_page;
            self.turn = None;
        }
    }

    /// First page of the spread the book turned to, once per turn
    pub fn take_page_change(&mut self) -> Option<usize> {
        self.page_change.take()
    }

    fn turn_to(&mut self, index: usize) {
        if self.page_count == 0 {
            return;
        }
        let index = index.min(self.page_count - 1);
        let from = self.spread();
        if from.contains(index) {
            return;
        }

        self.turn = Some(Turn {
            from,
            forward: index > self.current,
            started: Instant::now(),
        });
        let to = Spread::containing(index, self.page_count, self.show_cover, self.portrait);
        self.current = to.first().unwrap_or(index);
        self.page_change = Some(self.current);
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        pages: &[SurfacePage<'_>],
        textures: &PageTextures,
        size: BookSize,
    ) -> Option<BookSide> {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(size.width, size.height), egui::Sense::click());
        let painter = ui.painter_at(rect);
        let visuals = ui.visuals().clone();

        painter.rect_filled(rect, 4.0, visuals.extreme_bg_color);
        for (page_rect, index) in page_rects(rect, self.spread()) {
            paint_page(&painter, page_rect, index, pages, textures, &visuals);
        }
        if !self.portrait {
            painter.vline(
                rect.center().x,
                rect.y_range(),
                egui::Stroke::new(1.0, visuals.weak_text_color()),
            );
        }

        let progress = self.turn.as_ref().map(|turn| {
            turn.started.elapsed().as_secs_f32() / self.flipping_time.as_secs_f32().max(0.001)
        });
        match progress {
            Some(progress) if progress < 1.0 => {
                if let Some(turn) = &self.turn {
                    paint_turning_page(&painter, rect, turn, progress, pages, textures, &visuals);
                }
                ui.ctx().request_repaint();
            }
            _ => self.turn = None,
        }

        if !response.clicked() {
            return None;
        }
        let pointer = response.interact_pointer_pos()?;
        if pointer.x < rect.center().x {
            Some(BookSide::Left)
        } else {
            Some(BookSide::Right)
        }
    }
}

impl PresentationSurface for FlipBook {
    fn flip_next(&mut self) {
        if let Some(last) = self.spread().last() {
            if last + 1 < self.page_count {
                self.turn_to(last + 1);
            }
        }
    }

    fn flip_prev(&mut self) {
        if let Some(first) = self.spread().first() {
            if first > 0 {
                self.turn_to(first - 1);
            }
        }
    }

    fn flip_to(&mut self, index: usize) {
        self.turn_to(index);
    }
}

fn page_rects(rect: egui::Rect, spread: Spread) -> Vec<(egui::Rect, Option<usize>)> {
    let (left_half, right_half) = rect.split_left_right_at_fraction(0.5);
    match spread {
        Spread::Empty => Vec::new(),
        Spread::Single(index) => vec![(rect, Some(index))],
        Spread::Pair { left, right } => vec![(left_half, left), (right_half, right)],
    }
}

fn image_rect(texture: &egui::TextureHandle, bounds: egui::Rect) -> egui::Rect {
    let texture_size = texture.size_vec2();
    let (width, height) = fit_within(
        (texture_size.x, texture_size.y),
        (bounds.width(), bounds.height()),
    );
    egui::Rect::from_center_size(bounds.center(), egui::vec2(width, height))
}

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

fn paint_page(
    painter: &egui::Painter,
    rect: egui::Rect,
    index: Option<usize>,
    pages: &[SurfacePage<'_>],
    textures: &PageTextures,
    visuals: &egui::Visuals,
) {
    let Some(index) = index else {
        return;
    };

    let message = match (pages.get(index), textures.get(index)) {
        (Some(SurfacePage::Cover(_) | SurfacePage::Page(_)), Some(texture)) => {
            painter.image(
                texture.id(),
                image_rect(texture, rect),
                full_uv(),
                egui::Color32::WHITE,
            );
            return;
        }
        (Some(SurfacePage::Failed(_)), _) => {
            format!("Page {} could not be rendered", index + 1)
        }
        _ => "Loading…".to_string(),
    };

    painter.rect_filled(rect.shrink(8.0), 4.0, visuals.faint_bg_color);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::proportional(16.0),
        visuals.weak_text_color(),
    );
}

/// The page leaving the screen folds toward the spine as the turn progresses
fn paint_turning_page(
    painter: &egui::Painter,
    rect: egui::Rect,
    turn: &Turn,
    progress: f32,
    pages: &[SurfacePage<'_>],
    textures: &PageTextures,
    visuals: &egui::Visuals,
) {
    let leaving = match turn.from {
        Spread::Empty => return,
        Spread::Single(index) => (rect, index),
        Spread::Pair { left, right } => {
            let (left_half, right_half) = rect.split_left_right_at_fraction(0.5);
            let side = if turn.forward {
                right.map(|index| (right_half, index))
            } else {
                left.map(|index| (left_half, index))
            };
            let Some(side) = side else {
                return;
            };
            side
        }
    };
    let (page_rect, index) = leaving;
    let Some(texture) = textures.get(index) else {
        return;
    };

    let full = image_rect(texture, page_rect);
    let width = full.width() * (1.0 - progress);
    // Forward turns fold toward the left edge of the leaving page
    let folded = if turn.forward {
        egui::Rect::from_min_size(full.min, egui::vec2(width, full.height()))
    } else {
        egui::Rect::from_min_size(
            egui::pos2(full.max.x - width, full.min.y),
            egui::vec2(width, full.height()),
        )
    };

    if !matches!(pages.get(index), Some(SurfacePage::Cover(_) | SurfacePage::Page(_))) {
        return;
    }
    painter.rect_filled(folded.expand(2.0), 2.0, visuals.extreme_bg_color);
    painter.image(texture.id(), folded, full_uv(), egui::Color32::WHITE);
}
