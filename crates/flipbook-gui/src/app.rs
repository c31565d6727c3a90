use eframe::egui;
use flipbook_core::layout::{BookSize, ResizeDebouncer};
use flipbook_core::{DocumentRef, PdfiumSource, Result, Viewer, ViewerOptions};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::book::{BookSide, FlipBook};
use crate::fullscreen::EguiFullscreen;
use crate::logger::AppLogger;
use crate::textures::PageTextures;

pub const INITIAL_WINDOW_SIZE: [f32; 2] = [1280.0, 900.0];

/// How often to poll the loader while pages are still arriving
const LOADING_POLL: Duration = Duration::from_millis(50);

pub struct FlipbookApp {
    viewer: Viewer,
    book: FlipBook,
    textures: PageTextures,
    logger: AppLogger,
    resize: ResizeDebouncer,
    book_size: BookSize,
}

impl FlipbookApp {
    /// Must be called inside a tokio runtime context
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        options: ViewerOptions,
        logger: AppLogger,
        file: Option<PathBuf>,
    ) -> Result<Self> {
        let viewport = (INITIAL_WINDOW_SIZE[0], INITIAL_WINDOW_SIZE[1]);
        let surface = options.surface;

        let book = FlipBook::new(
            options.show_cover,
            Duration::from_millis(surface.flipping_time_ms),
        );
        let mut viewer = Viewer::new(PdfiumSource::new(), options)?;
        if let Some(path) = file {
            viewer.open(DocumentRef::Path(path));
        }

        Ok(Self {
            viewer,
            book,
            textures: PageTextures::default(),
            logger,
            resize: ResizeDebouncer::new(
                Duration::from_millis(surface.resize_debounce_ms),
                viewport,
            ),
            book_size: BookSize::fit(viewport, &surface),
        })
    }

    fn open(&mut self, path: PathBuf) {
        self.textures.clear();
        self.viewer.open(DocumentRef::Path(path));
    }

    fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .pick_file()
        {
            self.open(path);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("pdf"))
                .collect()
        });
        // Only the last dropped document stays open
        if let Some(path) = dropped.into_iter().last() {
            self.open(path);
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let (next, prev, home, fullscreen, zoom_in, zoom_out) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::Home),
                i.key_pressed(egui::Key::F11),
                i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals),
                i.key_pressed(egui::Key::Minus),
            )
        });

        if next {
            self.viewer.next_page(&mut self.book);
        }
        if prev {
            self.viewer.prev_page(&mut self.book);
        }
        if home {
            self.viewer.go_to_home(&mut self.book);
        }
        if fullscreen {
            self.viewer.toggle_fullscreen(&mut EguiFullscreen::new(ctx));
        }
        if zoom_in {
            self.viewer.zoom_in();
        }
        if zoom_out {
            self.viewer.zoom_out();
        }
    }

    fn track_viewport(&mut self, size: egui::Vec2) {
        let now = Instant::now();
        self.resize.record((size.x, size.y), now);
        if let Some(viewport) = self.resize.poll(now) {
            self.book_size = BookSize::fit(viewport, &self.viewer.options().surface);
            log::debug!(
                "Book resized to {:.0}x{:.0}",
                self.book_size.width,
                self.book_size.height
            );
        }
    }

    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("📂 Open…").clicked() {
                    self.open_dialog();
                }
                ui.separator();

                let state = self.viewer.state();
                let has_pages = state.page_count > 0;
                let can_go_back = state.current_page > 0;
                let can_go_forward = has_pages && !state.is_last_page();
                let label = self.viewer.page_label();
                let zoom = state.zoom;

                if ui
                    .add_enabled(can_go_back, egui::Button::new("◀ Previous"))
                    .clicked()
                {
                    self.viewer.prev_page(&mut self.book);
                }
                ui.label(label);
                if ui
                    .add_enabled(can_go_forward, egui::Button::new("Next ▶"))
                    .clicked()
                {
                    self.viewer.next_page(&mut self.book);
                }
                ui.separator();

                if ui.button("➖").on_hover_text("Zoom out").clicked() {
                    self.viewer.zoom_out();
                }
                ui.label(zoom.to_string());
                if ui.button("➕").on_hover_text("Zoom in").clicked() {
                    self.viewer.zoom_in();
                }
                ui.separator();

                if ui
                    .add_enabled(has_pages, egui::Button::new("⏮ Home"))
                    .clicked()
                {
                    self.viewer.go_to_home(&mut self.book);
                }
                if ui.button("⛶ Fullscreen").clicked() {
                    self.viewer.toggle_fullscreen(&mut EguiFullscreen::new(ctx));
                }
                if ui
                    .add_enabled(has_pages, egui::Button::new("Close"))
                    .clicked()
                {
                    self.textures.clear();
                    self.viewer.close();
                }
            });
        });
    }

    fn draw_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.viewer.state().loading {
                    ui.spinner();
                }
                if let Some(entry) = self.logger.latest() {
                    let text = format!("{} {}", entry.timestamp.format("%H:%M:%S"), entry.message);
                    match entry.level {
                        log::Level::Error => ui.colored_label(ui.visuals().error_fg_color, text),
                        log::Level::Warn => ui.colored_label(ui.visuals().warn_fg_color, text),
                        _ => ui.label(text),
                    };
                }
            });
        });
    }

    fn draw_book(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.track_viewport(ui.available_size());
            let state = self.viewer.state();

            if let Some(error) = &state.error {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, error.as_str());
                });
                return;
            }

            if state.page_count == 0 && !state.loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(50.0);
                    ui.heading("Flipbook");
                    ui.add_space(20.0);
                    ui.label("Drop a PDF file here or click Open");
                });
                return;
            }

            if !state.book_ready {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }

            let pages = self.viewer.pages();
            self.textures.sync(ctx, self.viewer.slots().version(), &pages);

            let clicked = ui
                .vertical_centered(|ui| {
                    let spare = (ui.available_height() - self.book_size.height).max(0.0);
                    ui.add_space(spare / 2.0);
                    self.book.show(ui, &pages, &self.textures, self.book_size)
                })
                .inner;
            drop(pages);

            match clicked {
                Some(BookSide::Left) => self.viewer.prev_page(&mut self.book),
                Some(BookSide::Right) => self.viewer.next_page(&mut self.book),
                None => {}
            }
        });
    }
}

impl eframe::App for FlipbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // The loader never wakes the UI, so keep polling until every slot settled
        let applied = self.viewer.poll_events();
        if applied > 0 || self.viewer.has_pending_work() {
            ctx.request_repaint_after(LOADING_POLL);
        }

        self.handle_keyboard_shortcuts(ctx);
        self.draw_toolbar(ctx);
        self.draw_status_bar(ctx);
        self.draw_book(ctx);

        // Page turns started by the book are reported back to the viewer
        if let Some(index) = self.book.take_page_change() {
            self.viewer.on_external_page_change(index);
        }
        let state = self.viewer.state();
        self.book
            .sync(state.page_count, state.current_page, self.book_size.portrait);

        if let Some(remaining) = self.resize.remaining(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}
