use eframe::egui;
use flipbook_core::{FullscreenHost, Result};

/// Fullscreen through the native window's viewport commands
pub struct EguiFullscreen<'a> {
    ctx: &'a egui::Context,
}

impl<'a> EguiFullscreen<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl FullscreenHost for EguiFullscreen<'_> {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_fullscreen(&self) -> bool {
        self.ctx
            .input(|i| i.viewport().fullscreen)
            .unwrap_or(false)
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        Ok(())
    }
}
