use eframe::egui;
use flipbook_core::{RenderedPage, SurfacePage};
use std::collections::HashMap;
use std::sync::Arc;

struct PageTexture {
    page: Arc<RenderedPage>,
    handle: egui::TextureHandle,
}

/// GPU textures for the page sequence, uploaded once per bitmap
#[derive(Default)]
pub struct PageTextures {
    textures: HashMap<usize, PageTexture>,
    /// Slot version the textures were last synced against
    synced: Option<u64>,
}

impl PageTextures {
    /// Upload new bitmaps and drop textures for slots that lost theirs
    pub fn sync(&mut self, ctx: &egui::Context, version: u64, pages: &[SurfacePage<'_>]) {
        if self.synced == Some(version) {
            return;
        }
        self.synced = Some(version);
        self.textures.retain(|&index, _| index < pages.len());

        for (index, page) in pages.iter().enumerate() {
            let Some(bitmap) = page.bitmap() else {
                self.textures.remove(&index);
                continue;
            };
            let stale = self
                .textures
                .get(&index)
                .is_none_or(|texture| !Arc::ptr_eq(&texture.page, bitmap));
            if stale {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [bitmap.width as usize, bitmap.height as usize],
                    &bitmap.rgba,
                );
                let handle =
                    ctx.load_texture(format!("page_{}", index), image, egui::TextureOptions::LINEAR);
                self.textures.insert(
                    index,
                    PageTexture {
                        page: bitmap.clone(),
                        handle,
                    },
                );
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&egui::TextureHandle> {
        self.textures.get(&index).map(|texture| &texture.handle)
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.synced = None;
    }
}
