use easel_engine::coords::ColorRgba;
use easel_engine::core::{App, AppControl, EventCtx, FrameCtx};
use easel_engine::input::{GestureInput, InputEvent, Key, KeyState};
use easel_engine::mode::{EDGE_ENHANCEMENT, RenderMode};
use easel_engine::program::ProgramBuilder;
use easel_engine::session::RenderSession;
use easel_engine::texture::Texture;

use crate::assets::{AssetLoader, AssetSource, DecodedImage};

const IMAGE_VS: &str = include_str!("../../shaders/image.vert.wgsl");
const FILTERS_FS: &str = include_str!("../../shaders/filters.frag.wgsl");
const TEXTURE_FS: &str = include_str!("../../shaders/texture.frag.wgsl");

const IMAGE_TEXTURE: &str = "u_image";
const PALETTE_TEXTURE: &str = "u_palette";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageVariant {
    /// Filter modes selected from the keyboard.
    Filters,
    /// Plain texture with pan/zoom only.
    Pan,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum KeyAction {
    SetMode(RenderMode),
    Redraw,
    Exit,
}

fn key_action(variant: ImageVariant, key: Key) -> Option<KeyAction> {
    if key == Key::Escape {
        return Some(KeyAction::Exit);
    }

    match variant {
        ImageVariant::Filters => match key {
            Key::G => Some(KeyAction::SetMode(RenderMode::Grayscale)),
            Key::I => Some(KeyAction::SetMode(RenderMode::Inverse)),
            Key::K => Some(KeyAction::SetMode(RenderMode::kernel(EDGE_ENHANCEMENT))),
            Key::P => Some(KeyAction::SetMode(RenderMode::PaletteLookup)),
            Key::R => Some(KeyAction::SetMode(RenderMode::Identity)),
            _ => None,
        },
        ImageVariant::Pan => match key {
            Key::M => Some(KeyAction::Redraw),
            _ => None,
        },
    }
}

/// A loaded image on a letterboxed quad, dragged and zoomed with the pointer.
pub struct ImageDemo {
    variant: ImageVariant,
    image: AssetSource,
    palette: AssetSource,
    loader: AssetLoader,
    session: Option<RenderSession>,
}

impl ImageDemo {
    pub fn new(
        variant: ImageVariant,
        image: AssetSource,
        palette: AssetSource,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            variant,
            image,
            palette,
            loader: AssetLoader::spawn()?,
            session: None,
        })
    }

    /// Drawing starts once every texture the variant samples has arrived.
    fn is_ready(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        session.has_texture(IMAGE_TEXTURE)
            && (self.variant == ImageVariant::Pan || session.has_texture(PALETTE_TEXTURE))
    }

    fn install(&mut self, ctx: &EventCtx<'_, '_>, slot: &str, img: DecodedImage) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let rctx = ctx.render_ctx();

        let texture =
            match Texture::from_rgba8(rctx.device, rctx.queue, slot, img.width, img.height, &img.rgba) {
                Ok(t) => t,
                Err(e) => {
                    log::error!("ResourceLoadFailure: `{slot}`: {e}");
                    return;
                }
            };

        if let Err(e) = session.attach_texture(slot, texture) {
            log::error!("cannot attach `{slot}`: {e}");
            return;
        }

        if slot == IMAGE_TEXTURE
            && session.fit_content(&rctx, img.width as f32, img.height as f32).is_none()
        {
            log::debug!("`{slot}` layout deferred until the window has area");
        }
        log::info!("`{slot}` ready ({}x{})", img.width, img.height);
    }
}

impl App for ImageDemo {
    fn on_start(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        let fragment = match self.variant {
            ImageVariant::Filters => FILTERS_FS,
            ImageVariant::Pan => TEXTURE_FS,
        };
        let label = match self.variant {
            ImageVariant::Filters => "filters",
            ImageVariant::Pan => "pan",
        };

        let program = ProgramBuilder::new(label, IMAGE_VS, fragment).build(ctx.gpu.device());
        match RenderSession::new(ctx.gpu.device(), program) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("{e}");
                return AppControl::Exit;
            }
        }

        self.loader.request(IMAGE_TEXTURE, self.image.clone());
        if self.variant == ImageVariant::Filters {
            self.loader.request(PALETTE_TEXTURE, self.palette.clone());
        }

        ctx.request_redraw();
        AppControl::Continue
    }

    fn on_input(&mut self, ctx: &mut EventCtx<'_, '_>, event: &InputEvent) -> AppControl {
        let InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        } = event
        else {
            return AppControl::Continue;
        };

        match key_action(self.variant, *key) {
            Some(KeyAction::Exit) => return AppControl::Exit,
            Some(KeyAction::Redraw) => ctx.request_redraw(),
            Some(KeyAction::SetMode(mode)) => {
                if let Some(session) = self.session.as_mut() {
                    match session.set_mode(mode) {
                        Ok(()) => ctx.request_redraw(),
                        Err(e) => log::warn!("mode {} rejected: {e}", mode.name()),
                    }
                }
            }
            None => {}
        }
        AppControl::Continue
    }

    fn on_gesture(&mut self, ctx: &mut EventCtx<'_, '_>, gesture: GestureInput) -> AppControl {
        let Some(session) = self.session.as_mut() else {
            return AppControl::Continue;
        };
        let rctx = ctx.render_ctx();

        match gesture {
            GestureInput::DragMove { start, current } => session.drag_move(&rctx, start, current),
            GestureInput::DragEnd { start, end } => session.drag_end(&rctx, start, end),
            GestureInput::DragCancel => session.drag_cancel(&rctx),
            GestureInput::Wheel { delta_y } => session.wheel(&rctx, delta_y),
        }

        ctx.request_redraw();
        AppControl::Continue
    }

    fn needs_poll(&self) -> bool {
        self.loader.is_pending()
    }

    fn on_poll(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        let mut changed = false;
        for asset in self.loader.drain() {
            if let Ok(img) = asset.result {
                self.install(ctx, asset.slot, img);
                changed = true;
            }
        }

        if changed && self.is_ready() {
            ctx.request_redraw();
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let ready = self.is_ready();
        let session = self.session.as_mut().filter(|_| ready);

        ctx.render(ColorRgba::black(), |rctx, target| {
            let Some(session) = session else { return };
            if let Err(e) = session.render(rctx, target) {
                log::warn!("frame skipped: {e}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── key bindings ──────────────────────────────────────────────────────

    #[test]
    fn filter_keys_select_modes() {
        let mode = |k| match key_action(ImageVariant::Filters, k) {
            Some(KeyAction::SetMode(m)) => m,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(mode(Key::G), RenderMode::Grayscale);
        assert_eq!(mode(Key::I), RenderMode::Inverse);
        assert_eq!(mode(Key::P), RenderMode::PaletteLookup);
        assert_eq!(mode(Key::R), RenderMode::Identity);
    }

    #[test]
    fn kernel_key_uses_edge_enhancement_weighted_by_its_sum() {
        match key_action(ImageVariant::Filters, Key::K) {
            Some(KeyAction::SetMode(RenderMode::Kernel {
                coefficients,
                weight,
            })) => {
                assert_eq!(coefficients, EDGE_ENHANCEMENT);
                assert_eq!(weight, 2.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pan_only_rerenders() {
        assert_eq!(key_action(ImageVariant::Pan, Key::M), Some(KeyAction::Redraw));
        assert_eq!(key_action(ImageVariant::Pan, Key::G), None);
        assert_eq!(key_action(ImageVariant::Filters, Key::M), None);
    }

    #[test]
    fn escape_exits_everywhere() {
        assert_eq!(key_action(ImageVariant::Pan, Key::Escape), Some(KeyAction::Exit));
        assert_eq!(key_action(ImageVariant::Filters, Key::Escape), Some(KeyAction::Exit));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(key_action(ImageVariant::Filters, Key::Unknown(7)), None);
        assert_eq!(key_action(ImageVariant::Filters, Key::Space), None);
    }
}
