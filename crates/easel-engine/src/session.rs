//! One textured quad with pan/zoom, a render mode and its GPU handles.
//!
//! All state an image demo needs lives in a [`RenderSession`]; nothing is
//! global. Every mutating call regenerates what changed, and nothing becomes
//! visible until the next [`RenderSession::render`].

use crate::buffer::{AttributeBinder, BufferKind, BufferStore, GpuBuffer, UsageHint};
use crate::coords::{ColorRgba, Rectangle, Vec2, Viewport};
use crate::error::{EngineError, EngineResult};
use crate::geometry::rect_vertices;
use crate::gesture::GestureCoordinator;
use crate::layout::letterbox;
use crate::mode::{MODE_UNIFORM, RenderMode};
use crate::program::{ShaderProgram, UniformBuffer};
use crate::render::{RenderCtx, RenderTarget};
use crate::texture::Texture;

/// Vertex attribute carrying clip-space corners.
pub const POSITION_ATTRIBUTE: &str = "position";

/// Optional vertex attribute carrying texture coordinates.
pub const TEX_COORDS_ATTRIBUTE: &str = "tex_coords";

const TOPOLOGY: wgpu::PrimitiveTopology = wgpu::PrimitiveTopology::TriangleList;

/// Placement, gesture and mode bookkeeping for a [`RenderSession`].
///
/// Holds no GPU handles. Every check the session runs before recording a
/// draw lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    program: String,
    accepts_mode: bool,
    mode: RenderMode,
    gesture: GestureCoordinator,
    content: Option<(f32, f32)>,
    fit_pending: bool,
}

impl SessionState {
    /// `accepts_mode` says whether the program has a `mode` uniform member.
    pub fn new(program: impl Into<String>, accepts_mode: bool) -> Self {
        Self {
            program: program.into(),
            accepts_mode,
            mode: RenderMode::default(),
            gesture: GestureCoordinator::default(),
            content: None,
            fit_pending: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        self
    }

    #[inline]
    pub fn gesture(&self) -> &GestureCoordinator {
        &self.gesture
    }

    /// True while a layout is waiting for a usable viewport.
    #[inline]
    pub fn is_fit_pending(&self) -> bool {
        self.fit_pending
    }

    /// Checks that `mode` can be selected without selecting it.
    pub fn check_mode(&self, mode: RenderMode) -> EngineResult<()> {
        mode.validate()?;
        if self.accepts_mode || mode == RenderMode::Identity {
            return Ok(());
        }
        Err(EngineError::UnknownUniform {
            program: self.program.clone(),
            name: MODE_UNIFORM.to_string(),
        })
    }

    /// Selects `mode`; on error the previous mode stays active.
    pub fn select_mode(&mut self, mode: RenderMode) -> EngineResult<()> {
        self.check_mode(mode)?;
        log::debug!("render mode: {}", mode.name());
        self.mode = mode;
        Ok(())
    }

    /// Runs before anything is recorded for a frame.
    pub fn check_render(&self) -> EngineResult<()> {
        self.check_mode(self.mode)
    }

    /// Letterboxes `content_w x content_h` pixels into `viewport` and commits
    /// the placement.
    ///
    /// Returns `None` when the viewport has no area; the layout is then kept
    /// pending until [`refit`](Self::refit) sees a usable viewport.
    pub fn fit(&mut self, content_w: f32, content_h: f32, viewport: Viewport) -> Option<Rectangle> {
        self.content = Some((content_w, content_h));
        self.fit_pending = true;
        self.refit(viewport)
    }

    /// Finishes a pending [`fit`](Self::fit) once `viewport` has area.
    pub fn refit(&mut self, viewport: Viewport) -> Option<Rectangle> {
        if !self.fit_pending || !viewport.is_valid() {
            return None;
        }
        let (w, h) = self.content?;
        let placement = letterbox(w, h, viewport).to_clip(viewport);
        if !placement.is_finite() {
            log::warn!("cannot fit {w}x{h} content into {}x{}", viewport.width, viewport.height);
            return None;
        }

        log::debug!(
            "fit {w}x{h} into {}x{}: {:?}",
            viewport.width,
            viewport.height,
            placement
        );
        self.fit_pending = false;
        self.gesture.reset(placement);
        Some(placement)
    }

    /// Preview rectangle for a drag, or `None` on a viewport with no area.
    pub fn drag_move(&mut self, start: Vec2, end: Vec2, viewport: Viewport) -> Option<Rectangle> {
        viewport
            .is_valid()
            .then(|| self.gesture.on_drag_move(start, end, viewport))
    }

    /// Commits a drag, or ignores it on a viewport with no area.
    pub fn drag_end(&mut self, start: Vec2, end: Vec2, viewport: Viewport) -> Option<Rectangle> {
        viewport
            .is_valid()
            .then(|| self.gesture.on_drag_end(start, end, viewport))
    }

    pub fn drag_cancel(&mut self) -> Rectangle {
        self.gesture.on_drag_cancel()
    }

    pub fn wheel(&mut self, delta_y: f32) -> Rectangle {
        self.gesture.on_wheel(delta_y)
    }
}

pub struct RenderSession {
    program: ShaderProgram,
    store: BufferStore,

    positions: GpuBuffer,
    tex_coords: Option<GpuBuffer>,
    uniforms: Option<UniformBuffer>,
    textures: Vec<(String, Texture)>,
    bind_groups: Option<Vec<wgpu::BindGroup>>,

    state: SessionState,
    clear: ColorRgba,
}

impl RenderSession {
    /// Wraps `program`, which must declare a `position` attribute if it linked.
    ///
    /// An unlinked program is accepted: the session then renders a blank surface.
    pub fn new(device: &wgpu::Device, program: ShaderProgram) -> EngineResult<Self> {
        let has_tex_coords = if program.is_linked() {
            program.attribute(POSITION_ATTRIBUTE)?;
            program.attribute(TEX_COORDS_ATTRIBUTE).is_ok()
        } else {
            false
        };

        let mut store = BufferStore::new();
        let mut uniforms = program.create_uniform_buffer(device);
        let accepts_mode = uniforms
            .as_ref()
            .is_some_and(|u| u.block().layout().field(MODE_UNIFORM).is_some());
        let state = SessionState::new(program.label(), accepts_mode);

        let positions = store.create(
            device,
            BufferKind::Vertex,
            UsageHint::Dynamic,
            &rect_vertices(state.gesture().committed()),
        );
        let tex_coords = has_tex_coords.then(|| {
            store.create(
                device,
                BufferKind::Vertex,
                UsageHint::Static,
                &rect_vertices(Rectangle::UNIT),
            )
        });

        if let Some(u) = uniforms.as_mut().filter(|_| accepts_mode) {
            state.mode().write_uniforms(u.block_mut())?;
        }

        Ok(Self {
            program,
            store,
            positions,
            tex_coords,
            uniforms,
            textures: Vec::new(),
            bind_groups: None,
            state,
            clear: ColorRgba::black(),
        })
    }

    #[inline]
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    #[inline]
    pub fn mode(&self) -> RenderMode {
        self.state.mode()
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[inline]
    pub fn buffers(&self) -> &BufferStore {
        &self.store
    }

    pub fn set_clear_color(&mut self, clear: ColorRgba) {
        self.clear = clear;
    }

    /// Uploads the quad for a clip-space rectangle.
    pub fn set_geometry(&mut self, ctx: &RenderCtx<'_>, rect: Rectangle) {
        let data = rect_vertices(rect);
        self.store.upload(ctx.device, ctx.queue, &mut self.positions, &data);
    }

    /// Letterboxes `content_w x content_h` pixels into the viewport and makes
    /// that placement the committed gesture state.
    ///
    /// On a minimized surface the layout waits for the next frame with a
    /// usable viewport.
    pub fn fit_content(&mut self, ctx: &RenderCtx<'_>, content_w: f32, content_h: f32) -> Option<Rectangle> {
        let placement = self.state.fit(content_w, content_h, ctx.viewport)?;
        self.set_geometry(ctx, placement);
        Some(placement)
    }

    /// Attaches `texture` under the program's texture name `name`.
    ///
    /// A texture already attached under that name is disposed.
    pub fn attach_texture(&mut self, name: &str, texture: Texture) -> EngineResult<()> {
        if self.program.is_linked() {
            self.program.texture(name)?;
        }

        self.bind_groups = None;
        match self.textures.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                let old = std::mem::replace(slot, texture);
                log::debug!("texture `{name}` replaced");
                old.dispose();
            }
            None => self.textures.push((name.to_string(), texture)),
        }
        Ok(())
    }

    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.iter().any(|(n, _)| n == name)
    }

    /// Selects the active render mode.
    ///
    /// Invalid kernels are rejected and the previous mode stays active.
    pub fn set_mode(&mut self, mode: RenderMode) -> EngineResult<()> {
        self.state.check_mode(mode)?;
        if self.state.accepts_mode {
            if let Some(u) = self.uniforms.as_mut() {
                mode.write_uniforms(u.block_mut())?;
            }
        }
        self.state.select_mode(mode)
    }

    /// Previews a drag; the committed placement is unchanged.
    pub fn drag_move(&mut self, ctx: &RenderCtx<'_>, start: Vec2, end: Vec2) {
        if let Some(rect) = self.state.drag_move(start, end, ctx.viewport) {
            self.set_geometry(ctx, rect);
        }
    }

    pub fn drag_end(&mut self, ctx: &RenderCtx<'_>, start: Vec2, end: Vec2) {
        if let Some(rect) = self.state.drag_end(start, end, ctx.viewport) {
            self.set_geometry(ctx, rect);
        }
    }

    /// Puts the quad back at the committed placement after an aborted drag.
    pub fn drag_cancel(&mut self, ctx: &RenderCtx<'_>) {
        let rect = self.state.drag_cancel();
        self.set_geometry(ctx, rect);
    }

    pub fn wheel(&mut self, ctx: &RenderCtx<'_>, delta_y: f32) {
        let rect = self.state.wheel(delta_y);
        self.set_geometry(ctx, rect);
    }

    /// Draws the quad into `target`.
    ///
    /// The mode is validated before anything is recorded. Once validation
    /// passes the surface is always cleared, so an unlinked program or a
    /// missing texture leaves it blank and reports `NotReady`. A layout left
    /// pending by a minimized surface is applied here.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> EngineResult<()> {
        self.state.check_render()?;
        if let Some(rect) = self.state.refit(ctx.viewport) {
            self.set_geometry(ctx, rect);
        }

        if let Some(u) = self.uniforms.as_mut() {
            u.flush(ctx.queue);
        }
        self.program.prepare(ctx.device, ctx.surface_format, &[TOPOLOGY]);

        let groups = match self.bind_groups.take() {
            Some(groups) => Ok(groups),
            None if self.program.is_linked() => {
                let textures: Vec<(&str, &Texture)> =
                    self.textures.iter().map(|(n, t)| (n.as_str(), t)).collect();
                self.program
                    .create_bind_groups(ctx.device, self.uniforms.as_ref(), &textures)
            }
            None => Err(EngineError::NotReady(format!(
                "program `{}` is not linked",
                self.program.label()
            ))),
        };

        let mut pass = target.begin_pass("easel session pass", Some(self.clear));
        let groups = groups?;

        let drawn = self.draw(&mut pass, &groups);
        drop(pass);
        self.bind_groups = Some(groups);
        drawn
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, groups: &[wgpu::BindGroup]) -> EngineResult<()> {
        let count = AttributeBinder::bind(pass, &self.program, POSITION_ATTRIBUTE, &self.positions)?;
        if let Some(uv) = &self.tex_coords {
            AttributeBinder::bind(pass, &self.program, TEX_COORDS_ATTRIBUTE, uv)?;
        }
        if count == 0 {
            return Ok(());
        }
        self.program.draw(pass, TOPOLOGY, groups, 0..count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::EDGE_ENHANCEMENT;

    const VP: Viewport = Viewport::new(800.0, 600.0);
    const MINIMIZED: Viewport = Viewport::new(0.0, 0.0);

    /// Laplacian; its coefficients sum to zero.
    const ZERO_SUM: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

    fn filters() -> SessionState {
        SessionState::new("filters", true)
    }

    fn plain() -> SessionState {
        SessionState::new("pan", false)
    }

    // ── mode selection ────────────────────────────────────────────────────

    #[test]
    fn zero_sum_kernel_is_rejected_and_previous_mode_kept() {
        let mut s = filters();
        s.select_mode(RenderMode::Grayscale).unwrap();

        let err = s.select_mode(RenderMode::kernel(ZERO_SUM)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidKernelWeight(w) if w == 0.0));
        assert_eq!(s.mode(), RenderMode::Grayscale);
    }

    #[test]
    fn weighted_kernel_is_selected() {
        let mut s = filters();
        s.select_mode(RenderMode::kernel(EDGE_ENHANCEMENT)).unwrap();
        assert_eq!(s.mode(), RenderMode::kernel(EDGE_ENHANCEMENT));
    }

    #[test]
    fn program_without_mode_member_only_takes_identity() {
        let mut s = plain();
        assert!(s.select_mode(RenderMode::Identity).is_ok());

        match s.select_mode(RenderMode::Inverse) {
            Err(EngineError::UnknownUniform { program, name }) => {
                assert_eq!(program, "pan");
                assert_eq!(name, MODE_UNIFORM);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.mode(), RenderMode::Identity);
    }

    #[test]
    fn invalid_kernel_is_caught_before_the_draw() {
        let mut s = filters();
        assert!(s.check_render().is_ok());

        s.mode = RenderMode::Kernel {
            coefficients: ZERO_SUM,
            weight: 0.0,
        };
        assert!(matches!(
            s.check_render(),
            Err(EngineError::InvalidKernelWeight(_))
        ));
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn fit_commits_letterboxed_placement() {
        let mut s = plain();
        let r = s.fit(1600.0, 600.0, VP).unwrap();
        assert_eq!(r, Rectangle::new(0.0, 150.0, 800.0, 450.0).to_clip(VP));
        assert_eq!(s.gesture().committed(), r);
        assert!(!s.is_fit_pending());
    }

    #[test]
    fn fit_on_minimized_surface_waits_for_a_real_viewport() {
        let mut s = plain();
        assert_eq!(s.fit(640.0, 480.0, MINIMIZED), None);
        assert!(s.is_fit_pending());
        assert!(s.gesture().committed().is_finite());

        assert_eq!(s.refit(MINIMIZED), None);

        let r = s.refit(VP).unwrap();
        assert!(r.is_finite());
        assert_eq!(s.gesture().committed(), r);
        assert!(!s.is_fit_pending());
        assert_eq!(s.refit(VP), None);
    }

    #[test]
    fn refit_without_content_does_nothing() {
        let mut s = plain();
        assert_eq!(s.refit(VP), None);
        assert_eq!(s.gesture().committed(), Rectangle::FULL_CLIP);
    }

    // ── gestures ──────────────────────────────────────────────────────────

    #[test]
    fn drags_on_minimized_surface_are_ignored() {
        let mut s = plain();
        s.fit(640.0, 480.0, VP).unwrap();
        let before = s.gesture().committed();

        let (a, b) = (Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0));
        assert_eq!(s.drag_move(a, b, MINIMIZED), None);
        assert_eq!(s.drag_end(a, b, MINIMIZED), None);
        assert_eq!(s.gesture().committed(), before);

        assert!(s.wheel(1.0).is_finite());
    }

    #[test]
    fn cancelled_drag_returns_to_committed() {
        let mut s = plain();
        let committed = s.fit(640.0, 480.0, VP).unwrap();
        let preview = s
            .drag_move(Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0), VP)
            .unwrap();
        assert_ne!(preview, committed);
        assert_eq!(s.drag_cancel(), committed);
    }
}
