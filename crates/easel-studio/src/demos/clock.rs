use chrono::Timelike;

use easel_engine::buffer::{AttributeBinder, BufferKind, BufferStore, GpuBuffer, UsageHint};
use easel_engine::coords::{ColorRgba, Vec2, Viewport};
use easel_engine::core::{App, AppControl, EventCtx, FrameCtx};
use easel_engine::geometry::{circle_points, fan_triangles, flatten};
use easel_engine::input::{InputEvent, Key, KeyState};
use easel_engine::program::{ProgramBuilder, ShaderProgram, UniformBuffer};
use easel_engine::render::{RenderCtx, RenderTarget};
use easel_engine::session::POSITION_ATTRIBUTE;
use easel_engine::{EngineError, EngineResult};

use wgpu::PrimitiveTopology;

const CLOCK_VS: &str = include_str!("../../shaders/clock.vert.wgsl");
const CLOCK_FS: &str = include_str!("../../shaders/clock.frag.wgsl");

const COLOR_UNIFORM: &str = "input_color";

const DIAL_RADIUS: f32 = 0.3;
const DIAL_POINTS: usize = 500;
const SECONDS_RADIUS: f32 = 0.27;
const MINUTES_RADIUS: f32 = 0.24;
const HOURS_RADIUS: f32 = 0.18;
const TICKS: usize = 60;

const BACKGROUND: ColorRgba = ColorRgba::white();
const DIAL_COLOR: ColorRgba = ColorRgba::black();
const WEDGE_COLOR: ColorRgba = ColorRgba::rgb(0.5, 0.7, 1.0);
const HAND_COLOR: ColorRgba = ColorRgba::rgb(1.0, 0.0, 0.0);

/// First vertex of the hand segment for `value` in a 60-segment hand table.
///
/// Segment `i` of the table points at angle `i/60` of a turn counter-clockwise
/// from 3 o'clock; 12 o'clock is segment 15. Values wrap at 60, and segment 60
/// is segment 0.
pub fn hand_vertex_offset(value: u32) -> u32 {
    let value = value % 60;
    let index = if value < 15 { 15 - value } else { 60 - value + 15 };
    (index % 60) * 2
}

/// Wall-clock reading the hands are drawn from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClockTime {
    pub hours12: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ClockTime {
    /// `hour` is 0..=23. Only hours past noon are folded, so midnight is 0
    /// and noon is 12.
    pub fn from_hms(hour: u32, minutes: u32, seconds: u32) -> Self {
        let hours12 = if hour > 12 { hour - 12 } else { hour };
        Self {
            hours12,
            minutes,
            seconds,
        }
    }

    pub fn now() -> Self {
        let t = chrono::Local::now();
        Self::from_hms(t.hour(), t.minute(), t.second())
    }

    /// Position of the hour hand on the 60-tick table.
    pub fn hour_value(&self) -> u32 {
        self.hours12 * 5 + self.minutes / 60
    }
}

/// One colour: a uniform buffer and the bind groups that point at it.
struct Paint {
    uniforms: UniformBuffer,
    groups: Vec<wgpu::BindGroup>,
}

impl Paint {
    fn new(device: &wgpu::Device, program: &ShaderProgram, color: ColorRgba) -> EngineResult<Self> {
        let mut uniforms = program.create_uniform_buffer(device).ok_or_else(|| {
            EngineError::NotReady(format!("program `{}` has no uniform block", program.label()))
        })?;
        uniforms.block_mut().set_f32s(COLOR_UNIFORM, &color.to_array())?;
        let groups = program.create_bind_groups(device, Some(&uniforms), &[])?;
        Ok(Self { uniforms, groups })
    }
}

struct ClockGeometry {
    dial: GpuBuffer,
    wedge: GpuBuffer,
    seconds: GpuBuffer,
    minutes: GpuBuffer,
    hours: GpuBuffer,
}

impl ClockGeometry {
    fn dial(viewport: Viewport) -> Vec<f32> {
        flatten(&circle_points(Vec2::zero(), DIAL_RADIUS, DIAL_POINTS, false, viewport))
    }

    fn wedge() -> Vec<f32> {
        flatten(&fan_triangles(Vec2::zero(), SECONDS_RADIUS, TICKS))
    }

    fn hand_table(radius: f32, viewport: Viewport) -> Vec<f32> {
        flatten(&circle_points(Vec2::zero(), radius, TICKS, true, viewport))
    }

    fn new(store: &mut BufferStore, device: &wgpu::Device, viewport: Viewport) -> Self {
        let mut make = |data: Vec<f32>| store.create(device, BufferKind::Vertex, UsageHint::Static, &data);
        Self {
            dial: make(Self::dial(viewport)),
            wedge: make(Self::wedge()),
            seconds: make(Self::hand_table(SECONDS_RADIUS, viewport)),
            minutes: make(Self::hand_table(MINUTES_RADIUS, viewport)),
            hours: make(Self::hand_table(HOURS_RADIUS, viewport)),
        }
    }

    /// Regenerates the aspect-dependent tables for a new surface size.
    fn resize(&mut self, store: &mut BufferStore, device: &wgpu::Device, viewport: Viewport) {
        store.replace(device, &mut self.dial, &Self::dial(viewport));
        store.replace(device, &mut self.seconds, &Self::hand_table(SECONDS_RADIUS, viewport));
        store.replace(device, &mut self.minutes, &Self::hand_table(MINUTES_RADIUS, viewport));
        store.replace(device, &mut self.hours, &Self::hand_table(HOURS_RADIUS, viewport));
    }
}

struct ClockScene {
    program: ShaderProgram,
    store: BufferStore,
    geometry: ClockGeometry,
    viewport: Viewport,
    dial_paint: Paint,
    wedge_paint: Paint,
    hand_paint: Paint,
}

impl ClockScene {
    fn new(ctx: &RenderCtx<'_>, program: ShaderProgram) -> EngineResult<Self> {
        program.attribute(POSITION_ATTRIBUTE)?;

        let dial_paint = Paint::new(ctx.device, &program, DIAL_COLOR)?;
        let wedge_paint = Paint::new(ctx.device, &program, WEDGE_COLOR)?;
        let hand_paint = Paint::new(ctx.device, &program, HAND_COLOR)?;

        let mut store = BufferStore::new();
        let geometry = ClockGeometry::new(&mut store, ctx.device, ctx.viewport);

        Ok(Self {
            program,
            store,
            geometry,
            viewport: ctx.viewport,
            dial_paint,
            wedge_paint,
            hand_paint,
        })
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, time: ClockTime) -> EngineResult<()> {
        if ctx.viewport != self.viewport && ctx.viewport.is_valid() {
            self.geometry.resize(&mut self.store, ctx.device, ctx.viewport);
            self.viewport = ctx.viewport;
        }

        for paint in [&mut self.dial_paint, &mut self.wedge_paint, &mut self.hand_paint] {
            paint.uniforms.flush(ctx.queue);
        }
        self.program.prepare(
            ctx.device,
            ctx.surface_format,
            &[
                PrimitiveTopology::PointList,
                PrimitiveTopology::TriangleList,
                PrimitiveTopology::LineList,
            ],
        );

        let program = &self.program;
        let geo = &self.geometry;
        let mut pass = target.begin_pass("clock pass", None);

        let dial = AttributeBinder::bind(&mut pass, program, POSITION_ATTRIBUTE, &geo.dial)?;
        program.draw(&mut pass, PrimitiveTopology::PointList, &self.dial_paint.groups, 0..dial)?;

        let wedge = AttributeBinder::bind(&mut pass, program, POSITION_ATTRIBUTE, &geo.wedge)?;
        program.draw(&mut pass, PrimitiveTopology::TriangleList, &self.wedge_paint.groups, 0..wedge)?;

        let hands = [
            (&geo.seconds, time.seconds),
            (&geo.minutes, time.minutes),
            (&geo.hours, time.hour_value()),
        ];
        for (table, value) in hands {
            AttributeBinder::bind(&mut pass, program, POSITION_ATTRIBUTE, table)?;
            let first = hand_vertex_offset(value);
            program.draw(&mut pass, PrimitiveTopology::LineList, &self.hand_paint.groups, first..first + 2)?;
        }

        Ok(())
    }
}

/// Analog clock redrawn once a second.
#[derive(Default)]
pub struct ClockDemo {
    scene: Option<ClockScene>,
}

impl ClockDemo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl App for ClockDemo {
    fn on_start(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        let program = ProgramBuilder::new("clock", CLOCK_VS, CLOCK_FS).build(ctx.gpu.device());
        if program.is_linked() {
            match ClockScene::new(&ctx.render_ctx(), program) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => log::error!("clock disabled: {e}"),
            }
        }

        ctx.request_redraw();
        AppControl::Continue
    }

    fn on_input(&mut self, _ctx: &mut EventCtx<'_, '_>, event: &InputEvent) -> AppControl {
        match event {
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ClockTime::now();
        let scene = self.scene.as_mut();

        ctx.render(BACKGROUND, |rctx, target| {
            let Some(scene) = scene else { return };
            if let Err(e) = scene.draw(rctx, target, time) {
                log::warn!("clock frame skipped: {e}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── hand table offsets ────────────────────────────────────────────────

    #[test]
    fn zero_points_straight_up() {
        assert_eq!(hand_vertex_offset(0), 30);
    }

    #[test]
    fn quarter_past_is_segment_zero() {
        assert_eq!(hand_vertex_offset(15), 0);
    }

    #[test]
    fn half_past_points_down() {
        assert_eq!(hand_vertex_offset(30), 90);
    }

    #[test]
    fn offsets_stay_inside_the_table() {
        for v in 0..120 {
            let first = hand_vertex_offset(v);
            assert!(first + 2 <= (TICKS * 2) as u32, "v={v} -> {first}");
            assert_eq!(first % 2, 0);
        }
    }

    #[test]
    fn consecutive_values_step_clockwise() {
        assert_eq!(hand_vertex_offset(14), 2);
        assert_eq!(hand_vertex_offset(16), 118);
        assert_eq!(hand_vertex_offset(59), 32);
    }

    // ── time folding ──────────────────────────────────────────────────────

    #[test]
    fn afternoon_hours_fold_to_twelve() {
        assert_eq!(ClockTime::from_hms(13, 0, 0).hours12, 1);
        assert_eq!(ClockTime::from_hms(23, 59, 59).hours12, 11);
    }

    #[test]
    fn noon_and_midnight_are_not_folded() {
        assert_eq!(ClockTime::from_hms(12, 0, 0).hours12, 12);
        assert_eq!(ClockTime::from_hms(0, 0, 0).hours12, 0);
    }

    #[test]
    fn hour_hand_uses_five_ticks_per_hour() {
        assert_eq!(ClockTime::from_hms(15, 45, 0).hour_value(), 15);
        // Noon lands on the same segment as midnight.
        assert_eq!(
            hand_vertex_offset(ClockTime::from_hms(12, 0, 0).hour_value()),
            hand_vertex_offset(0)
        );
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn hand_tables_hold_sixty_segments() {
        let table = ClockGeometry::hand_table(SECONDS_RADIUS, Viewport::new(600.0, 600.0));
        assert_eq!(table.len(), TICKS * 2 * 2);
    }

    #[test]
    fn wedge_is_a_full_triangle_fan() {
        assert_eq!(ClockGeometry::wedge().len(), TICKS * 3 * 2);
    }
}
