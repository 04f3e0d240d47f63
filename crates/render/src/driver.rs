use crate::clock::Clock;
use glam::Mat4;
use orbitview_camera::OrbitCamera;
use orbitview_transform::TransformStack;
use std::f32::consts::TAU;

/// Fixed projection constants, configured once at startup from the host
/// surface. Resize is out of scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: TAU / 6.0,
            aspect: 1.0,
            near: 0.2,
            far: 200.0,
        }
    }
}

impl Projection {
    pub fn with_aspect(self, aspect: f32) -> Self {
        Self { aspect, ..self }
    }

    pub fn matrix(&self) -> TransformStack {
        let mut p = TransformStack::identity();
        p.perspective(self.fov_y, self.aspect, self.near, self.far);
        p
    }
}

/// How the per-vertex effect channel is scaled over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectAnim {
    /// Channel suppressed entirely.
    Off,
    /// Channel shown at its full static magnitude.
    Full,
    /// Channel oscillates between zero and full.
    #[default]
    Pulse,
}

impl EffectAnim {
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::Full,
            Self::Full => Self::Pulse,
            Self::Pulse => Self::Off,
        }
    }

    pub fn scale(self, elapsed_secs: f32) -> f32 {
        match self {
            Self::Off => 0.0,
            Self::Full => 1.0,
            Self::Pulse => elapsed_secs.sin() / 2.0 + 0.5,
        }
    }
}

/// Everything a sink needs to render one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Composed model-view-projection transform for this tick.
    pub mvp: Mat4,
    /// Elapsed seconds since the previous tick.
    pub dt: f32,
    /// Elapsed seconds since the driver started ticking.
    pub elapsed: f32,
    /// Draw instance geometry with its line index set instead of fill.
    pub wireframe: bool,
    /// Effect channel scale for this tick.
    pub effect_scale: f32,
}

/// Render backend boundary. Implementations clear the target, activate
/// their shaders, upload the transform and draw every registered buffer
/// in insertion order.
pub trait FrameSink {
    fn render_frame(&mut self, ctx: &FrameContext);
}

/// Drives the animation loop: computes frame time, advances the camera,
/// rebuilds the transform stack and hands the composed frame to a sink.
pub struct FrameDriver {
    pub camera: OrbitCamera,
    pub wireframe: bool,
    pub effect_anim: EffectAnim,
    projection: Projection,
    prev_ms: f64,
    elapsed: f32,
    ticks: u64,
}

impl FrameDriver {
    pub fn new(camera: OrbitCamera, projection: Projection) -> Self {
        Self {
            camera,
            wireframe: false,
            effect_anim: EffectAnim::default(),
            projection,
            prev_ms: 0.0,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Fixes the aspect ratio once the host surface size is known.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.projection = self.projection.with_aspect(aspect);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One animation tick with a host timestamp in milliseconds.
    ///
    /// The first tick measures against a previous timestamp of zero and
    /// can see an arbitrarily large dt; the camera's clamped interpolation
    /// multiplier absorbs it, so nothing special happens here.
    pub fn tick(&mut self, now_ms: f64, sink: &mut impl FrameSink) -> FrameContext {
        let dt = ((now_ms - self.prev_ms) / 1000.0) as f32;
        self.prev_ms = now_ms;
        self.elapsed += dt;
        self.ticks += 1;

        self.camera.advance(dt);

        let mut mvp = self.projection.matrix();
        mvp.multiply(&self.camera.view());
        // model is identity: single static scene

        let ctx = FrameContext {
            mvp: mvp.matrix(),
            dt,
            elapsed: self.elapsed,
            wireframe: self.wireframe,
            effect_scale: self.effect_anim.scale(self.elapsed),
        };
        sink.render_frame(&ctx);
        ctx
    }

    /// Explicit scheduling loop: ticks against the injected clock until
    /// `stop` returns true for a completed frame.
    pub fn run(
        &mut self,
        clock: &mut impl Clock,
        sink: &mut impl FrameSink,
        mut stop: impl FnMut(&FrameContext) -> bool,
    ) {
        loop {
            let now_ms = clock.now_ms();
            let ctx = self.tick(now_ms, sink);
            if stop(&ctx) {
                tracing::debug!(ticks = self.ticks, "frame loop stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use orbitview_camera::ButtonMask;
    use orbitview_scene::unit_cube;

    /// Sink that records what a GPU backend would have drawn.
    struct RecordingSink {
        index_count: u32,
        frames: Vec<(Mat4, u32)>,
    }

    impl RecordingSink {
        fn with_unit_cube() -> Self {
            Self {
                index_count: unit_cube().index_count() as u32,
                frames: Vec::new(),
            }
        }
    }

    impl FrameSink for RecordingSink {
        fn render_frame(&mut self, ctx: &FrameContext) {
            self.frames.push((ctx.mvp, self.index_count));
        }
    }

    #[test]
    fn first_tick_tolerates_huge_dt() {
        let mut driver = FrameDriver::new(OrbitCamera::default(), Projection::default());
        driver.camera.wheel_scrolled(-50.0);
        let mut sink = RecordingSink::with_unit_cube();

        // hour-scale timestamp straight away; interpolation snaps, no blowup
        let ctx = driver.tick(3_600_000.0, &mut sink);
        assert!(ctx.dt > 1000.0);
        assert_eq!(driver.camera.current.recoil, driver.camera.target.recoil);
        assert!(ctx.mvp.is_finite());
    }

    #[test]
    fn sixty_ticks_move_the_camera_and_keep_index_count() {
        let mut camera = OrbitCamera::default();
        camera.wheel_scrolled(-30.0);
        camera.pointer_moved(120.0, 40.0, ButtonMask::ROTATE);

        let mut driver = FrameDriver::new(camera, Projection::default());
        let mut sink = RecordingSink::with_unit_cube();
        let mut clock = ManualClock::new(1000.0 / 60.0);

        let mut remaining = 60;
        driver.run(&mut clock, &mut sink, |_| {
            remaining -= 1;
            remaining == 0
        });

        assert_eq!(sink.frames.len(), 60);
        let (first_mvp, _) = sink.frames[0];
        let (last_mvp, _) = sink.frames[59];
        assert_ne!(first_mvp, last_mvp, "camera never moved");
        assert!(sink.frames.iter().all(|&(_, n)| n == 36));
    }

    #[test]
    fn run_stops_on_condition() {
        let mut driver = FrameDriver::new(OrbitCamera::default(), Projection::default());
        let mut sink = RecordingSink::with_unit_cube();
        let mut clock = ManualClock::new(16.0);

        driver.run(&mut clock, &mut sink, |ctx| ctx.elapsed > 0.1);
        assert!(driver.ticks() >= 1);
        assert!(sink.frames.len() < 100);
    }

    #[test]
    fn effect_anim_cycles_through_all_modes() {
        let mut anim = EffectAnim::Off;
        anim = anim.cycle();
        assert_eq!(anim, EffectAnim::Full);
        anim = anim.cycle();
        assert_eq!(anim, EffectAnim::Pulse);
        anim = anim.cycle();
        assert_eq!(anim, EffectAnim::Off);
    }

    #[test]
    fn effect_scales() {
        assert_eq!(EffectAnim::Off.scale(3.0), 0.0);
        assert_eq!(EffectAnim::Full.scale(3.0), 1.0);
        let pulse = EffectAnim::Pulse.scale(3.0);
        assert!((0.0..=1.0).contains(&pulse));
    }

    #[test]
    fn default_projection_constants() {
        let p = Projection::default();
        assert_eq!(p.near, 0.2);
        assert_eq!(p.far, 200.0);
        assert!((p.fov_y - TAU / 6.0).abs() < 1e-6);
        assert_eq!(p.with_aspect(2.0).aspect, 2.0);
    }
}
