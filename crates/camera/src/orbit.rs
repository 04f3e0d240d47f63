use glam::{Vec2, Vec3};
use orbitview_transform::TransformStack;
use std::f32::consts::FRAC_PI_2;

/// Pointer movement per unit of drag, in radians (rotate) or world
/// units (pan).
const DRAG_SENSITIVITY: f32 = 1.0 / 200.0;
/// Recoil change per unit of wheel delta.
const WHEEL_SENSITIVITY: f32 = 0.1;
/// Floor for the recoil target. Keeps the camera from crossing its own
/// focal point and inverting.
const MIN_RECOIL: f32 = 0.5;
/// Pitch is clamped to a quarter turn either way.
const MAX_PITCH: f32 = FRAC_PI_2;

/// Interpolation rates, in units of "fraction of remaining distance per
/// second". Distinct rates give the zoom a heavier feel than rotation.
const RECOIL_RATE: f32 = 10.0;
const ROTATE_RATE: f32 = 20.0;

/// Pointer button state as a bit mask. Bit 0 rotates the orbit, bit 1
/// pans the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    pub const NONE: Self = Self(0);
    pub const ROTATE: Self = Self(1 << 0);
    pub const PAN: Self = Self(1 << 1);

    pub fn rotate(self) -> bool {
        self.0 & Self::ROTATE.0 != 0
    }

    pub fn pan(self) -> bool {
        self.0 & Self::PAN.0 != 0
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

/// One orbit parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Zoom parameter. The camera sits `recoil^2` along the view axis,
    /// making near zoom more sensitive than far zoom.
    pub recoil: f32,
    /// x = yaw, y = pitch, radians.
    pub rotation: Vec2,
    /// Pan offset of the orbit focal point.
    pub origin: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            recoil: 1.0,
            rotation: Vec2::ZERO,
            origin: Vec3::ZERO,
        }
    }
}

/// Smoothed orbit camera.
///
/// Input handlers write `target`; `advance` moves `current` toward it by
/// frame-time-scaled exponential interpolation. A multiplier of one or
/// more snaps exactly to the target, so convergence is guaranteed in
/// finitely many frames even across frame-rate stalls.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub current: CameraState,
    pub target: CameraState,
    defaults: CameraState,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraState::default())
    }
}

impl OrbitCamera {
    pub fn new(defaults: CameraState) -> Self {
        Self {
            current: defaults,
            target: defaults,
            defaults,
        }
    }

    /// Pointer drag. With the rotate button held, horizontal movement
    /// accumulates into target yaw and vertical movement (inverted) into
    /// target pitch. With the pan button held, movement pans the origin
    /// in its first two axes only.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32, buttons: ButtonMask) {
        if buttons.rotate() {
            self.target.rotation.x += dx * DRAG_SENSITIVITY;
            self.target.rotation.y -= dy * DRAG_SENSITIVITY;
            self.target.rotation.y = self.target.rotation.y.clamp(-MAX_PITCH, MAX_PITCH);
        }

        if buttons.pan() {
            self.target.origin.x += dx * DRAG_SENSITIVITY;
            self.target.origin.y -= dy * DRAG_SENSITIVITY;
        }
    }

    /// Wheel scroll. Positive delta zooms in.
    pub fn wheel_scrolled(&mut self, delta_y: f32) {
        self.target.recoil -= delta_y * WHEEL_SENSITIVITY;
        self.target.recoil = self.target.recoil.max(MIN_RECOIL);
    }

    /// Moves current state toward the target. Called once per frame with
    /// the elapsed seconds; never called from input handlers.
    pub fn advance(&mut self, dt: f32) {
        let recoil_fac = dt * RECOIL_RATE;
        let rotate_fac = dt * ROTATE_RATE;

        self.current.recoil = approach(self.current.recoil, self.target.recoil, recoil_fac);

        self.current.rotation.x = approach(self.current.rotation.x, self.target.rotation.x, rotate_fac);
        self.current.rotation.y = approach(self.current.rotation.y, self.target.rotation.y, rotate_fac);

        self.current.origin.x = approach(self.current.origin.x, self.target.origin.x, rotate_fac);
        self.current.origin.y = approach(self.current.origin.y, self.target.origin.y, rotate_fac);
        self.current.origin.z = approach(self.current.origin.z, self.target.origin.z, rotate_fac);
    }

    /// Effective camera distance along the view axis.
    pub fn view_distance(&self) -> f32 {
        self.current.recoil * self.current.recoil
    }

    /// Builds the view matrix from the current state: back off along the
    /// view axis, orbit, then recenter on the pan origin.
    pub fn view(&self) -> TransformStack {
        let mut view = TransformStack::identity();
        view.translate(0.0, 0.0, -self.view_distance());
        view.rotate_2d(self.current.rotation.x, self.current.rotation.y);
        view.translate(
            self.current.origin.x,
            self.current.origin.y,
            self.current.origin.z,
        );
        view
    }

    /// Sends the target back to the configured defaults; current state
    /// glides there over the following frames.
    pub fn reset(&mut self) {
        self.target = self.defaults;
    }

    /// Resets target and snaps current state immediately.
    pub fn reset_hard(&mut self) {
        self.target = self.defaults;
        self.current = self.defaults;
    }

    pub fn set_defaults(&mut self, defaults: CameraState) {
        self.defaults = defaults;
        self.reset();
    }
}

/// One interpolation step: `current + (target - current) * fac`, snapping
/// when the factor reaches one.
fn approach(current: f32, target: f32, fac: f32) -> f32 {
    if fac >= 1.0 {
        return target;
    }
    current + (target - current) * fac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_factor_snaps_in_one_tick() {
        // dt * rate >= 1 must land exactly on target from any start
        for start in [-100.0, -0.3, 0.0, 7.5, 1e6] {
            let mut cam = OrbitCamera::default();
            cam.current.recoil = start;
            cam.target.recoil = 2.0;
            cam.advance(1.0);
            assert_eq!(cam.current.recoil, 2.0, "start {start}");
        }
    }

    #[test]
    fn partial_factor_strictly_shrinks_error() {
        let mut cam = OrbitCamera::default();
        cam.current.rotation.x = 0.2;
        cam.target.rotation.x = 1.4;

        let dt = 0.02; // dt * 20 = 0.4, inside (0, 1)
        let mut converged = false;
        for _ in 0..50 {
            let before = (cam.target.rotation.x - cam.current.rotation.x).abs();
            cam.advance(dt);
            let after = (cam.target.rotation.x - cam.current.rotation.x).abs();
            // below this the step rounds away in f32; strictness only
            // holds above the resolution floor
            if after < 1e-6 {
                converged = true;
                break;
            }
            assert!(after < before, "error grew: {before} -> {after}");
        }
        assert!(converged, "never reached the target neighborhood");
    }

    #[test]
    fn recoil_floor_survives_any_wheel_input() {
        let mut cam = OrbitCamera::default();
        cam.wheel_scrolled(1e9);
        assert!(cam.target.recoil >= MIN_RECOIL);

        for _ in 0..1000 {
            cam.wheel_scrolled(3.0);
        }
        assert!(cam.target.recoil >= MIN_RECOIL);
    }

    #[test]
    fn pitch_target_stays_within_quarter_turn() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(0.0, -1e9, ButtonMask::ROTATE);
        assert!(cam.target.rotation.y <= MAX_PITCH);

        for _ in 0..500 {
            cam.pointer_moved(0.0, 400.0, ButtonMask::ROTATE);
        }
        assert!(cam.target.rotation.y >= -MAX_PITCH);
    }

    #[test]
    fn drag_without_buttons_is_ignored() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(50.0, 50.0, ButtonMask::NONE);
        assert_eq!(cam.target, CameraState::default());
    }

    #[test]
    fn pan_moves_first_two_axes_only() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(40.0, 20.0, ButtonMask::PAN);
        assert_ne!(cam.target.origin.x, 0.0);
        assert_ne!(cam.target.origin.y, 0.0);
        assert_eq!(cam.target.origin.z, 0.0);
        // pan must not touch rotation
        assert_eq!(cam.target.rotation, Vec2::ZERO);
    }

    #[test]
    fn both_buttons_rotate_and_pan() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(40.0, 0.0, ButtonMask::ROTATE.with(ButtonMask::PAN));
        assert_ne!(cam.target.rotation.x, 0.0);
        assert_ne!(cam.target.origin.x, 0.0);
    }

    #[test]
    fn input_never_touches_current_state() {
        let mut cam = OrbitCamera::default();
        cam.pointer_moved(40.0, 20.0, ButtonMask::ROTATE.with(ButtonMask::PAN));
        cam.wheel_scrolled(-2.0);
        assert_eq!(cam.current, CameraState::default());
    }

    #[test]
    fn view_distance_is_recoil_squared() {
        let mut cam = OrbitCamera::default();
        cam.current.recoil = 3.0;
        assert_eq!(cam.view_distance(), 9.0);
    }

    #[test]
    fn reset_restores_target_but_glides_current() {
        let mut cam = OrbitCamera::default();
        cam.wheel_scrolled(-30.0);
        cam.advance(1.0);
        assert_ne!(cam.current, CameraState::default());

        cam.reset();
        assert_eq!(cam.target, CameraState::default());
        assert_ne!(cam.current, CameraState::default());

        cam.advance(1.0);
        assert_eq!(cam.current, CameraState::default());
    }

    #[test]
    fn view_matrix_backs_off_by_squared_recoil() {
        let cam = OrbitCamera::new(CameraState {
            recoil: 2.0,
            ..CameraState::default()
        });
        // no rotation, no pan: the view is a pure -z translation by 4
        let p = cam.view().project_point(glam::Vec3::ZERO);
        assert!((p - glam::Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
    }
}
