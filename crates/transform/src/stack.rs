use glam::{Mat4, Vec3, Vec4};

/// A 4x4 transform under construction.
///
/// Wraps `glam::Mat4` and exposes the handful of operations the render
/// pipeline composes each frame. `Copy` on `Mat4` means copying a stack
/// copies its backing floats; mutating a copy never touches the original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformStack(Mat4);

impl Default for TransformStack {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformStack {
    pub fn identity() -> Self {
        Self(Mat4::IDENTITY)
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self(matrix)
    }

    /// Right-handed symmetric perspective projection, clip depth 0..1.
    ///
    /// A degenerate frustum (`far <= near`, zero fov) is a programming
    /// error, not a runtime condition. It is asserted, never recovered.
    pub fn perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        debug_assert!(
            near > 0.0 && far > near,
            "degenerate frustum: near={near} far={far}"
        );
        debug_assert!(fov_y > 0.0 && aspect > 0.0);
        self.0 *= Mat4::perspective_rh(fov_y, aspect, near, far);
    }

    /// Right-multiplies a translation.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.0 *= Mat4::from_translation(Vec3::new(x, y, z));
    }

    /// Orbit rotation: yaw about the world Y axis, then pitch about the
    /// yawed perpendicular axis. Yaw first — swapping the order turns the
    /// orbit into free-look.
    pub fn rotate_2d(&mut self, yaw: f32, pitch: f32) {
        let pitch_axis = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        self.0 = self.0 * Mat4::from_rotation_y(yaw) * Mat4::from_axis_angle(pitch_axis, -pitch);
    }

    /// `self = self * other`.
    pub fn multiply(&mut self, other: &TransformStack) {
        self.0 *= other.0;
    }

    pub fn matrix(&self) -> Mat4 {
        self.0
    }

    /// Column-major array form for uniform upload.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.0.to_cols_array_2d()
    }

    /// Applies the transform to a point, including the perspective divide.
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        let v = self.0 * Vec4::new(p.x, p.y, p.z, 1.0);
        Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    const EPS: f32 = 1e-4;

    /// Small deterministic generator so the composition tests cover more
    /// than hand-picked matrices.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as f32 / (1u64 << 31) as f32) * 4.0 - 2.0
        }

        fn transform(&mut self) -> TransformStack {
            let mut t = TransformStack::identity();
            t.translate(self.next_f32(), self.next_f32(), self.next_f32());
            t.rotate_2d(self.next_f32(), self.next_f32());
            t
        }
    }

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for c in 0..4 {
            for r in 0..4 {
                let (x, y) = (a.col(c)[r], b.col(c)[r]);
                assert!((x - y).abs() < EPS, "col {c} row {r}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn composition_is_associative() {
        let mut rng = Lcg(42);
        for _ in 0..32 {
            let (a, b, c) = (rng.transform(), rng.transform(), rng.transform());

            let mut left = a;
            left.multiply(&b);
            left.multiply(&c);

            let mut bc = b;
            bc.multiply(&c);
            let mut right = a;
            right.multiply(&bc);

            assert_mat_eq(left.matrix(), right.matrix());
        }
    }

    #[test]
    fn perspective_maps_near_to_zero_and_far_to_one() {
        let mut p = TransformStack::identity();
        p.perspective(TAU / 6.0, 1.0, 0.2, 200.0);

        let near = p.project_point(Vec3::new(0.0, 0.0, -0.2));
        let far = p.project_point(Vec3::new(0.0, 0.0, -200.0));

        assert!(near.z.abs() < EPS, "near plane center depth: {}", near.z);
        assert!((far.z - 1.0).abs() < EPS, "far plane center depth: {}", far.z);
    }

    #[test]
    fn translate_moves_a_point() {
        let mut t = TransformStack::identity();
        t.translate(1.0, -2.0, 3.0);
        let p = t.project_point(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, -2.0, 3.0)).length() < EPS);
    }

    #[test]
    fn rotate_2d_yaw_only() {
        let mut t = TransformStack::identity();
        t.rotate_2d(FRAC_PI_2, 0.0);
        let p = t.project_point(Vec3::new(0.0, 0.0, -1.0));
        assert!((p - Vec3::new(-1.0, 0.0, 0.0)).length() < EPS, "{p}");
    }

    #[test]
    fn rotate_2d_pitch_only() {
        let mut t = TransformStack::identity();
        t.rotate_2d(0.0, FRAC_PI_2);
        let p = t.project_point(Vec3::new(0.0, 0.0, -1.0));
        assert!((p - Vec3::new(0.0, -1.0, 0.0)).length() < EPS, "{p}");
    }

    #[test]
    fn rotation_order_matters() {
        let mut a = TransformStack::identity();
        a.rotate_2d(0.7, 0.4);

        // The reverse composition (yaw applied after the pitch has already
        // tilted the frame) sends the probe somewhere else.
        let mut b = TransformStack::identity();
        b.rotate_2d(0.7, 0.0);
        b.rotate_2d(0.0, 0.4);

        let probe = Vec3::new(0.0, 0.0, -1.0);
        let (pa, pb) = (a.project_point(probe), b.project_point(probe));
        assert!((pa - pb).length() > 1e-2, "orders coincide: {pa} vs {pb}");
    }

    #[test]
    fn copies_do_not_alias() {
        let mut a = TransformStack::identity();
        a.translate(5.0, 0.0, 0.0);
        let b = a;
        a.translate(0.0, 7.0, 0.0);
        // b must still be the plain translation it was copied as
        assert_mat_eq(b.matrix(), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn multiply_is_right_composition() {
        // self * other applied to p must equal self(other(p))
        let mut view = TransformStack::identity();
        view.translate(0.0, 0.0, -10.0);
        let mut model = TransformStack::identity();
        model.translate(1.0, 0.0, 0.0);

        let mut mv = view;
        mv.multiply(&model);

        let p = mv.project_point(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 0.0, -10.0)).length() < EPS);
    }
}
