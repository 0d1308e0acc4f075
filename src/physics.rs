// ==============================================================================
// physics.rs — SINGLE RIGID BODY (CHASSIS) WITH POINT-APPLIED FORCES
// ------------------------------------------------------------------------------
// The chassis is the only simulated body. Forces are collected for one step and
// then integrated:
//
//   a     = Σ F / m
//   α_y   = Σ |r_xz| * |F_xz| * sin(∠(F_xz, r_xz)) / I
//   v    += a * dt,   ω_y += α_y * dt
//   p    += v * dt,   q    = rot_y(-ω_y * dt) * q
//
// where r is the horizontal lever arm from the center of mass to the force's
// world application point. Angular motion is constrained to yaw.
//
// Frame convention (body local): +Z forward, +Y up, +X left.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Below this magnitude linear / angular velocity snaps to zero.
pub const PHYSICS_MIN_VELOCITY: f32 = 0.001;

/// One force for the current step.
#[derive(Debug, Clone, Copy)]
pub struct Force {
    /// Force vector in world space (N).
    pub vector: Vector3<f32>,
    /// Application point in body-local space.
    pub position: Point3<f32>,
}

impl Force {
    pub fn new(vector: Vector3<f32>, position: Point3<f32>) -> Self {
        Self { vector, position }
    }
}

#[inline]
pub fn horizontal(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, 0.0, v.z)
}

/// Angle from `u` to `v`, signed by the vertical component of `u × v`.
#[inline]
pub fn signed_angle_about_up(u: &Vector3<f32>, v: &Vector3<f32>) -> f32 {
    if u.norm_squared() < 1e-12 || v.norm_squared() < 1e-12 {
        return 0.0;
    }
    let up = u.cross(v).y;
    u.angle(v) * sign(up)
}

/// Sign with `sign(0) == 0`.
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    mass: f32,                      // kg
    inertia: f32,                   // kg*m² about the vertical axis
    center_of_mass: Point3<f32>,    // body local

    position: Point3<f32>,
    orientation: UnitQuaternion<f32>,

    velocity: Vector3<f32>,         // m/s, world
    angular_velocity: f32,          // rad/s about +Y
    acceleration: Vector3<f32>,     // m/s², world
    angular_acceleration: f32,      // rad/s²

    forces: Vec<Force>,
}

impl RigidBody {
    /// `mass` and `inertia` are expected to be positive; the vehicle config
    /// rejects anything else before a body is built.
    pub fn new(mass: f32, inertia: f32) -> Self {
        debug_assert!(mass > 0.0 && inertia > 0.0);
        Self {
            mass,
            inertia,
            center_of_mass: Point3::origin(),
            position: Point3::origin(),
            orientation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: 0.0,
            acceleration: Vector3::zeros(),
            angular_acceleration: 0.0,
            forces: Vec::new(),
        }
    }

    pub fn with_center_of_mass(mut self, com: Point3<f32>) -> Self {
        self.center_of_mass = com;
        self
    }

    pub fn with_pose(mut self, position: Point3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        self.position = position;
        self.orientation = orientation;
        self
    }

    /// Queue a force for the next `update`. No immediate effect.
    pub fn apply_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    pub fn reset_forces(&mut self) {
        self.forces.clear();
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn local_to_world(&self, p: &Point3<f32>) -> Point3<f32> {
        self.position + self.orientation * p.coords
    }

    pub fn local_dir_to_world(&self, d: &Vector3<f32>) -> Vector3<f32> {
        self.orientation * *d
    }

    pub fn world_dir_to_local(&self, d: &Vector3<f32>) -> Vector3<f32> {
        self.orientation.inverse() * *d
    }

    pub fn mass(&self) -> f32 { self.mass }
    pub fn inertia(&self) -> f32 { self.inertia }
    pub fn center_of_mass(&self) -> Point3<f32> { self.center_of_mass }
    pub fn position(&self) -> Point3<f32> { self.position }
    pub fn orientation(&self) -> UnitQuaternion<f32> { self.orientation }
    pub fn velocity(&self) -> Vector3<f32> { self.velocity }
    pub fn angular_velocity(&self) -> f32 { self.angular_velocity }
    pub fn acceleration(&self) -> Vector3<f32> { self.acceleration }
    pub fn angular_acceleration(&self) -> f32 { self.angular_acceleration }

    pub fn set_velocity(&mut self, v: Vector3<f32>) {
        self.velocity = v;
    }

    pub fn set_angular_velocity(&mut self, w: f32) {
        self.angular_velocity = w;
    }

    /// Heading of the body's forward axis around +Y (radians, 0 = world +Z).
    pub fn yaw(&self) -> f32 {
        let fwd = self.local_dir_to_world(&Vector3::z());
        fwd.x.atan2(fwd.z)
    }

    // =========================================================================
    // Step
    // =========================================================================
    pub fn update(&mut self, dt: f32) {
        self.update_accel();

        if dt <= 0.0 {
            return;
        }

        self.update_velocity(dt);
        self.update_pose(dt);
    }

    fn update_accel(&mut self) {
        let com_world = self.local_to_world(&self.center_of_mass);

        let mut linear = Vector3::zeros();
        let mut angular = 0.0;

        for f in &self.forces {
            linear += f.vector / self.mass;

            let lever = horizontal(self.local_to_world(&f.position) - com_world);
            let force_xz = horizontal(f.vector);
            let angle = signed_angle_about_up(&force_xz, &lever);

            angular += lever.norm() * force_xz.norm() * angle.sin() / self.inertia;
        }

        self.acceleration = linear;
        self.angular_acceleration = angular;
    }

    fn update_velocity(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.angular_velocity += self.angular_acceleration * dt;

        // rest snap
        if self.velocity.norm() < PHYSICS_MIN_VELOCITY {
            self.velocity = Vector3::zeros();
        }
        if self.angular_velocity.abs() < PHYSICS_MIN_VELOCITY {
            self.angular_velocity = 0.0;
        }
    }

    fn update_pose(&mut self, dt: f32) {
        self.position += self.velocity * dt;

        let yaw_step = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -self.angular_velocity * dt);
        self.orientation = yaw_step * self.orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_no_forces_no_motion() {
        let mut body = RigidBody::new(1000.0, 950.0);
        for _ in 0..120 {
            body.reset_forces();
            body.update(1.0 / 60.0);
        }
        assert_eq!(body.velocity(), Vector3::zeros());
        assert_eq!(body.angular_velocity(), 0.0);
        assert_eq!(body.position(), Point3::origin());
    }

    #[test]
    fn test_force_through_com_is_pure_translation() {
        let mut body = RigidBody::new(10.0, 5.0);
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 20.0), Point3::origin()));
        body.update(0.5);

        assert!(body.angular_acceleration().abs() < EPS);
        assert!((body.acceleration() - Vector3::new(0.0, 0.0, 2.0)).norm() < EPS);
        assert!((body.velocity() - Vector3::new(0.0, 0.0, 1.0)).norm() < EPS);
        assert!((body.position() - Point3::new(0.0, 0.0, 0.5)).norm() < EPS);
    }

    #[test]
    fn test_force_parallel_to_lever_arm_has_no_torque() {
        let mut body = RigidBody::new(10.0, 5.0);
        // pushing straight forward at a point straight ahead of the COM
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 10.0), Point3::new(0.0, 0.0, 2.0)));
        body.update(0.1);
        assert!(body.angular_acceleration().abs() < EPS);
    }

    #[test]
    fn test_off_center_force_magnitude() {
        let mut body = RigidBody::new(10.0, 4.0);
        // lever 2m along +X (left), force 3N along +Z: |r||F|sin(90°)/I = 1.5
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 3.0), Point3::new(2.0, 0.0, 0.0)));
        body.update(0.0);
        assert!((body.angular_acceleration().abs() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_lever_arms_cancel() {
        let mut body = RigidBody::new(10.0, 4.0);
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 3.0), Point3::new(1.0, 0.0, 0.0)));
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 3.0), Point3::new(-1.0, 0.0, 0.0)));
        body.update(0.1);
        assert!(body.angular_acceleration().abs() < EPS);
        assert_eq!(body.angular_velocity(), 0.0);
    }

    #[test]
    fn test_forward_push_on_left_side_turns_right() {
        // left wheel pushing forward yaws the nose towards -X (right)
        let mut body = RigidBody::new(10.0, 4.0);
        body.apply_force(Force::new(Vector3::new(0.0, 0.0, 30.0), Point3::new(1.0, 0.0, 0.0)));
        body.update(0.1);
        body.reset_forces();
        body.update(0.1);

        let fwd = body.local_dir_to_world(&Vector3::z());
        assert!(fwd.x < 0.0, "nose should swing to -X, got {fwd:?}");
    }

    #[test]
    fn test_small_velocity_snaps_to_zero() {
        let mut body = RigidBody::new(1.0, 1.0);
        body.set_velocity(Vector3::new(0.0005, 0.0, 0.0));
        body.set_angular_velocity(0.0002);
        body.update(1.0 / 60.0);
        assert_eq!(body.velocity(), Vector3::zeros());
        assert_eq!(body.angular_velocity(), 0.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut body = RigidBody::new(2.0, 1.0);
        body.set_velocity(Vector3::new(1.0, 0.0, 0.0));
        body.apply_force(Force::new(Vector3::new(100.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)));
        body.update(0.0);
        assert_eq!(body.velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(body.position(), Point3::origin());
    }

    #[test]
    fn test_forces_do_not_carry_over_after_reset() {
        let mut body = RigidBody::new(1.0, 1.0);
        body.apply_force(Force::new(Vector3::new(1.0, 0.0, 0.0), Point3::origin()));
        body.update(1.0);
        body.reset_forces();
        assert!(body.forces().is_empty());
        body.update(1.0);
        assert!(body.acceleration().norm() < EPS);
        assert!((body.velocity().x - 1.0).abs() < EPS);
    }

    #[test]
    fn test_signed_angle() {
        let z = Vector3::z();
        let x = Vector3::x();
        // z × x = +y
        assert!((signed_angle_about_up(&z, &x) - std::f32::consts::FRAC_PI_2).abs() < EPS);
        assert!((signed_angle_about_up(&x, &z) + std::f32::consts::FRAC_PI_2).abs() < EPS);
        assert_eq!(signed_angle_about_up(&Vector3::zeros(), &x), 0.0);
        assert_eq!(sign(0.0), 0.0);
    }

    #[test]
    fn test_local_world_transforms() {
        let body = RigidBody::new(1.0, 1.0).with_pose(
            Point3::new(1.0, 0.0, 2.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        // +Z rotated 90° about +Y lands on +X
        let p = body.local_to_world(&Point3::new(0.0, 0.0, 1.0));
        assert!((p - Point3::new(2.0, 0.0, 2.0)).norm() < EPS);
        let d = body.world_dir_to_local(&body.local_dir_to_world(&Vector3::new(0.3, 0.0, 0.7)));
        assert!((d - Vector3::new(0.3, 0.0, 0.7)).norm() < EPS);
        assert!((body.yaw() - std::f32::consts::FRAC_PI_2).abs() < EPS);
    }
}
