// ==============================================================================
// solve.rs — PER-WHEEL TIRE SOLVE (FORCE ACCUMULATION)
// ==============================================================================
// For one wheel, in order:
// 1) drive force (driven wheels), updating the shared slip factor
// 2) mount kinematics from the displacement since last frame
// 3) brake force against the longitudinal speed
// 4) lateral force from the saturating grip curve
// 5) wheel spin update
// 6) the mount position is kept for the next frame (WheelState::track)
//
// A frame with dt <= 0 leaves the wheel untouched: no position sample, no spin
// update, zero derived speeds.
//
// All forces are pushed into the rigid body's accumulator at the wheel's
// body-local mount point; nothing is integrated here.
// ==============================================================================

use nalgebra::Vector3;

use crate::physics::{Force, RigidBody};
use crate::tire::kinematics::{slip_components, wheel_basis_world};
use crate::tire::lateral::solve_lateral;
use crate::tire::longitudinal::{solve_brake, solve_drive};
use crate::tire::spin::update_spin;
use crate::tire::types::{SolveContext, TireConfig, WheelForces, WheelMount, WheelState};

pub fn solve_wheel(
    cfg: &TireConfig,
    ctx: &SolveContext,
    body: &mut RigidBody,
    wheel: &mut WheelState,
    mount: &WheelMount,
    slip_factor: &mut f32,
) -> WheelForces {
    let steer = if mount.steer { ctx.steer_angle } else { 0.0 };
    let (forward, side) = wheel_basis_world(body, steer);
    let torque = if mount.drive { ctx.wheel_torque } else { 0.0 };

    let mut out = WheelForces::default();

    // -------------------------
    // DRIVE
    // -------------------------
    if mount.drive {
        let drive = solve_drive(cfg, wheel, torque, slip_factor, ctx.dt);
        out.drive = drive.force;
        out.slipping = drive.slipping;

        body.apply_force(Force::new(forward * drive.force, mount.position));
    }

    // -------------------------
    // KINEMATICS
    // -------------------------
    let delta = if ctx.dt > 0.0 {
        wheel.track(body.local_to_world(&mount.position))
    } else {
        Vector3::zeros()
    };
    let (v_long, v_lat) = slip_components(delta, forward, side, ctx.dt);
    out.v_long = v_long;
    out.v_lat = v_lat;

    // -------------------------
    // BRAKE
    // -------------------------
    let brake = solve_brake(cfg, wheel, v_long, ctx.brake_pedal, ctx.brake_torque, ctx.dt);
    if brake != 0.0 {
        out.brake = brake;
        body.apply_force(Force::new(forward * brake, mount.position));
    }

    // -------------------------
    // LATERAL
    // -------------------------
    out.lateral = solve_lateral(cfg, wheel, v_lat, out.slipping);
    body.apply_force(Force::new(side * out.lateral, mount.position));

    // -------------------------
    // SPIN
    // -------------------------
    if ctx.dt > 0.0 {
        update_spin(cfg, wheel, v_long, torque, *slip_factor, ctx.dt);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn ctx(torque: f32, brake: f32) -> SolveContext {
        SolveContext {
            dt: 0.1,
            steer_angle: 0.0,
            wheel_torque: torque,
            brake_pedal: brake,
            brake_torque: 1200.0,
        }
    }

    fn rear_left() -> WheelMount {
        WheelMount { position: Point3::new(0.8, 0.0, -1.3), drive: true, steer: false }
    }

    #[test]
    fn test_first_frame_has_no_lateral_or_brake() {
        let cfg = TireConfig::default();
        let mut body = RigidBody::new(1000.0, 950.0);
        let mut wheel = WheelState::new(0.3, 0.8, 250.0);
        let mut slip = 0.0;

        let out = solve_wheel(&cfg, &ctx(500.0, 1.0), &mut body, &mut wheel, &rear_left(), &mut slip);

        assert_eq!(out.v_long, 0.0);
        assert_eq!(out.v_lat, 0.0);
        assert_eq!(out.brake, 0.0);
        assert_eq!(out.lateral, 0.0);
        assert_eq!(out.drive, 500.0);
        // drive + lateral
        assert_eq!(body.forces().len(), 2);
        assert!((body.forces()[0].vector - Vector3::new(0.0, 0.0, 500.0)).norm() < 1e-3);
    }

    #[test]
    fn test_undriven_wheel_pushes_no_drive_force() {
        let cfg = TireConfig::default();
        let mut body = RigidBody::new(1000.0, 950.0);
        let mut wheel = WheelState::new(0.3, 0.8, 250.0);
        let mut slip = 0.4;
        let mount = WheelMount { drive: false, ..rear_left() };

        let out = solve_wheel(&cfg, &ctx(500.0, 0.0), &mut body, &mut wheel, &mount, &mut slip);
        assert_eq!(out.drive, 0.0);
        assert_eq!(slip, 0.4);
        assert_eq!(body.forces().len(), 1);
    }

    #[test]
    fn test_moving_wheel_brakes_and_resists_side_slip() {
        let cfg = TireConfig::default();
        let mut body = RigidBody::new(1000.0, 950.0);
        let mut wheel = WheelState::new(0.3, 0.8, 250.0);
        let mut slip = 0.0;
        let mount = WheelMount { drive: false, ..rear_left() };

        solve_wheel(&cfg, &ctx(0.0, 1.0), &mut body, &mut wheel, &mount, &mut slip);

        // move the body 1 m forward and 0.1 m left over 0.1 s
        body.set_velocity(Vector3::new(1.0, 0.0, 10.0));
        body.reset_forces();
        body.update(0.1);
        body.reset_forces();

        let out = solve_wheel(&cfg, &ctx(0.0, 1.0), &mut body, &mut wheel, &mount, &mut slip);
        assert!((out.v_long - 10.0).abs() < 1e-3);
        assert!((out.v_lat - 1.0).abs() < 1e-3);
        assert_eq!(out.brake, -1200.0);
        assert!(out.lateral < 0.0);
        // ground-locked spin: 10 / (2 * 0.3)
        assert!((wheel.rot_speed - 10.0 / 0.6).abs() < 1e-2);
    }

    #[test]
    fn test_zero_dt_frame_leaves_wheel_untouched() {
        let cfg = TireConfig::default();
        let mut body = RigidBody::new(1000.0, 950.0);
        let mut wheel = WheelState::new(0.3, 0.8, 250.0);
        let mut slip = 0.0;
        let mount = WheelMount { drive: false, ..rear_left() };

        solve_wheel(&cfg, &ctx(0.0, 0.0), &mut body, &mut wheel, &mount, &mut slip);
        body.set_velocity(Vector3::new(0.0, 0.0, 6.0));
        body.update(0.1);
        wheel.rot_speed = 10.0;

        let frozen = SolveContext { dt: 0.0, ..ctx(0.0, 1.0) };
        body.reset_forces();
        let out = solve_wheel(&cfg, &frozen, &mut body, &mut wheel, &mount, &mut slip);
        assert_eq!(out.v_long, 0.0);
        assert_eq!(out.brake, 0.0);
        assert_eq!(wheel.rot_speed, 10.0);

        // the next real frame still sees the full 0.6 m travelled
        body.reset_forces();
        let out = solve_wheel(&cfg, &ctx(0.0, 0.0), &mut body, &mut wheel, &mount, &mut slip);
        assert!((out.v_long - 6.0).abs() < 1e-3);
        assert!((wheel.rot_speed - 10.0).abs() < 1e-2);
    }
}
