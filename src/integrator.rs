use crate::kinematic_state::KinematicState;

/// Propagates a kinematic state over one tick of duration `dt` under
/// constant jerk `jerk`.
///
/// The update is exact for constant jerk, not a discretization:
/// `a' = a + j*dt`, then the velocity integral collapses to the trapezoid
/// `v' = v + dt/2 * (a' + a)` and the position integral to
/// `x' = x + dt/3 * (v' + a*dt/2 + 2v)`, both algebraic identities of the
/// underlying cubic. Any mid-tick change of the held jerk must therefore be
/// applied before calling this, never patched on afterwards.
pub fn integrate_tick(jerk: f64, state: KinematicState, dt: f64) -> KinematicState {
    let acceleration = jerk * dt + state.acceleration;
    let velocity = dt / 2.0 * (acceleration + state.acceleration) + state.velocity;
    let position =
        dt / 3.0 * (velocity + state.acceleration * dt / 2.0 + 2.0 * state.velocity) + state.position;

    KinematicState {
        acceleration,
        velocity,
        position,
    }
}
