//! Per-tick trajectory generator for one degree of freedom.
//!
//! Called once per control period in a receding-horizon loop: the full
//! maneuver is replanned from scratch at every tick from the latest state,
//! so the only memory carried between calls is the jerk actually issued on
//! the previous tick and that tick's duration (plus the previous plan's T1
//! and T3, which the jitter compensator consults).

use tracing::{debug, trace};

use crate::constraints::{ComplexRootFallback, Constraints};
use crate::integrator::integrate_tick;
use crate::kinematic_state::KinematicState;
use crate::solver::{compute_t1, compute_t2, compute_t3};

/// Durations of the three bang-bang phases, recomputed every tick.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PhaseDurations {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
}

/// Inter-tick memory of the generator.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct ControllerMemory {
    /// Jerk command issued on the previous tick.
    pub previous_jerk: f64,
    /// Duration of the previous tick.
    pub previous_dt: f64,
    /// T1 of the previous tick's plan.
    pub previous_t1: f64,
    /// T3 of the previous tick's plan.
    pub previous_t3: f64,
}

/// Result of one [`TrajectoryGenerator::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutput {
    /// Jerk command to hold until the next call.
    pub jerk: f64,
    /// The previous tick's jerk as actually integrated this call, after
    /// jitter compensation. Zero on the first call.
    pub compensated_previous_jerk: f64,
    /// State after integrating the compensated previous jerk over `dt`.
    pub state: KinematicState,
    /// This tick's replanned phase durations.
    pub durations: PhaseDurations,
}

/// Single-axis jerk-limited velocity trajectory generator.
///
/// Owns the motion constraints and the small inter-tick memory; everything
/// else is recomputed per call in closed form, so each call costs a fixed
/// handful of comparisons and square roots. Axes never interact: replicate
/// the generator (it is `Clone`) for each independent degree of freedom.
#[derive(Clone, Debug)]
pub struct TrajectoryGenerator {
    constraints: Constraints,
    fallback: ComplexRootFallback,
    memory: Option<ControllerMemory>,
}

impl TrajectoryGenerator {
    /// Creates a generator with empty inter-tick memory.
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            fallback: ComplexRootFallback::default(),
            memory: None,
        }
    }

    /// Selects the behavior of the duration solver when no real bang-bang
    /// solution exists. Defaults to [`ComplexRootFallback::JerkValue`].
    pub fn set_fallback(&mut self, fallback: ComplexRootFallback) {
        self.fallback = fallback;
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn memory(&self) -> Option<ControllerMemory> {
        self.memory
    }

    /// Discards the inter-tick memory, as at the end of a maneuver. The
    /// next [`advance`](Self::advance) behaves like a first call.
    pub fn reset(&mut self) {
        self.memory = None;
    }

    /// Runs one control tick.
    ///
    /// First the jerk issued on the previous call is re-applied over the
    /// actually elapsed `dt` (rescaled by the jitter compensator when the
    /// tick stretched) and the state integrated across it; then the
    /// maneuver toward `target_velocity` is replanned from the fresh state
    /// and the jerk of the currently active phase is returned. On the
    /// first call the supplied state passes through unintegrated.
    ///
    /// `dt` must be positive and the constraints valid (see
    /// [`Constraints::new`]); neither is re-checked here. The call never
    /// fails: infeasible plans degrade to reduced or zero jerk.
    pub fn advance(&mut self, state: KinematicState, target_velocity: f64, dt: f64) -> TickOutput {
        let (state, compensated_previous_jerk) = match self.memory {
            Some(memory) => {
                let compensated = compensate_jerk(&memory, dt);
                (integrate_tick(compensated, state, dt), compensated)
            }
            None => (state, 0.0),
        };

        let jerk_max = select_jerk_polarity(&state, target_velocity, self.constraints.max_jerk);

        let dv = target_velocity - state.velocity;
        let (t1, jerk_t1) = compute_t1(
            state.acceleration,
            dv,
            jerk_max,
            self.constraints.max_acceleration,
            dt,
            self.fallback,
        );
        let (t3, jerk_t3) = compute_t3(t1, state.acceleration, jerk_t1, dt);
        let t2 = compute_t2(t1, t3, state.acceleration, dv, jerk_t3, dt);
        let durations = PhaseDurations { t1, t2, t3 };
        trace!(t1, t2, t3, jerk = jerk_t3, "replanned phases");

        // The active phase dictates the command: rising jerk during T1,
        // none during T2, falling jerk during T3.
        let jerk = if t1 > f64::EPSILON {
            jerk_t3
        } else if t2 > f64::EPSILON {
            0.0
        } else if t3 > f64::EPSILON {
            -jerk_t3
        } else {
            0.0
        };

        self.memory = Some(ControllerMemory {
            previous_jerk: jerk,
            previous_dt: dt,
            previous_t1: t1,
            previous_t3: t3,
        });

        TickOutput {
            jerk,
            compensated_previous_jerk,
            state,
            durations,
        }
    }
}

/// Rescales the previously held jerk when the current tick came in longer
/// than the previous one and the previous plan's T1 or T3 was meant to
/// complete within a single tick.
///
/// Holding the stored jerk over the stretched interval would overshoot the
/// planned acceleration change and leave the acceleration chattering
/// around zero near phase boundaries; scaling by `dt_prev/dt` makes the
/// realized change match the plan exactly.
fn compensate_jerk(memory: &ControllerMemory, dt: f64) -> f64 {
    let single_tick_phase = (dt > memory.previous_t1 && memory.previous_t1 > f64::EPSILON)
        || (dt > memory.previous_t3 && memory.previous_t3 > f64::EPSILON);

    if dt > memory.previous_dt && single_tick_phase {
        let compensated = memory.previous_jerk * memory.previous_dt / dt;
        debug!(
            previous_jerk = memory.previous_jerk,
            compensated, "tick stretched, rescaling held jerk"
        );
        compensated
    } else {
        memory.previous_jerk
    }
}

/// Picks the sign of the maneuver jerk from the velocity the axis would
/// reach if the current acceleration were driven to zero at full jerk.
///
/// Comparing the target against that predicted velocity, not the current
/// one, avoids starting in the velocity-error direction when the existing
/// acceleration is already large enough to overshoot: the profile must
/// first arrest the acceleration. With negligible acceleration this
/// reduces to the plain sign of the velocity error.
fn select_jerk_polarity(state: &KinematicState, target_velocity: f64, max_jerk: f64) -> f64 {
    let velocity_at_zero_acceleration = if state.acceleration.abs() > f64::EPSILON {
        let jerk_zero_acc = -state.acceleration.signum() * max_jerk.abs();
        let time_zero_acc = -state.acceleration / jerk_zero_acc;
        state.velocity
            + state.acceleration * time_zero_acc
            + 0.5 * jerk_zero_acc * time_zero_acc * time_zero_acc
    } else {
        state.velocity
    };

    if target_velocity > velocity_at_zero_acceleration {
        max_jerk.abs()
    } else {
        -max_jerk.abs()
    }
}
