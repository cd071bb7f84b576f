//! Closed-form phase-duration solver for bang-bang jerk profiles.
//!
//! A maneuver is three phases: jerk of one sign for `T1`, zero jerk for
//! `T2`, jerk of the opposite sign for `T3`, driving the acceleration from
//! its initial value `a0` back to zero while realizing a requested velocity
//! change `dv`. Everything here is direct arithmetic on those constraints;
//! no iteration, no search, so every call has a fixed worst-case cost and
//! degenerate inputs resolve through epsilon fallbacks instead of retries.
//!
//! `jerk` arguments are signed: the sign encodes the maneuver direction
//! (phase 1 applies `+jerk`, phase 3 applies `-jerk`).

use tracing::{debug, trace};

use crate::constraints::ComplexRootFallback;

/// Solves the acceleration-zeroing / velocity-matching quadratic
/// `j²T1² + 2·a0·j·T1 + a0² − 2·j·dv = 0` for the minimum-time `(T1, T3)`
/// pair, with `T3 = a0/j + T1`.
///
/// Both candidate roots are evaluated and the pair with `T1 ≥ 0` and
/// `T3 ≥ 0` is returned; when neither qualifies the result is `(0.0, NAN)`.
/// A negative discriminant means no real bang-bang profile exists at this
/// jerk magnitude, and the result is dictated by `fallback`.
pub fn compute_t1_t3(a0: f64, dv: f64, jerk: f64, fallback: ComplexRootFallback) -> (f64, f64) {
    if jerk.abs() <= f64::EPSILON {
        // No division by a vanishing jerk; T3 is unsolvable without one.
        return (0.0, f64::NAN);
    }

    let delta = 2.0 * a0 * a0 + 4.0 * jerk * dv;
    if delta < 0.0 {
        debug!(delta, "complex roots, no bang-bang profile at this jerk");
        return match fallback {
            ComplexRootFallback::JerkValue => (0.0, jerk),
            ComplexRootFallback::NanDuration => (0.0, f64::NAN),
        };
    }

    let sqrt_delta = delta.sqrt();
    let t1_plus = (-a0 + 0.5 * sqrt_delta) / jerk;
    let t1_minus = (-a0 - 0.5 * sqrt_delta) / jerk;
    let t3_plus = a0 / jerk + t1_plus;
    let t3_minus = a0 / jerk + t1_minus;
    trace!(t1_plus, t1_minus, "candidate T1 roots");

    if t1_plus >= 0.0 && t3_plus >= 0.0 {
        (t1_plus, t3_plus)
    } else if t1_minus >= 0.0 && t3_minus >= 0.0 {
        (t1_minus, t3_minus)
    } else {
        (0.0, f64::NAN)
    }
}

/// Computes `T1` and clips it against the acceleration bound.
///
/// A `T1` shorter than one tick is not resolvable by the control loop and
/// collapses to `(0.0, jerk)`, leaving the maneuver to T2/T3 alone. When
/// the acceleration reached at the end of `T1` would exceed
/// `±max_acceleration`, `T1` is shortened to stop exactly on the bound;
/// T2 then holds that clipped acceleration and T3 only shrinks it, so no
/// further bound check is needed downstream.
pub fn compute_t1(
    a0: f64,
    dv: f64,
    jerk: f64,
    max_acceleration: f64,
    dt: f64,
    fallback: ComplexRootFallback,
) -> (f64, f64) {
    let (mut t1, _t3) = compute_t1_t3(a0, dv, jerk, fallback);

    if t1 < dt {
        return (0.0, jerk);
    }

    let a1 = a0 + jerk * t1;
    if a1 > max_acceleration {
        t1 = (max_acceleration - a0) / jerk;
    } else if a1 < -max_acceleration {
        t1 = (-max_acceleration - a0) / jerk;
    }

    (t1, jerk)
}

/// Computes `T3 = a0/j + T1` and applies the sub-tick correction.
///
/// If `T1` is effectively zero while `T3` lands strictly between epsilon
/// and one tick, the deceleration phase is shorter than the loop can
/// resolve: `T3` is stretched to exactly one tick and the jerk magnitude
/// reduced to `a0/T3` so the acceleration still lands on zero at the end
/// of it. If that reduced jerk would exceed the commanded magnitude it is
/// clamped back, accepting a residual acceleration. Never returns a
/// negative `T3`.
pub fn compute_t3(t1: f64, a0: f64, jerk: f64, dt: f64) -> (f64, f64) {
    if jerk.abs() <= f64::EPSILON {
        return (0.0, jerk);
    }

    let mut t3 = a0 / jerk + t1;
    let mut jerk_t3 = jerk;

    if t1 < f64::EPSILON && t3 < dt && t3 > f64::EPSILON {
        trace!(t3, "T3 shorter than one tick, stretching to dt");
        t3 = dt;
        jerk_t3 = a0 / t3;
        if jerk_t3.abs() > jerk.abs() {
            debug!(jerk_t3, "adjusted jerk exceeds commanded magnitude, clamping");
            jerk_t3 = jerk;
        }
    }

    (t3.max(0.0), jerk_t3)
}

/// Computes `T2` from conservation of the velocity change over all three
/// phases, given already-solved `T1` and `T3`.
///
/// The denominator `T1·j + a0` is the acceleration at the end of T1; when
/// it is below machine epsilon the constant phase is meaningless and `T2`
/// is zero. A `T2` shorter than one tick is likewise zeroed, its effect
/// being absorbed by the neighboring phases on the next replan.
pub fn compute_t2(t1: f64, t3: f64, a0: f64, dv: f64, jerk: f64, dt: f64) -> f64 {
    let mut t2 = 0.0;

    let den = t1 * jerk + a0;
    if den.abs() > f64::EPSILON {
        t2 = (-0.5 * t1 * t1 * jerk - t1 * t3 * jerk - t1 * a0 + 0.5 * t3 * t3 * jerk - t3 * a0
            + dv)
            / den;
    }

    if t2 < dt {
        t2 = 0.0;
    }

    t2
}

/// Fixed-total-duration variant of the `T1` solve: the total `T123` is
/// imposed externally (typically exactly one control period) instead of
/// being minimized.
///
/// A negative discriminant is retried once with the jerk sign flipped,
/// trading a direction reversal for completing the required velocity
/// change inside the time budget. The root whose `(T1, T3)` pair fits
/// within `T123` is kept; if neither fits, `T1` is zero. Returns the
/// possibly sign-flipped jerk alongside `T1`.
pub fn compute_t1_for_total(t123: f64, a0: f64, dv: f64, jerk: f64, dt: f64) -> (f64, f64) {
    let mut jerk = jerk;
    let mut delta = t123 * t123 * jerk * jerk + 2.0 * t123 * a0 * jerk - a0 * a0 - 4.0 * jerk * dv;

    if delta < 0.0 {
        debug!(delta, "negative discriminant, flipping jerk sign");
        jerk = -jerk;
        delta = t123 * t123 * jerk * jerk + 2.0 * t123 * a0 * jerk - a0 * a0 - 4.0 * jerk * dv;
    }

    let sqrt_delta = delta.sqrt();

    if jerk.abs() <= f64::EPSILON {
        debug!("jerk magnitude below epsilon");
        return (0.0, jerk);
    }
    let denominator_inv = 1.0 / (2.0 * jerk);

    let b = -t123 * jerk + a0;

    // NaN from a still-negative discriminant collapses to zero here.
    let t1_plus = ((-b + sqrt_delta) * denominator_inv).max(0.0);
    let t1_minus = ((-b - sqrt_delta) * denominator_inv).max(0.0);
    trace!(t1_plus, t1_minus, "candidate T1 roots for fixed total");

    let (t3_plus, _) = compute_t3(t1_plus, a0, jerk, dt);
    let (t3_minus, _) = compute_t3(t1_minus, a0, jerk, dt);

    let mut t1 = if t1_plus + t3_plus > t123 {
        t1_minus
    } else if t1_minus + t3_minus > t123 {
        t1_plus
    } else {
        0.0
    };

    if t1 < dt {
        t1 = 0.0;
    }

    (t1, jerk)
}

/// `T2` for the fixed-total-duration mode: whatever remains of `T123`
/// after `T1` and `T3`, zeroed when shorter than one tick.
pub fn compute_t2_for_total(t123: f64, t1: f64, t3: f64, dt: f64) -> f64 {
    let t2 = t123 - t1 - t3;

    if t2 < dt {
        return 0.0;
    }

    t2
}

/// Solves for a reduced jerk magnitude when the nominal `T1` came out
/// shorter than one tick, i.e. the commanded jerk is too large to shape a
/// bang-bang profile at the loop rate.
///
/// The candidates are the roots of `2T1²a0² − 4T1·a0·dv + dv²` in jerk;
/// each is validated by re-solving `(T1, T3)` with it, and when both are
/// valid the one with the smaller total time wins. A negative discriminant
/// returns `0.0`; when neither candidate validates the input jerk is kept.
pub fn recompute_max_jerk(
    t1: f64,
    a0: f64,
    dv: f64,
    jerk: f64,
    fallback: ComplexRootFallback,
) -> f64 {
    if t1.abs() <= f64::EPSILON {
        return jerk;
    }

    let delta = 2.0 * t1 * t1 * a0 * a0 - 4.0 * t1 * a0 * dv + dv * dv;
    if delta < 0.0 {
        debug!(delta, "no real reduced jerk");
        return 0.0;
    }

    let t1_sq = t1 * t1;
    let jerk_plus = -0.5 * (2.0 * t1 * a0 - dv) / t1_sq + 0.5 * delta.sqrt() / t1_sq;
    let jerk_minus = -0.5 * (2.0 * t1 * a0 - dv) / t1_sq - 0.5 * delta.sqrt() / t1_sq;
    trace!(jerk_plus, jerk_minus, "candidate reduced jerks");

    let (t1_plus, t3_plus) = compute_t1_t3(a0, dv, jerk_plus, fallback);
    let (t1_minus, t3_minus) = compute_t1_t3(a0, dv, jerk_minus, fallback);
    let plus_valid = t1_plus >= 0.0 && t3_plus >= 0.0;
    let minus_valid = t1_minus >= 0.0 && t3_minus >= 0.0;

    if plus_valid && minus_valid {
        // Both shapes reach the target; keep the time-optimal one.
        if t1_plus + t3_plus > t1_minus + t3_minus {
            jerk_minus
        } else {
            jerk_plus
        }
    } else if plus_valid {
        jerk_plus
    } else if minus_valid {
        jerk_minus
    } else {
        debug!("neither reduced jerk validates, keeping input");
        jerk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use proptest::prelude::*;

    const DT: f64 = 0.02;

    #[test]
    fn symmetric_ramp_from_rest() {
        // a0 = 0: T1 and T3 are equal and the realized dv is j*T1^2.
        let (t1, t3) = compute_t1_t3(0.0, 2.0, 9.0, ComplexRootFallback::default());
        assert_float_absolute_eq!(t1, (2.0_f64 / 9.0).sqrt(), 1e-12);
        assert_float_absolute_eq!(t3, t1, 1e-12);
        assert_float_absolute_eq!(9.0 * t1 * t1, 2.0, 1e-12);
    }

    #[test]
    fn root_selection_with_initial_acceleration() {
        // Positive a0 against a negative-direction maneuver forces the
        // minus root; both durations must still come out non-negative.
        let (t1, t3) = compute_t1_t3(4.0, 0.5, -9.0, ComplexRootFallback::default());
        assert!(t1 >= 0.0 && t3 >= 0.0);
        // End-of-T1 acceleration flows back to zero under the opposite
        // jerk held for T3.
        assert_float_absolute_eq!((4.0 + -9.0 * t1) + 9.0 * t3, 0.0, 1e-9);
    }

    #[test]
    fn sub_tick_t1_collapses() {
        // Tiny dv: nominal T1 is far below one tick.
        let (t1, jerk) = compute_t1(0.0, 1e-6, 9.0, 6.0, DT, ComplexRootFallback::default());
        assert_eq!(t1, 0.0);
        assert_eq!(jerk, 9.0);
    }

    #[test]
    fn saturation_clips_t1_to_acceleration_bound() {
        // Large dv would push the acceleration way past the bound.
        let (t1, jerk) = compute_t1(0.0, 10.0, 9.0, 6.0, DT, ComplexRootFallback::default());
        assert_float_absolute_eq!(t1, 6.0 / 9.0, 1e-12);
        assert_eq!(jerk, 9.0);
        assert!(0.0 + jerk * t1 <= 6.0 + 1e-12);
    }

    #[test]
    fn sub_tick_t3_stretches_to_one_tick() {
        let (t3, jerk_adjusted) = compute_t3(0.0, 0.005, 9.0, DT);
        assert_eq!(t3, DT);
        assert_float_absolute_eq!(jerk_adjusted, 0.005 / DT, 1e-15);
        // Holding -jerk_adjusted for one tick cancels a0 exactly.
        assert_float_absolute_eq!(0.005 - jerk_adjusted * DT, 0.0, 1e-15);
    }

    #[test]
    fn sub_tick_t3_clamps_adjusted_jerk_to_commanded_magnitude() {
        // A negative T1 out of the saturation clip (acceleration already
        // past the bound) leaves more a0 than one tick of commanded jerk
        // can cancel; the stretched-phase jerk is clamped back to the
        // command instead of exceeding it.
        let (t3, jerk_adjusted) = compute_t3(-0.01, 0.2, 9.0, DT);
        assert_eq!(t3, DT);
        assert_eq!(jerk_adjusted, 9.0);
    }

    #[test]
    fn t3_never_negative() {
        let (t3, _) = compute_t3(0.0, 0.005, -9.0, DT);
        assert_eq!(t3, 0.0);
    }

    #[test]
    fn t2_zeroed_on_vanishing_denominator() {
        assert_eq!(compute_t2(0.0, 0.0, 0.0, 1.0, 9.0, DT), 0.0);
    }

    #[test]
    fn t2_positive_for_saturated_profile() {
        // Saturated ramp: T2 carries the bulk of a large velocity change.
        let a0 = 0.0;
        let dv = 10.0;
        let (t1, jerk) = compute_t1(a0, dv, 9.0, 6.0, DT, ComplexRootFallback::default());
        let (t3, jerk) = compute_t3(t1, a0, jerk, DT);
        let t2 = compute_t2(t1, t3, a0, dv, jerk, DT);
        assert!(t2 > DT);
        // Velocity realized over the three phases matches dv.
        let a1 = a0 + jerk * t1;
        let dv_realized = (a0 + a1) / 2.0 * t1 + a1 * t2 + (a1 / 2.0) * t3;
        assert_float_absolute_eq!(dv_realized, dv, 1e-9);
    }

    #[test]
    fn fixed_total_single_tick_budget() {
        // Small residual maneuver forced into exactly one control period.
        let dt = 0.01;
        let t123 = dt;
        let a0 = 6.58e-6;
        let dv = 0.00049;
        let jerk = -55.2;

        let (t1, jerk_t1) = compute_t1_for_total(t123, a0, dv, jerk, dt);
        let (t3, jerk_t3) = compute_t3(t1, a0, jerk_t1, dt);
        let t2 = compute_t2_for_total(t123, t1, t3, dt);

        assert_eq!(t1, 0.0);
        assert_eq!(t3, 0.0);
        assert_float_absolute_eq!(t2, t123, 1e-15);
        assert_eq!(jerk_t1, jerk);
        assert_eq!(jerk_t3, jerk);
    }

    #[test]
    fn fixed_total_flips_jerk_on_negative_discriminant() {
        // A large dv inside a one-tick budget has no real root until the
        // sign flips.
        let (_, jerk) = compute_t1_for_total(0.01, 0.0, 1.0, 9.0, 0.01);
        assert_eq!(jerk, -9.0);
    }

    #[test]
    fn recompute_max_jerk_reduces_magnitude() {
        // Nominal T1 below one tick at j = 9: a slower jerk over a full
        // tick must realize the same dv with valid phase durations.
        let a0 = 0.0;
        let dv = 1e-3;
        let reduced = recompute_max_jerk(DT, a0, dv, 9.0, ComplexRootFallback::default());
        assert!(reduced.abs() < 9.0);
        let (t1, t3) = compute_t1_t3(a0, dv, reduced, ComplexRootFallback::default());
        assert!(t1 >= 0.0 && t3 >= 0.0);
        assert_float_absolute_eq!(reduced * t1 * t1, dv, 1e-9);
    }

    #[test]
    fn recompute_max_jerk_zeroes_on_negative_discriminant() {
        // 2*t1^2*a0^2 - 4*t1*a0*dv + dv^2 goes negative for dv strictly
        // between (2 - sqrt(2))*t1*a0 and (2 + sqrt(2))*t1*a0; no real
        // reduced jerk exists there.
        assert_eq!(
            recompute_max_jerk(DT, 1.0, 0.04, 9.0, ComplexRootFallback::default()),
            0.0
        );
    }

    #[test]
    fn recompute_max_jerk_keeps_input_when_no_candidate_validates() {
        // At rest with no velocity error both candidate jerks collapse
        // to zero, which solves nothing; the input magnitude is kept.
        assert_eq!(
            recompute_max_jerk(DT, 0.0, 0.0, 9.0, ComplexRootFallback::default()),
            9.0
        );
    }

    #[test]
    fn recompute_max_jerk_keeps_input_on_zero_t1() {
        assert_eq!(
            recompute_max_jerk(0.0, 0.1, 1.0, 9.0, ComplexRootFallback::default()),
            9.0
        );
    }

    proptest! {
        /// A negative discriminant must reproduce the historical fallback
        /// exactly: T1 = 0 and the signed jerk standing in for T3.
        #[test]
        fn complex_roots_return_jerk_value(
            a0 in -5.0_f64..5.0,
            dv in 0.01_f64..100.0,
            jerk in 1.0_f64..20.0,
        ) {
            // Opposing jerk and dv makes 2a0^2 + 4*j*dv go negative once
            // |4*j*dv| dominates.
            let jerk = -jerk;
            prop_assume!(2.0 * a0 * a0 + 4.0 * jerk * dv < 0.0);

            let (t1, t3) = compute_t1_t3(a0, dv, jerk, ComplexRootFallback::JerkValue);
            prop_assert_eq!(t1, 0.0);
            prop_assert_eq!(t3, jerk);

            let (t1, t3) = compute_t1_t3(a0, dv, jerk, ComplexRootFallback::NanDuration);
            prop_assert_eq!(t1, 0.0);
            prop_assert!(t3.is_nan());
        }

        /// Whenever real roots exist, the selected pair is non-negative and
        /// consistent with the T3 = a0/j + T1 relation.
        #[test]
        fn selected_roots_are_consistent(
            a0 in -5.0_f64..5.0,
            dv in -10.0_f64..10.0,
            jerk in 1.0_f64..20.0,
        ) {
            let jerk = if dv >= 0.0 { jerk } else { -jerk };
            prop_assume!(2.0 * a0 * a0 + 4.0 * jerk * dv >= 0.0);

            let (t1, t3) = compute_t1_t3(a0, dv, jerk, ComplexRootFallback::default());
            prop_assert!(t1 >= 0.0);
            if !t3.is_nan() {
                prop_assert!(t3 >= 0.0);
                prop_assert!((a0 / jerk + t1 - t3).abs() < 1e-9);
            }
        }
    }
}
