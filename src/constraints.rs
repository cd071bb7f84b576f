use thiserror::Error;

/// Errors produced when constructing [`Constraints`] from out-of-range bounds.
#[derive(Debug, Error, PartialEq)]
pub enum ConstraintError {
    #[error("max jerk must be positive and finite, got {0}")]
    InvalidMaxJerk(f64),
    #[error("max acceleration must be positive and finite, got {0}")]
    InvalidMaxAcceleration(f64),
    #[error("max velocity must be positive and finite, got {0}")]
    InvalidMaxVelocity(f64),
}

/// Motion bounds for one degree of freedom.
///
/// All bounds are positive magnitudes; the maneuver direction is chosen per
/// tick by the generator, never encoded in the constraints. `max_velocity`
/// is carried for the caller's benefit (see [`Constraints::clamp_target`])
/// and is not enforced by the phase-duration formulas themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub max_jerk: f64,
    pub max_acceleration: f64,
    pub max_velocity: f64,
}

impl Constraints {
    /// Creates validated constraints. Each bound must be finite and > 0.
    ///
    /// The solver functions assume valid bounds and do not re-check them;
    /// construct through here to keep the precondition at the boundary.
    pub fn new(
        max_jerk: f64,
        max_acceleration: f64,
        max_velocity: f64,
    ) -> Result<Self, ConstraintError> {
        if !max_jerk.is_finite() || max_jerk <= 0.0 {
            return Err(ConstraintError::InvalidMaxJerk(max_jerk));
        }
        if !max_acceleration.is_finite() || max_acceleration <= 0.0 {
            return Err(ConstraintError::InvalidMaxAcceleration(max_acceleration));
        }
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return Err(ConstraintError::InvalidMaxVelocity(max_velocity));
        }
        Ok(Self {
            max_jerk,
            max_acceleration,
            max_velocity,
        })
    }

    /// Clamps a velocity setpoint into `[-max_velocity, max_velocity]`.
    ///
    /// The generator itself never limits velocity; callers that need the
    /// bound apply it to the target before each [`advance`] call.
    ///
    /// [`advance`]: crate::TrajectoryGenerator::advance
    pub fn clamp_target(&self, target_velocity: f64) -> f64 {
        target_velocity.clamp(-self.max_velocity, self.max_velocity)
    }
}

/// Behavior of [`compute_t1_t3`] when the bang-bang quadratic has no real
/// root, i.e. no profile at the given jerk magnitude realizes the requested
/// velocity change.
///
/// [`compute_t1_t3`]: crate::solver::compute_t1_t3
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComplexRootFallback {
    /// Return `(0.0, jerk)`: the signed jerk magnitude stands in for T3.
    /// This reproduces the historical controller behavior; note the value
    /// has jerk units where a duration is expected, and downstream phase
    /// selection merely treats it as "T3 is active".
    #[default]
    JerkValue,
    /// Return `(0.0, NAN)` so the missing solution is observable.
    NanDuration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_bounds() {
        assert_eq!(
            Constraints::new(0.0, 6.0, 6.0),
            Err(ConstraintError::InvalidMaxJerk(0.0))
        );
        assert_eq!(
            Constraints::new(9.0, -1.0, 6.0),
            Err(ConstraintError::InvalidMaxAcceleration(-1.0))
        );
        assert!(Constraints::new(9.0, 6.0, f64::NAN).is_err());
        assert!(Constraints::new(9.0, 6.0, 6.0).is_ok());
    }

    #[test]
    fn clamp_target_symmetric() {
        let c = Constraints::new(9.0, 6.0, 6.0).unwrap();
        assert_eq!(c.clamp_target(10.0), 6.0);
        assert_eq!(c.clamp_target(-10.0), -6.0);
        assert_eq!(c.clamp_target(4.0), 4.0);
    }
}
