/// Caller-side post-processing policy for the integrated position.
///
/// The generator always integrates position; a controller tracking a real
/// plant may want to stop the setpoint from running away once the tracked
/// position error grows past a limit. This helper holds the setpoint at
/// the first value seen while the error exceeds the limit and releases it
/// as soon as the error falls back inside. It is applied to the position
/// returned by [`advance`], never inside it.
///
/// [`advance`]: crate::TrajectoryGenerator::advance
#[derive(Clone, Copy, Debug)]
pub struct PositionFreeze {
    position_error_limit: f64,
    frozen_position: Option<f64>,
}

impl PositionFreeze {
    pub fn new(position_error_limit: f64) -> Self {
        Self {
            position_error_limit,
            frozen_position: None,
        }
    }

    /// Returns `integrated_position` while `|integrated − measured|` stays
    /// within the limit, otherwise the position held when the error first
    /// exceeded it.
    pub fn apply(&mut self, integrated_position: f64, measured_position: f64) -> f64 {
        let error = integrated_position - measured_position;
        if error.abs() > self.position_error_limit {
            *self.frozen_position.get_or_insert(integrated_position)
        } else {
            self.frozen_position = None;
            integrated_position
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_position.is_some()
    }
}
