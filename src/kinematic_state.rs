/// Kinematic state of a single degree of freedom at one control tick.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct KinematicState {
    pub acceleration: f64,
    pub velocity: f64,
    pub position: f64,
}

impl KinematicState {
    /// Creates a new KinematicState.
    pub fn new(acceleration: f64, velocity: f64, position: f64) -> Self {
        Self {
            acceleration,
            velocity,
            position,
        }
    }
}
