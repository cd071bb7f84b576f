use std::error::Error;

use gnuplot::*;
use rand::Rng;

use veltraj_motion::{Constraints, KinematicState, TrajectoryGenerator};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // -----------------------
    // 1. Set up parameters
    // -----------------------
    // Initial conditions and constraints of the simulated axis.
    let initial_state = KinematicState::new(0.0, 0.5, 0.0);

    let max_jerk = 9.0;
    let max_acceleration = 6.0;
    let max_velocity = 6.0;

    // Simulation time parameters: nominal 50 Hz loop with random tick
    // jitter, the way a soft real-time scheduler would actually run it.
    let dt_nominal = 1.0 / 50.0;
    let sigma_jitter = dt_nominal / 5.0;
    let t_end = 5.2;

    // -------------------------
    // 2. Create and configure
    // -------------------------
    let constraints = Constraints::new(max_jerk, max_acceleration, max_velocity)?;
    let mut generator = TrajectoryGenerator::new(constraints);
    let mut rng = rand::thread_rng();

    // --------------------------------
    // 3. Run the control loop
    // --------------------------------
    let mut state = initial_state;
    let mut t = 0.0;

    let mut time_axis = Vec::new();
    let mut targets = Vec::new();
    let mut jerks = Vec::new();
    let mut compensated_jerks = Vec::new();
    let mut accelerations = Vec::new();
    let mut velocities = Vec::new();
    let mut positions = Vec::new();

    while t < t_end {
        let dt = dt_nominal + rng.gen_range(-sigma_jitter..sigma_jitter);

        // Stepped velocity setpoint schedule (simulated operator input).
        let target = if t < 3.0 {
            0.0
        } else if t < 4.5 {
            4.0
        } else {
            5.0
        };
        let target = constraints.clamp_target(target);

        let out = generator.advance(state, target, dt);
        state = out.state;
        t += dt;

        time_axis.push(t);
        targets.push(target);
        jerks.push(out.jerk);
        compensated_jerks.push(out.compensated_previous_jerk);
        accelerations.push(state.acceleration);
        velocities.push(state.velocity);
        positions.push(state.position);
    }

    // Quick final check (did we roughly settle on the last setpoint?)
    let final_velocity = *velocities.last().unwrap_or(&0.0);
    if (final_velocity - 5.0).abs() > 0.05 {
        eprintln!("Warning: final velocity is off by more than 0.05 units.");
    }

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Jerk-limited velocity trajectory vs. time", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Metric amplitude", &[]);
        axes.lines(&time_axis, &targets, &[Color("black"), Caption("v target")]);
        axes.lines(&time_axis, &jerks, &[Color("orange"), Caption("Jerk")]);
        axes.lines(
            &time_axis,
            &compensated_jerks,
            &[Color("magenta"), Caption("Jerk (compensated)")],
        );
        axes.lines(
            &time_axis,
            &accelerations,
            &[Color("green"), Caption("Acceleration")],
        );
        axes.lines(&time_axis, &velocities, &[Color("red"), Caption("Velocity")]);
        axes.lines(&time_axis, &positions, &[Color("blue"), Caption("Position")]);
    }

    // Attempt to show in a pop-up window (might require gnuplot installed)
    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!(
        "Plot generated. Final velocity: {:.3} after {:.3} seconds.",
        final_velocity, t
    );
    Ok(())
}
