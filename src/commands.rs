//! Driver commands and the per-frame tick clock.
//!
//! Input devices (keyboard, settings file, tests) never touch simulation
//! state directly. They send [`DriverCommand`] events, and each owning
//! module applies the commands it cares about during [`crate::TickSet::Input`].

use bevy::prelude::*;

use crate::headlights::HeadlightMode;
use crate::units::UnitSystem;
use crate::vehicle::braking::PavementCondition;

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DriverCommand>()
            .init_resource::<TickClock>()
            .add_systems(Update, sample_tick_clock.in_set(crate::TickSet::Input));
    }
}

/// Everything the driver (or the GUI layer on their behalf) can ask for.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum DriverCommand {
    /// Desired cruising speed, expressed in the given display unit.
    SetTargetSpeed { value: f32, units: UnitSystem },
    /// Brake pedal pressed (`true`) or released (`false`).
    Brake(bool),
    SetPavement(PavementCondition),
    SetHeadlights(HeadlightMode),
    SetUnits(UnitSystem),
    /// Day (`true`) or night (`false`).
    SetDaytime(bool),
}

/// Frame delta sampled exactly once per tick.
///
/// Speed and position integration both read this instead of `Time` so they
/// always agree on how much time passed.
#[derive(Resource, Debug)]
pub struct TickClock {
    /// Seconds since the previous tick, clamped to `max_delta_secs`.
    pub delta_secs: f32,
    /// Largest delta a single tick may integrate.
    pub max_delta_secs: f32,
    /// Ticks since start.
    pub frame: u64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self {
            delta_secs: 0.0,
            max_delta_secs: 0.1,
            frame: 0,
        }
    }
}

impl TickClock {
    pub fn sample(&mut self, raw_delta_secs: f32) {
        self.delta_secs = if raw_delta_secs.is_finite() {
            raw_delta_secs.clamp(0.0, self.max_delta_secs)
        } else {
            0.0
        };
        self.frame += 1;
    }
}

fn sample_tick_clock(time: Res<Time>, mut clock: ResMut<TickClock>) {
    clock.sample(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hitches_are_clamped() {
        let mut clock = TickClock::default();
        clock.sample(2.5);
        assert_eq!(clock.delta_secs, 0.1);
        clock.sample(f32::NAN);
        assert_eq!(clock.delta_secs, 0.0);
        clock.sample(1.0 / 60.0);
        assert_eq!(clock.delta_secs, 1.0 / 60.0);
        assert_eq!(clock.frame, 3);
    }
}
