//! Keyboard to [`DriverCommand`] mapping.

use bevy::prelude::*;

use crate::commands::DriverCommand;
use crate::day_night::LightingState;
use crate::headlights::HeadlightMode;
use crate::units::{mph_to_kmh, UnitSystem, SPEED_PRESETS};
use crate::vehicle::braking::PavementCondition;
use crate::vehicle::VehicleState;

pub const PRESET_KEYS: [KeyCode; 4] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
];

/// What the toggles toggle from.
#[derive(Clone, Copy, Debug)]
pub struct ControlContext {
    pub units: UnitSystem,
    pub pavement: PavementCondition,
    pub headlights: HeadlightMode,
    pub is_daytime: bool,
}

/// Commands for this frame's key edges. Brake follows Space being held:
/// press sends `Brake(true)`, release sends `Brake(false)`.
pub fn commands_for_keys(
    keys: &ButtonInput<KeyCode>,
    context: ControlContext,
) -> Vec<DriverCommand> {
    let mut out = Vec::new();

    if keys.just_pressed(KeyCode::Space) {
        out.push(DriverCommand::Brake(true));
    }
    if keys.just_released(KeyCode::Space) {
        out.push(DriverCommand::Brake(false));
    }

    for (key, preset) in PRESET_KEYS.iter().zip(SPEED_PRESETS.iter()) {
        if keys.just_pressed(*key) {
            let value = match context.units {
                UnitSystem::Metric => mph_to_kmh(preset.mph),
                UnitSystem::Imperial => preset.mph,
            };
            out.push(DriverCommand::SetTargetSpeed {
                value,
                units: context.units,
            });
        }
    }

    if keys.just_pressed(KeyCode::KeyP) {
        out.push(DriverCommand::SetPavement(context.pavement.next()));
    }
    if keys.just_pressed(KeyCode::KeyH) {
        out.push(DriverCommand::SetHeadlights(context.headlights.next()));
    }
    if keys.just_pressed(KeyCode::KeyU) {
        out.push(DriverCommand::SetUnits(context.units.toggled()));
    }
    if keys.just_pressed(KeyCode::KeyN) {
        out.push(DriverCommand::SetDaytime(!context.is_daytime));
    }

    out
}

pub(super) fn handle_driver_keys(
    keys: Res<ButtonInput<KeyCode>>,
    units: Res<UnitSystem>,
    vehicle: Res<VehicleState>,
    lighting: Res<LightingState>,
    mut commands: EventWriter<DriverCommand>,
) {
    let context = ControlContext {
        units: *units,
        pavement: vehicle.pavement(),
        headlights: vehicle.headlight_mode,
        is_daytime: lighting.is_daytime,
    };
    for command in commands_for_keys(&keys, context) {
        commands.send(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::display_speed_to_mph;
    use approx::assert_relative_eq;

    fn context() -> ControlContext {
        ControlContext {
            units: UnitSystem::Metric,
            pavement: PavementCondition::Normal,
            headlights: HeadlightMode::Regular,
            is_daytime: true,
        }
    }

    #[test]
    fn space_press_and_release_are_brake_edges() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Space);
        assert_eq!(commands_for_keys(&keys, context()), vec![DriverCommand::Brake(true)]);

        // Held: no repeat.
        keys.clear();
        assert!(commands_for_keys(&keys, context()).is_empty());

        keys.release(KeyCode::Space);
        assert_eq!(commands_for_keys(&keys, context()), vec![DriverCommand::Brake(false)]);
    }

    #[test]
    fn metric_preset_round_trips_to_mph() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Digit3);
        let commands = commands_for_keys(&keys, context());
        let [DriverCommand::SetTargetSpeed { value, units }] = commands[..] else {
            panic!("expected one target speed, got {commands:?}");
        };
        assert_relative_eq!(display_speed_to_mph(value, units), 45.0, max_relative = 1e-5);
    }

    #[test]
    fn toggles_step_from_current_state() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyP);
        keys.press(KeyCode::KeyH);
        keys.press(KeyCode::KeyU);
        keys.press(KeyCode::KeyN);
        let commands = commands_for_keys(&keys, context());
        assert_eq!(
            commands,
            vec![
                DriverCommand::SetPavement(PavementCondition::Normal.next()),
                DriverCommand::SetHeadlights(HeadlightMode::High),
                DriverCommand::SetUnits(UnitSystem::Imperial),
                DriverCommand::SetDaytime(false),
            ]
        );
    }
}
