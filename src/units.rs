//! Metric/imperial conversions and display formatting.
//!
//! The simulation stores speed in miles per hour and distance in meters.
//! The unit system only changes how values are shown, never the underlying
//! world coordinates.

use bevy::prelude::*;

use crate::commands::DriverCommand;

pub struct UnitsPlugin;

impl Plugin for UnitsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UnitSystem>()
            .add_systems(Update, apply_unit_commands.in_set(crate::TickSet::Input));
    }
}

fn apply_unit_commands(mut commands: EventReader<DriverCommand>, mut units: ResMut<UnitSystem>) {
    for command in commands.read() {
        if let DriverCommand::SetUnits(next) = *command {
            if *units != next {
                *units = next;
                info!("Units: {}", next.label());
            }
        }
    }
}

pub const FEET_PER_METER: f32 = 3.28084;
pub const KMH_PER_MPH: f32 = 1.60934;
pub const KMH_PER_MPS: f32 = 3.6;

/// Which unit system readouts and overlay markers use.
#[derive(Resource, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Parse a settings-file name; `None` for anything unrecognised.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "metric" | "si" => Some(UnitSystem::Metric),
            "imperial" | "us" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "Metric",
            UnitSystem::Imperial => "Imperial",
        }
    }
}

pub fn meters_to_feet(meters: f32) -> f32 {
    meters * FEET_PER_METER
}

pub fn feet_to_meters(feet: f32) -> f32 {
    feet / FEET_PER_METER
}

pub fn mph_to_kmh(mph: f32) -> f32 {
    mph * KMH_PER_MPH
}

pub fn kmh_to_mph(kmh: f32) -> f32 {
    kmh / KMH_PER_MPH
}

/// Miles per hour to meters per second (mph -> km/h -> m/s).
pub fn mph_to_mps(mph: f32) -> f32 {
    mph_to_kmh(mph) / KMH_PER_MPS
}

/// Convert a speed entered in the display unit into mph.
pub fn display_speed_to_mph(value: f32, units: UnitSystem) -> f32 {
    match units {
        UnitSystem::Metric => kmh_to_mph(value),
        UnitSystem::Imperial => value,
    }
}

/// HUD speed readout, e.g. `"16.1 km/h"` or `"10.0 mph"`.
pub fn format_speed(speed_mph: f32, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{:.1} km/h", mph_to_kmh(speed_mph)),
        UnitSystem::Imperial => format!("{:.1} mph", speed_mph),
    }
}

/// HUD distance readout, e.g. `"100.0 meters"` or `"328.1 feet"`.
pub fn format_distance(meters: f32, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{:.1} meters", meters),
        UnitSystem::Imperial => format!("{:.1} feet", meters_to_feet(meters)),
    }
}

/// Compact whole-unit distance used on the overlay, e.g. `"100m"` or `"328ft"`.
pub fn format_overlay_distance(meters: f32, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{:.0}m", meters),
        UnitSystem::Imperial => format!("{:.0}ft", meters_to_feet(meters)),
    }
}

/// A selectable cruising speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedPreset {
    pub name: &'static str,
    pub mph: f32,
}

pub const SPEED_PRESETS: [SpeedPreset; 4] = [
    SpeedPreset { name: "Slow", mph: 10.0 },
    SpeedPreset { name: "Normal", mph: 25.0 },
    SpeedPreset { name: "Fast", mph: 45.0 },
    SpeedPreset { name: "Very Fast", mph: 60.0 },
];

impl SpeedPreset {
    /// Label in the active unit system, e.g. `"Normal (40 km/h)"`.
    pub fn label(&self, units: UnitSystem) -> String {
        match units {
            UnitSystem::Metric => format!("{} ({:.0} km/h)", self.name, mph_to_kmh(self.mph)),
            UnitSystem::Imperial => format!("{} ({:.0} mph)", self.name, self.mph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn feet_meters_round_trip() {
        for x in [0.0_f32, 1.0, 50.0, 150.0, 402.336, 1320.0] {
            assert_relative_eq!(meters_to_feet(feet_to_meters(x)), x, max_relative = 1e-5);
            assert_relative_eq!(feet_to_meters(meters_to_feet(x)), x, max_relative = 1e-5);
        }
    }

    #[test]
    fn ten_mph_is_about_four_and_a_half_meters_per_second() {
        assert_relative_eq!(mph_to_mps(10.0), 4.4704, max_relative = 1e-4);
    }

    #[test]
    fn overlay_distance_switches_units_without_touching_meters() {
        assert_eq!(format_overlay_distance(100.0, UnitSystem::Metric), "100m");
        assert_eq!(format_overlay_distance(100.0, UnitSystem::Imperial), "328ft");
    }

    #[test]
    fn hud_readouts_match_unit_system() {
        assert_eq!(format_speed(10.0, UnitSystem::Metric), "16.1 km/h");
        assert_eq!(format_speed(10.0, UnitSystem::Imperial), "10.0 mph");
        assert_eq!(format_distance(100.0, UnitSystem::Metric), "100.0 meters");
        assert_eq!(format_distance(100.0, UnitSystem::Imperial), "328.1 feet");
    }

    #[test]
    fn metric_speed_input_is_converted_to_mph() {
        assert_relative_eq!(
            display_speed_to_mph(40.2335, UnitSystem::Metric),
            25.0,
            max_relative = 1e-4
        );
        assert_eq!(display_speed_to_mph(25.0, UnitSystem::Imperial), 25.0);
    }

    #[test]
    fn preset_labels_follow_units() {
        assert_eq!(SPEED_PRESETS[1].label(UnitSystem::Metric), "Normal (40 km/h)");
        assert_eq!(SPEED_PRESETS[3].label(UnitSystem::Imperial), "Very Fast (60 mph)");
    }
}
