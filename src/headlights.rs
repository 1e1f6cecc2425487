//! Headlight beam modes.
//!
//! Three mutually exclusive modes, switched only by the driver. Each mode maps
//! to a light profile for the car's spot lights and to a beam glyph for the
//! overlay. Switching is instantaneous; nothing is interpolated.

use bevy::prelude::*;

use crate::vehicle::{DemoCar, VehicleState};

pub struct HeadlightsPlugin;

impl Plugin for HeadlightsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeadlightConfig>()
            .add_systems(Update, spawn_headlights)
            .add_systems(
                Update,
                sync_headlights
                    .after(crate::TickSet::Input)
                    .run_if(resource_changed::<VehicleState>),
            );
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum HeadlightMode {
    Off,
    #[default]
    Regular,
    High,
}

/// Intensity and reach of each headlight, in demo units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightProfile {
    pub intensity: f32,
    /// Meters.
    pub range: f32,
}

/// Size of the schematic beam triangle on the overlay, in world meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamGlyph {
    pub length: f32,
    pub width: f32,
}

impl HeadlightMode {
    /// Parse a GUI/settings name, falling back to `Off` when unrecognised.
    pub fn from_name_or_off(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" => HeadlightMode::Off,
            "regular" | "low" | "normal" => HeadlightMode::Regular,
            "high" | "highbeam" | "high_beam" => HeadlightMode::High,
            _ => {
                warn!("Unknown headlight mode {:?}, switching beams off", name);
                HeadlightMode::Off
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeadlightMode::Off => "Off",
            HeadlightMode::Regular => "Regular Beam",
            HeadlightMode::High => "High Beam",
        }
    }

    pub fn next(self) -> Self {
        match self {
            HeadlightMode::Off => HeadlightMode::Regular,
            HeadlightMode::Regular => HeadlightMode::High,
            HeadlightMode::High => HeadlightMode::Off,
        }
    }

    pub fn light_profile(self) -> LightProfile {
        match self {
            HeadlightMode::Off => LightProfile {
                intensity: 0.0,
                range: 0.0,
            },
            HeadlightMode::Regular => LightProfile {
                intensity: 3.0,
                range: 10.0,
            },
            HeadlightMode::High => LightProfile {
                intensity: 5.0,
                range: 100.0,
            },
        }
    }

    /// Overlay beam triangle; `None` when the lights are off.
    pub fn beam_glyph(self) -> Option<BeamGlyph> {
        match self {
            HeadlightMode::Off => None,
            HeadlightMode::Regular => Some(BeamGlyph {
                length: 20.0,
                width: 8.0,
            }),
            HeadlightMode::High => Some(BeamGlyph {
                length: 50.0,
                width: 12.0,
            }),
        }
    }
}

/// Placement and scaling of the physical spot lights.
#[derive(Resource)]
pub struct HeadlightConfig {
    /// Lumens per unit of [`LightProfile::intensity`].
    pub lumens_per_unit: f32,
    pub color: Color,
    /// Meters ahead of the car body's center.
    pub forward_offset: f32,
    /// Meters either side of the centerline, one lamp per side.
    pub side_offset: f32,
    /// Lamp height above the road, in meters.
    pub height: f32,
}

impl Default for HeadlightConfig {
    fn default() -> Self {
        Self {
            lumens_per_unit: 200_000.0,
            color: Color::srgb_u8(0xc7, 0xd1, 0xff),
            forward_offset: 2.3,
            side_offset: 0.7,
            height: 1.0,
        }
    }
}

/// Component marking one of the car's two headlights.
#[derive(Component)]
pub struct Headlight {
    pub is_left: bool,
}

fn spawn_headlights(
    mut commands: Commands,
    config: Res<HeadlightConfig>,
    vehicle: Res<VehicleState>,
    cars: Query<Entity, Added<DemoCar>>,
) {
    let profile = vehicle.headlight_mode.light_profile();

    for car in &cars {
        commands.entity(car).with_children(|parent| {
            for (is_left, side_mult) in [(true, -1.0_f32), (false, 1.0_f32)] {
                let position = Vec3::new(
                    config.forward_offset,
                    config.height,
                    config.side_offset * side_mult,
                );
                let aim = position + Vec3::new(20.0, -config.height, 0.0);

                parent.spawn((
                    SpotLight {
                        color: config.color,
                        intensity: profile.intensity * config.lumens_per_unit,
                        range: profile.range,
                        outer_angle: 0.6,
                        inner_angle: 0.3,
                        shadows_enabled: true,
                        ..default()
                    },
                    Transform::from_translation(position).looking_at(aim, Vec3::Y),
                    Headlight { is_left },
                ));
            }
        });

        info!("Spawned headlights ({})", vehicle.headlight_mode.label());
    }
}

/// Push the current mode's profile onto the spot lights.
fn sync_headlights(
    config: Res<HeadlightConfig>,
    vehicle: Res<VehicleState>,
    mut lights: Query<(&mut SpotLight, &mut Visibility), With<Headlight>>,
) {
    let profile = vehicle.headlight_mode.light_profile();
    let intensity = profile.intensity * config.lumens_per_unit;

    for (mut light, mut visibility) in &mut lights {
        if light.intensity != intensity || light.range != profile.range {
            light.intensity = intensity;
            light.range = profile.range;
        }
        let wanted = if vehicle.headlight_mode == HeadlightMode::Off {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_beam_outshines_regular() {
        let regular = HeadlightMode::Regular.light_profile();
        let high = HeadlightMode::High.light_profile();
        assert!(high.intensity > regular.intensity);
        assert!(high.range > regular.range);
    }

    #[test]
    fn off_has_no_light_and_no_glyph() {
        let off = HeadlightMode::Off.light_profile();
        assert_eq!(off.intensity, 0.0);
        assert!(HeadlightMode::Off.beam_glyph().is_none());
    }

    #[test]
    fn high_beam_glyph_is_two_and_a_half_times_regular() {
        let regular = HeadlightMode::Regular.beam_glyph().unwrap();
        let high = HeadlightMode::High.beam_glyph().unwrap();
        assert_eq!(high.length / regular.length, 2.5);
        assert!(high.width > regular.width);
    }

    #[test]
    fn unknown_names_switch_lights_off() {
        assert_eq!(HeadlightMode::from_name_or_off("fog"), HeadlightMode::Off);
        assert_eq!(HeadlightMode::from_name_or_off("HIGH"), HeadlightMode::High);
    }

    #[test]
    fn cycling_returns_to_start() {
        let mode = HeadlightMode::Off;
        assert_eq!(mode.next().next().next(), mode);
    }
}
