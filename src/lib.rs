//! Work zone safety demo.
//!
//! A single car drives a straight quarter-mile road toward a road worker.
//! The driver picks a speed, brakes, changes pavement and headlights, and
//! flips between day and night; a top-down strip shows the gap to the worker.
//!
//! [`SimulationCorePlugin`] holds everything that runs without a window and is
//! what the integration tests and the headless runner use. [`WorkZonePlugin`]
//! adds the scene, lights, overlay drawing, weather and HUD on top.

use bevy::prelude::*;

pub mod camera;
pub mod commands;
pub mod day_night;
pub mod headlights;
pub mod overlay;
pub mod settings;
pub mod ui;
pub mod units;
pub mod vehicle;
pub mod weather;
pub mod world;

/// Per-tick ordering. Each set sees the results of the sets before it in the
/// same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Devices turn key presses into driver commands.
    Controls,
    /// Commands are applied and the frame delta is sampled.
    Input,
    Speed,
    Position,
    Camera,
    Overlay,
}

/// Vehicle, lighting state, camera follow and overlay projection.
pub struct SimulationCorePlugin;

impl Plugin for SimulationCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                TickSet::Controls,
                TickSet::Input,
                TickSet::Speed,
                TickSet::Position,
                TickSet::Camera,
                TickSet::Overlay,
            )
                .chain(),
        )
        .add_plugins((
            commands::CommandsPlugin,
            units::UnitsPlugin,
            vehicle::VehiclePlugin,
            day_night::DayNightPlugin,
            camera::CameraFollowPlugin,
            overlay::OverlayPlugin,
        ));
    }
}

/// The full interactive demo.
pub struct WorkZonePlugin;

impl Plugin for WorkZonePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SimulationCorePlugin)
            // Scene
            .add_plugins(world::WorldPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(headlights::HeadlightsPlugin)
            // Overlay strip and weather effects
            .add_plugins(overlay::draw::OverlayDrawPlugin)
            .add_plugins(weather::WeatherPlugin)
            // HUD and keyboard
            .add_plugins(ui::UiPlugin);
    }
}
