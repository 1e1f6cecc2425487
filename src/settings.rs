//! Command line options and the optional JSON session file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::prelude::*;
use clap::Parser;
use serde::Deserialize;

use crate::day_night::DayNightConfig;
use crate::headlights::HeadlightMode;
use crate::units::UnitSystem;
use crate::vehicle::braking::PavementCondition;
use crate::vehicle::driving::{DrivingConfig, SpeedState};
use crate::vehicle::VehicleState;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "work_zone_sim",
    version,
    about = "Interactive work zone safety demo: stopping distance by speed, pavement and light"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Show speeds and distances in imperial units (overrides the settings file)
    #[clap(long)]
    pub imperial: bool,

    /// Start at night (overrides the settings file)
    #[clap(long)]
    pub night: bool,

    /// Log at debug level
    #[clap(short, long)]
    pub verbose: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Path to a JSON settings file
    #[clap(short, long)]
    pub settings: Option<PathBuf>,

    /// Run without a window for the given number of simulated seconds, then exit
    #[clap(long, value_name = "SECONDS")]
    pub headless: Option<f32>,
}

/// Session start-up values. Every field is optional in the file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimSettings {
    pub start_speed_mph: f32,
    pub start_position_x: f32,
    pub pavement: String,
    pub headlights: String,
    pub units: String,
    pub daytime: bool,
    /// mph per second.
    pub acceleration: f32,
    /// mph per second on dry pavement.
    pub deceleration: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        let driving = DrivingConfig::default();
        let vehicle = VehicleState::default();
        Self {
            start_speed_mph: vehicle.current_speed_mph(),
            start_position_x: vehicle.position_x,
            pavement: vehicle.pavement().name().to_string(),
            headlights: "regular".to_string(),
            units: "metric".to_string(),
            daytime: true,
            acceleration: driving.acceleration,
            deceleration: driving.base_deceleration,
        }
    }
}

/// read_settings decodes the JSON settings file at `filepath`.
pub fn read_settings(filepath: &Path) -> anyhow::Result<SimSettings> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .with_context(|| format!("Failed to open settings file {}!", filepath.display()))?;
    let settings = serde_json::from_reader(&fh)
        .with_context(|| format!("Failed to parse settings file {}!", filepath.display()))?;
    Ok(settings)
}

/// Resources a session starts with.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub vehicle: VehicleState,
    pub driving: DrivingConfig,
    pub units: UnitSystem,
    pub day_night: DayNightConfig,
}

impl SimSettings {
    /// Resolve names and apply command line overrides. Unrecognised names fall
    /// back the same way the driver controls do.
    pub fn resolve(&self, opts: &SimOpts) -> SessionSetup {
        let mut driving = DrivingConfig::default();
        if self.acceleration.is_finite() && self.acceleration > 0.0 {
            driving.acceleration = self.acceleration;
        } else {
            warn!("Ignoring acceleration {} from settings", self.acceleration);
        }
        if self.deceleration.is_finite() && self.deceleration > 0.0 {
            driving.base_deceleration = self.deceleration;
        } else {
            warn!("Ignoring deceleration {} from settings", self.deceleration);
        }

        let start_speed = self
            .start_speed_mph
            .clamp(0.0, driving.max_target_speed);
        let speed = SpeedState {
            current_mph: start_speed,
            target_mph: start_speed,
            is_braking: false,
            pavement: PavementCondition::from_name_or_default(&self.pavement),
        };

        let defaults = VehicleState::default();
        let half_road = crate::vehicle::motion::RoadGeometry::default().half_length();
        let position_x = if self.start_position_x.is_finite() {
            self.start_position_x.clamp(-half_road, half_road)
        } else {
            defaults.position_x
        };

        let vehicle = VehicleState {
            speed,
            position_x,
            headlight_mode: HeadlightMode::from_name_or_off(&self.headlights),
        };

        let units = if opts.imperial {
            UnitSystem::Imperial
        } else {
            UnitSystem::from_name(&self.units).unwrap_or_else(|| {
                warn!("Unknown unit system {:?}, using metric", self.units);
                UnitSystem::Metric
            })
        };

        let day_night = DayNightConfig {
            start_in_daytime: self.daytime && !opts.night,
            ..default()
        };

        SessionSetup {
            vehicle,
            driving,
            units,
            day_night,
        }
    }
}

impl SessionSetup {
    /// Insert before the simulation plugins so their `init_resource` calls
    /// keep these values.
    pub fn insert_into(self, app: &mut App) {
        app.insert_resource(self.vehicle)
            .insert_resource(self.driving)
            .insert_resource(self.units)
            .insert_resource(self.day_night);
    }
}
