//! Speed and braking state machine.
//!
//! Each tick speed either climbs toward the target at a fixed acceleration or,
//! while the brake is held, falls toward zero at the base deceleration scaled
//! by the pavement's braking coefficient. Braking always wins.

use bevy::prelude::*;

use super::braking::{BrakingCoefficientTable, PavementCondition};

/// Tunables for the speed integrator. Units are mph and mph/s.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct DrivingConfig {
    /// Acceleration toward the target speed (mph/s).
    pub acceleration: f32,
    /// Deceleration with the brake held on dry pavement (mph/s).
    pub base_deceleration: f32,
    /// Upper bound for any requested target speed (mph).
    pub max_target_speed: f32,
}

impl Default for DrivingConfig {
    fn default() -> Self {
        Self {
            acceleration: 5.0,
            base_deceleration: 15.0,
            max_target_speed: 60.0,
        }
    }
}

impl DrivingConfig {
    /// Deceleration rate on the given pavement.
    pub fn braking_rate(
        &self,
        pavement: PavementCondition,
        table: &BrakingCoefficientTable,
    ) -> f32 {
        self.base_deceleration * table.coefficient(pavement)
    }
}

/// The speed half of the vehicle state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedState {
    /// Current speed (mph), never negative.
    pub current_mph: f32,
    /// Speed the driver asked for (mph).
    pub target_mph: f32,
    pub is_braking: bool,
    pub pavement: PavementCondition,
}

impl Default for SpeedState {
    fn default() -> Self {
        Self {
            current_mph: 10.0,
            target_mph: 10.0,
            is_braking: false,
            pavement: PavementCondition::Normal,
        }
    }
}

impl SpeedState {
    /// Advance one tick of `dt` seconds.
    pub fn advance(
        self,
        dt: f32,
        config: &DrivingConfig,
        table: &BrakingCoefficientTable,
    ) -> Self {
        let dt = dt.max(0.0);
        let current_mph = if self.is_braking {
            (self.current_mph - config.braking_rate(self.pavement, table) * dt).max(0.0)
        } else {
            (self.current_mph + config.acceleration * dt)
                .min(self.target_mph)
                .max(0.0)
        };

        Self {
            current_mph,
            ..self
        }
    }

    /// Request a new target speed (mph). Does not touch current speed; while
    /// braking it has no effect until the brake is released.
    pub fn with_target(self, target_mph: f32, config: &DrivingConfig) -> Self {
        let target_mph = if target_mph.is_finite() {
            target_mph.clamp(0.0, config.max_target_speed)
        } else {
            self.target_mph
        };
        Self { target_mph, ..self }
    }
}
