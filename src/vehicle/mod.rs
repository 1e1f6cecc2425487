//! The demo vehicle: speed, braking, pavement and position along the road.
//!
//! [`VehicleState`] is owned here. Only the systems in this module mutate it;
//! camera, overlay, headlights and HUD read it.

use bevy::prelude::*;

use crate::commands::{DriverCommand, TickClock};
use crate::headlights::HeadlightMode;
use crate::units::display_speed_to_mph;
use crate::TickSet;

pub mod braking;
pub mod driving;
pub mod motion;

use braking::{BrakingCoefficientTable, PavementCondition};
use driving::{DrivingConfig, SpeedState};
use motion::{integrate_position, RoadGeometry, WorkerPosition};

pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DrivingConfig>()
            .init_resource::<BrakingCoefficientTable>()
            .init_resource::<RoadGeometry>()
            .init_resource::<WorkerPosition>()
            .init_resource::<VehicleState>()
            .init_resource::<LapCounter>()
            .add_systems(Update, apply_driver_commands.in_set(TickSet::Input))
            .add_systems(Update, advance_speed.in_set(TickSet::Speed))
            .add_systems(
                Update,
                (integrate_vehicle_position, sync_vehicle_transform)
                    .chain()
                    .in_set(TickSet::Position),
            );
    }
}

/// Live state of the single demo vehicle.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub speed: SpeedState,
    /// Meters along the road axis, within `[-length/2, length/2]`.
    pub position_x: f32,
    pub headlight_mode: HeadlightMode,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            speed: SpeedState::default(),
            position_x: -195.0,
            headlight_mode: HeadlightMode::Regular,
        }
    }
}

impl VehicleState {
    pub fn current_speed_mph(&self) -> f32 {
        self.speed.current_mph
    }

    pub fn target_speed_mph(&self) -> f32 {
        self.speed.target_mph
    }

    pub fn is_braking(&self) -> bool {
        self.speed.is_braking
    }

    pub fn pavement(&self) -> PavementCondition {
        self.speed.pavement
    }

    /// Straight-line distance to the worker in meters.
    pub fn distance_to(&self, worker: &WorkerPosition) -> f32 {
        (self.position_x - worker.x).abs()
    }

    /// World-space position of the vehicle (road axis is +X, ground at y = 0).
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.position_x, 0.0, 0.0)
    }

    /// Apply one driver command. Returns `true` if the vehicle state changed.
    pub fn apply(&mut self, command: &DriverCommand, config: &DrivingConfig) -> bool {
        match *command {
            DriverCommand::SetTargetSpeed { value, units } => {
                let next = self.speed.with_target(display_speed_to_mph(value, units), config);
                let changed = next != self.speed;
                self.speed = next;
                changed
            }
            DriverCommand::Brake(pressed) => {
                let changed = self.speed.is_braking != pressed;
                self.speed.is_braking = pressed;
                changed
            }
            DriverCommand::SetPavement(pavement) => {
                let changed = self.speed.pavement != pavement;
                self.speed.pavement = pavement;
                changed
            }
            DriverCommand::SetHeadlights(mode) => {
                let changed = self.headlight_mode != mode;
                self.headlight_mode = mode;
                changed
            }
            DriverCommand::SetUnits(_) | DriverCommand::SetDaytime(_) => false,
        }
    }
}

/// Completed laps, bumped on each wraparound.
#[derive(Resource, Default, Debug)]
pub struct LapCounter(pub u32);

/// Marks the entity whose transform mirrors [`VehicleState::position_x`].
#[derive(Component)]
pub struct DemoCar;

fn apply_driver_commands(
    mut commands: EventReader<DriverCommand>,
    config: Res<DrivingConfig>,
    mut vehicle: ResMut<VehicleState>,
) {
    for command in commands.read() {
        let mut next = vehicle.clone();
        if !next.apply(command, &config) {
            continue;
        }
        *vehicle = next;

        match command {
            DriverCommand::Brake(true) => {
                info!("Brake pressed at {:.1} mph", vehicle.current_speed_mph())
            }
            DriverCommand::Brake(false) => {
                info!("Brake released at {:.1} mph", vehicle.current_speed_mph())
            }
            DriverCommand::SetPavement(pavement) => info!("Road condition: {}", pavement.label()),
            DriverCommand::SetHeadlights(mode) => info!("Headlights: {}", mode.label()),
            DriverCommand::SetTargetSpeed { .. } => {
                info!("Target speed: {:.1} mph", vehicle.target_speed_mph())
            }
            DriverCommand::SetUnits(_) | DriverCommand::SetDaytime(_) => {}
        }
    }
}

fn advance_speed(
    clock: Res<TickClock>,
    config: Res<DrivingConfig>,
    table: Res<BrakingCoefficientTable>,
    mut vehicle: ResMut<VehicleState>,
) {
    let next = vehicle.speed.advance(clock.delta_secs, &config, &table);
    if next != vehicle.speed {
        vehicle.speed = next;
    }
}

fn integrate_vehicle_position(
    clock: Res<TickClock>,
    road: Res<RoadGeometry>,
    mut vehicle: ResMut<VehicleState>,
    mut laps: ResMut<LapCounter>,
) {
    let step = integrate_position(
        vehicle.position_x,
        vehicle.current_speed_mph(),
        clock.delta_secs,
        &road,
    );

    if step.wrapped {
        laps.0 += 1;
        debug!("Vehicle wrapped to road start (lap {})", laps.0);
    }
    if step.position_x != vehicle.position_x {
        vehicle.position_x = step.position_x;
    }
}

fn sync_vehicle_transform(
    vehicle: Res<VehicleState>,
    mut cars: Query<&mut Transform, With<DemoCar>>,
) {
    for mut transform in &mut cars {
        transform.translation.x = vehicle.position_x;
    }
}
