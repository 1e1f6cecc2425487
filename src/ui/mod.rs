//! Driver HUD and keyboard controls.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::day_night::LightingState;
use crate::units::{format_distance, format_speed, UnitSystem};
use crate::vehicle::motion::WorkerPosition;
use crate::vehicle::{LapCounter, VehicleState};
use crate::TickSet;

pub mod controls;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(Startup, setup_hud)
            .add_systems(Update, controls::handle_driver_keys.in_set(TickSet::Controls))
            .add_systems(
                Update,
                (update_readouts, update_status, update_fps_counter).after(TickSet::Overlay),
            );
    }
}

/// The strings the HUD shows for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct HudReadout {
    pub speed: String,
    pub target: String,
    pub distance: String,
    pub status: String,
}

impl HudReadout {
    pub fn new(
        vehicle: &VehicleState,
        worker: &WorkerPosition,
        units: UnitSystem,
        is_daytime: bool,
        laps: u32,
    ) -> Self {
        let braking = if vehicle.is_braking() { " [BRAKING]" } else { "" };
        Self {
            speed: format!(
                "Speed: {}{}",
                format_speed(vehicle.current_speed_mph(), units),
                braking
            ),
            target: format!("Target: {}", format_speed(vehicle.target_speed_mph(), units)),
            distance: format!(
                "Distance to worker: {}",
                format_distance(vehicle.distance_to(worker), units)
            ),
            status: format!(
                "Road: {} | Lights: {} | {} | {} | Lap {}",
                vehicle.pavement().label(),
                vehicle.headlight_mode.label(),
                units.label(),
                if is_daytime { "Day" } else { "Night" },
                laps + 1
            ),
        }
    }
}

#[derive(Component)]
struct SpeedText;

#[derive(Component)]
struct TargetText;

#[derive(Component)]
struct DistanceText;

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct FpsText;

fn setup_hud(mut commands: Commands) {
    let panel_bg = Color::srgba(0.04, 0.05, 0.06, 0.85);
    let border = Color::srgb(1.0, 0.55, 0.0);
    let readout = Color::srgb(0.95, 0.95, 0.9);
    let muted = Color::srgb(0.7, 0.75, 0.7);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                right: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                row_gap: Val::Px(6.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(panel_bg),
            BorderColor(border),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("WORK ZONE SAFETY"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(border),
            ));

            parent.spawn((
                Text::new("Speed: --"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(readout),
                SpeedText,
            ));

            parent.spawn((
                Text::new("Target: --"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(muted),
                TargetText,
            ));

            parent.spawn((
                Text::new("Distance to worker: --"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(readout),
                DistanceText,
            ));

            parent.spawn((
                Text::new("--"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(muted),
                StatusText,
            ));

            parent.spawn((
                Text::new("FPS: --"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(muted),
                FpsText,
            ));
        });

    commands.spawn((
        Text::new("Space: Brake | 1-4: Speed | P: Road | H: Headlights | U: Units | N: Day/Night"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.85, 0.85, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn update_readouts(
    vehicle: Res<VehicleState>,
    worker: Res<WorkerPosition>,
    units: Res<UnitSystem>,
    lighting: Res<LightingState>,
    laps: Res<LapCounter>,
    mut speed: Query<&mut Text, (With<SpeedText>, Without<TargetText>, Without<DistanceText>)>,
    mut target: Query<&mut Text, (With<TargetText>, Without<SpeedText>, Without<DistanceText>)>,
    mut distance: Query<&mut Text, (With<DistanceText>, Without<SpeedText>, Without<TargetText>)>,
) {
    if !(vehicle.is_changed() || units.is_changed()) {
        return;
    }
    let hud = HudReadout::new(&vehicle, &worker, *units, lighting.is_daytime, laps.0);

    for mut text in &mut speed {
        **text = hud.speed.clone();
    }
    for mut text in &mut target {
        **text = hud.target.clone();
    }
    for mut text in &mut distance {
        **text = hud.distance.clone();
    }
}

fn update_status(
    vehicle: Res<VehicleState>,
    worker: Res<WorkerPosition>,
    units: Res<UnitSystem>,
    lighting: Res<LightingState>,
    laps: Res<LapCounter>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    if !(vehicle.is_changed() || units.is_changed() || lighting.is_changed() || laps.is_changed()) {
        return;
    }
    let hud = HudReadout::new(&vehicle, &worker, *units, lighting.is_daytime, laps.0);
    for mut text in &mut query {
        if **text != hud.status {
            **text = hud.status.clone();
        }
    }
}

fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
    else {
        return;
    };
    for mut text in &mut query {
        **text = format!("FPS: {:.0}", fps);
    }
}
