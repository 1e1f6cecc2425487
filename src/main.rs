//! Work Zone Safety Demo
//!
//! A car approaches a road worker on a straight quarter-mile road. Change the
//! speed, road condition, headlights and time of day and watch how much room
//! the driver needs to stop.

use std::time::Duration;

use anyhow::Context;
use bevy::{
    app::{AppExit, ScheduleRunnerPlugin},
    log::{Level, LogPlugin},
    prelude::*,
    time::TimeUpdateStrategy,
};
use clap::Parser;

use work_zone_sim::settings::{read_settings, SimOpts, SimSettings};
use work_zone_sim::units::{format_distance, format_speed, UnitSystem};
use work_zone_sim::vehicle::motion::WorkerPosition;
use work_zone_sim::vehicle::{LapCounter, VehicleState};
use work_zone_sim::{SimulationCorePlugin, TickSet, WorkZonePlugin};

const HEADLESS_STEP: Duration = Duration::from_nanos(16_666_667);

fn main() -> anyhow::Result<()> {
    let opts = SimOpts::parse();

    let settings = match &opts.settings {
        Some(path) => read_settings(path)
            .with_context(|| format!("Could not load session settings from {}", path.display()))?,
        None => SimSettings::default(),
    };

    let log = LogPlugin {
        level: if opts.verbose { Level::DEBUG } else { Level::INFO },
        ..default()
    };

    let mut app = App::new();

    match opts.headless {
        Some(seconds) => {
            anyhow::ensure!(
                seconds.is_finite() && seconds > 0.0,
                "--headless needs a positive number of seconds, got {seconds}"
            );
            app.add_plugins((
                MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
                log,
            ))
            .insert_resource(TimeUpdateStrategy::ManualDuration(HEADLESS_STEP))
            .insert_resource(HeadlessRun {
                duration_secs: seconds,
                elapsed_secs: 0.0,
                next_report_secs: 1.0,
            });
            settings.resolve(&opts).insert_into(&mut app);
            app.add_plugins(SimulationCorePlugin)
                .add_systems(Update, report_headless_run.after(TickSet::Overlay));
        }
        None => {
            // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
            #[cfg(target_os = "windows")]
            std::env::set_var("WGPU_BACKEND", "vulkan");

            app.add_plugins(
                DefaultPlugins
                    .set(WindowPlugin {
                        primary_window: Some(Window {
                            title: "Work Zone Safety Demo".into(),
                            resolution: (1280., 720.).into(),
                            ..default()
                        }),
                        ..default()
                    })
                    .set(log),
            );
            settings.resolve(&opts).insert_into(&mut app);
            app.add_plugins(WorkZonePlugin);
        }
    }

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("Demo exited with code {code}"),
    }
}

/// Progress of a windowless run.
#[derive(Resource)]
struct HeadlessRun {
    duration_secs: f32,
    elapsed_secs: f32,
    next_report_secs: f32,
}

fn report_headless_run(
    time: Res<Time>,
    mut run: ResMut<HeadlessRun>,
    vehicle: Res<VehicleState>,
    worker: Res<WorkerPosition>,
    units: Res<UnitSystem>,
    laps: Res<LapCounter>,
    mut exit: EventWriter<AppExit>,
) {
    run.elapsed_secs += time.delta_secs();

    if run.elapsed_secs >= run.next_report_secs {
        info!(
            "t={:>5.1}s  x={:>8.2}  speed {}  distance {}  laps {}",
            run.elapsed_secs,
            vehicle.position_x,
            format_speed(vehicle.current_speed_mph(), *units),
            format_distance(vehicle.distance_to(&worker), *units),
            laps.0
        );
        run.next_report_secs += 1.0;
    }

    if run.elapsed_secs >= run.duration_secs {
        info!("Headless run finished after {:.1}s", run.elapsed_secs);
        exit.send(AppExit::Success);
    }
}
