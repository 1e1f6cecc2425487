// benches/bench_core_tick.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use bevy::math::Vec2;
use work_zone_sim::camera::CameraFollowConfig;
use work_zone_sim::headlights::HeadlightMode;
use work_zone_sim::overlay::OverlayProjector;
use work_zone_sim::units::UnitSystem;
use work_zone_sim::vehicle::braking::{BrakingCoefficientTable, PavementCondition};
use work_zone_sim::vehicle::driving::{DrivingConfig, SpeedState};
use work_zone_sim::vehicle::motion::{integrate_position, RoadGeometry};

/// One full tick without the ECS: speed, position, camera pose, overlay frame.
fn bench_core_tick(c: &mut Criterion) {
    let config = DrivingConfig::default();
    let table = BrakingCoefficientTable::default();
    let road = RoadGeometry::default();
    let follow = CameraFollowConfig::default();
    let canvas = Vec2::new(768.0, 72.0);

    let mut group = c.benchmark_group("core_tick");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    for (units, headlights) in [
        (UnitSystem::Metric, HeadlightMode::Off),
        (UnitSystem::Imperial, HeadlightMode::High),
    ] {
        let projector = OverlayProjector::new(road.length)
            .units(units)
            .headlights(headlights);

        group.bench_function(format!("{}_{}", units.label(), headlights.label()), |b| {
            let mut speed = SpeedState {
                target_mph: 60.0,
                pavement: PavementCondition::Rain,
                ..SpeedState::default()
            };
            let mut position_x = -195.0_f32;

            b.iter(|| {
                speed = speed.advance(black_box(1.0 / 60.0), &config, &table);
                position_x =
                    integrate_position(position_x, speed.current_mph, 1.0 / 60.0, &road).position_x;
                let pose = follow.pose_for(bevy::math::Vec3::new(position_x, 0.0, 0.0));
                let frame = projector.project(position_x, 0.0, canvas);
                black_box((pose, frame))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_core_tick);
criterion_main!(benches);
