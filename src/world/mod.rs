//! Placeholder scene: road, lane stripes, worker, car body, sun and street lights.

use bevy::prelude::*;

use crate::day_night::{street_light_visibility, LightingState, StreetLight, Sun};
use crate::vehicle::motion::{RoadGeometry, WorkerPosition};
use crate::vehicle::{DemoCar, VehicleState};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>()
            .add_systems(Startup, (spawn_road, spawn_actors, spawn_sun, spawn_street_lights));
    }
}

#[derive(Resource)]
pub struct SceneConfig {
    pub car_size: Vec3,
    /// Worker stands this far from the road centerline.
    pub worker_lateral_offset: f32,
    pub stripe_length: f32,
    pub stripe_gap: f32,
    pub stripe_width: f32,
    /// Distance between street lights along one side of the road.
    pub light_spacing: f32,
    /// Distance from the road edge to each street light.
    pub light_offset: f32,
    pub light_height: f32,
    pub light_range: f32,
    pub light_intensity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            car_size: Vec3::new(4.5, 1.5, 2.0),
            worker_lateral_offset: 2.0,
            stripe_length: 3.0,
            stripe_gap: 6.0,
            stripe_width: 0.15,
            light_spacing: 30.0,
            light_offset: 4.0,
            light_height: 6.8,
            light_range: 30.0,
            light_intensity: 2_000_000.0,
        }
    }
}

/// Both sides of the road, one light per spacing interval, centered in the interval.
pub fn street_light_positions(road: &RoadGeometry, config: &SceneConfig) -> Vec<Vec3> {
    if config.light_spacing <= 0.0 {
        return Vec::new();
    }
    let count = (road.length / config.light_spacing).floor() as usize;
    let lateral = road.width / 2.0 + config.light_offset;

    (0..count)
        .flat_map(|i| {
            let x = road.start_x() + i as f32 * config.light_spacing + config.light_spacing / 2.0;
            [
                Vec3::new(x, config.light_height, -lateral),
                Vec3::new(x, config.light_height, lateral),
            ]
        })
        .collect()
}

/// Centerline stripe centers along the road.
pub fn stripe_centers(road: &RoadGeometry, config: &SceneConfig) -> Vec<f32> {
    let period = config.stripe_length + config.stripe_gap;
    if period <= 0.0 {
        return Vec::new();
    }
    let count = (road.length / period).floor() as usize;
    (0..count)
        .map(|i| road.start_x() + i as f32 * period + config.stripe_length / 2.0)
        .collect()
}

fn spawn_road(
    mut commands: Commands,
    road: Res<RoadGeometry>,
    config: Res<SceneConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let asphalt = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        perceptual_roughness: 0.9,
        ..default()
    });
    let grass = materials.add(StandardMaterial {
        base_color: Color::srgb(0.25, 0.45, 0.2),
        perceptual_roughness: 1.0,
        ..default()
    });
    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.85, 0.1),
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(road.length * 2.0, 200.0))),
        MeshMaterial3d(grass),
        Transform::from_xyz(0.0, -0.01, 0.0),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(road.length, road.width))),
        MeshMaterial3d(asphalt),
        Transform::IDENTITY,
    ));

    let stripe = meshes.add(
        Plane3d::default()
            .mesh()
            .size(config.stripe_length, config.stripe_width),
    );
    for x in stripe_centers(&road, &config) {
        commands.spawn((
            Mesh3d(stripe.clone()),
            MeshMaterial3d(paint.clone()),
            Transform::from_xyz(x, 0.01, 0.0),
        ));
    }
}

fn spawn_actors(
    mut commands: Commands,
    config: Res<SceneConfig>,
    vehicle: Res<VehicleState>,
    worker: Res<WorkerPosition>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let size = config.car_size;
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.7, 0.1, 0.1),
            metallic: 0.6,
            perceptual_roughness: 0.4,
            ..default()
        })),
        Transform::from_translation(vehicle.world_position() + Vec3::Y * size.y / 2.0),
        DemoCar,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(0.3, 1.2))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.5, 0.0),
            emissive: LinearRgba::new(0.4, 0.2, 0.0, 1.0),
            ..default()
        })),
        Transform::from_xyz(worker.x, 0.9, config.worker_lateral_offset),
    ));

    info!(
        "Car placed at x = {:.1}, worker at x = {:.1}",
        vehicle.position_x, worker.x
    );
}

fn spawn_sun(mut commands: Commands, lighting: Res<LightingState>) {
    commands.spawn((
        DirectionalLight {
            illuminance: 0.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(-50.0, 100.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
        Sun,
    ));
    debug!(
        "Sun spawned ({})",
        if lighting.is_daytime { "day" } else { "night" }
    );
}

fn spawn_street_lights(
    mut commands: Commands,
    road: Res<RoadGeometry>,
    config: Res<SceneConfig>,
    lighting: Res<LightingState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pole_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.16, 0.16, 0.16),
        perceptual_roughness: 0.7,
        metallic: 0.5,
        ..default()
    });
    let pole_mesh = meshes.add(Cylinder::new(0.1, config.light_height));

    let positions = street_light_positions(&road, &config);
    let visibility = street_light_visibility(lighting.is_daytime);

    for position in &positions {
        commands.spawn((
            Mesh3d(pole_mesh.clone()),
            MeshMaterial3d(pole_material.clone()),
            Transform::from_xyz(position.x, config.light_height / 2.0, position.z),
        ));

        // Lamp hangs over the road edge and points straight down.
        let lamp = Vec3::new(position.x, position.y, position.z * 0.7);
        commands.spawn((
            SpotLight {
                color: Color::srgb(1.0, 1.0, 0.67),
                intensity: config.light_intensity,
                range: config.light_range,
                outer_angle: std::f32::consts::FRAC_PI_4,
                inner_angle: std::f32::consts::FRAC_PI_4 * 0.8,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(lamp).looking_at(Vec3::new(lamp.x, 0.0, lamp.z), Vec3::X),
            visibility,
            StreetLight,
        ));
    }

    info!("Spawned {} street lights", positions.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_lights_line_both_sides() {
        let road = RoadGeometry::default();
        let config = SceneConfig::default();
        let positions = street_light_positions(&road, &config);
        assert_eq!(positions.len(), 26);
        assert_eq!(positions[0].x, road.start_x() + 15.0);
        assert_eq!(positions[0].z, -8.0);
        assert_eq!(positions[1].z, 8.0);
        assert!(positions.iter().all(|p| p.x < road.end_x()));
    }

    #[test]
    fn stripes_stay_on_the_road() {
        let road = RoadGeometry::default();
        let centers = stripe_centers(&road, &SceneConfig::default());
        assert_eq!(centers.len(), 44);
        assert!(centers.iter().all(|&x| x > road.start_x() && x < road.end_x()));
    }
}
