//! Chase camera that rides behind the demo car.
//!
//! The follow step is recomputed every tick after the vehicle has moved, so
//! the camera never lags a frame behind and jumps with the car on wraparound.

use bevy::{
    core_pipeline::{
        bloom::{Bloom, BloomPrefilter},
        tonemapping::Tonemapping,
    },
    prelude::*,
};

use crate::day_night::{DayNightConfig, LightingState};
use crate::vehicle::VehicleState;
use crate::TickSet;

/// Headless part: keeps every [`FollowCamera`] locked to the vehicle.
pub struct CameraFollowPlugin;

impl Plugin for CameraFollowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraFollowConfig>()
            .add_systems(Update, follow_vehicle.in_set(TickSet::Camera));
    }
}

/// Spawns the perspective camera the follow system drives.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BloomConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                update_bloom_intensity.run_if(resource_changed::<LightingState>),
            );
    }
}

/// Offsets relative to the vehicle position.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct CameraFollowConfig {
    /// Eye offset: behind and above the car.
    pub eye_offset: Vec3,
    /// Look-target offset: ahead of the car.
    pub target_offset: Vec3,
}

impl Default for CameraFollowConfig {
    fn default() -> Self {
        Self {
            eye_offset: Vec3::new(-7.0, 1.0, 1.0),
            target_offset: Vec3::new(10.0, 0.0, 1.0),
        }
    }
}

/// Where the camera sits and what it looks at for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraFollowConfig {
    pub fn pose_for(&self, vehicle_position: Vec3) -> CameraPose {
        CameraPose {
            eye: vehicle_position + self.eye_offset,
            target: vehicle_position + self.target_offset,
        }
    }
}

/// Marker for the camera that chases the car.
#[derive(Component)]
pub struct FollowCamera;

/// Configuration for bloom effect.
#[derive(Resource)]
pub struct BloomConfig {
    /// Bloom intensity in daylight.
    pub day_intensity: f32,
    /// Bloom intensity at night, when headlights and street lights glow.
    pub night_intensity: f32,
    /// Bloom threshold (luminance above this glows).
    pub threshold: f32,
    /// How soft the threshold is.
    pub threshold_softness: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            day_intensity: 0.05,
            night_intensity: 0.3,
            threshold: 0.8,
            threshold_softness: 0.3,
        }
    }
}

fn setup_camera(
    mut commands: Commands,
    follow: Res<CameraFollowConfig>,
    vehicle: Res<VehicleState>,
    bloom_config: Res<BloomConfig>,
) {
    let pose = follow.pose_for(vehicle.world_position());

    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true, // Required for bloom
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(pose.eye).looking_at(pose.target, Vec3::Y),
        Bloom {
            intensity: bloom_config.day_intensity,
            prefilter: BloomPrefilter {
                threshold: bloom_config.threshold,
                threshold_softness: bloom_config.threshold_softness,
            },
            ..default()
        },
        Tonemapping::TonyMcMapface,
        // HUD stays full-window; the overlay camera has a small viewport.
        IsDefaultUiCamera,
        Visibility::default(),
        FollowCamera,
    ));
}

fn follow_vehicle(
    config: Res<CameraFollowConfig>,
    vehicle: Res<VehicleState>,
    mut cameras: Query<&mut Transform, With<FollowCamera>>,
) {
    let pose = config.pose_for(vehicle.world_position());
    for mut transform in &mut cameras {
        *transform = Transform::from_translation(pose.eye).looking_at(pose.target, Vec3::Y);
    }
}

/// Bloom follows the lighting: subtle by day, pronounced at night.
fn update_bloom_intensity(
    lighting: Res<LightingState>,
    config: Res<BloomConfig>,
    day_night: Res<DayNightConfig>,
    mut bloom_query: Query<&mut Bloom>,
) {
    // 1.0 in full daylight, 0.0 at night.
    let day_factor = if day_night.day.ambient_intensity > 0.0 {
        (lighting.ambient_intensity / day_night.day.ambient_intensity).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let intensity =
        config.night_intensity + (config.day_intensity - config.night_intensity) * day_factor;

    for mut bloom in &mut bloom_query {
        bloom.intensity = intensity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_rides_behind_and_looks_ahead() {
        let config = CameraFollowConfig::default();
        let pose = config.pose_for(Vec3::new(-50.0, 0.0, 0.0));
        assert_eq!(pose.eye, Vec3::new(-57.0, 1.0, 1.0));
        assert_eq!(pose.target, Vec3::new(-40.0, 0.0, 1.0));
        assert!(pose.eye.x < pose.target.x);
    }

    #[test]
    fn pose_jumps_with_wraparound() {
        let config = CameraFollowConfig::default();
        let before = config.pose_for(Vec3::new(201.0, 0.0, 0.0));
        let after = config.pose_for(Vec3::new(-201.168, 0.0, 0.0));
        assert_eq!(after.eye.x, -201.168 - 7.0);
        assert!(before.eye.x > after.eye.x);
    }
}
