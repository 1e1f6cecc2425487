//! Precipitation and windscreen wipers, both following the pavement condition.
//!
//! Purely cosmetic: nothing here feeds back into braking.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::camera::FollowCamera;
use crate::commands::TickClock;
use crate::vehicle::braking::PavementCondition;
use crate::vehicle::VehicleState;
use crate::TickSet;

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeatherConfig>()
            .init_resource::<Wipers>()
            .add_systems(Startup, init_precipitation)
            .add_systems(Update, spawn_wipers)
            .add_systems(
                Update,
                (
                    follow_pavement.run_if(resource_changed::<VehicleState>),
                    (animate_precipitation, sweep_wipers),
                    (draw_precipitation, pose_wipers),
                )
                    .chain()
                    .after(TickSet::Camera),
            );
    }
}

/// Wiper and precipitation speeds are quoted per 60 Hz frame.
const REFERENCE_FPS: f32 = 60.0;

#[derive(Resource, Clone, Debug)]
pub struct WeatherConfig {
    pub seed: u64,
    /// Particles live in a box this far either side of the car along the road.
    pub half_extent_x: f32,
    pub half_extent_z: f32,
    pub ceiling: f32,
    /// Largest wiper swing in radians.
    pub wiper_sweep: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            half_extent_x: 60.0,
            half_extent_z: 30.0,
            ceiling: 40.0,
            wiper_sweep: 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecipitationKind {
    Rain,
    Snow,
}

/// What falls from the sky for a pavement condition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrecipitationProfile {
    pub kind: PrecipitationKind,
    pub count: usize,
    /// Meters per second.
    pub fall_speed: f32,
    pub color: Color,
}

impl PrecipitationProfile {
    /// `None` for dry and icy roads.
    pub fn for_pavement(pavement: PavementCondition) -> Option<Self> {
        let rain = Color::srgba(0.67, 0.67, 0.67, 0.6);
        match pavement {
            PavementCondition::Normal | PavementCondition::Ice => None,
            PavementCondition::Drizzle => Some(Self {
                kind: PrecipitationKind::Rain,
                count: 600,
                fall_speed: 0.2 * REFERENCE_FPS,
                color: rain,
            }),
            PavementCondition::Rain => Some(Self {
                kind: PrecipitationKind::Rain,
                count: 1500,
                fall_speed: 0.4 * REFERENCE_FPS,
                color: rain,
            }),
            PavementCondition::Snow => Some(Self {
                kind: PrecipitationKind::Snow,
                count: 1000,
                fall_speed: 0.02 * REFERENCE_FPS,
                color: Color::srgba(1.0, 1.0, 1.0, 0.8),
            }),
        }
    }
}

/// Live particles. Positions are relative to the car.
#[derive(Resource)]
pub struct Precipitation {
    rng: StdRng,
    profile: Option<PrecipitationProfile>,
    drops: Vec<Vec3>,
}

impl Precipitation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            profile: None,
            drops: Vec::new(),
        }
    }

    pub fn profile(&self) -> Option<PrecipitationProfile> {
        self.profile
    }

    pub fn drops(&self) -> &[Vec3] {
        &self.drops
    }

    /// Swap to the profile for `pavement`, reseeding the particle box.
    pub fn set_pavement(&mut self, pavement: PavementCondition, config: &WeatherConfig) {
        let profile = PrecipitationProfile::for_pavement(pavement);
        if profile == self.profile {
            return;
        }
        self.profile = profile;
        self.drops.clear();

        let Some(profile) = profile else {
            return;
        };
        for _ in 0..profile.count {
            let drop = Vec3::new(
                self.rng.gen_range(-config.half_extent_x..config.half_extent_x),
                self.rng.gen_range(0.0..config.ceiling),
                self.rng.gen_range(-config.half_extent_z..config.half_extent_z),
            );
            self.drops.push(drop);
        }
    }

    /// Let everything fall; drops that reach the ground respawn at the ceiling
    /// somewhere new.
    pub fn fall(&mut self, dt: f32, config: &WeatherConfig) {
        let Some(profile) = self.profile else {
            return;
        };
        for drop in &mut self.drops {
            drop.y -= profile.fall_speed * dt;
            if drop.y < 0.0 {
                drop.y += config.ceiling;
                drop.x = self.rng.gen_range(-config.half_extent_x..config.half_extent_x);
                drop.z = self.rng.gen_range(-config.half_extent_z..config.half_extent_z);
            }
        }
    }
}

/// Back-and-forth wiper sweep.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Wipers {
    pub active: bool,
    /// Radians per 60 Hz frame.
    pub speed: f32,
    pub angle: f32,
    pub direction: f32,
}

impl Default for Wipers {
    fn default() -> Self {
        Self {
            active: false,
            speed: 0.0,
            angle: 0.0,
            direction: 1.0,
        }
    }
}

impl Wipers {
    pub fn set_pavement(&mut self, pavement: PavementCondition) {
        let speed = match pavement {
            PavementCondition::Rain => Some(0.08),
            PavementCondition::Drizzle | PavementCondition::Snow => Some(0.05),
            PavementCondition::Normal | PavementCondition::Ice => None,
        };
        match speed {
            Some(speed) => {
                self.active = true;
                self.speed = speed;
            }
            None => *self = Self::default(),
        }
    }

    pub fn advance(&mut self, dt: f32, sweep: f32) {
        if !self.active {
            self.angle = 0.0;
            return;
        }
        self.angle += self.speed * REFERENCE_FPS * dt * self.direction;
        if self.angle > sweep {
            self.direction = -1.0;
        } else if self.angle < 0.0 {
            self.direction = 1.0;
        }
    }
}

#[derive(Component)]
pub struct Wiper {
    pub is_left: bool,
}

fn init_precipitation(
    mut commands: Commands,
    config: Res<WeatherConfig>,
    vehicle: Res<VehicleState>,
    mut wipers: ResMut<Wipers>,
) {
    let mut precipitation = Precipitation::new(config.seed);
    precipitation.set_pavement(vehicle.pavement(), &config);
    wipers.set_pavement(vehicle.pavement());
    commands.insert_resource(precipitation);
}

fn follow_pavement(
    config: Res<WeatherConfig>,
    vehicle: Res<VehicleState>,
    mut precipitation: ResMut<Precipitation>,
    mut wipers: ResMut<Wipers>,
) {
    let pavement = vehicle.pavement();
    if precipitation.profile() != PrecipitationProfile::for_pavement(pavement) {
        precipitation.set_pavement(pavement, &config);
        wipers.set_pavement(pavement);
        debug!("Weather now follows {} pavement", pavement.name());
    }
}

fn animate_precipitation(
    clock: Res<TickClock>,
    config: Res<WeatherConfig>,
    mut precipitation: ResMut<Precipitation>,
) {
    precipitation.fall(clock.delta_secs, &config);
}

fn sweep_wipers(clock: Res<TickClock>, config: Res<WeatherConfig>, mut wipers: ResMut<Wipers>) {
    wipers.advance(clock.delta_secs, config.wiper_sweep);
}

fn draw_precipitation(
    precipitation: Res<Precipitation>,
    vehicle: Res<VehicleState>,
    mut gizmos: Gizmos,
) {
    let Some(profile) = precipitation.profile() else {
        return;
    };
    let origin = vehicle.world_position();

    for drop in precipitation.drops() {
        let at = origin + *drop;
        match profile.kind {
            PrecipitationKind::Rain => {
                gizmos.line(at, at - Vec3::Y * 0.4, profile.color);
            }
            PrecipitationKind::Snow => {
                gizmos.line(at - Vec3::X * 0.05, at + Vec3::X * 0.05, profile.color);
                gizmos.line(at - Vec3::Z * 0.05, at + Vec3::Z * 0.05, profile.color);
            }
        }
    }
}

/// Wipers hang off the follow camera so they stay in view.
fn spawn_wipers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cameras: Query<Entity, Added<FollowCamera>>,
) {
    for camera in &cameras {
        let mesh = meshes.add(Cuboid::new(0.8, 0.05, 0.05));
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.1, 0.1, 0.1),
            ..default()
        });

        commands.entity(camera).with_children(|parent| {
            for (is_left, side) in [(true, -1.0_f32), (false, 1.0_f32)] {
                parent
                    .spawn((
                        Transform::from_xyz(0.7 * side, -0.6, -2.0),
                        Visibility::Hidden,
                        Wiper { is_left },
                    ))
                    .with_children(|pivot| {
                        // Blade extends inward from its pivot.
                        pivot.spawn((
                            Mesh3d(mesh.clone()),
                            MeshMaterial3d(material.clone()),
                            Transform::from_xyz(-0.4 * side, 0.0, 0.0),
                        ));
                    });
            }
        });
    }
}

fn pose_wipers(wipers: Res<Wipers>, mut blades: Query<(&Wiper, &mut Transform, &mut Visibility)>) {
    for (wiper, mut transform, mut visibility) in &mut blades {
        let angle = if wiper.is_left { wipers.angle } else { -wipers.angle };
        transform.rotation = Quat::from_rotation_z(angle);

        let wanted = if wipers.active {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}
