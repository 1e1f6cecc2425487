//! Day/night toggle with a smoothed lighting transition.
//!
//! Two resting states, Day and Night. Toggling starts a one second animation
//! of ambient intensity, sun intensity and sky color from whatever the live
//! values are at that moment. The animation runs on real (wall-clock) time,
//! independent of the vehicle tick. Re-toggling mid-flight replaces the
//! running animation; there is only ever one.

use std::time::Duration;

use bevy::prelude::*;

use crate::commands::DriverCommand;

pub struct DayNightPlugin;

impl Plugin for DayNightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayNightConfig>();
        if !app.world().contains_resource::<LightingState>() {
            let config = app.world().resource::<DayNightConfig>();
            let lighting = LightingState::settled(config.start_in_daytime, config);
            app.insert_resource(lighting);
        }

        app.init_resource::<DayNightTransition>()
            .add_event::<DayNightToggled>()
            .add_systems(
                Update,
                (
                    handle_day_night_commands,
                    switch_street_lights,
                    advance_transition.run_if(transition_in_flight),
                )
                    .chain()
                    .after(crate::TickSet::Controls),
            )
            .add_systems(
                Update,
                (
                    apply_ambient_light.run_if(resource_exists::<AmbientLight>),
                    apply_sun_light,
                    apply_sky_color.run_if(resource_exists::<ClearColor>),
                )
                    .after(advance_transition)
                    .run_if(resource_changed::<LightingState>),
            );
    }
}

/// One end of the transition: the values a fully settled day or night uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingPreset {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub sky_color: LinearRgba,
}

#[derive(Resource, Clone, Debug)]
pub struct DayNightConfig {
    pub transition_duration: Duration,
    pub day: LightingPreset,
    pub night: LightingPreset,
    /// Ambient brightness per unit of intensity.
    pub ambient_brightness_scale: f32,
    /// Sun illuminance (lux) per unit of intensity.
    pub sun_illuminance_scale: f32,
    /// Whether the session starts in daylight.
    pub start_in_daytime: bool,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            transition_duration: Duration::from_millis(1000),
            day: LightingPreset {
                ambient_intensity: 0.6,
                directional_intensity: 0.8,
                sky_color: Color::srgb_u8(0x87, 0xce, 0xeb).to_linear(),
            },
            night: LightingPreset {
                ambient_intensity: 0.0,
                directional_intensity: 0.0,
                sky_color: Color::srgb_u8(0x00, 0x00, 0x20).to_linear(),
            },
            ambient_brightness_scale: 500.0,
            sun_illuminance_scale: 12_000.0,
            start_in_daytime: true,
        }
    }
}

impl DayNightConfig {
    pub fn preset(&self, daytime: bool) -> LightingPreset {
        if daytime {
            self.day
        } else {
            self.night
        }
    }
}

/// Live lighting values, read by the renderer.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct LightingState {
    /// The state being shown or transitioned to.
    pub is_daytime: bool,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub sky_color: LinearRgba,
}

impl LightingState {
    pub fn settled(daytime: bool, config: &DayNightConfig) -> Self {
        let preset = config.preset(daytime);
        Self {
            is_daytime: daytime,
            ambient_intensity: preset.ambient_intensity,
            directional_intensity: preset.directional_intensity,
            sky_color: preset.sky_color,
        }
    }

    pub fn snapshot(&self) -> LightingPreset {
        LightingPreset {
            ambient_intensity: self.ambient_intensity,
            directional_intensity: self.directional_intensity,
            sky_color: self.sky_color,
        }
    }

    fn show(&mut self, values: LightingPreset) {
        self.ambient_intensity = values.ambient_intensity;
        self.directional_intensity = values.directional_intensity;
        self.sky_color = values.sky_color;
    }
}

/// Ease curve `t² (3 − 2t)`, with `t` clamped to [0, 1].
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

fn lerp_color(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    LinearRgba::new(
        lerp(a.red, b.red, t),
        lerp(a.green, b.green, t),
        lerp(a.blue, b.blue, t),
        lerp(a.alpha, b.alpha, t),
    )
}

impl LightingPreset {
    /// Blend toward `to` by the eased fraction of linear `progress`.
    pub fn eased(&self, to: &LightingPreset, progress: f32) -> LightingPreset {
        let t = smoothstep(progress);
        LightingPreset {
            ambient_intensity: lerp(self.ambient_intensity, to.ambient_intensity, t),
            directional_intensity: lerp(self.directional_intensity, to.directional_intensity, t),
            sky_color: lerp_color(self.sky_color, to.sky_color, t),
        }
    }
}

/// A single in-flight animation.
#[derive(Clone, Debug)]
pub struct Transition {
    pub started_at: Duration,
    pub duration: Duration,
    pub from: LightingPreset,
    pub to: LightingPreset,
}

impl Transition {
    /// Linear progress in [0, 1] at real time `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn sample(&self, now: Duration) -> LightingPreset {
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.to
        } else {
            self.from.eased(&self.to, progress)
        }
    }
}

/// Holds the running animation, if any.
#[derive(Resource, Default, Debug)]
pub struct DayNightTransition {
    pub active: Option<Transition>,
}

impl DayNightTransition {
    /// Start animating toward day or night from the live values.
    ///
    /// Any running animation is dropped. Returns `false` when `daytime` is
    /// already the current target and nothing was started.
    pub fn trigger(
        &mut self,
        lighting: &mut LightingState,
        daytime: bool,
        now: Duration,
        config: &DayNightConfig,
    ) -> bool {
        if lighting.is_daytime == daytime {
            return false;
        }

        lighting.is_daytime = daytime;
        self.active = Some(Transition {
            started_at: now,
            duration: config.transition_duration,
            from: lighting.snapshot(),
            to: config.preset(daytime),
        });
        true
    }

    /// Write the animation's value at `now` into `lighting`. Clears itself once done.
    pub fn advance(&mut self, lighting: &mut LightingState, now: Duration) {
        let Some(transition) = &self.active else {
            return;
        };

        lighting.show(transition.sample(now));
        if transition.progress(now) >= 1.0 {
            self.active = None;
        }
    }

    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }
}

/// Sent when a toggle starts a transition.
#[derive(Event, Clone, Copy, Debug)]
pub struct DayNightToggled {
    pub daytime: bool,
}

/// Marks a street-light fixture whose visibility follows day/night.
#[derive(Component)]
pub struct StreetLight;

/// Marks the directional light driven by [`LightingState::directional_intensity`].
#[derive(Component)]
pub struct Sun;

fn transition_in_flight(transition: Res<DayNightTransition>) -> bool {
    transition.in_flight()
}

fn handle_day_night_commands(
    mut commands: EventReader<DriverCommand>,
    time: Res<Time<Real>>,
    config: Res<DayNightConfig>,
    mut lighting: ResMut<LightingState>,
    mut transition: ResMut<DayNightTransition>,
    mut toggled: EventWriter<DayNightToggled>,
) {
    for command in commands.read() {
        let DriverCommand::SetDaytime(daytime) = *command else {
            continue;
        };

        let restarting = transition.in_flight();
        if transition.trigger(&mut lighting, daytime, time.elapsed(), &config) {
            info!(
                "Switching to {}{}",
                if daytime { "day" } else { "night" },
                if restarting { " (restarted mid-transition)" } else { "" }
            );
            toggled.send(DayNightToggled { daytime });
        }
    }
}

/// Street lights flip the moment a transition starts, not when it finishes.
fn switch_street_lights(
    mut toggled: EventReader<DayNightToggled>,
    mut lights: Query<&mut Visibility, With<StreetLight>>,
) {
    let Some(last) = toggled.read().last() else {
        return;
    };

    let visibility = street_light_visibility(last.daytime);
    for mut light in &mut lights {
        *light = visibility;
    }
}

pub fn street_light_visibility(daytime: bool) -> Visibility {
    if daytime {
        Visibility::Hidden
    } else {
        Visibility::Visible
    }
}

fn advance_transition(
    time: Res<Time<Real>>,
    mut transition: ResMut<DayNightTransition>,
    mut lighting: ResMut<LightingState>,
) {
    transition.advance(&mut lighting, time.elapsed());
}

fn apply_ambient_light(
    lighting: Res<LightingState>,
    config: Res<DayNightConfig>,
    mut ambient: ResMut<AmbientLight>,
) {
    ambient.color = Color::WHITE;
    ambient.brightness = lighting.ambient_intensity * config.ambient_brightness_scale;
}

fn apply_sun_light(
    lighting: Res<LightingState>,
    config: Res<DayNightConfig>,
    mut suns: Query<&mut DirectionalLight, With<Sun>>,
) {
    for mut light in &mut suns {
        light.illuminance = lighting.directional_intensity * config.sun_illuminance_scale;
    }
}

fn apply_sky_color(lighting: Res<LightingState>, mut clear_color: ResMut<ClearColor>) {
    clear_color.0 = Color::LinearRgba(lighting.sky_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn endpoints_are_exact() {
        let config = DayNightConfig::default();
        let mut lighting = LightingState::settled(true, &config);
        let mut transition = DayNightTransition::default();
        assert!(transition.trigger(&mut lighting, false, ms(5_000), &config));

        transition.advance(&mut lighting, ms(5_000));
        assert_eq!(lighting.snapshot(), config.day);

        transition.advance(&mut lighting, ms(6_000));
        assert_eq!(lighting.snapshot(), config.night);
        assert!(!transition.in_flight());
    }

    #[test]
    fn intensities_fall_monotonically_toward_night() {
        let config = DayNightConfig::default();
        let mut lighting = LightingState::settled(true, &config);
        let mut transition = DayNightTransition::default();
        transition.trigger(&mut lighting, false, Duration::ZERO, &config);

        let mut previous = lighting.snapshot();
        for step in 1..=100 {
            transition.advance(&mut lighting, ms(step * 10));
            let current = lighting.snapshot();
            assert!(current.ambient_intensity <= previous.ambient_intensity);
            assert!(current.directional_intensity <= previous.directional_intensity);
            previous = current;
        }
        assert_eq!(previous, config.night);
    }

    #[test]
    fn retrigger_restarts_from_live_values_without_snapping() {
        let config = DayNightConfig::default();
        let mut lighting = LightingState::settled(true, &config);
        let mut transition = DayNightTransition::default();
        transition.trigger(&mut lighting, false, Duration::ZERO, &config);
        transition.advance(&mut lighting, ms(400));
        let live = lighting.snapshot();

        assert!(transition.trigger(&mut lighting, true, ms(400), &config));
        let restarted = transition.active.as_ref().unwrap();
        assert_eq!(restarted.from, live);
        assert_eq!(restarted.started_at, ms(400));

        // One 16 ms frame later the change is bounded by the ease curve's
        // steepest slope (1.5) over the remaining range.
        transition.advance(&mut lighting, ms(416));
        let max_step =
            1.5 * (config.day.ambient_intensity - live.ambient_intensity).abs() * 0.016;
        assert!((lighting.ambient_intensity - live.ambient_intensity).abs() <= max_step + 1e-6);
    }

    #[test]
    fn toggling_to_the_current_state_is_ignored() {
        let config = DayNightConfig::default();
        let mut lighting = LightingState::settled(true, &config);
        let mut transition = DayNightTransition::default();
        assert!(!transition.trigger(&mut lighting, true, Duration::ZERO, &config));
        assert!(!transition.in_flight());
    }

    #[test]
    fn sky_color_blends_linearly_in_eased_time() {
        let config = DayNightConfig::default();
        let halfway = config.day.eased(&config.night, 0.5);
        assert_abs_diff_eq!(
            halfway.sky_color.blue,
            (config.day.sky_color.blue + config.night.sky_color.blue) / 2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn street_lights_are_lit_only_at_night() {
        assert_eq!(street_light_visibility(false), Visibility::Visible);
        assert_eq!(street_light_visibility(true), Visibility::Hidden);
    }
}
