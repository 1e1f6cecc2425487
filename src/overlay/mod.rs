//! Top-down distance strip.
//!
//! [`OverlayPlugin`] recomputes the [`CurrentOverlay`] frame at the end of
//! every tick from the freshly integrated vehicle position. Drawing lives in
//! [`draw`] and only runs with a window.

use bevy::prelude::*;

use crate::units::UnitSystem;
use crate::vehicle::motion::{RoadGeometry, WorkerPosition};
use crate::vehicle::VehicleState;
use crate::TickSet;

pub mod draw;
pub mod projector;

pub use projector::{OverlayFrame, OverlayProjector};

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayStyle>()
            .init_resource::<OverlayCanvas>()
            .init_resource::<CurrentOverlay>()
            .add_systems(Update, project_overlay.in_set(TickSet::Overlay));
    }
}

/// Geometry and colors of the strip.
#[derive(Resource, Clone, Debug)]
pub struct OverlayStyle {
    /// Fraction of the canvas width left empty on each side of the road.
    pub margin: f32,
    /// Fraction of the canvas width the full road spans.
    pub span: f32,
    /// The strip never grows wider than this, in logical pixels.
    pub max_width: f32,
    /// Strip height as a fraction of the window height.
    pub height_fraction: f32,
    /// Dash and gap of the car-to-worker connector.
    pub dash: (f32, f32),
    pub marker_radius: f32,
    pub font_size: f32,
    pub background: Color,
    pub car_color: Color,
    pub worker_color: Color,
    pub tick_color: Color,
    pub text_color: Color,
    pub beam_color: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            margin: 0.1,
            span: 0.8,
            max_width: 768.0,
            height_fraction: 0.1,
            dash: (5.0, 5.0),
            marker_radius: 4.0,
            font_size: 11.0,
            background: Color::srgb_u8(0x1a, 0x1a, 0x1a),
            car_color: Color::srgb_u8(0x00, 0xff, 0x00),
            worker_color: Color::srgb_u8(0xff, 0x88, 0x00),
            tick_color: Color::srgb_u8(0x44, 0x44, 0x44),
            text_color: Color::WHITE,
            beam_color: Color::srgba(1.0, 1.0, 0.6, 0.8),
        }
    }
}

/// Displayed size of the strip. The draw layer keeps this in step with the
/// window before each redraw.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct OverlayCanvas {
    /// Logical pixels.
    pub logical_size: Vec2,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl Default for OverlayCanvas {
    fn default() -> Self {
        Self {
            logical_size: Vec2::new(768.0, 72.0),
            scale_factor: 1.0,
        }
    }
}

impl OverlayCanvas {
    /// The strip for a window of `window_size` logical pixels: as wide as the
    /// window up to the style's cap, and a fixed fraction of its height.
    pub fn for_window(window_size: Vec2, scale_factor: f32, style: &OverlayStyle) -> Self {
        Self {
            logical_size: Vec2::new(
                window_size.x.min(style.max_width),
                window_size.y * style.height_fraction,
            ),
            scale_factor,
        }
    }

    pub fn physical_size(&self) -> UVec2 {
        (self.logical_size * self.scale_factor).max(Vec2::ZERO).round().as_uvec2()
    }
}

/// The frame projected this tick; `None` while the canvas has no area.
#[derive(Resource, Default, Debug)]
pub struct CurrentOverlay(pub Option<OverlayFrame>);

/// Build the projector for the current display settings.
pub fn projector_for(
    style: &OverlayStyle,
    road: &RoadGeometry,
    units: UnitSystem,
    vehicle: &VehicleState,
) -> OverlayProjector {
    OverlayProjector::new(road.length)
        .units(units)
        .headlights(vehicle.headlight_mode)
        .margins(style.margin, style.span)
        .dash(style.dash.0, style.dash.1)
}

fn project_overlay(
    style: Res<OverlayStyle>,
    canvas: Res<OverlayCanvas>,
    road: Res<RoadGeometry>,
    worker: Res<WorkerPosition>,
    units: Res<UnitSystem>,
    vehicle: Res<VehicleState>,
    mut current: ResMut<CurrentOverlay>,
    mut was_skipped: Local<bool>,
) {
    let frame = projector_for(&style, &road, *units, &vehicle).project(
        vehicle.position_x,
        worker.x,
        canvas.logical_size,
    );

    match (&frame, *was_skipped) {
        (None, false) => {
            warn!(
                "Overlay canvas is {:?}, skipping overlay frames",
                canvas.logical_size
            );
            *was_skipped = true;
        }
        (Some(_), true) => {
            info!("Overlay canvas restored");
            *was_skipped = false;
        }
        _ => {}
    }

    current.0 = frame;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_accounts_for_pixel_ratio() {
        let canvas = OverlayCanvas {
            logical_size: Vec2::new(768.0, 72.0),
            scale_factor: 2.0,
        };
        assert_eq!(canvas.physical_size(), UVec2::new(1536, 144));
    }

    #[test]
    fn projector_carries_display_settings() {
        let mut vehicle = VehicleState::default();
        vehicle.headlight_mode = crate::headlights::HeadlightMode::High;
        let projector = projector_for(
            &OverlayStyle::default(),
            &RoadGeometry::default(),
            UnitSystem::Imperial,
            &vehicle,
        );
        let frame = projector
            .project(vehicle.position_x, 0.0, OverlayCanvas::default().logical_size)
            .unwrap();
        assert!(frame.beam.is_some());
        assert!(frame.distance_text.ends_with("ft"));
    }
}
