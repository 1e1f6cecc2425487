//! Renders the projected [`OverlayFrame`] into a strip along the bottom of
//! the window: a second camera with its own viewport and render layer,
//! gizmo lines for geometry and a fixed pool of text labels.

use bevy::{
    math::Isometry2d,
    prelude::*,
    render::{camera::Viewport, view::RenderLayers},
    sprite::Anchor,
    window::PrimaryWindow,
};

use super::{CurrentOverlay, OverlayCanvas, OverlayFrame, OverlayStyle};
use crate::TickSet;

/// Render layer shared by the overlay camera, its gizmos and its labels.
pub const OVERLAY_LAYER: usize = 1;

/// Enough label slots for the densest marker scale.
const TICK_LABEL_SLOTS: usize = 12;

pub struct OverlayDrawPlugin;

impl Plugin for OverlayDrawPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<OverlayGizmos>()
            .add_systems(Startup, (setup_overlay_camera, spawn_overlay_labels))
            .add_systems(Update, resize_overlay_canvas.before(TickSet::Overlay))
            .add_systems(
                Update,
                (draw_overlay, update_overlay_labels).after(TickSet::Overlay),
            );
    }
}

/// Gizmos that only the overlay camera sees.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct OverlayGizmos;

#[derive(Component)]
pub struct OverlayCamera;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
enum OverlayLabel {
    CarLegend,
    WorkerLegend,
    Distance,
    Tick(usize),
}

/// Canvas space (top-left origin, y down) to the overlay camera's 2D world
/// (centered, y up).
fn to_world(frame: &OverlayFrame, x: f32, y: f32) -> Vec2 {
    Vec2::new(x - frame.canvas.x / 2.0, frame.canvas.y / 2.0 - y)
}

fn setup_overlay_camera(
    mut commands: Commands,
    style: Res<OverlayStyle>,
    mut gizmo_store: ResMut<GizmoConfigStore>,
) {
    commands.spawn((
        Camera2d,
        Camera {
            // Drawn after the 3D view, inside its own viewport.
            order: 1,
            clear_color: ClearColorConfig::Custom(style.background),
            is_active: false,
            ..default()
        },
        RenderLayers::layer(OVERLAY_LAYER),
        OverlayCamera,
    ));

    let (config, _) = gizmo_store.config_mut::<OverlayGizmos>();
    config.render_layers = RenderLayers::layer(OVERLAY_LAYER);
    config.line_width = 1.5;
}

fn spawn_overlay_labels(mut commands: Commands, style: Res<OverlayStyle>) {
    let font = TextFont {
        font_size: style.font_size,
        ..default()
    };

    let legend = [
        (OverlayLabel::CarLegend, "Car", style.car_color),
        (OverlayLabel::WorkerLegend, "Worker", style.worker_color),
        (OverlayLabel::Distance, "", style.text_color),
    ];
    for (label, text, color) in legend {
        commands.spawn((
            Text2d::new(text),
            font.clone(),
            TextColor(color),
            Anchor::CenterLeft,
            Transform::default(),
            Visibility::Hidden,
            RenderLayers::layer(OVERLAY_LAYER),
            label,
        ));
    }

    for slot in 0..TICK_LABEL_SLOTS {
        commands.spawn((
            Text2d::new(""),
            font.clone(),
            TextColor(style.text_color),
            Anchor::Center,
            Transform::default(),
            Visibility::Hidden,
            RenderLayers::layer(OVERLAY_LAYER),
            OverlayLabel::Tick(slot),
        ));
    }
}

/// Size the strip to `min(window width, max width)` by a fixed fraction of
/// the window height, centered along the bottom edge.
fn resize_overlay_canvas(
    style: Res<OverlayStyle>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut canvas: ResMut<OverlayCanvas>,
    mut cameras: Query<&mut Camera, With<OverlayCamera>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    let next = OverlayCanvas::for_window(
        Vec2::new(window.width(), window.height()),
        window.scale_factor(),
        &style,
    );
    if *canvas != next {
        debug!(
            "Overlay canvas resized to {:?} @ {}x",
            next.logical_size, next.scale_factor
        );
        *canvas = next;
    }

    let placement = overlay_viewport(
        canvas.physical_size(),
        UVec2::new(window.physical_width(), window.physical_height()),
    );

    for mut camera in &mut cameras {
        let visible = placement.is_some();
        if camera.is_active != visible {
            camera.is_active = visible;
        }
        let Some((position, size)) = placement else {
            continue;
        };
        let unchanged = camera
            .viewport
            .as_ref()
            .is_some_and(|v| v.physical_position == position && v.physical_size == size);
        if !unchanged {
            camera.viewport = Some(Viewport {
                physical_position: position,
                physical_size: size,
                ..default()
            });
        }
    }
}

/// Physical position and size of the strip, centered on the bottom edge of
/// the window. `None` when the strip has no area.
fn overlay_viewport(canvas: UVec2, window: UVec2) -> Option<(UVec2, UVec2)> {
    if canvas.x == 0 || canvas.y == 0 {
        return None;
    }
    let position = UVec2::new(
        window.x.saturating_sub(canvas.x) / 2,
        window.y.saturating_sub(canvas.y),
    );
    Some((position, canvas.min(window.max(UVec2::ONE))))
}

fn draw_overlay(
    current: Res<CurrentOverlay>,
    style: Res<OverlayStyle>,
    mut gizmos: Gizmos<OverlayGizmos>,
) {
    let Some(frame) = current.0.as_ref() else {
        return;
    };

    for tick in &frame.ticks {
        gizmos.line_2d(
            to_world(frame, tick.x, frame.tick_top_y),
            to_world(frame, tick.x, frame.tick_bottom_y),
            style.tick_color,
        );
    }

    for (start, end) in frame.dash_segments() {
        gizmos.line_2d(
            to_world(frame, start, frame.marker_y),
            to_world(frame, end, frame.marker_y),
            style.text_color,
        );
    }

    if let Some(beam) = frame.beam {
        gizmos.linestrip_2d(
            [beam.apex, beam.upper, beam.lower, beam.apex]
                .map(|p| to_world(frame, p.x, p.y)),
            style.beam_color,
        );
    }

    let markers = [
        (frame.worker_x, style.worker_color),
        (frame.car_x, style.car_color),
    ];
    for (x, color) in markers {
        let center = to_world(frame, x, frame.marker_y);
        // Concentric rings read as a filled dot at this size.
        let mut radius = style.marker_radius;
        while radius > 0.0 {
            gizmos.circle_2d(Isometry2d::from_translation(center), radius, color);
            radius -= 1.0;
        }
    }

    let legend_dots = [(14.0, style.car_color), (74.0, style.worker_color)];
    for (x, color) in legend_dots {
        gizmos.circle_2d(
            Isometry2d::from_translation(to_world(frame, x, frame.legend_y)),
            3.0,
            color,
        );
    }
}

fn update_overlay_labels(
    current: Res<CurrentOverlay>,
    mut labels: Query<(&OverlayLabel, &mut Text2d, &mut Transform, &mut Visibility)>,
) {
    let Some(frame) = current.0.as_ref() else {
        for (_, _, _, mut visibility) in &mut labels {
            *visibility = Visibility::Hidden;
        }
        return;
    };

    for (label, mut text, mut transform, mut visibility) in &mut labels {
        let placed = match *label {
            OverlayLabel::CarLegend => Some((20.0, frame.legend_y, None)),
            OverlayLabel::WorkerLegend => Some((80.0, frame.legend_y, None)),
            OverlayLabel::Distance => Some((
                140.0,
                frame.legend_y,
                Some(format!("----- {}", frame.distance_text)),
            )),
            OverlayLabel::Tick(slot) => frame
                .ticks
                .get(slot)
                .map(|tick| (tick.x, frame.tick_label_y, Some(tick.label.clone()))),
        };

        let Some((x, y, content)) = placed else {
            *visibility = Visibility::Hidden;
            continue;
        };

        if let Some(content) = content {
            if text.0 != content {
                text.0 = content;
            }
        }
        transform.translation = to_world(frame, x, y).extend(0.0);
        *visibility = Visibility::Inherited;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayProjector;

    #[test]
    fn canvas_corners_map_to_camera_space() {
        let frame = OverlayProjector::new(402.336)
            .project(0.0, 0.0, Vec2::new(768.0, 72.0))
            .unwrap();
        assert_eq!(to_world(&frame, 0.0, 0.0), Vec2::new(-384.0, 36.0));
        assert_eq!(to_world(&frame, 768.0, 72.0), Vec2::new(384.0, -36.0));
        assert_eq!(to_world(&frame, 384.0, 36.0), Vec2::ZERO);
    }

    #[test]
    fn strip_sits_centered_on_the_bottom_edge() {
        let style = OverlayStyle::default();
        let canvas = OverlayCanvas::for_window(Vec2::new(1280.0, 720.0), 2.0, &style);
        assert_eq!(canvas.logical_size, Vec2::new(768.0, 72.0));

        let (position, size) =
            overlay_viewport(canvas.physical_size(), UVec2::new(2560, 1440)).unwrap();
        assert_eq!(size, UVec2::new(1536, 144));
        assert_eq!(position, UVec2::new(512, 1296));
    }

    #[test]
    fn narrow_window_gets_a_full_width_strip() {
        let style = OverlayStyle::default();
        let canvas = OverlayCanvas::for_window(Vec2::new(600.0, 400.0), 1.0, &style);
        assert_eq!(canvas.logical_size, Vec2::new(600.0, 40.0));

        let (position, size) =
            overlay_viewport(canvas.physical_size(), UVec2::new(600, 400)).unwrap();
        assert_eq!(position, UVec2::new(0, 360));
        assert_eq!(size, UVec2::new(600, 40));
    }

    #[test]
    fn minimised_window_has_no_strip() {
        let canvas = OverlayCanvas::for_window(Vec2::ZERO, 1.0, &OverlayStyle::default());
        assert_eq!(canvas.logical_size, Vec2::ZERO);
        assert_eq!(canvas.physical_size(), UVec2::ZERO);
        assert!(overlay_viewport(canvas.physical_size(), UVec2::ZERO).is_none());
    }
}
