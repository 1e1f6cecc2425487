//! World-to-canvas projection for the top-down distance strip.
//!
//! Pure: given the canvas size and the two world positions it produces an
//! [`OverlayFrame`] with every coordinate and string the draw layer needs.
//! One projector handles every unit/headlight combination; the variants are
//! configuration, not separate code paths.

use bevy::math::Vec2;
use smallvec::SmallVec;

use crate::headlights::HeadlightMode;
use crate::units::{feet_to_meters, format_overlay_distance, UnitSystem};

/// Distance markers for one unit system: a label every `step` up to `max`,
/// both in that system's unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerScale {
    pub step: u32,
    pub max: u32,
}

impl MarkerScale {
    pub fn for_units(units: UnitSystem) -> Self {
        match units {
            UnitSystem::Metric => MarkerScale { step: 50, max: 400 },
            UnitSystem::Imperial => MarkerScale {
                step: 150,
                max: 1200,
            },
        }
    }
}

/// One distance marker on the strip.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceTick {
    /// Canvas x in logical pixels.
    pub x: f32,
    pub label: String,
}

/// Headlight beam triangle in canvas space, apex at the car marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamTriangle {
    pub apex: Vec2,
    pub upper: Vec2,
    pub lower: Vec2,
}

impl BeamTriangle {
    pub fn length(&self) -> f32 {
        self.upper.x - self.apex.x
    }

    pub fn width(&self) -> f32 {
        self.lower.y - self.upper.y
    }
}

/// Everything needed to redraw the strip for one tick.
///
/// Canvas coordinates: origin at the top-left, y pointing down, logical pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayFrame {
    pub canvas: Vec2,
    /// Logical pixels per world meter.
    pub scale: f32,
    pub car_x: f32,
    pub worker_x: f32,
    /// Baseline shared by both markers and the dashed connector.
    pub marker_y: f32,
    pub distance_m: f32,
    /// Whole-unit distance, e.g. `"328ft"`.
    pub distance_text: String,
    pub legend_y: f32,
    pub ticks: SmallVec<[DistanceTick; 12]>,
    pub tick_top_y: f32,
    pub tick_bottom_y: f32,
    pub tick_label_y: f32,
    pub beam: Option<BeamTriangle>,
    /// Dash and gap length of the connector, in logical pixels.
    pub dash: (f32, f32),
}

impl OverlayFrame {
    /// The dashed car-to-worker connector as `(start_x, end_x)` segments on
    /// `marker_y`, drawn from the car toward the worker.
    pub fn dash_segments(&self) -> Vec<(f32, f32)> {
        let (dash, gap) = self.dash;
        let (from, to) = (self.car_x, self.worker_x);
        let length = (to - from).abs();
        if dash <= 0.0 || length <= f32::EPSILON {
            return Vec::new();
        }

        let direction = (to - from).signum();
        let period = dash + gap.max(0.0);
        let mut segments = Vec::with_capacity((length / period) as usize + 1);
        let mut travelled = 0.0;
        while travelled < length {
            let end = (travelled + dash).min(length);
            segments.push((from + direction * travelled, from + direction * end));
            travelled += period;
        }
        segments
    }
}

/// Maps world x onto the strip.
///
/// `span` of the canvas width covers the whole road, leaving `margin` on
/// each side. World x is shifted by half the road length so the road start
/// lands on the left margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayProjector {
    road_length: f32,
    units: UnitSystem,
    headlights: HeadlightMode,
    margin: f32,
    span: f32,
    dash: (f32, f32),
}

impl OverlayProjector {
    pub fn new(road_length: f32) -> Self {
        Self {
            road_length,
            units: UnitSystem::Metric,
            headlights: HeadlightMode::Off,
            margin: 0.1,
            span: 0.8,
            dash: (5.0, 5.0),
        }
    }

    pub fn units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn headlights(mut self, mode: HeadlightMode) -> Self {
        self.headlights = mode;
        self
    }

    pub fn margins(mut self, margin: f32, span: f32) -> Self {
        self.margin = margin;
        self.span = span;
        self
    }

    pub fn dash(mut self, dash: f32, gap: f32) -> Self {
        self.dash = (dash, gap);
        self
    }

    /// Canvas x of a world x for a canvas `width` pixels wide.
    pub fn world_to_canvas_x(&self, world_x: f32, width: f32) -> f32 {
        let scale = width * self.span / self.road_length;
        width * self.margin + (world_x + self.road_length / 2.0) * scale
    }

    /// Project one tick. `None` when the canvas has no drawable area.
    pub fn project(&self, car_x: f32, worker_x: f32, canvas: Vec2) -> Option<OverlayFrame> {
        if !canvas.is_finite() || canvas.x <= 0.0 || canvas.y <= 0.0 {
            return None;
        }
        if !(self.road_length.is_finite() && self.road_length > 0.0) {
            return None;
        }

        let (width, height) = (canvas.x, canvas.y);
        let scale = width * self.span / self.road_length;
        let offset = width * self.margin;

        let car_screen_x = self.world_to_canvas_x(car_x, width);
        let worker_screen_x = self.world_to_canvas_x(worker_x, width);
        let marker_y = height * 0.6;

        let distance_m = (car_x - worker_x).abs();

        let markers = MarkerScale::for_units(self.units);
        let ticks = (0..=markers.max)
            .step_by(markers.step as usize)
            .map(|value| {
                let meters = match self.units {
                    UnitSystem::Metric => value as f32,
                    UnitSystem::Imperial => feet_to_meters(value as f32),
                };
                let suffix = match self.units {
                    UnitSystem::Metric => "m",
                    UnitSystem::Imperial => "ft",
                };
                DistanceTick {
                    x: offset + meters * scale,
                    label: format!("{value}{suffix}"),
                }
            })
            .collect();

        let beam = self.headlights.beam_glyph().map(|glyph| {
            let length = glyph.length * scale;
            let half_width = glyph.width * scale / 2.0;
            BeamTriangle {
                apex: Vec2::new(car_screen_x, marker_y),
                upper: Vec2::new(car_screen_x + length, marker_y - half_width),
                lower: Vec2::new(car_screen_x + length, marker_y + half_width),
            }
        });

        Some(OverlayFrame {
            canvas,
            scale,
            car_x: car_screen_x,
            worker_x: worker_screen_x,
            marker_y,
            distance_m,
            distance_text: format_overlay_distance(distance_m, self.units),
            legend_y: height * 0.3,
            ticks,
            tick_top_y: height * 0.5,
            tick_bottom_y: height * 0.7,
            tick_label_y: height * 0.85,
            beam,
            dash: self.dash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ROAD: f32 = 402.336;
    const CANVAS: Vec2 = Vec2::new(768.0, 72.0);

    #[test]
    fn road_ends_land_on_the_margins() {
        let projector = OverlayProjector::new(ROAD);
        let frame = projector.project(-ROAD / 2.0, ROAD / 2.0, CANVAS).unwrap();
        assert_relative_eq!(frame.car_x, 76.8, epsilon = 1e-3);
        assert_relative_eq!(frame.worker_x, 691.2, epsilon = 1e-3);
        assert_relative_eq!(frame.scale, 768.0 * 0.8 / ROAD, epsilon = 1e-6);
    }

    #[test]
    fn zero_or_broken_canvas_skips_the_frame() {
        let projector = OverlayProjector::new(ROAD);
        assert!(projector.project(0.0, 0.0, Vec2::ZERO).is_none());
        assert!(projector.project(0.0, 0.0, Vec2::new(768.0, 0.0)).is_none());
        assert!(projector.project(0.0, 0.0, Vec2::new(f32::NAN, 72.0)).is_none());
    }

    #[test]
    fn imperial_distance_text_is_whole_feet() {
        let frame = OverlayProjector::new(ROAD)
            .units(UnitSystem::Imperial)
            .project(-100.0, 0.0, CANVAS)
            .unwrap();
        assert_eq!(frame.distance_text, "328ft");
        assert_eq!(frame.distance_m, 100.0);
    }

    #[test]
    fn unit_switch_changes_markers_not_positions() {
        let metric = OverlayProjector::new(ROAD).project(-50.0, 0.0, CANVAS).unwrap();
        let imperial = OverlayProjector::new(ROAD)
            .units(UnitSystem::Imperial)
            .project(-50.0, 0.0, CANVAS)
            .unwrap();

        assert_eq!(metric.car_x, imperial.car_x);
        assert_eq!(metric.worker_x, imperial.worker_x);

        assert_eq!(metric.ticks.len(), 9);
        assert_eq!(metric.ticks[1].label, "50m");
        assert_eq!(metric.ticks[8].label, "400m");
        assert_relative_eq!(
            metric.ticks[1].x - metric.ticks[0].x,
            50.0 * metric.scale,
            epsilon = 1e-3
        );

        assert_eq!(imperial.ticks.len(), 9);
        assert_eq!(imperial.ticks[1].label, "150ft");
        assert_eq!(imperial.ticks[8].label, "1200ft");
        assert_relative_eq!(
            imperial.ticks[1].x - imperial.ticks[0].x,
            feet_to_meters(150.0) * imperial.scale,
            epsilon = 1e-3
        );
    }

    #[test]
    fn beam_glyph_follows_headlight_mode() {
        let base = OverlayProjector::new(ROAD);
        let off = base.project(-50.0, 0.0, CANVAS).unwrap();
        assert!(off.beam.is_none());

        let regular = base
            .headlights(HeadlightMode::Regular)
            .project(-50.0, 0.0, CANVAS)
            .unwrap()
            .beam
            .unwrap();
        let high = base
            .headlights(HeadlightMode::High)
            .project(-50.0, 0.0, CANVAS)
            .unwrap()
            .beam
            .unwrap();

        assert_relative_eq!(high.length() / regular.length(), 2.5, epsilon = 1e-4);
        assert!(high.width() > regular.width());
        assert_eq!(high.apex, Vec2::new(high.apex.x, CANVAS.y * 0.6));
    }

    #[test]
    fn dashes_run_from_car_to_worker() {
        let frame = OverlayProjector::new(ROAD).project(-10.0, 0.0, CANVAS).unwrap();
        let dashes = frame.dash_segments();
        assert!(!dashes.is_empty());
        assert_eq!(dashes[0].0, frame.car_x);
        for &(start, end) in &dashes {
            assert!(end - start <= 5.0 + 1e-4);
            assert!(end <= frame.worker_x + 1e-4);
        }
    }

    #[test]
    fn car_on_the_worker_has_no_connector() {
        let frame = OverlayProjector::new(ROAD).project(0.0, 0.0, CANVAS).unwrap();
        assert!(frame.dash_segments().is_empty());
        assert_eq!(frame.distance_text, "0m");
    }
}
