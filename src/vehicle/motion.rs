//! Position integration along the road axis with end-of-road wraparound.

use bevy::prelude::*;

use crate::units::mph_to_mps;

/// Fixed correction applied to the physical displacement so the demo car
/// covers the quarter mile at a watchable pace.
pub const POSITION_SCALE: f32 = 0.975 * 0.5;

/// Length and width of the straight road. Immutable for the session.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct RoadGeometry {
    /// Road length in meters (a quarter mile).
    pub length: f32,
    pub width: f32,
}

impl Default for RoadGeometry {
    fn default() -> Self {
        Self {
            length: 402.336,
            width: 8.0,
        }
    }
}

impl RoadGeometry {
    pub fn half_length(&self) -> f32 {
        self.length / 2.0
    }

    /// World x of the road's start, where wrapped vehicles re-enter.
    pub fn start_x(&self) -> f32 {
        -self.half_length()
    }

    pub fn end_x(&self) -> f32 {
        self.half_length()
    }
}

/// Where the worker stands on the road axis. Stationary for the session.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Default)]
pub struct WorkerPosition {
    pub x: f32,
}

/// Result of one integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionStep {
    pub position_x: f32,
    /// The vehicle ran off the end and re-entered at the start this tick.
    pub wrapped: bool,
}

/// Advance `position_x` by `speed_mph` over `dt` seconds.
///
/// Motion is forward only. Past the end of the road the position snaps to
/// exactly the start, discarding any overshoot.
pub fn integrate_position(
    position_x: f32,
    speed_mph: f32,
    dt: f32,
    road: &RoadGeometry,
) -> PositionStep {
    let displacement = mph_to_mps(speed_mph.max(0.0)) * dt.max(0.0) * POSITION_SCALE;
    let advanced = position_x + displacement;

    if advanced > road.end_x() {
        PositionStep {
            position_x: road.start_x(),
            wrapped: true,
        }
    } else {
        PositionStep {
            position_x: advanced,
            wrapped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn displacement_uses_scaled_meters_per_second() {
        let road = RoadGeometry::default();
        let step = integrate_position(0.0, 10.0, 1.0, &road);
        assert_relative_eq!(step.position_x, 4.4704 * 0.4875, max_relative = 1e-4);
        assert!(!step.wrapped);
    }

    #[test]
    fn overshoot_is_discarded_on_wrap() {
        let road = RoadGeometry::default();
        for epsilon in [1e-3_f32, 0.5, 3.0, 50.0] {
            let step = integrate_position(road.end_x() + epsilon, 0.0, 0.0, &road);
            assert!(step.wrapped);
            assert_eq!(step.position_x, -road.length / 2.0);
        }
    }

    #[test]
    fn crossing_the_end_resets_to_start() {
        let road = RoadGeometry::default();
        // 10 mph for one second moves ~2.18 m, enough to pass 201.168.
        let step = integrate_position(201.1, 10.0, 1.0, &road);
        assert!(step.wrapped);
        assert_eq!(step.position_x, -201.168);
    }

    #[test]
    fn standing_still_never_moves_backwards() {
        let road = RoadGeometry::default();
        let step = integrate_position(12.0, 0.0, 1.0, &road);
        assert_eq!(step.position_x, 12.0);
        let step = integrate_position(12.0, -5.0, 1.0, &road);
        assert_eq!(step.position_x, 12.0);
    }

    #[test]
    fn exactly_at_the_end_does_not_wrap() {
        let road = RoadGeometry::default();
        let step = integrate_position(road.end_x(), 0.0, 1.0 / 60.0, &road);
        assert!(!step.wrapped);
    }
}
