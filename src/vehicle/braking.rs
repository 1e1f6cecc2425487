//! Pavement conditions and how much braking each one leaves the driver.

use bevy::prelude::*;

/// Road-surface state selected by the driver.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PavementCondition {
    #[default]
    Normal,
    /// Wet from drizzle.
    Drizzle,
    /// Wet from rain.
    Rain,
    Snow,
    Ice,
}

impl PavementCondition {
    pub const ALL: [PavementCondition; 5] = [
        PavementCondition::Normal,
        PavementCondition::Drizzle,
        PavementCondition::Rain,
        PavementCondition::Snow,
        PavementCondition::Ice,
    ];

    /// Parse a GUI/settings name. `None` for anything unrecognised.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" | "dry" => Some(PavementCondition::Normal),
            "drizzle" => Some(PavementCondition::Drizzle),
            "rain" => Some(PavementCondition::Rain),
            "snow" | "snowy" => Some(PavementCondition::Snow),
            "ice" | "icy" => Some(PavementCondition::Ice),
            _ => None,
        }
    }

    /// Parse a name, falling back to `Normal` (full braking) when unrecognised.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("Unknown pavement condition {:?}, using normal braking", name);
            PavementCondition::Normal
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PavementCondition::Normal => "normal",
            PavementCondition::Drizzle => "drizzle",
            PavementCondition::Rain => "rain",
            PavementCondition::Snow => "snow",
            PavementCondition::Ice => "ice",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PavementCondition::Normal => "Normal",
            PavementCondition::Drizzle => "Wet from Drizzle",
            PavementCondition::Rain => "Wet from Rain",
            PavementCondition::Snow => "Snowy",
            PavementCondition::Ice => "Icy",
        }
    }

    /// Next condition in selection order, wrapping back to normal.
    pub fn next(self) -> Self {
        match self {
            PavementCondition::Normal => PavementCondition::Drizzle,
            PavementCondition::Drizzle => PavementCondition::Rain,
            PavementCondition::Rain => PavementCondition::Snow,
            PavementCondition::Snow => PavementCondition::Ice,
            PavementCondition::Ice => PavementCondition::Normal,
        }
    }
}

/// Friction multiplier per pavement condition, each in (0, 1].
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct BrakingCoefficientTable {
    pub normal: f32,
    pub drizzle: f32,
    pub rain: f32,
    pub snow: f32,
    pub ice: f32,
}

impl Default for BrakingCoefficientTable {
    fn default() -> Self {
        Self {
            normal: 1.0,
            drizzle: 0.8, // 20% less effective
            rain: 0.6,
            snow: 0.4,
            ice: 0.2, // 80% less effective
        }
    }
}

impl BrakingCoefficientTable {
    pub fn coefficient(&self, condition: PavementCondition) -> f32 {
        let raw = match condition {
            PavementCondition::Normal => self.normal,
            PavementCondition::Drizzle => self.drizzle,
            PavementCondition::Rain => self.rain,
            PavementCondition::Snow => self.snow,
            PavementCondition::Ice => self.ice,
        };
        sanitize_coefficient(raw)
    }
}

/// Keep a coefficient inside (0, 1]. Broken table entries brake at full strength.
fn sanitize_coefficient(raw: f32) -> f32 {
    if raw.is_finite() && raw > 0.0 {
        raw.min(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_condition_has_a_coefficient_in_unit_interval() {
        let table = BrakingCoefficientTable::default();
        for condition in PavementCondition::ALL {
            let c = table.coefficient(condition);
            assert!(c > 0.0 && c <= 1.0, "{:?} -> {}", condition, c);
        }
        assert_eq!(table.coefficient(PavementCondition::Ice), 0.2);
        assert_eq!(table.coefficient(PavementCondition::Drizzle), 0.8);
    }

    #[test]
    fn unknown_condition_brakes_at_full_strength() {
        let table = BrakingCoefficientTable::default();
        let hail = PavementCondition::from_name_or_default("hail");
        assert_eq!(table.coefficient(hail), 1.0);
        let ice = PavementCondition::from_name_or_default("ICE");
        assert_eq!(table.coefficient(ice), 0.2);
        assert_eq!(
            PavementCondition::from_name_or_default("black ice"),
            PavementCondition::Normal
        );
    }

    #[test]
    fn broken_table_entries_fall_back_to_full_braking() {
        let table = BrakingCoefficientTable {
            rain: 0.0,
            snow: f32::NAN,
            ice: 3.0,
            ..default()
        };
        assert_eq!(table.coefficient(PavementCondition::Rain), 1.0);
        assert_eq!(table.coefficient(PavementCondition::Snow), 1.0);
        assert_eq!(table.coefficient(PavementCondition::Ice), 1.0);
    }

    #[test]
    fn cycling_visits_every_condition() {
        let mut condition = PavementCondition::Normal;
        for _ in 0..PavementCondition::ALL.len() {
            condition = condition.next();
        }
        assert_eq!(condition, PavementCondition::Normal);
    }
}
