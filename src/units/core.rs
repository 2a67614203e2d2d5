use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Rounded mph per m/s. Existing detection thresholds were tuned against this
/// value rather than the exact 2.23694.
pub const MPH_PER_METRE_PER_SECOND: f32 = 2.237;
pub const KMH_PER_METRE_PER_SECOND: f32 = 3.6;

/// Closed set of display units. Fixed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DisplayUnit {
    #[default]
    #[serde(rename = "mph")]
    Miles,
    #[serde(rename = "km/h")]
    Kilometers,
}

impl DisplayUnit {
    pub const fn label(self) -> &'static str {
        match self {
            DisplayUnit::Miles => "mph",
            DisplayUnit::Kilometers => "km/h",
        }
    }

    /// Display units per metre per second.
    pub const fn factor(self) -> f32 {
        match self {
            DisplayUnit::Miles => MPH_PER_METRE_PER_SECOND,
            DisplayUnit::Kilometers => KMH_PER_METRE_PER_SECOND,
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DisplayUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mph" => Ok(DisplayUnit::Miles),
            "km/h" => Ok(DisplayUnit::Kilometers),
            other => Err(ConfigError::UnsupportedUnits(other.to_string())),
        }
    }
}

/// Convert a raw speed in `unit` to metres per second.
pub fn to_canonical(raw: f32, unit: DisplayUnit) -> f32 {
    raw / unit.factor()
}

/// Convert metres per second back into `unit` for display.
pub fn from_canonical(metres_per_second: f32, unit: DisplayUnit) -> f32 {
    metres_per_second * unit.factor()
}

/// String-typed conversion. Any label outside the closed set is a
/// configuration error, never a silent default.
pub fn convert_labelled(raw: f32, label: &str) -> Result<f32, ConfigError> {
    let unit = label.parse::<DisplayUnit>()?;
    Ok(to_canonical(raw, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn miles_use_rounded_factor() {
        let mps = to_canonical(100.0, DisplayUnit::Miles);
        assert!(close(mps, 44.702_73), "got {mps}");
        assert_eq!(mps, 100.0_f32 / 2.237_f32);
    }

    #[test]
    fn kilometres_divide_by_three_point_six() {
        let mps = to_canonical(100.0, DisplayUnit::Kilometers);
        assert!(close(mps, 27.777_779), "got {mps}");
    }

    #[test]
    fn labels_parse_both_ways() {
        for unit in [DisplayUnit::Miles, DisplayUnit::Kilometers] {
            assert_eq!(unit.label().parse::<DisplayUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn unknown_label_is_configuration_error() {
        let err = convert_labelled(100.0, "knots").unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedUnits("knots".into()));
        assert!("".parse::<DisplayUnit>().is_err());
        assert!("MPH".parse::<DisplayUnit>().is_err());
    }

    #[test]
    fn labelled_conversion_matches_typed() {
        assert_eq!(
            convert_labelled(88.0, "km/h").unwrap(),
            to_canonical(88.0, DisplayUnit::Kilometers)
        );
    }

    #[test]
    fn from_canonical_inverts() {
        let mps = to_canonical(55.0, DisplayUnit::Miles);
        assert!(close(from_canonical(mps, DisplayUnit::Miles), 55.0));
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&DisplayUnit::Kilometers).unwrap(),
            "\"km/h\""
        );
    }
}
