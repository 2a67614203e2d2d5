//! Speed unit policy for raw sensor readings.
//!
//! The detection pipeline reports speeds in the configured display unit;
//! thresholds are tuned in metres per second.

mod core;

pub use self::core::{
    DisplayUnit, KMH_PER_METRE_PER_SECOND, MPH_PER_METRE_PER_SECOND, convert_labelled,
    from_canonical, to_canonical,
};
