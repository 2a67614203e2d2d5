//! Radar collaborator surface.
//!
//! Detection and the radar panel itself live outside the core. The core owns
//! the display flags and drives [`Radar::update`] on the throttled cadence.

use crate::Result;
use crate::overlay::OverlayChannel;
use crate::units::DisplayUnit;

/// Display flags for the radar panel.
///
/// `displayed` is written only by the visibility arbiter; `enabled` only by
/// the radar's owner (operator power toggle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadarDisplayState {
    displayed: bool,
    enabled: bool,
}

impl RadarDisplayState {
    pub const fn new(enabled: bool) -> Self {
        Self {
            displayed: false,
            enabled,
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }
}

/// What the radar sees on each throttled update.
pub struct RadarFrame<'a> {
    pub display: &'a RadarDisplayState,
    pub units: DisplayUnit,
    pub overlay: &'a mut OverlayChannel,
}

/// Opaque detection collaborator.
pub trait Radar {
    fn update(&mut self, frame: RadarFrame<'_>) -> Result<()>;
}

/// Radar that never detects anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleRadar;

impl Radar for IdleRadar {
    fn update(&mut self, _frame: RadarFrame<'_>) -> Result<()> {
        Ok(())
    }
}
