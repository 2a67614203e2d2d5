//! Per-frame visibility reducers.
//!
//! [`VisibilityArbiter`] owns the radar's `displayed` flag and
//! [`InputRouter`] owns the control panel's `visible` flag. The two write
//! disjoint state, so their order within a frame does not matter.

use crate::host::{Occupancy, Seat, VehicleClass};
use crate::radar::RadarDisplayState;

/// True iff the local actor sits in the driver seat of a vehicle whose class
/// is in `qualifying`.
pub fn is_driving_qualifying(occupancy: Option<Occupancy>, qualifying: &[VehicleClass]) -> bool {
    match occupancy {
        Some(Occupancy {
            seat: Seat::Driver,
            class,
        }) => qualifying.contains(&class),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityDecision {
    Hide,
    Show,
    Keep,
}

pub struct VisibilityArbiter;

impl VisibilityArbiter {
    /// First matching rule wins; hiding is checked before showing so a seat
    /// change and an enable toggle in the same frame never flash the display.
    pub fn decide(displayed: bool, enabled: bool, driving: bool) -> VisibilityDecision {
        if displayed && !driving {
            VisibilityDecision::Hide
        } else if driving && !displayed && enabled {
            VisibilityDecision::Show
        } else {
            VisibilityDecision::Keep
        }
    }

    pub fn apply(state: &mut RadarDisplayState, driving: bool) -> VisibilityDecision {
        let decision = Self::decide(state.is_displayed(), state.is_enabled(), driving);
        match decision {
            VisibilityDecision::Hide => state.set_displayed(false),
            VisibilityDecision::Show => state.set_displayed(true),
            VisibilityDecision::Keep => {}
        }
        decision
    }
}

/// Visibility of the auxiliary control panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerVisibility {
    visible: bool,
}

impl ControllerVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

pub struct InputRouter;

impl InputRouter {
    /// Whether the panel should flip this frame.
    pub fn route(toggle_pressed: bool, driving: bool) -> bool {
        toggle_pressed && driving
    }

    /// Flip the panel if routed. Returns whether it flipped.
    pub fn apply(
        controller: &mut ControllerVisibility,
        toggle_pressed: bool,
        driving: bool,
    ) -> bool {
        let flip = Self::route(toggle_pressed, driving);
        if flip {
            controller.visible = !controller.visible;
        }
        flip
    }
}
