//! Host-facing surface: the queries the core consumes from the game client.
//!
//! The core never calls native functions directly. Everything it needs from
//! the host arrives through [`GameHost`] and [`KeyboardHost`], which keeps the
//! reducers testable against [`ScriptedHost`].

mod edge;
mod scripted;

pub use edge::EdgeTrigger;
pub use scripted::{KeyboardPrompt, ScriptedHost};

use serde::{Deserialize, Serialize};

/// Input control identifier as understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Control(pub u16);

impl Control {
    /// Duck while in a vehicle; the default panel toggle.
    pub const VEHICLE_DUCK: Control = Control(73);
}

/// Vehicle class identifier. The taxonomy itself belongs to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleClass(pub u8);

impl VehicleClass {
    pub const EMERGENCY: VehicleClass = VehicleClass(18);
}

/// Seat occupied by the local actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Driver,
    Passenger(i32),
}

impl Seat {
    /// Host seat indices start at -1 for the driver.
    pub const fn from_index(index: i32) -> Self {
        if index == -1 {
            Seat::Driver
        } else {
            Seat::Passenger(index)
        }
    }

    pub const fn index(self) -> i32 {
        match self {
            Seat::Driver => -1,
            Seat::Passenger(index) => index,
        }
    }
}

/// Where the local actor currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub seat: Seat,
    pub class: VehicleClass,
}

impl Occupancy {
    pub const fn new(seat: Seat, class: VehicleClass) -> Self {
        Self { seat, class }
    }

    pub const fn driver(class: VehicleClass) -> Self {
        Self::new(Seat::Driver, class)
    }
}

/// Live input and vehicle queries, polled every frame.
pub trait GameHost {
    /// True only on the frame `control` went from released to pressed.
    fn is_control_just_pressed(&self, control: Control) -> bool;

    /// `None` when the local actor is on foot.
    fn local_occupancy(&self) -> Option<Occupancy>;
}

/// On-screen text entry subsystem.
pub trait KeyboardHost {
    fn display_onscreen_keyboard(&mut self, limit: u32, initial_text: &str);

    /// Raw status: 0 still editing, 1 confirmed, 2 cancelled.
    fn update_onscreen_keyboard(&mut self) -> i32;

    fn onscreen_keyboard_result(&mut self) -> Option<String>;
}

/// Everything the coordination core needs from the host.
pub trait Host: GameHost + KeyboardHost {}

impl<T> Host for T where T: GameHost + KeyboardHost {}
