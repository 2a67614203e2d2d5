use std::collections::{BTreeMap, BTreeSet};

use super::{Control, EdgeTrigger, GameHost, KeyboardHost, Occupancy};

/// A prompt opened through [`KeyboardHost::display_onscreen_keyboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardPrompt {
    pub limit: u32,
    pub initial_text: String,
}

/// In-memory host whose state is set frame by frame, by the script driver or
/// directly by tests.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    occupancy: Option<Occupancy>,
    triggers: BTreeMap<Control, EdgeTrigger>,
    just_pressed: BTreeSet<Control>,
    keyboard_status: i32,
    keyboard_text: Option<String>,
    prompts: Vec<KeyboardPrompt>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_occupancy(&mut self, occupancy: Option<Occupancy>) {
        self.occupancy = occupancy;
    }

    /// Report which controls are held this frame. Edges are derived against
    /// the previous call, so holding a control across frames fires once.
    pub fn hold(&mut self, held: &[Control]) {
        self.just_pressed.clear();
        for control in held {
            self.triggers.entry(*control).or_default();
        }
        for (control, trigger) in self.triggers.iter_mut() {
            if trigger.update(held.contains(control)) {
                self.just_pressed.insert(*control);
            }
        }
    }

    /// Set the status the next keyboard poll reports, plus the text returned
    /// on confirmation.
    pub fn set_keyboard_status(&mut self, status: i32, text: Option<String>) {
        self.keyboard_status = status;
        self.keyboard_text = text;
    }

    pub fn prompts(&self) -> &[KeyboardPrompt] {
        &self.prompts
    }
}

impl GameHost for ScriptedHost {
    fn is_control_just_pressed(&self, control: Control) -> bool {
        self.just_pressed.contains(&control)
    }

    fn local_occupancy(&self) -> Option<Occupancy> {
        self.occupancy
    }
}

impl KeyboardHost for ScriptedHost {
    fn display_onscreen_keyboard(&mut self, limit: u32, initial_text: &str) {
        self.prompts.push(KeyboardPrompt {
            limit,
            initial_text: initial_text.to_string(),
        });
        self.keyboard_status = 0;
        self.keyboard_text = None;
    }

    fn update_onscreen_keyboard(&mut self) -> i32 {
        self.keyboard_status
    }

    fn onscreen_keyboard_result(&mut self) -> Option<String> {
        self.keyboard_text.clone()
    }
}
