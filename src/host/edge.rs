/// Rising-edge detector for level-reporting inputs.
///
/// Hosts that only expose "is held" state feed it once per frame; it reports
/// `true` only on the frame the input goes from released to pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTrigger {
    was_pressed: bool,
}

impl EdgeTrigger {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        rising
    }

    pub fn is_pressed(&self) -> bool {
        self.was_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_press() {
        let mut edge = EdgeTrigger::new();
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(false));
        assert!(edge.update(true));
    }

    #[test]
    fn release_never_fires() {
        let mut edge = EdgeTrigger::new();
        assert!(!edge.update(false));
        edge.update(true);
        assert!(!edge.update(false));
        assert!(!edge.is_pressed());
    }
}
