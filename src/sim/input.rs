//! Input commands for a single tick
//!
//! The platform layer keeps key state up to date between frames; the engine
//! samples it exactly once at the start of each tick.

/// Logical inputs the simulation understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    /// Jump (space / up arrow)
    Jump,
    /// Crouch on the ground, fast-fall in the air
    Down,
}

/// Anything that can report whether a key is currently held
pub trait InputSource {
    fn is_down(&self, key: Key) -> bool;
}

/// Key state captured for one tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub down: bool,
}

impl TickInput {
    /// Sample every key from `source`
    pub fn sample(source: &impl InputSource) -> Self {
        Self {
            left: source.is_down(Key::Left),
            right: source.is_down(Key::Right),
            jump: source.is_down(Key::Jump),
            down: source.is_down(Key::Down),
        }
    }

    /// Horizontal intent: -1 left, +1 right, 0 none. Left wins a tie.
    pub fn direction(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

impl InputSource for TickInput {
    fn is_down(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Jump => self.jump,
            Key::Down => self.down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyJump;

    impl InputSource for OnlyJump {
        fn is_down(&self, key: Key) -> bool {
            key == Key::Jump
        }
    }

    #[test]
    fn test_sample() {
        let input = TickInput::sample(&OnlyJump);
        assert!(input.jump);
        assert!(!input.left && !input.right && !input.down);
    }

    #[test]
    fn test_direction_prefers_left() {
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.direction(), -1.0);
        assert_eq!(TickInput::default().direction(), 0.0);
    }
}
