//! Sprite animation state
//!
//! Frame advancement is driven by a tick counter and the current action.
//! Looping actions wrap around their strip; held poses stop on the last frame.

use serde::{Deserialize, Serialize};

use crate::tuning::AnimationTuning;

/// Pose the player is in, derived each tick from physics and input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Idle,
    Walk,
    Jump,
    Crouch,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Idle, Action::Walk, Action::Jump, Action::Crouch];

    /// Jump and crouch hold their last frame instead of looping
    pub fn holds_last_frame(self) -> bool {
        matches!(self, Action::Jump | Action::Crouch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Walk => "walk",
            Action::Jump => "jump",
            Action::Crouch => "crouch",
        }
    }
}

/// Horizontal facing of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// One value per action, indexed by `Action`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionTable<T> {
    pub idle: T,
    pub walk: T,
    pub jump: T,
    pub crouch: T,
}

impl<T> ActionTable<T> {
    pub fn get(&self, action: Action) -> &T {
        match action {
            Action::Idle => &self.idle,
            Action::Walk => &self.walk,
            Action::Jump => &self.jump,
            Action::Crouch => &self.crouch,
        }
    }

    pub fn get_mut(&mut self, action: Action) -> &mut T {
        match action {
            Action::Idle => &mut self.idle,
            Action::Walk => &mut self.walk,
            Action::Jump => &mut self.jump,
            Action::Crouch => &mut self.crouch,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.idle, &self.walk, &self.jump, &self.crouch].into_iter()
    }
}

/// Current frame of an entity's sprite strip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationState {
    action: Action,
    frame_index: u32,
    tick_count: u32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Switch action; restarts the strip only when the action actually changes
    pub fn set_action(&mut self, action: Action) {
        if self.action != action {
            self.action = action;
            self.frame_index = 0;
            self.tick_count = 0;
        }
    }

    /// Advance one tick
    pub fn update(&mut self, tuning: &AnimationTuning) {
        self.tick_count += 1;
        if self.tick_count <= tuning.ticks_per_frame {
            return;
        }
        self.tick_count = 0;

        let frames = (*tuning.frames.get(self.action)).max(1);
        if self.action.holds_last_frame() {
            if self.frame_index + 1 < frames {
                self.frame_index += 1;
            }
        } else {
            self.frame_index = (self.frame_index + 1) % frames;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(anim: &mut AnimationState, tuning: &AnimationTuning, ticks: u32) {
        for _ in 0..ticks {
            anim.update(tuning);
        }
    }

    #[test]
    fn test_set_action_is_idempotent() {
        let tuning = AnimationTuning::default();
        let mut anim = AnimationState::new();
        anim.set_action(Action::Walk);
        run(&mut anim, &tuning, 7);
        let before = anim.clone();

        anim.set_action(Action::Walk);
        assert_eq!(anim, before);

        anim.set_action(Action::Idle);
        assert_eq!(anim.frame_index(), 0);
        assert_eq!(anim.tick_count(), 0);
    }

    #[test]
    fn test_frame_advances_after_threshold() {
        let tuning = AnimationTuning::default();
        let mut anim = AnimationState::new();

        run(&mut anim, &tuning, tuning.ticks_per_frame);
        assert_eq!(anim.frame_index(), 0);

        anim.update(&tuning);
        assert_eq!(anim.frame_index(), 1);
        assert_eq!(anim.tick_count(), 0);
    }

    #[test]
    fn test_idle_loops() {
        let tuning = AnimationTuning::default();
        let mut anim = AnimationState::new();
        let per_frame = tuning.ticks_per_frame + 1;

        run(&mut anim, &tuning, per_frame * tuning.frames.idle);
        assert_eq!(anim.frame_index(), 0);

        run(&mut anim, &tuning, per_frame * 3);
        assert_eq!(anim.frame_index(), 3);
    }

    #[test]
    fn test_jump_and_crouch_hold_last_frame() {
        let tuning = AnimationTuning::default();
        let per_frame = tuning.ticks_per_frame + 1;

        for action in [Action::Jump, Action::Crouch] {
            let mut anim = AnimationState::new();
            anim.set_action(action);
            run(&mut anim, &tuning, per_frame * 20);
            assert_eq!(anim.frame_index(), tuning.frames.get(action) - 1);
        }
    }

    #[test]
    fn test_action_table_lookup() {
        let table = ActionTable {
            idle: 1,
            walk: 2,
            jump: 3,
            crouch: 4,
        };
        let values: Vec<_> = Action::ALL.iter().map(|&a| *table.get(a)).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert_eq!(table.iter().sum::<i32>(), 10);
    }
}
