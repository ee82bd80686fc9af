//! The player character
//!
//! Turns a tick's input into motion intent (run, variable-height jump,
//! fast-fall, crouch), then runs physics, collision and animation.

use glam::Vec2;

use super::animation::{Action, AnimationState, Facing};
use super::hitbox::{HitboxTable, Rect};
use super::input::TickInput;
use super::physics::{self, Body, Contact, ContactKind};
use super::tile::{ActiveTile, TileId};
use crate::tuning::{AnimationTuning, PhysicsTuning, Tuning};

/// Player-controlled character
#[derive(Debug, Clone)]
pub struct Player {
    body: Body,
    facing: Facing,
    animation: AnimationState,
    /// Jump key state from the previous tick (for press-edge detection)
    jump_was_down: bool,
    /// Variable-height phase of the current jump is still running
    jump_boosting: bool,
    physics: PhysicsTuning,
    anim_tuning: AnimationTuning,
    hitboxes: HitboxTable,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: Body::at(spawn),
            facing: Facing::Right,
            animation: AnimationState::new(),
            jump_was_down: false,
            jump_boosting: false,
            physics: tuning.physics.clone(),
            anim_tuning: tuning.animation.clone(),
            hitboxes: tuning.hitboxes,
        }
    }

    /// Sprite top-left corner
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn prev_pos(&self) -> Vec2 {
        self.body.prev
    }

    pub fn vel(&self) -> Vec2 {
        self.body.vel
    }

    pub fn on_ground(&self) -> bool {
        self.body.on_ground
    }

    pub fn action(&self) -> Action {
        self.animation.action()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn sprite_scale(&self) -> f32 {
        self.anim_tuning.sprite_scale
    }

    /// One-line motion readout for the debug overlay
    pub fn debug_readout(&self) -> String {
        let (pos, vel) = (self.body.pos, self.body.vel);
        format!(
            "{} pos {:.1},{:.1} vel {:.2},{:.2}{}",
            self.action().as_str(),
            pos.x,
            pos.y,
            vel.x,
            vel.y,
            if self.on_ground() { " ground" } else { "" }
        )
    }

    pub fn hitboxes(&self) -> &HitboxTable {
        &self.hitboxes
    }

    /// Debug editing of the hitbox table
    pub fn hitboxes_mut(&mut self) -> &mut HitboxTable {
        &mut self.hitboxes
    }

    /// Collision rectangle for the current pose
    pub fn hitbox(&self) -> Rect {
        self.hitboxes
            .rect_at(self.body.pos, self.action(), self.anim_tuning.sprite_scale)
    }

    /// Place the player directly (spawning, tests)
    pub fn set_motion(&mut self, pos: Vec2, vel: Vec2) {
        self.body.pos = pos;
        self.body.prev = pos;
        self.body.vel = vel;
    }

    /// Turn toward the held direction; keeps the last facing when none is held
    pub fn face_toward(&mut self, input: &TickInput) {
        if input.left {
            self.facing = Facing::Left;
        } else if input.right {
            self.facing = Facing::Right;
        }
    }

    /// Advance one tick against the tick's active tiles.
    ///
    /// Returns the contacts made; tiles landed on should be reported to the world.
    pub fn update(&mut self, input: &TickInput, tiles: &[ActiveTile]) -> Vec<Contact> {
        let crouching = input.down && self.body.on_ground;
        self.update_jump(input, crouching);

        physics::apply_gravity(&mut self.body, &self.physics, input.down);
        physics::apply_horizontal(&mut self.body, input.direction(), &self.physics);
        physics::integrate(&mut self.body);

        let hitbox = self.hitboxes.get(self.action());
        let contacts = physics::resolve_collisions(
            &mut self.body,
            hitbox,
            self.anim_tuning.sprite_scale,
            tiles,
        );
        if contacts.iter().any(|c| c.kind == ContactKind::Landing) {
            self.jump_boosting = false;
        }

        self.animation.set_action(self.derive_action(input));
        self.animation.update(&self.anim_tuning);

        contacts
    }

    fn update_jump(&mut self, input: &TickInput, crouching: bool) {
        let pressed = input.jump && !self.jump_was_down;
        self.jump_was_down = input.jump;

        if pressed && self.body.on_ground && !crouching {
            self.body.vel.y = self.physics.jump_power;
            self.body.on_ground = false;
            self.jump_boosting = true;
        } else if self.jump_boosting {
            if input.jump && self.body.vel.y < 0.0 {
                self.body.vel.y -= self.physics.jump_hold_impulse;
            } else {
                // Released or at the apex: this jump gets no more boost
                self.jump_boosting = false;
            }
        }
    }

    fn derive_action(&self, input: &TickInput) -> Action {
        if !self.body.on_ground {
            Action::Jump
        } else if input.down {
            Action::Crouch
        } else if self.body.vel.x != 0.0 {
            Action::Walk
        } else {
            Action::Idle
        }
    }
}

/// Tiles landed on in a set of contacts
pub fn landed_tiles(contacts: &[Contact]) -> impl Iterator<Item = TileId> + '_ {
    contacts
        .iter()
        .filter(|c| c.kind == ContactKind::Landing)
        .map(|c| c.tile)
}
