use super::collision::{self, PLAYER_EYE_LEVEL};
use crate::voxel::BlockKind;
use crate::world::World;
use glam::{IVec3, Vec3};

pub const GRAVITY: f32 = -28.0;
pub const JUMP_VELOCITY: f32 = 9.0;
pub const MOVE_SPEED: f32 = 5.0;
pub const FLY_SPEED: f32 = 10.0;

// Water physics constants.
pub const WATER_GRAVITY: f32 = -6.0;
pub const SWIM_VELOCITY: f32 = 3.0;
pub const WATER_MOVE_SPEED_MULTIPLIER: f32 = 0.6;
pub const MAX_SINK_SPEED: f32 = -4.0;

/// A second jump press within this window toggles fly mode.
pub const FLY_DOUBLE_TAP_WINDOW: f32 = 0.3;

/// Held movement keys for one tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub descend: bool,
}

/// The player: a 0.6 x 1.8 box whose position is the centre of its feet.
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub in_water: bool,
    pub flying: bool,
    /// Engine-clock timestamp of the previous jump press, for the
    /// double-tap fly toggle.
    last_jump_press: Option<f32>,
    jump_was_held: bool,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
            in_water: false,
            flying: false,
            last_jump_press: None,
            jump_was_held: false,
        }
    }

    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, PLAYER_EYE_LEVEL, 0.0)
    }

    #[inline]
    pub fn head_cell(&self) -> IVec3 {
        self.eye_position().floor().as_ivec3()
    }

    /// Advance one tick: environment check, double-tap handling, locomotion
    /// by mode, then the axis-swept collision resolve.
    ///
    /// `flat_forward`/`flat_right` are the camera's horizontal basis (unit
    /// length, y = 0); `now` is the engine clock in seconds.
    pub fn update(
        &mut self,
        world: &World,
        input: &MoveInput,
        flat_forward: Vec3,
        flat_right: Vec3,
        dt: f32,
        now: f32,
    ) {
        self.in_water = world.get_block(self.head_cell()) == BlockKind::Water;
        self.handle_fly_toggle(input.jump, now);

        let mut wish = Vec3::ZERO;
        if input.forward {
            wish += flat_forward;
        }
        if input.backward {
            wish -= flat_forward;
        }
        if input.right {
            wish += flat_right;
        }
        if input.left {
            wish -= flat_right;
        }

        let horizontal_speed;
        if self.flying {
            self.on_ground = false;
            let up = (input.jump as i32 - input.descend as i32) as f32;
            self.velocity.y = up * FLY_SPEED;
            horizontal_speed = FLY_SPEED;
        } else if self.in_water {
            self.on_ground = false;
            self.velocity.y += WATER_GRAVITY * dt;
            if input.jump {
                self.velocity.y = SWIM_VELOCITY;
            }
            if self.velocity.y < MAX_SINK_SPEED {
                self.velocity.y = MAX_SINK_SPEED;
            }
            horizontal_speed = MOVE_SPEED * WATER_MOVE_SPEED_MULTIPLIER;
        } else {
            self.velocity.y += GRAVITY * dt;
            if input.jump && self.on_ground {
                self.velocity.y = JUMP_VELOCITY;
                self.on_ground = false;
            }
            horizontal_speed = MOVE_SPEED;
        }

        let wish = wish.normalize_or_zero() * horizontal_speed;
        self.velocity.x = wish.x;
        self.velocity.z = wish.z;

        let displacement = self.velocity * dt;
        let flags = collision::resolve(world, &mut self.position, &mut self.velocity, displacement);
        self.on_ground = flags.on_ground && !self.flying;
    }

    /// Fly toggles on the rising edge of a second jump press inside the
    /// double-tap window.
    fn handle_fly_toggle(&mut self, jump_held: bool, now: f32) {
        let pressed = jump_held && !self.jump_was_held;
        self.jump_was_held = jump_held;
        if !pressed {
            return;
        }
        if let Some(previous) = self.last_jump_press {
            if now - previous < FLY_DOUBLE_TAP_WINDOW {
                self.flying = !self.flying;
                if self.flying {
                    self.velocity.y = 0.0;
                }
                self.last_jump_press = None;
                return;
            }
        }
        self.last_jump_press = Some(now);
    }
}
