use crate::world::World;
use glam::{IVec3, Vec3};

pub const PLAYER_WIDTH: f32 = 0.6;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_EYE_LEVEL: f32 = 1.6;

/// Snap margin that keeps the resolved box strictly outside solid cells.
const EPSILON: f32 = 1e-4;

/// Axis-aligned box, min/max corners in world space.
#[derive(Copy, Clone, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The player box for a given feet position.
    #[inline]
    pub fn player_at(position: Vec3) -> Self {
        let half = PLAYER_WIDTH / 2.0;
        Self {
            min: position - Vec3::new(half, 0.0, half),
            max: position + Vec3::new(half, PLAYER_HEIGHT, half),
        }
    }

    /// The unit box of a voxel cell.
    #[inline]
    pub fn block_at(cell: IVec3) -> Self {
        let min = cell.as_vec3();
        Self {
            min,
            max: min + Vec3::ONE,
        }
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
            && self.max.z > other.min.z
            && self.min.z < other.max.z
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct CollisionFlags {
    pub on_ground: bool,
    pub hit_head: bool,
}

/// Sweep the player box through the voxel grid one axis at a time (x, then
/// z, then y), snapping out of any solid cell the box lands in. Water is not
/// solid and never blocks. Vertical hits zero the vertical velocity; a
/// downward hit reports ground contact.
pub fn resolve(
    world: &World,
    position: &mut Vec3,
    velocity: &mut Vec3,
    displacement: Vec3,
) -> CollisionFlags {
    let mut flags = CollisionFlags::default();
    let half = PLAYER_WIDTH / 2.0;

    position.x += displacement.x;
    let mut player_box = Aabb::player_at(*position);
    for_each_overlapped_solid(world, &mut player_box, |block_box, player_box| {
        if displacement.x > 0.0 {
            position.x = block_box.min.x - half - EPSILON;
        } else if displacement.x < 0.0 {
            position.x = block_box.max.x + half + EPSILON;
        }
        *player_box = Aabb::player_at(*position);
    });

    position.z += displacement.z;
    let mut player_box = Aabb::player_at(*position);
    for_each_overlapped_solid(world, &mut player_box, |block_box, player_box| {
        if displacement.z > 0.0 {
            position.z = block_box.min.z - half - EPSILON;
        } else if displacement.z < 0.0 {
            position.z = block_box.max.z + half + EPSILON;
        }
        *player_box = Aabb::player_at(*position);
    });

    position.y += displacement.y;
    let mut player_box = Aabb::player_at(*position);
    for_each_overlapped_solid(world, &mut player_box, |block_box, player_box| {
        if displacement.y > 0.0 {
            position.y = block_box.min.y - PLAYER_HEIGHT - EPSILON;
            flags.hit_head = true;
            velocity.y = 0.0;
        } else if displacement.y < 0.0 {
            position.y = block_box.max.y;
            flags.on_ground = true;
            velocity.y = 0.0;
        }
        *player_box = Aabb::player_at(*position);
    });

    flags
}

/// Visit every solid cell whose unit box currently overlaps the player box.
/// The callback may move the box; the cell range is fixed up front, matching
/// the per-axis sweep structure.
fn for_each_overlapped_solid<F>(world: &World, player_box: &mut Aabb, mut on_hit: F)
where
    F: FnMut(&Aabb, &mut Aabb),
{
    let min = player_box.min.floor().as_ivec3();
    let max = player_box.max.floor().as_ivec3();

    for y in min.y..=max.y {
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                let cell = IVec3::new(x, y, z);
                if !world.get_block(cell).is_solid() {
                    continue;
                }
                let block_box = Aabb::block_at(cell);
                if player_box.intersects(&block_box) {
                    on_hit(&block_box, player_box);
                }
            }
        }
    }
}
