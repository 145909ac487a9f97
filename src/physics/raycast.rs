use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;
use crate::voxel::BlockKind;
use crate::world::World;
use glam::{IVec3, Vec3};

/// How many cells a pick ray may traverse before giving up.
pub const MAX_RAY_STEPS: usize = 100;

/// Result of a successful pick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// The first non-air cell the ray entered.
    pub block: IVec3,
    /// The cell the ray came from, i.e. the face neighbour of `block` on the
    /// entry side. Right-click placement targets this cell.
    pub adjacent: IVec3,
}

/// Amanatides-Woo DDA traversal over the voxel grid.
///
/// Walks cell by cell along `direction` from `origin`, always crossing the
/// nearest axis boundary next, and stops at the first non-air voxel within
/// [`MAX_RAY_STEPS`].
pub fn raycast(world: &World, origin: Vec3, direction: Vec3) -> Option<RayHit> {
    if direction.length_squared() < 1e-4 {
        return None;
    }

    let mut current = origin.floor().as_ivec3();
    let step = IVec3::new(
        direction.x.signum() as i32,
        direction.y.signum() as i32,
        direction.z.signum() as i32,
    );

    let t_delta = Vec3::ONE / direction.abs();
    let mut t_max = Vec3::new(
        axis_t_max(origin.x, current.x, direction.x, t_delta.x),
        axis_t_max(origin.y, current.y, direction.y, t_delta.y),
        axis_t_max(origin.z, current.z, direction.z, t_delta.z),
    );

    for _ in 0..MAX_RAY_STEPS {
        count_call!(FUNCTION_COUNTERS.raycast_steps);
        let last = current;

        if t_max.x < t_max.y {
            if t_max.x < t_max.z {
                current.x += step.x;
                t_max.x += t_delta.x;
            } else {
                current.z += step.z;
                t_max.z += t_delta.z;
            }
        } else if t_max.y < t_max.z {
            current.y += step.y;
            t_max.y += t_delta.y;
        } else {
            current.z += step.z;
            t_max.z += t_delta.z;
        }

        if world.get_block(current) != BlockKind::Air {
            return Some(RayHit {
                block: current,
                adjacent: last,
            });
        }
    }

    None
}

/// Parametric distance to the first boundary crossing on one axis.
#[inline]
fn axis_t_max(origin: f32, cell: i32, direction: f32, t_delta: f32) -> f32 {
    if direction == 0.0 {
        return f32::INFINITY;
    }
    if direction > 0.0 {
        (cell as f32 + 1.0 - origin) * t_delta
    } else {
        (origin - cell as f32) * t_delta
    }
}
