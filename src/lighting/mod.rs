/// Flood-fill lighting engine.
///
/// Maintains the single 0..=15 light channel: sky columns seed level 15,
/// light decays by one per cell through the 6-neighbourhood, and opaque cells
/// never hold light. Block edits run the incremental update protocol
/// synchronously so mesher jobs dispatched in the same tick always see the
/// post-edit field.
use crate::count_add;
use crate::perf::FUNCTION_COUNTERS;
use crate::voxel::{BlockKind, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, MAX_LIGHT};
use crate::world::World;
use glam::{IVec2, IVec3};
use std::collections::VecDeque;

/// One unit of flood-fill work. In the propagation queue `level` is the
/// level already written at `pos`; in the removal queue it is the level the
/// cell held before it was cleared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightNode {
    pub pos: IVec3,
    pub level: u8,
}

/// How many queue pops the initial sky fill may spend per tick. The startup
/// queue covers the whole resident grid, so it drains across frames instead
/// of stalling the first one.
pub const INITIAL_DRAIN_BUDGET: usize = 20_000;

const NEIGHBORS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

pub struct LightEngine {
    /// Startup sky seeds, drained with a per-tick budget.
    initial: VecDeque<LightNode>,
    /// Edit-driven propagation; always drained to empty before returning.
    propagation: VecDeque<LightNode>,
    /// Darkening queue; drains into `propagation` for the refill pass.
    removal: VecDeque<LightNode>,
}

impl LightEngine {
    pub fn new() -> Self {
        Self {
            initial: VecDeque::new(),
            propagation: VecDeque::new(),
            removal: VecDeque::new(),
        }
    }

    /// Sky seeding after world generation. Every column is walked from the
    /// top: transparent cells get level 15 until the first opaque cell stops
    /// the sky. Cells bordering shadowed volume become seeds for the
    /// budgeted flood fill; interior sky cells already sit at their final
    /// value and would propagate nothing, so they are not queued.
    pub fn seed_initial(&mut self, world: &mut World) {
        let coords: Vec<IVec2> = world.chunk_coords().collect();

        for coord in &coords {
            if let Some(chunk) = world.chunk_mut(*coord) {
                for lx in 0..CHUNK_SIZE_X {
                    for lz in 0..CHUNK_SIZE_Z {
                        for ly in (0..CHUNK_HEIGHT).rev() {
                            if !chunk.block(lx, ly, lz).is_transparent() {
                                break;
                            }
                            chunk.set_light(lx, ly, lz, MAX_LIGHT);
                        }
                    }
                }
                chunk.dirty_mesh = true;
            }
        }

        for coord in &coords {
            let origin = IVec3::new(
                coord.x * CHUNK_SIZE_X as i32,
                0,
                coord.y * CHUNK_SIZE_Z as i32,
            );
            for lx in 0..CHUNK_SIZE_X {
                for lz in 0..CHUNK_SIZE_Z {
                    for ly in (0..CHUNK_HEIGHT).rev() {
                        let pos = origin + IVec3::new(lx as i32, ly as i32, lz as i32);
                        if !world.get_block(pos).is_transparent() {
                            break;
                        }
                        if self.borders_shadow(world, pos) {
                            self.initial.push_back(LightNode {
                                pos,
                                level: MAX_LIGHT,
                            });
                        }
                    }
                }
            }
        }

        log::info!("sky seeding queued {} frontier nodes", self.initial.len());
    }

    /// A sky-lit cell is a useful seed only if some neighbour can still
    /// accept light from it.
    fn borders_shadow(&self, world: &World, pos: IVec3) -> bool {
        NEIGHBORS.iter().any(|offset| {
            let q = pos + *offset;
            q.y >= 0
                && q.y < CHUNK_HEIGHT as i32
                && world.get_block(q).is_transparent()
                && world.get_light(q) + 1 < MAX_LIGHT
        })
    }

    /// Nodes still pending from the initial sky fill.
    pub fn initial_pending(&self) -> usize {
        self.initial.len()
    }

    /// Spend up to `budget` pops on the startup queue. Returns pops used.
    pub fn drain_initial(&mut self, world: &mut World, budget: usize) -> usize {
        let mut pops = 0;
        while pops < budget {
            let Some(node) = self.initial.pop_front() else {
                break;
            };
            pops += 1;
            Self::spread(world, node, &mut self.initial);
        }
        count_add!(FUNCTION_COUNTERS.light_propagation_pops, pops as u64);
        pops
    }

    fn drain_initial_all(&mut self, world: &mut World) {
        let mut pops = 0usize;
        while let Some(node) = self.initial.pop_front() {
            pops += 1;
            Self::spread(world, node, &mut self.initial);
        }
        count_add!(FUNCTION_COUNTERS.light_propagation_pops, pops as u64);
        if pops > 0 {
            log::debug!("flushed {pops} pending sky-fill pops before edit");
        }
    }

    /// One propagation step: push `level - 1` into every transparent
    /// neighbour that is currently darker.
    #[inline]
    fn spread(world: &mut World, node: LightNode, queue: &mut VecDeque<LightNode>) {
        if node.level <= 1 {
            return;
        }
        let next = node.level - 1;
        for offset in NEIGHBORS {
            let q = node.pos + offset;
            if q.y < 0 || q.y >= CHUNK_HEIGHT as i32 {
                continue;
            }
            if world.get_block(q).is_transparent() && world.get_light(q) < next {
                world.set_light(q, next);
                queue.push_back(LightNode { pos: q, level: next });
            }
        }
    }

    /// Drain the edit propagation queue to quiescence.
    fn propagate(&mut self, world: &mut World) {
        let mut pops = 0usize;
        while let Some(node) = self.propagation.pop_front() {
            pops += 1;
            Self::spread(world, node, &mut self.propagation);
        }
        count_add!(FUNCTION_COUNTERS.light_propagation_pops, pops as u64);
    }

    /// Drain the removal queue, collecting re-propagation sources, then let
    /// the surviving sources refill the darkened volume.
    fn run_removal(&mut self, world: &mut World) {
        let mut pops = 0usize;
        while let Some(node) = self.removal.pop_front() {
            pops += 1;
            for offset in NEIGHBORS {
                let q = node.pos + offset;
                if q.y < 0 || q.y >= CHUNK_HEIGHT as i32 {
                    continue;
                }
                let level = world.get_light(q);
                if level == 0 {
                    continue;
                }
                if level < node.level {
                    world.set_light(q, 0);
                    self.removal.push_back(LightNode { pos: q, level });
                } else {
                    // Equal or brighter: an independent source survives here
                    // and will re-light the cleared volume.
                    self.propagation.push_back(LightNode { pos: q, level });
                }
            }
        }
        count_add!(FUNCTION_COUNTERS.light_removal_pops, pops as u64);
        self.propagate(world);
    }

    /// Incremental update for a block edit that already happened in the
    /// store. Only transparency changes move light; recolouring dirt to
    /// stone is free.
    pub fn on_block_changed(
        &mut self,
        world: &mut World,
        pos: IVec3,
        previous: BlockKind,
        current: BlockKind,
    ) {
        if previous.is_transparent() == current.is_transparent() {
            return;
        }

        // A pending startup fill would race the edit and overwrite it with
        // stale levels; finish it first so edits always act on settled light.
        self.drain_initial_all(world);

        if current.is_transparent() {
            self.on_cell_opened(world, pos);
        } else {
            self.on_cell_sealed(world, pos);
        }
    }

    /// Opaque -> transparent: the cell either joins a sky column or takes
    /// the strongest neighbour minus one, then floods outwards.
    fn on_cell_opened(&mut self, world: &mut World, pos: IVec3) {
        if column_open_above(world, pos) {
            // Everything above is sky; this cell and the transparent run
            // below it become sky-seeded at full level.
            let mut y = pos.y;
            while y >= 0 {
                let p = IVec3::new(pos.x, y, pos.z);
                if !world.get_block(p).is_transparent() {
                    break;
                }
                world.set_light(p, MAX_LIGHT);
                self.propagation.push_back(LightNode {
                    pos: p,
                    level: MAX_LIGHT,
                });
                y -= 1;
            }
        } else {
            let strongest = NEIGHBORS
                .iter()
                .map(|offset| world.get_light(pos + *offset))
                .max()
                .unwrap_or(0);
            let level = strongest.saturating_sub(1);
            world.set_light(pos, level);
            if level > 1 {
                self.propagation.push_back(LightNode { pos, level });
            }
        }
        self.propagate(world);
    }

    /// Transparent -> opaque: clear the cell, un-seed any sky column it was
    /// feeding below, and run the removal/refill passes.
    fn on_cell_sealed(&mut self, world: &mut World, pos: IVec3) {
        let old_level = world.get_light(pos);
        world.set_light(pos, 0);
        self.removal.push_back(LightNode {
            pos,
            level: old_level,
        });

        if column_open_above(world, pos) {
            // The column below was sky-exposed through this cell. Those
            // cells lose their seed status; queue them at their old level so
            // removal can pull the shaft down to whatever the sides supply.
            let mut y = pos.y - 1;
            while y >= 0 {
                let q = IVec3::new(pos.x, y, pos.z);
                if !(world.get_block(q).is_transparent() && world.get_light(q) == MAX_LIGHT) {
                    break;
                }
                world.set_light(q, 0);
                self.removal.push_back(LightNode {
                    pos: q,
                    level: MAX_LIGHT,
                });
                y -= 1;
            }
        }

        self.run_removal(world);
    }
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// True when every cell strictly above `pos` in its column is transparent.
/// Absent chunks and cells above the world count as open sky.
pub fn column_open_above(world: &World, pos: IVec3) -> bool {
    for y in (pos.y + 1)..CHUNK_HEIGHT as i32 {
        if !world.get_block(IVec3::new(pos.x, y, pos.z)).is_transparent() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Chunk;

    /// 3x3 grid of empty chunks around the origin so edits near (0..16)^2
    /// never fall off the resident set.
    fn empty_world() -> World {
        let mut world = World::new();
        for x in -1..=1 {
            for z in -1..=1 {
                world.insert_chunk(Chunk::new(IVec2::new(x, z)));
            }
        }
        world
    }

    fn seed_and_settle(world: &mut World) -> LightEngine {
        let mut engine = LightEngine::new();
        engine.seed_initial(world);
        while engine.drain_initial(world, 100_000) > 0 {}
        engine
    }

    #[test]
    fn open_world_is_fully_sky_lit() {
        let mut world = empty_world();
        seed_and_settle(&mut world);
        for y in [0, 5, 64, 127] {
            assert_eq!(world.get_light(IVec3::new(8, y, 8)), MAX_LIGHT);
        }
    }

    #[test]
    fn budget_limits_pops_per_call() {
        let mut world = empty_world();
        // Carve a large shadowed pocket so seeding leaves real work queued.
        for x in 0..16 {
            for z in 0..16 {
                world.set_block(IVec3::new(x, 20, z), BlockKind::Stone);
            }
        }
        let mut engine = LightEngine::new();
        engine.seed_initial(&mut world);
        assert!(engine.initial_pending() > 0);

        let used = engine.drain_initial(&mut world, 8);
        assert!(used <= 8);
    }

    #[test]
    fn water_passes_sky_light() {
        let mut world = empty_world();
        for y in 5..=8 {
            world.set_block(IVec3::new(2, y, 2), BlockKind::Water);
        }
        seed_and_settle(&mut world);
        // Transparent water columns stay at full sky light.
        assert_eq!(world.get_light(IVec3::new(2, 5, 2)), MAX_LIGHT);
        assert_eq!(world.get_light(IVec3::new(2, 8, 2)), MAX_LIGHT);
    }

    #[test]
    fn opaque_cells_hold_no_light() {
        let mut world = empty_world();
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        seed_and_settle(&mut world);
        assert_eq!(world.get_light(IVec3::new(4, 10, 4)), 0);
    }

    #[test]
    fn recolouring_without_transparency_change_is_free() {
        let mut world = empty_world();
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        let mut engine = seed_and_settle(&mut world);

        let previous = world.set_block(IVec3::new(4, 10, 4), BlockKind::Dirt).unwrap();
        engine.on_block_changed(&mut world, IVec3::new(4, 10, 4), previous, BlockKind::Dirt);
        assert_eq!(world.get_light(IVec3::new(4, 10, 4)), 0);
        assert_eq!(world.get_light(IVec3::new(4, 11, 4)), MAX_LIGHT);
    }
}
