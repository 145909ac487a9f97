/// Chunk store: owns the grid of chunk columns and resolves
/// world -> chunk -> local addressing for every other system.
pub mod terrain;

use crate::voxel::{BlockKind, Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, MAX_LIGHT};
use glam::{IVec2, IVec3};
use rayon::prelude::*;
use std::collections::HashMap;

/// Side length of the resident chunk grid; columns span -12..12 on both axes.
pub const WORLD_SIZE_IN_CHUNKS: i32 = 24;

/// The resident set of chunk columns, keyed by (x, z) chunk coordinate.
///
/// A column absent from the store is semantically Air with full sky light, so
/// meshing and lighting at the world edge behave predictably. All voxel and
/// light mutation funnels through here; concurrent readers (mesher jobs,
/// collision, raycast) share the store behind a single RwLock owned by the
/// engine.
pub struct World {
    chunks: HashMap<IVec2, Chunk>,
}

/// Decompose a world x/z into (chunk coordinate, local offset).
#[inline]
pub fn world_to_chunk(wx: i32, wz: i32) -> (IVec2, usize, usize) {
    let chunk = IVec2::new(
        wx.div_euclid(CHUNK_SIZE_X as i32),
        wz.div_euclid(CHUNK_SIZE_Z as i32),
    );
    (
        chunk,
        wx.rem_euclid(CHUNK_SIZE_X as i32) as usize,
        wz.rem_euclid(CHUNK_SIZE_Z as i32) as usize,
    )
}

/// Recompose a chunk coordinate and local offset back into world x/z.
#[inline]
pub fn chunk_to_world(chunk: IVec2, lx: usize, lz: usize) -> (i32, i32) {
    (
        chunk.x * CHUNK_SIZE_X as i32 + lx as i32,
        chunk.y * CHUNK_SIZE_Z as i32 + lz as i32,
    )
}

impl World {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
        }
    }

    /// Generate the full resident grid from terrain noise.
    /// Columns are independent, so generation fans out across rayon workers.
    pub fn generate(seed: u32) -> Self {
        let generator = terrain::TerrainGenerator::new(seed);
        let half = WORLD_SIZE_IN_CHUNKS / 2;

        let coords: Vec<IVec2> = (-half..half)
            .flat_map(|x| (-half..half).map(move |z| IVec2::new(x, z)))
            .collect();

        let chunks: HashMap<IVec2, Chunk> = coords
            .into_par_iter()
            .map(|coord| (coord, generator.generate_chunk(coord)))
            .collect();

        log::info!("generated {} chunk columns", chunks.len());
        Self { chunks }
    }

    pub fn insert_chunk(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.coord, chunk);
    }

    #[inline]
    pub fn contains_chunk(&self, coord: IVec2) -> bool {
        self.chunks.contains_key(&coord)
    }

    #[inline]
    pub fn chunk(&self, coord: IVec2) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn chunk_mut(&mut self, coord: IVec2) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_coords(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.chunks.keys().copied()
    }

    /// True when `pos` addresses a resident voxel (in height range, chunk
    /// present). Out-of-store positions read as Air and refuse writes.
    #[inline]
    pub fn contains_pos(&self, pos: IVec3) -> bool {
        if pos.y < 0 || pos.y >= CHUNK_HEIGHT as i32 {
            return false;
        }
        let (coord, _, _) = world_to_chunk(pos.x, pos.z);
        self.chunks.contains_key(&coord)
    }

    /// Voxel lookup; Air when the height is out of range or the chunk is
    /// absent.
    #[inline]
    pub fn get_block(&self, pos: IVec3) -> BlockKind {
        if pos.y < 0 || pos.y >= CHUNK_HEIGHT as i32 {
            return BlockKind::Air;
        }
        let (coord, lx, lz) = world_to_chunk(pos.x, pos.z);
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.block(lx, pos.y as usize, lz),
            None => BlockKind::Air,
        }
    }

    /// Write a voxel. Returns the previous kind when the write actually
    /// changed something; `None` when out of bounds, chunk absent, or the
    /// value was already `kind` (in which case nothing is dirtied).
    ///
    /// Dirties the owning chunk, and each face-adjacent chunk when the edited
    /// voxel sits on that chunk's border. The caller is responsible for
    /// running the lighting edit protocol with the returned previous kind
    /// before the chunk is allowed to remesh.
    pub fn set_block(&mut self, pos: IVec3, kind: BlockKind) -> Option<BlockKind> {
        if pos.y < 0 || pos.y >= CHUNK_HEIGHT as i32 {
            return None;
        }
        let (coord, lx, lz) = world_to_chunk(pos.x, pos.z);
        let ly = pos.y as usize;

        let previous = {
            let chunk = self.chunks.get_mut(&coord)?;
            let previous = chunk.block(lx, ly, lz);
            if previous == kind {
                return None;
            }
            chunk.set_block(lx, ly, lz, kind);
            chunk.dirty_mesh = true;
            previous
        };

        if lx == 0 {
            self.mark_dirty(coord + IVec2::NEG_X);
        }
        if lx == CHUNK_SIZE_X - 1 {
            self.mark_dirty(coord + IVec2::X);
        }
        if lz == 0 {
            self.mark_dirty(coord + IVec2::NEG_Y);
        }
        if lz == CHUNK_SIZE_Z - 1 {
            self.mark_dirty(coord + IVec2::Y);
        }

        Some(previous)
    }

    /// Light lookup. Above the world and over absent chunks this reads full
    /// sky light; below the world it reads darkness so nothing leaks up from
    /// the void.
    #[inline]
    pub fn get_light(&self, pos: IVec3) -> u8 {
        if pos.y >= CHUNK_HEIGHT as i32 {
            return MAX_LIGHT;
        }
        if pos.y < 0 {
            return 0;
        }
        let (coord, lx, lz) = world_to_chunk(pos.x, pos.z);
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.light(lx, pos.y as usize, lz),
            None => MAX_LIGHT,
        }
    }

    /// Write a light level (clamped to 0..=15). A write that changes the
    /// stored value marks the owning chunk dirty; out-of-store writes no-op.
    pub fn set_light(&mut self, pos: IVec3, level: u8) {
        if pos.y < 0 || pos.y >= CHUNK_HEIGHT as i32 {
            return;
        }
        let (coord, lx, lz) = world_to_chunk(pos.x, pos.z);
        let ly = pos.y as usize;
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            let level = level.min(MAX_LIGHT);
            if chunk.light(lx, ly, lz) != level {
                chunk.set_light(lx, ly, lz, level);
                chunk.dirty_mesh = true;
            }
        }
    }

    pub fn mark_dirty(&mut self, coord: IVec2) {
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.dirty_mesh = true;
        }
    }

    /// Chunks awaiting a remesh and not already being built.
    pub fn iter_dirty(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.chunks
            .values()
            .filter(|chunk| chunk.dirty_mesh && !chunk.building)
            .map(|chunk| chunk.coord)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
