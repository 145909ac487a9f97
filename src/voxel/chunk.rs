use super::block::BlockKind;
use glam::IVec2;

/// Horizontal footprint of a chunk column in blocks.
pub const CHUNK_SIZE_X: usize = 16;
pub const CHUNK_SIZE_Z: usize = 16;
/// Full world height; the y dimension is collapsed into the column.
pub const CHUNK_HEIGHT: usize = 128;
/// Total number of voxels in one column.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_HEIGHT * CHUNK_SIZE_Z;

/// Full-daylight level; the light field is a single 0..=15 scalar.
pub const MAX_LIGHT: u8 = 15;

/// A 16x128x16 column of voxels plus its parallel light field.
///
/// Blocks and light live in boxed flat arrays indexed (y, z, x) so a
/// horizontal sweep at fixed height stays cache-friendly. The two flags drive
/// the mesh pipeline: `dirty_mesh` means voxel or light state changed since
/// the last meshing, `building` means a mesher job is currently in flight.
pub struct Chunk {
    pub coord: IVec2,
    blocks: Box<[BlockKind]>,
    light: Box<[u8]>,
    pub dirty_mesh: bool,
    pub building: bool,
}

#[inline]
const fn index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_SIZE_Z + z) * CHUNK_SIZE_X + x
}

impl Chunk {
    /// Create an all-air, unlit column.
    pub fn new(coord: IVec2) -> Self {
        Self {
            coord,
            blocks: vec![BlockKind::Air; CHUNK_VOLUME].into_boxed_slice(),
            light: vec![0u8; CHUNK_VOLUME].into_boxed_slice(),
            dirty_mesh: true,
            building: false,
        }
    }

    /// Create a column filled with a single block kind (tests and benches).
    pub fn filled(coord: IVec2, kind: BlockKind) -> Self {
        let mut chunk = Self::new(coord);
        chunk.blocks.fill(kind);
        chunk
    }

    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockKind {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_HEIGHT && z < CHUNK_SIZE_Z);
        self.blocks[index(x, y, z)]
    }

    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, kind: BlockKind) {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_HEIGHT && z < CHUNK_SIZE_Z);
        self.blocks[index(x, y, z)] = kind;
    }

    #[inline]
    pub fn light(&self, x: usize, y: usize, z: usize) -> u8 {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_HEIGHT && z < CHUNK_SIZE_Z);
        self.light[index(x, y, z)]
    }

    #[inline]
    pub fn set_light(&mut self, x: usize, y: usize, z: usize, level: u8) {
        debug_assert!(x < CHUNK_SIZE_X && y < CHUNK_HEIGHT && z < CHUNK_SIZE_Z);
        self.light[index(x, y, z)] = level.min(MAX_LIGHT);
    }

    /// World-space position of the column's (0, 0, 0) corner.
    #[inline]
    pub fn origin(&self) -> glam::IVec3 {
        glam::IVec3::new(
            self.coord.x * CHUNK_SIZE_X as i32,
            0,
            self.coord.y * CHUNK_SIZE_Z as i32,
        )
    }
}
