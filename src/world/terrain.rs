use crate::voxel::{BlockKind, Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use glam::IVec2;
use noise::{NoiseFn, OpenSimplex, Perlin};

/// Water fills terrain up to this height.
pub const SEA_LEVEL: i32 = 8;

const OCTAVES: u32 = 5;
const PERSISTENCE: f64 = 0.5;
const LACUNARITY: f64 = 2.2;
const BASE_FREQUENCY: f64 = 0.1;
const BASE_AMPLITUDE: f64 = 20.0;
const WARP_FREQUENCY: f64 = 0.05;
const WARP_STRENGTH: f64 = 10.0;

// Sampling offset that decorrelates the two warp axes.
const WARP_Z_OFFSET: (f64, f64) = (543.21, -123.45);

/// Deterministic terrain: a multi-octave OpenSimplex height field whose
/// sample coordinates are displaced by a low-frequency Perlin warp, which
/// bends the otherwise blobby simplex ridges into more organic coastlines.
pub struct TerrainGenerator {
    height_noise: OpenSimplex,
    warp_noise: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            height_noise: OpenSimplex::new(seed),
            warp_noise: Perlin::new(seed),
        }
    }

    /// Terrain surface height for a world column.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let x = wx as f64;
        let z = wz as f64;

        let warp_x = self.warp_noise.get([x * WARP_FREQUENCY, z * WARP_FREQUENCY]) * WARP_STRENGTH;
        let warp_z = self.warp_noise.get([
            (x + WARP_Z_OFFSET.0) * WARP_FREQUENCY,
            (z + WARP_Z_OFFSET.1) * WARP_FREQUENCY,
        ]) * WARP_STRENGTH;

        let mut total = 0.0;
        let mut frequency = BASE_FREQUENCY;
        let mut amplitude = BASE_AMPLITUDE;
        for _ in 0..OCTAVES {
            total += self
                .height_noise
                .get([x * frequency + warp_x, z * frequency + warp_z])
                * amplitude;
            amplitude *= PERSISTENCE;
            frequency *= LACUNARITY;
        }

        total.floor() as i32 + SEA_LEVEL
    }

    /// Voxel assignment for a single cell given its column's surface height.
    #[inline]
    pub fn block_for(height: i32, wy: i32) -> BlockKind {
        if wy > height {
            if wy <= SEA_LEVEL {
                BlockKind::Water
            } else {
                BlockKind::Air
            }
        } else if wy == height && wy > SEA_LEVEL {
            BlockKind::Grass
        } else if wy > height - 5 {
            BlockKind::Dirt
        } else {
            BlockKind::Stone
        }
    }

    /// Fill a fresh chunk column. Only the block array is written; the light
    /// field is seeded afterwards by the lighting engine.
    pub fn generate_chunk(&self, coord: IVec2) -> Chunk {
        let mut chunk = Chunk::new(coord);
        let origin = chunk.origin();

        for lx in 0..CHUNK_SIZE_X {
            for lz in 0..CHUNK_SIZE_Z {
                let height =
                    self.surface_height(origin.x + lx as i32, origin.z + lz as i32);
                for ly in 0..CHUNK_HEIGHT {
                    let kind = Self::block_for(height, ly as i32);
                    if kind != BlockKind::Air {
                        chunk.set_block(lx, ly, lz, kind);
                    }
                }
            }
        }

        chunk
    }
}
