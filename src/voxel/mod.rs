/// Core voxel data: the block taxonomy and the chunk column it lives in.
pub mod block;
pub mod chunk;

pub use block::{BlockKind, BLOCK_KIND_COUNT};
pub use chunk::{
    Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, CHUNK_VOLUME, MAX_LIGHT,
};
