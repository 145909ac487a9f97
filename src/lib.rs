pub mod camera;
pub mod engine;
pub mod lighting;
pub mod meshing;
pub mod perf;
pub mod physics;
pub mod render;
/// Cubecraft - small voxel sandbox engine.
/// The library is the world simulation and render-data pipeline; the binary
/// is a thin platform shim around `Engine::tick`.
pub mod voxel;
pub mod world;

pub use camera::{Camera, Frustum};
pub use engine::{Engine, Input, MeshUpload, TickOutput};
pub use lighting::{LightEngine, LightNode, INITIAL_DRAIN_BUDGET};
pub use meshing::{atlas, ChunkMeshData, CulledMesher, FaceDir, MeshScheduler, MesherConfig, Vertex};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use physics::{raycast, Aabb, MoveInput, Player, RayHit};
pub use render::{ChunkBuffers, Framebuffer, Rasterizer, TextureAtlas};
pub use voxel::{BlockKind, Chunk, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, MAX_LIGHT};
pub use world::{terrain::TerrainGenerator, World, WORLD_SIZE_IN_CHUNKS};
