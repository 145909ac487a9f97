/// CPU stand-in for the GL device: a depth-buffered framebuffer, a
/// procedural texture atlas and a small triangle rasterizer that honours the
/// engine's fragment contract. The simulation core never depends on this
/// module; it only consumes the vertex streams the core hands out.
pub mod atlas;
pub mod framebuffer;
pub mod rasterizer;

pub use atlas::TextureAtlas;
pub use framebuffer::Framebuffer;
pub use rasterizer::{ChunkBuffers, Rasterizer};
