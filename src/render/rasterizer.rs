use super::atlas::TextureAtlas;
use super::framebuffer::Framebuffer;
use crate::count_call;
use crate::meshing::Vertex;
use crate::perf::FUNCTION_COUNTERS;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Retained vertex buffers for one uploaded chunk. Owning them in a struct
/// keeps their lifetime tied to the shim's chunk map: when a chunk's upload
/// is replaced or the entry is dropped, the buffers go with it.
pub struct ChunkBuffers {
    pub opaque: Vec<Vertex>,
    pub transparent: Vec<Vertex>,
}

impl ChunkBuffers {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}

/// The ambient floor of the fragment contract: brightness never drops below
/// this even at light level zero.
const AMBIENT_BRIGHTNESS: f32 = 0.05;
/// Fragments more transparent than this are discarded outright.
const ALPHA_DISCARD: f32 = 0.1;

#[derive(Copy, Clone)]
struct ScreenVertex {
    screen: Vec2,
    depth: f32,
    uv: Vec2,
    light: f32,
}

/// Minimal depth-tested triangle rasterizer over the engine's vertex
/// streams. Triangles arrive as consecutive vertex triples in chunk-local
/// space; the chunk origin translates them into the world, mirroring the
/// per-chunk model matrix of a GL draw call.
pub struct Rasterizer {
    pub atlas: TextureAtlas,
    pub backface_culling: bool,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            atlas: TextureAtlas::default(),
            backface_culling: true,
        }
    }

    /// Draw one vertex stream. `depth_write` is disabled for the
    /// transparent pass; `blend` turns on source-over blending.
    pub fn draw_stream(
        &self,
        fb: &mut Framebuffer,
        vertices: &[Vertex],
        chunk_origin: Vec3,
        view_proj: &Mat4,
        depth_write: bool,
        blend: bool,
    ) {
        if fb.width == 0 || fb.height == 0 {
            return;
        }
        for triangle in vertices.chunks_exact(3) {
            self.draw_triangle(fb, triangle, chunk_origin, view_proj, depth_write, blend);
        }
    }

    fn draw_triangle(
        &self,
        fb: &mut Framebuffer,
        triangle: &[Vertex],
        chunk_origin: Vec3,
        view_proj: &Mat4,
        depth_write: bool,
        blend: bool,
    ) {
        count_call!(FUNCTION_COUNTERS.render_triangle_calls);

        let mut projected = [None::<ScreenVertex>; 3];
        for (slot, vertex) in projected.iter_mut().zip(triangle) {
            *slot = project(vertex, chunk_origin, view_proj, fb.width, fb.height);
        }
        // Near-plane clipping is reduced to rejection; chunk geometry is
        // small enough that partially-behind triangles vanish for one frame
        // at most.
        let [Some(a), Some(b), Some(c)] = projected else {
            count_call!(FUNCTION_COUNTERS.render_triangle_culled);
            return;
        };

        // Screen space has y flipped, so outward-wound front faces come out
        // with negative signed area here.
        let area = edge(a.screen, b.screen, c.screen);
        if self.backface_culling && area >= 0.0 {
            count_call!(FUNCTION_COUNTERS.render_triangle_culled);
            return;
        }
        if area.abs() < 1e-8 {
            return;
        }
        let inv_area = 1.0 / area;

        let min_x = a.screen.x.min(b.screen.x).min(c.screen.x).floor().max(0.0) as usize;
        let max_x = (a.screen.x.max(b.screen.x).max(c.screen.x).ceil() as usize)
            .min(fb.width.saturating_sub(1));
        let min_y = a.screen.y.min(b.screen.y).min(c.screen.y).floor().max(0.0) as usize;
        let max_y = (a.screen.y.max(b.screen.y).max(c.screen.y).ceil() as usize)
            .min(fb.height.saturating_sub(1));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.screen, c.screen, point) * inv_area;
                let w1 = edge(c.screen, a.screen, point) * inv_area;
                let w2 = edge(a.screen, b.screen, point) * inv_area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                count_call!(FUNCTION_COUNTERS.set_pixel_attempts);
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                let index = fb.index(x, y);
                if depth >= fb.depth[index] {
                    count_call!(FUNCTION_COUNTERS.set_pixel_depth_failed);
                    continue;
                }
                count_call!(FUNCTION_COUNTERS.set_pixel_depth_passed);

                let uv = a.uv * w0 + b.uv * w1 + c.uv * w2;
                let texel = self.atlas.sample(uv.x, uv.y);
                let alpha = (texel >> 24) as f32 / 255.0;
                if alpha < ALPHA_DISCARD {
                    continue;
                }

                let light = w0 * a.light + w1 * b.light + w2 * c.light;
                let brightness = light.max(AMBIENT_BRIGHTNESS);
                let lit = modulate(texel, brightness);

                fb.color[index] = if blend && alpha < 1.0 {
                    blend_over(lit, fb.color[index], alpha)
                } else {
                    lit
                };
                if depth_write {
                    fb.depth[index] = depth;
                }
            }
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn project(
    vertex: &Vertex,
    chunk_origin: Vec3,
    view_proj: &Mat4,
    width: usize,
    height: usize,
) -> Option<ScreenVertex> {
    let world = chunk_origin + Vec3::from(vertex.position);
    let clip: Vec4 = *view_proj * world.extend(1.0);
    if clip.w <= 1e-3 {
        return None;
    }
    let ndc = clip / clip.w;
    Some(ScreenVertex {
        screen: Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        ),
        depth: ndc.z,
        uv: Vec2::from(vertex.uv),
        light: vertex.light,
    })
}

#[inline]
fn edge(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x)
}

/// Multiply the RGB channels by a brightness factor, keeping alpha.
#[inline]
fn modulate(texel: u32, brightness: f32) -> u32 {
    let r = ((texel >> 16) & 0xFF) as f32 * brightness;
    let g = ((texel >> 8) & 0xFF) as f32 * brightness;
    let b = (texel & 0xFF) as f32 * brightness;
    (texel & 0xFF00_0000) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Source-over blend of `src` onto `dst` with the given source alpha.
#[inline]
fn blend_over(src: u32, dst: u32, alpha: f32) -> u32 {
    let inv = 1.0 - alpha;
    let channel = |shift: u32| {
        let s = ((src >> shift) & 0xFF) as f32;
        let d = ((dst >> shift) & 0xFF) as f32;
        ((s * alpha + d * inv) as u32) << shift
    };
    0xFF00_0000 | channel(16) | channel(8) | channel(0)
}
