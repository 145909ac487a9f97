use super::mesh::{atlas, ChunkMeshData, FaceDir, Vertex};
use crate::perf::FUNCTION_COUNTERS;
use crate::{count_add, count_call};
use crate::voxel::{BlockKind, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, MAX_LIGHT};
use crate::world::World;
use glam::IVec2;
use glam::IVec3;

/// How far the exposed surface of a water column sinks below the cell top.
const WATER_SURFACE_DROP: f32 = 0.2;

#[derive(Copy, Clone, Debug)]
pub struct MesherConfig {
    /// Also emit the water top with reversed winding so it is visible from
    /// below. One source revision did this; the canonical mesh is
    /// single-sided.
    pub double_sided_water_top: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            double_sided_water_top: false,
        }
    }
}

/// Face-culling mesher.
///
/// Walks every voxel of one chunk and emits a quad for each face whose
/// neighbour does not occlude it, reading neighbours through the store so
/// chunk borders resolve correctly (absent chunks read as sky-lit air).
/// Opaque faces and water faces go to separate streams; each face carries
/// the light of the cell it looks into.
pub struct CulledMesher;

impl CulledMesher {
    pub fn mesh_chunk(world: &World, coord: IVec2, config: &MesherConfig) -> ChunkMeshData {
        count_call!(FUNCTION_COUNTERS.mesh_chunk_calls);

        let mut mesh = ChunkMeshData::new();
        let Some(chunk) = world.chunk(coord) else {
            return mesh;
        };
        let origin = chunk.origin();

        for lx in 0..CHUNK_SIZE_X {
            for ly in 0..CHUNK_HEIGHT {
                for lz in 0..CHUNK_SIZE_Z {
                    let kind = chunk.block(lx, ly, lz);
                    if kind.is_air() {
                        continue;
                    }

                    let world_pos = origin + IVec3::new(lx as i32, ly as i32, lz as i32);
                    let local = [lx as f32, ly as f32, lz as f32];
                    let sunken = kind == BlockKind::Water
                        && world.get_block(world_pos + IVec3::Y).is_air();

                    for face in FaceDir::ALL {
                        let neighbour_pos = world_pos + face.offset();
                        let neighbour = world.get_block(neighbour_pos);

                        let visible = if kind == BlockKind::Water {
                            // Water only hides faces against other water, so
                            // surfaces against air and solids still draw.
                            neighbour != BlockKind::Water
                        } else {
                            neighbour.is_transparent()
                        };
                        if !visible {
                            continue;
                        }

                        let light = world.get_light(neighbour_pos) as f32 / MAX_LIGHT as f32;
                        let quad = build_face(local, face, kind, light, sunken);

                        if kind == BlockKind::Water {
                            push_quad(&mut mesh.transparent, &quad);
                            if face == FaceDir::PosY && config.double_sided_water_top {
                                push_quad_reversed(&mut mesh.transparent, &quad);
                            }
                        } else {
                            push_quad(&mut mesh.opaque, &quad);
                        }
                    }
                }
            }
        }

        count_add!(
            FUNCTION_COUNTERS.faces_emitted,
            ((mesh.opaque.len() + mesh.transparent.len()) / 6) as u64
        );
        mesh
    }
}

/// Atlas tile for a block face. Grass is the only kind with per-face tiles.
#[inline]
fn tile_for(kind: BlockKind, face: FaceDir) -> usize {
    match kind {
        BlockKind::Stone => atlas::STONE,
        BlockKind::Dirt => atlas::DIRT,
        BlockKind::Grass => match face {
            FaceDir::PosY => atlas::GRASS_TOP,
            FaceDir::NegY => atlas::DIRT,
            _ => atlas::GRASS_SIDE,
        },
        BlockKind::Water => atlas::WATER,
        BlockKind::Air => unreachable!("air emits no faces"),
    }
}

/// Build the four vertices of one face quad.
#[inline]
fn build_face(
    local: [f32; 3],
    face: FaceDir,
    kind: BlockKind,
    light: f32,
    sunken: bool,
) -> [Vertex; 4] {
    let u0 = tile_for(kind, face) as f32 * atlas::TILE_WIDTH;
    let u1 = u0 + atlas::TILE_WIDTH;
    let uvs = [[u0, 0.0], [u1, 0.0], [u1, 1.0], [u0, 1.0]];

    let corners = face.corners();
    std::array::from_fn(|i| {
        let corner = corners[i];
        let mut y = local[1] + corner[1];
        // Exposed water surface sits a little below the cell top.
        if sunken && corner[1] == 1.0 {
            y -= WATER_SURFACE_DROP;
        }
        Vertex::new(
            [local[0] + corner[0], y, local[2] + corner[2]],
            uvs[i],
            light,
        )
    })
}

#[inline]
fn push_quad(stream: &mut Vec<Vertex>, quad: &[Vertex; 4]) {
    stream.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
}

#[inline]
fn push_quad_reversed(stream: &mut Vec<Vertex>, quad: &[Vertex; 4]) {
    stream.extend_from_slice(&[quad[0], quad[2], quad[1], quad[0], quad[3], quad[2]]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Chunk;

    fn world_with_block(pos: IVec3, kind: BlockKind) -> World {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        world.set_block(pos, kind);
        world
    }

    #[test]
    fn lone_stone_block_emits_six_opaque_faces() {
        let world = world_with_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        assert_eq!(mesh.opaque.len(), 6 * 6);
        assert!(mesh.transparent.is_empty());
    }

    #[test]
    fn buried_faces_are_culled() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        // Two stone blocks sharing a face: 12 faces minus the shared pair.
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        world.set_block(IVec3::new(5, 10, 4), BlockKind::Stone);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        assert_eq!(mesh.opaque.len(), 10 * 6);
    }

    #[test]
    fn water_hides_faces_only_against_water() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Water);
        world.set_block(IVec3::new(5, 10, 4), BlockKind::Water);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        // 12 faces minus the internal water pair; all in the transparent
        // stream.
        assert!(mesh.opaque.is_empty());
        assert_eq!(mesh.transparent.len(), 10 * 6);
    }

    #[test]
    fn solid_against_water_still_draws_its_side() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        world.set_block(IVec3::new(5, 10, 4), BlockKind::Water);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        // Stone keeps all 6 faces (water neighbour is transparent); water
        // draws its 6 too, including the boundary against stone.
        assert_eq!(mesh.opaque.len(), 6 * 6);
        assert_eq!(mesh.transparent.len(), 6 * 6);
    }

    #[test]
    fn exposed_water_surface_is_sunken() {
        let world = world_with_block(IVec3::new(4, 10, 4), BlockKind::Water);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());

        let max_y = mesh
            .transparent
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((max_y - 10.8).abs() < 1e-6, "water top should drop by 0.2");
        // No vertex may remain at the undropped cell top.
        assert!(mesh.transparent.iter().all(|v| v.position[1] < 11.0));
    }

    #[test]
    fn submerged_water_keeps_a_flat_top() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Water);
        world.set_block(IVec3::new(4, 11, 4), BlockKind::Water);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        // The lower cell has water above: its side faces keep y = 11.0.
        assert!(mesh
            .transparent
            .iter()
            .any(|v| (v.position[1] - 11.0).abs() < 1e-6));
    }

    #[test]
    fn face_light_comes_from_the_neighbour_cell() {
        let mut world = world_with_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        world.set_light(IVec3::new(5, 10, 4), 10);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());

        // The +x face (every vertex on the x = 5 plane) carries the +x
        // neighbour's light.
        let expected = 10.0 / 15.0;
        let face_verts: Vec<&Vertex> = mesh
            .opaque
            .chunks(3)
            .filter(|tri| tri.iter().all(|v| v.position[0] == 5.0))
            .flatten()
            .collect();
        assert_eq!(face_verts.len(), 6);
        for vertex in face_verts {
            assert!((vertex.light - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn grass_uses_distinct_tiles_per_face() {
        let world = world_with_block(IVec3::new(4, 10, 4), BlockKind::Grass);
        let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());

        // Identify each quad's tile from the minimum u of its six vertices.
        let tiles: std::collections::HashSet<usize> = mesh
            .opaque
            .chunks(6)
            .map(|quad| {
                let u0 = quad.iter().map(|v| v.uv[0]).fold(f32::MAX, f32::min);
                (u0 * atlas::ATLAS_TILES as f32).round() as usize
            })
            .collect();
        // Top, bottom (dirt) and side tiles all appear.
        assert!(tiles.contains(&atlas::GRASS_TOP));
        assert!(tiles.contains(&atlas::DIRT));
        assert!(tiles.contains(&atlas::GRASS_SIDE));
    }

    #[test]
    fn double_sided_water_top_doubles_only_the_top() {
        let world = world_with_block(IVec3::new(4, 10, 4), BlockKind::Water);
        let single = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
        let double = CulledMesher::mesh_chunk(
            &world,
            IVec2::ZERO,
            &MesherConfig {
                double_sided_water_top: true,
            },
        );
        assert_eq!(double.transparent.len(), single.transparent.len() + 6);
    }
}
