/// Integration tests for the mesher: face-count parity against neighbouring
/// chunks and the water surface rules.
use cubecraft::{
    BlockKind, Chunk, CulledMesher, MesherConfig, World, CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z,
};
use glam::{IVec2, IVec3};

/// Count triangles whose three vertices all lie on one axis plane.
fn triangles_on_plane(vertices: &[cubecraft::Vertex], axis: usize, value: f32) -> usize {
    vertices
        .chunks(3)
        .filter(|tri| tri.iter().all(|v| (v.position[axis] - value).abs() < 1e-6))
        .count()
}

// Property: a solid chunk exposed on exactly one side emits the full face
// plane there, the sky-facing top and bottom planes, and nothing interior.
#[test]
fn face_count_parity_for_a_solid_chunk() {
    let mut world = World::new();
    world.insert_chunk(Chunk::filled(IVec2::ZERO, BlockKind::Stone));
    // Stone on -x and both z sides, air chunk on +x.
    world.insert_chunk(Chunk::filled(IVec2::new(-1, 0), BlockKind::Stone));
    world.insert_chunk(Chunk::filled(IVec2::new(0, -1), BlockKind::Stone));
    world.insert_chunk(Chunk::filled(IVec2::new(0, 1), BlockKind::Stone));
    world.insert_chunk(Chunk::new(IVec2::new(1, 0)));

    let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
    assert!(mesh.transparent.is_empty());

    let side_quads = CHUNK_SIZE_Z * CHUNK_HEIGHT;
    let cap_quads = CHUNK_SIZE_X * CHUNK_SIZE_Z;

    // The exposed +x plane is complete.
    assert_eq!(
        triangles_on_plane(&mesh.opaque, 0, CHUNK_SIZE_X as f32),
        side_quads * 2
    );
    // Above-world and below-world neighbours read as air, so the caps emit.
    assert_eq!(
        triangles_on_plane(&mesh.opaque, 1, CHUNK_HEIGHT as f32),
        cap_quads * 2
    );
    assert_eq!(triangles_on_plane(&mesh.opaque, 1, 0.0), cap_quads * 2);
    // Occluded sides emit nothing.
    assert_eq!(triangles_on_plane(&mesh.opaque, 0, 0.0), 0);
    assert_eq!(triangles_on_plane(&mesh.opaque, 2, 0.0), 0);
    assert_eq!(triangles_on_plane(&mesh.opaque, 2, CHUNK_SIZE_Z as f32), 0);

    // And nothing interior: the three visible planes account for the whole
    // stream.
    let total = mesh.opaque.len() / 3;
    assert_eq!(total, side_quads * 2 + cap_quads * 4);
}

// Property: a lone water voxel is all transparent-stream, six faces, with a
// sunken top.
#[test]
fn lone_water_voxel_emits_six_sunken_faces() {
    let mut world = World::new();
    world.insert_chunk(Chunk::new(IVec2::ZERO));
    world.set_block(IVec3::new(8, 40, 8), BlockKind::Water);

    let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());

    assert!(mesh.opaque.is_empty());
    assert_eq!(mesh.transparent.len(), 6 * 6, "six faces, two triangles each");

    // Every top corner dropped by 0.2; the cell-top plane is empty.
    let top = 41.0 - 0.2;
    assert!(mesh
        .transparent
        .iter()
        .any(|v| (v.position[1] - top).abs() < 1e-6));
    assert!(mesh.transparent.iter().all(|v| v.position[1] < 41.0));
}

#[test]
fn chunk_border_faces_use_the_neighbour_chunk() {
    let mut world = World::new();
    world.insert_chunk(Chunk::new(IVec2::ZERO));
    world.insert_chunk(Chunk::new(IVec2::new(1, 0)));
    // A block on the +x border of chunk (0,0) and its neighbour across the
    // seam in chunk (1,0).
    world.set_block(IVec3::new(15, 40, 8), BlockKind::Stone);
    world.set_block(IVec3::new(16, 40, 8), BlockKind::Stone);

    let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
    // The +x face at the seam is culled by the neighbouring chunk's block.
    assert_eq!(triangles_on_plane(&mesh.opaque, 0, 16.0), 0);
    assert_eq!(mesh.opaque.len(), 5 * 6);
}

#[test]
fn mesh_light_reflects_the_stored_field() {
    let mut world = World::new();
    world.insert_chunk(Chunk::new(IVec2::ZERO));
    world.set_block(IVec3::new(8, 40, 8), BlockKind::Stone);
    world.set_light(IVec3::new(8, 41, 8), 12);

    let mesh = CulledMesher::mesh_chunk(&world, IVec2::ZERO, &MesherConfig::default());
    let top_light: Vec<f32> = mesh
        .opaque
        .chunks(3)
        .filter(|tri| tri.iter().all(|v| (v.position[1] - 41.0).abs() < 1e-6))
        .flat_map(|tri| tri.iter().map(|v| v.light))
        .collect();

    assert!(!top_light.is_empty());
    for light in top_light {
        assert!((light - 12.0 / 15.0).abs() < 1e-6);
    }
}
