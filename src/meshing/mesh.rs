use glam::IVec3;

/// Texture atlas layout: a horizontal strip of 5 tiles.
pub mod atlas {
    pub const STONE: usize = 0;
    pub const DIRT: usize = 1;
    pub const GRASS_TOP: usize = 2;
    pub const GRASS_SIDE: usize = 3;
    pub const WATER: usize = 4;

    pub const ATLAS_TILES: usize = 5;
    pub const TILE_WIDTH: f32 = 1.0 / ATLAS_TILES as f32;
}

/// One mesh vertex as consumed by the shader contract:
/// location 0 = position (chunk-local), 1 = uv, 2 = light in [0, 1].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub light: f32,
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 3], uv: [f32; 2], light: f32) -> Self {
        Self {
            position,
            uv,
            light,
        }
    }
}

/// The six cube faces. The discriminant doubles as an index into the corner
/// and offset tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaceDir {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

// Unit-quad corners per face, wound so the outward normal points at the
// neighbour the face is emitted against. Corner order pairs with the uv
// rectangle (u0,0) (u1,0) (u1,1) (u0,1).
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // PosX
    [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
    // NegX
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    // PosY
    [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    // NegY
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    // PosZ
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    // NegZ
    [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
];

const FACE_OFFSETS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

impl FaceDir {
    pub const ALL: [FaceDir; 6] = [
        FaceDir::PosX,
        FaceDir::NegX,
        FaceDir::PosY,
        FaceDir::NegY,
        FaceDir::PosZ,
        FaceDir::NegZ,
    ];

    /// Offset to the neighbour cell this face looks at.
    #[inline]
    pub const fn offset(self) -> IVec3 {
        FACE_OFFSETS[self as usize]
    }

    /// The four corner positions of the face's unit quad.
    #[inline]
    pub const fn corners(self) -> [[f32; 3]; 4] {
        FACE_CORNERS[self as usize]
    }
}

/// The two vertex streams one mesher job produces for a chunk: opaque
/// triangles and water triangles, both in chunk-local coordinates.
#[derive(Default)]
pub struct ChunkMeshData {
    pub opaque: Vec<Vertex>,
    pub transparent: Vec<Vertex>,
}

impl ChunkMeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }

    pub fn opaque_triangles(&self) -> usize {
        self.opaque.len() / 3
    }

    pub fn transparent_triangles(&self) -> usize {
        self.transparent.len() / 3
    }
}
