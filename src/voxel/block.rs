/// Block taxonomy.
/// u8 representation with lookup tables so the hot-path trait queries stay
/// branch-free.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockKind {
    Air = 0,
    Stone = 1,
    Dirt = 2,
    Grass = 3,
    Water = 4,
}

pub const BLOCK_KIND_COUNT: usize = 5;

// Lookup tables for block properties.
// `solid` drives collision; `transparent` drives meshing and light.
const BLOCK_IS_SOLID_LUT: [bool; BLOCK_KIND_COUNT] = [
    false, // Air
    true,  // Stone
    true,  // Dirt
    true,  // Grass
    false, // Water
];

const BLOCK_IS_TRANSPARENT_LUT: [bool; BLOCK_KIND_COUNT] = [
    true,  // Air
    false, // Stone
    false, // Dirt
    false, // Grass
    true,  // Water
];

impl BlockKind {
    pub const ALL: [BlockKind; BLOCK_KIND_COUNT] = [
        BlockKind::Air,
        BlockKind::Stone,
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Water,
    ];

    /// Does this block participate in collision? Water does not.
    #[inline]
    pub const fn is_solid(self) -> bool {
        BLOCK_IS_SOLID_LUT[self as usize]
    }

    /// Does this block let light and neighbouring faces through?
    /// Transparent = Air or Water.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        BLOCK_IS_TRANSPARENT_LUT[self as usize]
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, BlockKind::Air)
    }

    /// Convert from u8, mapping out-of-range values to Air.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => BlockKind::Stone,
            2 => BlockKind::Dirt,
            3 => BlockKind::Grass,
            4 => BlockKind::Water,
            _ => BlockKind::Air,
        }
    }
}

impl Default for BlockKind {
    fn default() -> Self {
        BlockKind::Air
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_match_taxonomy() {
        assert!(!BlockKind::Air.is_solid());
        assert!(BlockKind::Air.is_transparent());

        assert!(!BlockKind::Water.is_solid());
        assert!(BlockKind::Water.is_transparent());

        for kind in [BlockKind::Stone, BlockKind::Dirt, BlockKind::Grass] {
            assert!(kind.is_solid(), "{kind:?} must be solid");
            assert!(!kind.is_transparent(), "{kind:?} must be opaque");
        }
    }

    #[test]
    fn from_u8_round_trips_and_defaults() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_u8(kind as u8), kind);
        }
        assert_eq!(BlockKind::from_u8(200), BlockKind::Air);
    }
}
