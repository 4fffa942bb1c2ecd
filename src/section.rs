/// Section records and packed grid keys
/// A section is a 16-unit cube of world space addressed by an integer coordinate
use crate::occlusion::direction::{Direction, DirectionSet, DIRECTION_COUNT};
use crate::occlusion::visibility::VisibilityData;
use glam::{DVec3, IVec3, Vec3};

/// Edge length of a section in world units
pub const SECTION_SIZE: i32 = 16;

/// Frame stamp meaning "never visited"; valid frame numbers stay below it
pub(crate) const FRAME_NEVER: u32 = u32::MAX;

// Key layout: x in bits 42..64, z in bits 20..42, y in bits 0..20
const KEY_X_MASK: u64 = 0x3F_FFFF;
const KEY_Z_MASK: u64 = 0x3F_FFFF;
const KEY_Y_MASK: u64 = 0xF_FFFF;

/// Packed 64-bit key addressing a section in the sparse grid
///
/// Distinct coordinates always pack to distinct keys within the supported
/// ranges (|x|, |z| < 2^21 and |y| < 2^19), so the key doubles as an identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionKey(u64);

impl SectionKey {
    #[inline]
    pub const fn pack(coord: IVec3) -> SectionKey {
        SectionKey(
            ((coord.x as u64 & KEY_X_MASK) << 42)
                | ((coord.z as u64 & KEY_Z_MASK) << 20)
                | (coord.y as u64 & KEY_Y_MASK),
        )
    }

    /// Recover the coordinate, sign-extending each field
    #[inline]
    pub const fn unpack(self) -> IVec3 {
        let bits = self.0 as i64;
        IVec3::new(
            (bits >> 42) as i32,
            (bits << 44 >> 44) as i32,
            (bits << 22 >> 42) as i32,
        )
    }
}

/// Section coordinate containing the given world position
#[inline]
pub fn world_to_section_coord(world_pos: DVec3) -> IVec3 {
    IVec3::new(
        (world_pos.x / SECTION_SIZE as f64).floor() as i32,
        (world_pos.y / SECTION_SIZE as f64).floor() as i32,
        (world_pos.z / SECTION_SIZE as f64).floor() as i32,
    )
}

/// Minimum corner of a section in world units
#[inline]
pub fn section_origin(coord: IVec3) -> IVec3 {
    coord * SECTION_SIZE
}

/// Center point of a section in world units
#[inline]
pub fn section_center(coord: IVec3) -> Vec3 {
    section_origin(coord).as_vec3() + Vec3::splat(SECTION_SIZE as f32 * 0.5)
}

/// One section's record in the grid: identity, baked visibility, and the
/// per-frame visitation state the traversal maintains
pub struct Section {
    coord: IVec3,
    visibility: VisibilityData,
    last_visible_frame: u32,
    incoming_directions: DirectionSet,
    adjacent_mask: DirectionSet,
    neighbors: [Option<SectionKey>; DIRECTION_COUNT],
}

impl Section {
    pub(crate) fn new(coord: IVec3) -> Section {
        Section {
            coord,
            visibility: VisibilityData::NONE,
            last_visible_frame: FRAME_NEVER,
            incoming_directions: DirectionSet::NONE,
            adjacent_mask: DirectionSet::NONE,
            neighbors: [None; DIRECTION_COUNT],
        }
    }

    #[inline]
    pub fn coord(&self) -> IVec3 {
        self.coord
    }

    #[inline]
    pub fn origin(&self) -> IVec3 {
        section_origin(self.coord)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        section_center(self.coord)
    }

    #[inline]
    pub fn visibility(&self) -> VisibilityData {
        self.visibility
    }

    pub(crate) fn set_visibility(&mut self, visibility: VisibilityData) {
        self.visibility = visibility;
    }

    /// Last frame number this section was claimed by a traversal
    #[inline]
    pub fn last_visible_frame(&self) -> u32 {
        self.last_visible_frame
    }

    #[inline]
    pub(crate) fn set_last_visible_frame(&mut self, frame: u32) {
        self.last_visible_frame = frame;
    }

    /// Union of the faces sight entered through this frame
    #[inline]
    pub fn incoming_directions(&self) -> DirectionSet {
        self.incoming_directions
    }

    #[inline]
    pub(crate) fn reset_incoming_directions(&mut self) {
        self.incoming_directions = DirectionSet::NONE;
    }

    #[inline]
    pub(crate) fn add_incoming_directions(&mut self, directions: DirectionSet) {
        self.incoming_directions |= directions;
    }

    /// Which of the six neighbor slots hold a loaded section
    #[inline]
    pub fn adjacent_mask(&self) -> DirectionSet {
        self.adjacent_mask
    }

    #[inline]
    pub fn neighbor(&self, direction: Direction) -> Option<SectionKey> {
        self.neighbors[direction.index()]
    }

    #[inline]
    pub(crate) fn neighbors(&self) -> [Option<SectionKey>; DIRECTION_COUNT] {
        self.neighbors
    }

    /// Install or clear a neighbor link, keeping the adjacency mask in sync
    pub(crate) fn set_neighbor(&mut self, direction: Direction, key: Option<SectionKey>) {
        self.neighbors[direction.index()] = key;
        match key {
            Some(_) => self.adjacent_mask |= DirectionSet::of(direction),
            None => self.adjacent_mask &= !DirectionSet::of(direction),
        }
    }
}
