/// Axis-aligned traversal directions and direction sets
/// Using u8 bit codes so a set of directions packs into a single byte
use glam::IVec3;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

pub const DIRECTION_COUNT: usize = 6;

// Lookup tables keep direction math branch-free in the traversal inner loop
const OPPOSITE_LUT: [Direction; DIRECTION_COUNT] = [
    Direction::Up,    // Down
    Direction::Down,  // Up
    Direction::South, // North
    Direction::North, // South
    Direction::East,  // West
    Direction::West,  // East
];

const OFFSET_LUT: [IVec3; DIRECTION_COUNT] = [
    IVec3::new(0, -1, 0), // Down
    IVec3::new(0, 1, 0),  // Up
    IVec3::new(0, 0, -1), // North
    IVec3::new(0, 0, 1),  // South
    IVec3::new(-1, 0, 0), // West
    IVec3::new(1, 0, 0),  // East
];

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Direction through the opposite face
    #[inline]
    pub const fn opposite(self) -> Direction {
        OPPOSITE_LUT[self as usize]
    }

    /// Unit step in section coordinates
    #[inline]
    pub const fn offset(self) -> IVec3 {
        OFFSET_LUT[self as usize]
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Subset of the six axis directions as a 6-bit mask
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const NONE: DirectionSet = DirectionSet(0);
    pub const ALL: DirectionSet = DirectionSet(0b111111);

    #[inline]
    pub const fn of(direction: Direction) -> DirectionSet {
        DirectionSet(1 << direction as u8)
    }

    #[inline]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction as u8) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build a set from raw bits, ignoring anything above the six direction bits
    #[inline]
    pub const fn from_bits(bits: u8) -> DirectionSet {
        DirectionSet(bits & Self::ALL.0)
    }
}

impl BitOr for DirectionSet {
    type Output = DirectionSet;

    #[inline]
    fn bitor(self, rhs: DirectionSet) -> DirectionSet {
        DirectionSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirectionSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: DirectionSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DirectionSet {
    type Output = DirectionSet;

    #[inline]
    fn bitand(self, rhs: DirectionSet) -> DirectionSet {
        DirectionSet(self.0 & rhs.0)
    }
}

impl BitAndAssign for DirectionSet {
    #[inline]
    fn bitand_assign(&mut self, rhs: DirectionSet) {
        self.0 &= rhs.0;
    }
}

impl Not for DirectionSet {
    type Output = DirectionSet;

    #[inline]
    fn not(self) -> DirectionSet {
        DirectionSet(!self.0 & Self::ALL.0)
    }
}
