//! Baked section visibility: which exit faces sight can reach from which
//! entry faces. Stored one byte per entry face with the exit set in the low
//! six bits, so a query can mask whole rows by incoming direction and
//! collapse them with a three-shift OR fold instead of a per-direction loop.
use crate::occlusion::direction::{Direction, DirectionSet, DIRECTION_COUNT};

/// Raw per-face-pair connectivity produced by the meshing stage, before
/// encoding. Bits are packed at a 6-wide stride (no spare bits); this type is
/// a builder, not a query structure.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceVisibility(u64);

impl FaceVisibility {
    /// No face can see any other face (a fully solid section)
    pub const fn new() -> FaceVisibility {
        FaceVisibility(0)
    }

    /// Every face can see every face, self-pairs included (an empty section)
    pub const fn fully_open() -> FaceVisibility {
        FaceVisibility((1u64 << (DIRECTION_COUNT * DIRECTION_COUNT)) - 1)
    }

    #[inline]
    const fn bit(from: Direction, to: Direction) -> u64 {
        1u64 << (from as u64 * DIRECTION_COUNT as u64 + to as u64)
    }

    /// Mark the ordered pair (from, to) as see-through
    #[inline]
    pub fn set_visible_through(&mut self, from: Direction, to: Direction) {
        self.0 |= Self::bit(from, to);
    }

    /// Mark every ordered pair among `faces` as see-through
    pub fn connect_faces(&mut self, faces: DirectionSet) {
        for from in Direction::ALL {
            if !faces.contains(from) {
                continue;
            }
            for to in Direction::ALL {
                if faces.contains(to) {
                    self.set_visible_through(from, to);
                }
            }
        }
    }

    #[inline]
    pub const fn is_visible_through(self, from: Direction, to: Direction) -> bool {
        self.0 & Self::bit(from, to) != 0
    }
}

/// The packed visibility encoding stored on each section. Bit `from * 8 + to`
/// is set when sight can pass from face `from` to face `to` through the
/// section interior; the two bits above each six-bit exit row stay zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct VisibilityData(u64);

/// Row mask for every possible incoming direction set. Entry `s` is the OR of
/// the full 8-bit row of each direction in `s`, so masking the encoded value
/// keeps exactly the rows that sight can enter through.
const INCOMING_MASKS: [u64; 64] = build_incoming_masks();

const fn build_incoming_masks() -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut set = 0;
    while set < table.len() {
        let mut from = 0;
        while from < DIRECTION_COUNT {
            if set & (1 << from) != 0 {
                table[set] |= 0xFF_u64 << (from * 8);
            }
            from += 1;
        }
        set += 1;
    }
    table
}

/// Collapse the six 8-bit rows into a single direction set
#[inline]
const fn fold(mut bits: u64) -> DirectionSet {
    bits |= bits >> 32;
    bits |= bits >> 16;
    bits |= bits >> 8;
    DirectionSet::from_bits((bits & 0b111111) as u8)
}

impl VisibilityData {
    /// No connectivity at all; the value a section holds before its mesh build
    /// supplies real data
    pub const NONE: VisibilityData = VisibilityData(0);

    /// Full connectivity: every row holds all six exit bits
    pub const OPEN: VisibilityData = VisibilityData(0x3F3F_3F3F_3F3F);

    /// Spread the raw connectivity table onto the 8-wide row stride
    pub fn encode(faces: &FaceVisibility) -> VisibilityData {
        let mut bits = 0u64;
        for from in Direction::ALL {
            for to in Direction::ALL {
                if faces.is_visible_through(from, to) {
                    bits |= 1 << (from as u64 * 8 + to as u64);
                }
            }
        }
        VisibilityData(bits)
    }

    /// Exit faces reachable when sight enters through any face in `incoming`
    #[inline]
    pub const fn outgoing_from(self, incoming: DirectionSet) -> DirectionSet {
        fold(self.0 & INCOMING_MASKS[incoming.bits() as usize])
    }

    /// Exit faces reachable from any entry face at all
    #[inline]
    pub const fn outgoing(self) -> DirectionSet {
        fold(self.0)
    }
}
