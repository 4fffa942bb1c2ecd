/// Sparse section grid with neighbor topology maintenance
/// Sections stream in and out as the surrounding world loads; the traversal
/// only ever reads the resulting topology
use crate::occlusion::direction::Direction;
use crate::occlusion::visibility::{FaceVisibility, VisibilityData};
use crate::section::{Section, SectionKey};
use glam::IVec3;
use log::trace;
use std::collections::HashMap;

/// Vertical extent of the world in section coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    /// Lowest section layer that can exist
    pub bottom_section_y: i32,
    /// One past the highest section layer that can exist
    pub top_section_y: i32,
}

impl WorldBounds {
    pub fn new(bottom_section_y: i32, top_section_y: i32) -> WorldBounds {
        assert!(
            bottom_section_y < top_section_y,
            "world bounds are empty: bottom {bottom_section_y} >= top {top_section_y}"
        );
        WorldBounds {
            bottom_section_y,
            top_section_y,
        }
    }

    #[inline]
    pub fn contains_y(self, section_y: i32) -> bool {
        section_y >= self.bottom_section_y && section_y < self.top_section_y
    }
}

impl Default for WorldBounds {
    /// A 384-unit world column, 24 sections from y=-64 up to y=320
    fn default() -> WorldBounds {
        WorldBounds {
            bottom_section_y: -4,
            top_section_y: 20,
        }
    }
}

/// All loaded sections, keyed by packed coordinate
///
/// Adding or removing a section rewires the neighbor links on both sides, so
/// a section's adjacency mask always names exactly the loaded neighbors.
/// Lifecycle misuse (double add, removing what is not there) is a programmer
/// error and panics.
pub struct SectionGrid {
    sections: HashMap<SectionKey, Section>,
    bounds: WorldBounds,
}

impl SectionGrid {
    pub fn new(bounds: WorldBounds) -> SectionGrid {
        SectionGrid {
            sections: HashMap::new(),
            bounds,
        }
    }

    #[inline]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Insert a section and link it to every already-loaded neighbor.
    /// Its visibility data starts fully closed until a mesh build supplies
    /// the real thing.
    ///
    /// Panics if the coordinate is already occupied.
    pub fn add_section(&mut self, coord: IVec3) -> SectionKey {
        let key = SectionKey::pack(coord);
        if self.sections.contains_key(&key) {
            panic!("section at {coord} has already been added to the grid");
        }

        let mut section = Section::new(coord);
        for direction in Direction::ALL {
            let neighbor_key = SectionKey::pack(coord + direction.offset());
            if let Some(neighbor) = self.sections.get_mut(&neighbor_key) {
                neighbor.set_neighbor(direction.opposite(), Some(key));
                section.set_neighbor(direction, Some(neighbor_key));
            }
        }

        self.sections.insert(key, section);
        trace!("added section at {coord}");
        key
    }

    /// Remove a section and clear the links its neighbors held to it.
    ///
    /// Panics if no section is loaded at the coordinate.
    pub fn remove_section(&mut self, coord: IVec3) {
        let key = SectionKey::pack(coord);
        if self.sections.remove(&key).is_none() {
            panic!("section at {coord} was not loaded in the grid");
        }

        for direction in Direction::ALL {
            let neighbor_key = SectionKey::pack(coord + direction.offset());
            if let Some(neighbor) = self.sections.get_mut(&neighbor_key) {
                neighbor.set_neighbor(direction.opposite(), None);
            }
        }

        trace!("removed section at {coord}");
    }

    /// Replace a section's visibility data wholesale after a mesh (re)build.
    /// A mesh result can arrive after its section unloaded; that is dropped,
    /// not an error.
    pub fn set_visibility_data(&mut self, coord: IVec3, faces: &FaceVisibility) {
        let key = SectionKey::pack(coord);
        match self.sections.get_mut(&key) {
            Some(section) => section.set_visibility(VisibilityData::encode(faces)),
            None => trace!("dropped visibility data for unloaded section at {coord}"),
        }
    }

    #[inline]
    pub fn get(&self, key: SectionKey) -> Option<&Section> {
        self.sections.get(&key)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, key: SectionKey) -> Option<&mut Section> {
        self.sections.get_mut(&key)
    }

    #[inline]
    pub fn get_by_coord(&self, coord: IVec3) -> Option<&Section> {
        self.sections.get(&SectionKey::pack(coord))
    }

    #[inline]
    pub fn contains(&self, coord: IVec3) -> bool {
        self.sections.contains_key(&SectionKey::pack(coord))
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Add every section in the inclusive coordinate box (for tests and
    /// benchmarks)
    pub fn add_region(&mut self, min: IVec3, max: IVec3) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.add_section(IVec3::new(x, y, z));
                }
            }
        }
    }

    /// Drop every section
    pub fn clear(&mut self) {
        self.sections.clear();
        trace!("cleared section grid");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occlusion::direction::DirectionSet;

    #[test]
    fn add_links_both_sides() {
        let mut grid = SectionGrid::new(WorldBounds::default());
        let a = IVec3::new(0, 0, 0);
        let b = IVec3::new(1, 0, 0);

        let key_a = grid.add_section(a);
        let key_b = grid.add_section(b);

        let section_a = grid.get(key_a).unwrap();
        let section_b = grid.get(key_b).unwrap();

        assert_eq!(section_a.neighbor(Direction::East), Some(key_b));
        assert_eq!(section_b.neighbor(Direction::West), Some(key_a));
        assert_eq!(section_a.adjacent_mask(), DirectionSet::of(Direction::East));
        assert_eq!(section_b.adjacent_mask(), DirectionSet::of(Direction::West));
    }

    #[test]
    fn remove_unlinks_neighbors() {
        let mut grid = SectionGrid::new(WorldBounds::default());
        grid.add_section(IVec3::new(0, 0, 0));
        let key = grid.add_section(IVec3::new(0, 1, 0));

        grid.remove_section(IVec3::new(0, 0, 0));

        let survivor = grid.get(key).unwrap();
        assert_eq!(survivor.neighbor(Direction::Down), None);
        assert_eq!(survivor.adjacent_mask(), DirectionSet::NONE);
        assert_eq!(grid.section_count(), 1);
    }

    #[test]
    fn interior_section_links_all_six() {
        let mut grid = SectionGrid::new(WorldBounds::default());
        grid.add_region(IVec3::splat(-1), IVec3::splat(1));
        assert_eq!(grid.section_count(), 27);

        let center = grid.get_by_coord(IVec3::ZERO).unwrap();
        assert_eq!(center.adjacent_mask(), DirectionSet::ALL);
        for direction in Direction::ALL {
            assert_eq!(
                center.neighbor(direction),
                Some(SectionKey::pack(direction.offset()))
            );
        }
    }

    #[test]
    fn visibility_data_for_unloaded_section_is_dropped() {
        let mut grid = SectionGrid::new(WorldBounds::default());
        // must not panic; the section simply is not there anymore
        grid.set_visibility_data(IVec3::new(5, 5, 5), &FaceVisibility::fully_open());
        assert_eq!(grid.section_count(), 0);
    }

    #[test]
    fn visibility_data_replaces_wholesale() {
        let mut grid = SectionGrid::new(WorldBounds::default());
        let key = grid.add_section(IVec3::ZERO);
        assert_eq!(grid.get(key).unwrap().visibility(), VisibilityData::NONE);

        grid.set_visibility_data(IVec3::ZERO, &FaceVisibility::fully_open());
        assert_eq!(grid.get(key).unwrap().visibility(), VisibilityData::OPEN);

        grid.set_visibility_data(IVec3::ZERO, &FaceVisibility::new());
        assert_eq!(grid.get(key).unwrap().visibility(), VisibilityData::NONE);
    }

    #[test]
    #[should_panic(expected = "bounds are empty")]
    fn inverted_bounds_panic() {
        WorldBounds::new(4, -4);
    }

    #[test]
    fn bounds_contain_y() {
        let bounds = WorldBounds::new(-4, 20);
        assert!(bounds.contains_y(-4));
        assert!(bounds.contains_y(19));
        assert!(!bounds.contains_y(20));
        assert!(!bounds.contains_y(-5));
    }
}
