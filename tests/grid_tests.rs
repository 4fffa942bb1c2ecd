/// Integration tests for grid mutations feeding the traversal
///
/// Visibility re-bakes, section loads, and section unloads all change what
/// the next frame's search can reach; these tests drive those transitions
/// through the public API.

use glam::{DVec3, IVec3};
use voxel_visibility::{
    camera::{Frustum, Viewport},
    occlusion::{Direction, DirectionSet, FaceVisibility, OcclusionCuller},
    section::Section,
    world::{SectionGrid, WorldBounds},
};

fn viewport_at(position: DVec3) -> Viewport {
    Viewport::new(Frustum::accept_all(), position)
}

fn run_search(
    culler: &mut OcclusionCuller,
    grid: &mut SectionGrid,
    viewport: &Viewport,
    search_distance: f32,
    frame: u32,
) -> Vec<(IVec3, bool)> {
    let mut visits = Vec::new();
    let mut visitor =
        |section: &Section, visible: bool| visits.push((section.coord(), visible));
    culler.find_visible(&mut visitor, grid, viewport, search_distance, true, frame);
    visits
}

#[test]
fn opening_a_wall_lets_sight_through_on_the_next_frame() {
    let mut grid = SectionGrid::new(WorldBounds::new(0, 1));
    grid.add_region(IVec3::new(0, 0, 0), IVec3::new(4, 0, 0));
    let open = FaceVisibility::fully_open();
    for x in [0, 1, 3, 4] {
        grid.set_visibility_data(IVec3::new(x, 0, 0), &open);
    }

    let viewport = viewport_at(DVec3::new(8.0, 8.0, 8.0));
    let mut culler = OcclusionCuller::new();

    let blocked = run_search(&mut culler, &mut grid, &viewport, 1000.0, 1);
    assert_eq!(blocked.len(), 3, "sight ends at the still-closed section");

    grid.set_visibility_data(IVec3::new(2, 0, 0), &open);
    let through = run_search(&mut culler, &mut grid, &viewport, 1000.0, 2);
    assert_eq!(through.len(), 5);
}

#[test]
fn removing_a_section_breaks_the_path_and_a_readd_starts_closed() {
    let mut grid = SectionGrid::new(WorldBounds::new(0, 1));
    grid.add_region(IVec3::new(0, 0, 0), IVec3::new(3, 0, 0));
    let open = FaceVisibility::fully_open();
    for x in 0..=3 {
        grid.set_visibility_data(IVec3::new(x, 0, 0), &open);
    }

    let viewport = viewport_at(DVec3::new(8.0, 8.0, 8.0));
    let mut culler = OcclusionCuller::new();

    let full = run_search(&mut culler, &mut grid, &viewport, 1000.0, 1);
    assert_eq!(full.len(), 4);

    grid.remove_section(IVec3::new(2, 0, 0));
    let cut = run_search(&mut culler, &mut grid, &viewport, 1000.0, 2);
    assert_eq!(cut.len(), 2, "the search cannot cross the unloaded gap");

    // a re-added section is linked up again but starts fully closed
    grid.add_section(IVec3::new(2, 0, 0));
    let readded = run_search(&mut culler, &mut grid, &viewport, 1000.0, 3);
    assert_eq!(readded.len(), 3);
}

#[test]
#[should_panic(expected = "already been added")]
fn adding_a_section_twice_panics() {
    let mut grid = SectionGrid::new(WorldBounds::default());
    grid.add_section(IVec3::ZERO);
    grid.add_section(IVec3::ZERO);
}

#[test]
#[should_panic(expected = "was not loaded")]
fn removing_an_absent_section_panics() {
    let mut grid = SectionGrid::new(WorldBounds::default());
    grid.remove_section(IVec3::new(3, 0, 0));
}

#[test]
fn grid_bookkeeping_tracks_mutations() {
    let mut grid = SectionGrid::new(WorldBounds::default());
    assert_eq!(grid.section_count(), 0);

    grid.add_section(IVec3::new(0, -4, 0));
    grid.add_section(IVec3::new(0, 19, 0));
    assert_eq!(grid.section_count(), 2);
    assert!(grid.contains(IVec3::new(0, -4, 0)));
    assert!(!grid.contains(IVec3::new(0, 0, 0)));

    grid.remove_section(IVec3::new(0, -4, 0));
    assert_eq!(grid.section_count(), 1);
    assert!(grid.get_by_coord(IVec3::new(0, -4, 0)).is_none());
}

#[test]
fn default_bounds_match_the_extended_world_height() {
    let mut grid = SectionGrid::new(WorldBounds::default());
    grid.add_section(IVec3::new(0, 19, 0));
    grid.add_section(IVec3::new(0, -4, 0));
    let mut culler = OcclusionCuller::new();

    // far above the world the spiral lands on the topmost in-bounds layer
    let above = viewport_at(DVec3::new(8.0, 488.0, 8.0));
    let visits = run_search(&mut culler, &mut grid, &above, 170.0, 1);
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].0, IVec3::new(0, 19, 0));
    assert_eq!(
        grid.get_by_coord(IVec3::new(0, 19, 0)).unwrap().incoming_directions(),
        DirectionSet::of(Direction::Up)
    );

    // far below it lands on the bottommost layer
    let below = viewport_at(DVec3::new(8.0, -75.0, 8.0));
    let visits = run_search(&mut culler, &mut grid, &below, 40.0, 2);
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].0, IVec3::new(0, -4, 0));
    assert_eq!(
        grid.get_by_coord(IVec3::new(0, -4, 0)).unwrap().incoming_directions(),
        DirectionSet::of(Direction::Down)
    );
}
