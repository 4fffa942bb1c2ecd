//! Breadth-first visibility search over the section grid.
//!
//! The search walks outward from the camera's section one layer at a time,
//! following only the face connections each section's baked visibility data
//! leaves open and never stepping back toward the camera. The first edge to
//! reach a section claims it for the frame, so every reachable section is
//! handed to the visitor exactly once together with its frustum and distance
//! verdict.
//!
//! When the camera sits above or below the world's vertical bounds there is
//! no camera section to start from. The search instead seeds every loaded
//! column of the nearest boundary layer in an outward spiral, entered through
//! the face turned toward the camera.

use crate::camera::{CameraTransform, Viewport};
use crate::count_add;
use crate::count_call;
use crate::occlusion::direction::{Direction, DirectionSet, DIRECTION_COUNT};
use crate::occlusion::queue::{DoubleBufferedQueue, SearchQueue};
use crate::section::{section_center, Section, SectionKey, FRAME_NEVER, SECTION_SIZE};
use crate::world::SectionGrid;
use glam::IVec3;
use log::debug;

#[cfg(feature = "profiling")]
use crate::perf::FUNCTION_COUNTERS;

/// Half extent of the frustum test box around a section center. The margin
/// over the true half edge (8.0) hides seams between adjacent sections.
const SECTION_BOX_HALF_EXTENT: f32 = 8.0 + 1.0 + 0.125;

/// Receives every section the traversal touches, in visitation order.
/// `visible` is the frustum and distance verdict; sections that fail it are
/// still reported (callers track them for statistics) but never expanded.
pub trait SectionVisitor {
    fn visit(&mut self, section: &Section, visible: bool);
}

impl<F: FnMut(&Section, bool)> SectionVisitor for F {
    fn visit(&mut self, section: &Section, visible: bool) {
        self(section, visible)
    }
}

/// The traversal engine. Owns nothing but its work queues, which are reused
/// across frames.
pub struct OcclusionCuller {
    queue: DoubleBufferedQueue<SectionKey>,
}

impl OcclusionCuller {
    pub fn new() -> OcclusionCuller {
        OcclusionCuller {
            queue: DoubleBufferedQueue::new(),
        }
    }

    /// Run one frame's visibility search.
    ///
    /// Seeds at the camera's section (or through a spiral over the nearest
    /// world boundary layer when the camera is above or below the world),
    /// then expands layer by layer until the front dies out. Sections are
    /// claimed with `frame`; callers must pass a strictly larger frame number
    /// than any previous call on the same grid, otherwise the stale stamps
    /// from the earlier traversal suppress this one.
    ///
    /// `use_occlusion_culling = false` treats every section as fully open,
    /// reducing the search to frustum-tested flood reachability.
    pub fn find_visible<V>(
        &mut self,
        visitor: &mut V,
        grid: &mut SectionGrid,
        viewport: &Viewport,
        search_distance: f32,
        use_occlusion_culling: bool,
        frame: u32,
    ) where
        V: SectionVisitor,
    {
        debug_assert!(frame != FRAME_NEVER, "frame counter overflow");
        count_call!(FUNCTION_COUNTERS.find_visible_calls);

        self.queue.reset();
        self.init(visitor, grid, viewport, search_distance, use_occlusion_culling, frame);

        while self.queue.flip() {
            count_call!(FUNCTION_COUNTERS.layers_processed);
            let (read, write) = self.queue.split_mut();
            process_queue(
                visitor,
                grid,
                viewport,
                search_distance,
                use_occlusion_culling,
                frame,
                read,
                write,
            );
        }
    }

    fn init<V>(
        &mut self,
        visitor: &mut V,
        grid: &mut SectionGrid,
        viewport: &Viewport,
        search_distance: f32,
        use_occlusion_culling: bool,
        frame: u32,
    ) where
        V: SectionVisitor,
    {
        let origin = viewport.section_coord();
        let bounds = grid.bounds();

        if origin.y < bounds.bottom_section_y {
            // below the world: flood the bottom layer through its down faces
            self.init_outside_world_height(
                grid,
                viewport,
                search_distance,
                frame,
                bounds.bottom_section_y,
                Direction::Down,
            );
        } else if origin.y >= bounds.top_section_y {
            // above the world: flood the top layer through its up faces
            self.init_outside_world_height(
                grid,
                viewport,
                search_distance,
                frame,
                bounds.top_section_y - 1,
                Direction::Up,
            );
        } else {
            self.init_within_world(visitor, grid, viewport, use_occlusion_culling, frame);
        }
    }

    fn init_within_world<V>(
        &mut self,
        visitor: &mut V,
        grid: &mut SectionGrid,
        viewport: &Viewport,
        use_occlusion_culling: bool,
        frame: u32,
    ) where
        V: SectionVisitor,
    {
        let origin = viewport.section_coord();
        let key = SectionKey::pack(origin);
        let write = self.queue.write();

        let Some(section) = grid.get_mut(key) else {
            // the camera stands in an unloaded cell; nothing is reachable
            return;
        };

        section.set_last_visible_frame(frame);
        section.reset_incoming_directions();

        let visibility = section.visibility();
        let adjacent = section.adjacent_mask();
        let neighbors = section.neighbors();

        // the camera's own section is always visible
        count_call!(FUNCTION_COUNTERS.sections_visited);
        visitor.visit(section, true);

        // sight did not enter through any face here, so every open exit row
        // counts
        let outgoing = if use_occlusion_culling {
            visibility.outgoing()
        } else {
            DirectionSet::ALL
        };

        visit_neighbors(grid, write, &neighbors, adjacent, outgoing, frame);
    }

    /// Seed the traversal when the camera is outside the world's vertical
    /// bounds. Enumerates columns around the camera in an outward spiral and
    /// claims every loaded, frustum-visible section on the boundary layer,
    /// entered through the face pointing at the camera's side.
    fn init_outside_world_height(
        &mut self,
        grid: &mut SectionGrid,
        viewport: &Viewport,
        search_distance: f32,
        frame: u32,
        height: i32,
        direction: Direction,
    ) {
        let origin = viewport.section_coord();
        let radius = (search_distance / SECTION_SIZE as f32).floor() as i32;
        debug!("camera outside world height, spiral seeding at y={height} radius={radius}");

        let write = self.queue.write();

        // the column the camera is over
        try_visit_node(
            grid,
            write,
            viewport,
            IVec3::new(origin.x, height, origin.z),
            direction,
            frame,
        );

        // diamond rings out to the search radius, walked as two diagonal
        // half-edge sweeps each
        for layer in 1..=radius {
            for z in -layer..layer {
                let x = z.abs() - layer;
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
            for z in (-layer + 1..=layer).rev() {
                let x = layer - z.abs();
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
        }

        // rings past the radius only contribute the corners of the bounding
        // square that the diamond sweeps left uncovered
        for layer in radius + 1..=2 * radius {
            let inset = layer - radius;

            for z in -radius..=-inset {
                let x = -z - layer;
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
            for z in inset..=radius {
                let x = z - layer;
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
            for z in (inset..=radius).rev() {
                let x = layer - z;
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
            for z in (-radius..=-inset).rev() {
                let x = layer + z;
                try_visit_node(
                    grid,
                    write,
                    viewport,
                    IVec3::new(origin.x + x, height, origin.z + z),
                    direction,
                    frame,
                );
            }
        }
    }
}

fn process_queue<V>(
    visitor: &mut V,
    grid: &mut SectionGrid,
    viewport: &Viewport,
    search_distance: f32,
    use_occlusion_culling: bool,
    frame: u32,
    read: &mut SearchQueue<SectionKey>,
    write: &mut SearchQueue<SectionKey>,
) where
    V: SectionVisitor,
{
    count_add!(FUNCTION_COUNTERS.sections_dequeued, read.len() as u64);

    while let Some(key) = read.dequeue() {
        let Some(section) = grid.get(key) else {
            continue;
        };

        let coord = section.coord();
        let visibility = section.visibility();
        let incoming = section.incoming_directions();
        let adjacent = section.adjacent_mask();
        let neighbors = section.neighbors();

        let visible = is_section_visible(viewport, search_distance, coord);
        count_call!(FUNCTION_COUNTERS.sections_visited);
        visitor.visit(section, visible);

        if !visible {
            // out-of-range or off-screen sections do not propagate
            count_call!(FUNCTION_COUNTERS.sections_culled);
            continue;
        }

        let mut connections = if use_occlusion_culling {
            visibility.outgoing_from(incoming)
        } else {
            DirectionSet::ALL
        };
        connections &= outward_directions(viewport.section_coord(), coord);

        visit_neighbors(grid, write, &neighbors, adjacent, connections, frame);
    }
}

fn visit_neighbors(
    grid: &mut SectionGrid,
    write: &mut SearchQueue<SectionKey>,
    neighbors: &[Option<SectionKey>; DIRECTION_COUNT],
    adjacent: DirectionSet,
    outgoing: DirectionSet,
    frame: u32,
) {
    // never step toward neighbors that are not loaded
    let outgoing = outgoing & adjacent;
    if outgoing.is_empty() {
        return;
    }

    // all six may be pushed before the next dequeue
    write.reserve(DIRECTION_COUNT);

    for direction in Direction::ALL {
        if !outgoing.contains(direction) {
            continue;
        }
        count_call!(FUNCTION_COUNTERS.neighbor_visits);

        if let Some(key) = neighbors[direction.index()] {
            // the grid keeps links and map entries in sync
            if let Some(neighbor) = grid.get_mut(key) {
                visit_node(
                    write,
                    neighbor,
                    key,
                    DirectionSet::of(direction.opposite()),
                    frame,
                );
            }
        }
    }
}

fn visit_node(
    write: &mut SearchQueue<SectionKey>,
    section: &mut Section,
    key: SectionKey,
    incoming: DirectionSet,
    frame: u32,
) {
    if section.last_visible_frame() != frame {
        // the first edge to reach a section this frame claims it
        section.set_last_visible_frame(frame);
        section.reset_incoming_directions();
        write.enqueue(key);
        count_call!(FUNCTION_COUNTERS.sections_enqueued);
    }

    // sibling edges discovered before the dequeue union their entry faces
    section.add_incoming_directions(incoming);
}

/// Spiral seeding probe: claim the section at `coord` if it is loaded and on
/// screen. Distance and occlusion gating happen when it is dequeued.
fn try_visit_node(
    grid: &mut SectionGrid,
    write: &mut SearchQueue<SectionKey>,
    viewport: &Viewport,
    coord: IVec3,
    direction: Direction,
    frame: u32,
) {
    count_call!(FUNCTION_COUNTERS.spiral_probes);

    let key = SectionKey::pack(coord);
    let Some(section) = grid.get_mut(key) else {
        return;
    };
    if !is_within_frustum(viewport, coord) {
        return;
    }

    visit_node(write, section, key, DirectionSet::of(direction), frame);
}

fn is_section_visible(viewport: &Viewport, search_distance: f32, coord: IVec3) -> bool {
    is_within_render_distance(viewport.transform(), search_distance, coord)
        && is_within_frustum(viewport, coord)
}

/// Split distance test: squared cutoff on the horizontal plane, linear cutoff
/// on the vertical axis. Matches a frustum that is wider than it is tall and
/// skips the full 3D Euclidean cost.
fn is_within_render_distance(camera: &CameraTransform, max_distance: f32, coord: IVec3) -> bool {
    let origin = coord * SECTION_SIZE;
    let ox = origin.x - camera.int_x;
    let oy = origin.y - camera.int_y;
    let oz = origin.z - camera.int_z;

    // distance from the camera to the nearest point of the section's span on
    // each axis, zero when the camera projects inside the span
    let dx = nearest_to_zero(ox, ox + SECTION_SIZE) as f32 - camera.frac_x;
    let dy = nearest_to_zero(oy, oy + SECTION_SIZE) as f32 - camera.frac_y;
    let dz = nearest_to_zero(oz, oz + SECTION_SIZE) as f32 - camera.frac_z;

    dx * dx + dz * dz < max_distance * max_distance && dy.abs() < max_distance
}

/// Endpoint of [min, max] nearest to zero, or zero when the range spans it
#[inline]
fn nearest_to_zero(min: i32, max: i32) -> i32 {
    let mut clamped = 0;
    if min > 0 {
        clamped = min;
    }
    if max < 0 {
        clamped = max;
    }
    clamped
}

fn is_within_frustum(viewport: &Viewport, coord: IVec3) -> bool {
    viewport.is_box_visible(section_center(coord), SECTION_BOX_HALF_EXTENT)
}

/// Directions pointing away from (or level with) the camera's section on each
/// axis. Restricting expansion to these keeps the front moving outward and
/// guarantees termination.
fn outward_directions(camera: IVec3, coord: IVec3) -> DirectionSet {
    let mut bits = 0u8;
    bits |= ((coord.x <= camera.x) as u8) << Direction::West.index();
    bits |= ((coord.x >= camera.x) as u8) << Direction::East.index();
    bits |= ((coord.y <= camera.y) as u8) << Direction::Down.index();
    bits |= ((coord.y >= camera.y) as u8) << Direction::Up.index();
    bits |= ((coord.z <= camera.z) as u8) << Direction::North.index();
    bits |= ((coord.z >= camera.z) as u8) << Direction::South.index();
    DirectionSet::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_to_zero_clamps_toward_zero() {
        assert_eq!(nearest_to_zero(4, 20), 4);
        assert_eq!(nearest_to_zero(-20, -4), -4);
        assert_eq!(nearest_to_zero(-8, 8), 0);
        assert_eq!(nearest_to_zero(0, 16), 0);
        assert_eq!(nearest_to_zero(-16, 0), 0);
    }

    #[test]
    fn outward_mask_at_the_camera_is_everything() {
        let camera = IVec3::new(3, -2, 7);
        assert_eq!(outward_directions(camera, camera), DirectionSet::ALL);
    }

    #[test]
    fn outward_mask_excludes_backtracking() {
        let camera = IVec3::ZERO;

        // strictly east of the camera: west would walk back
        let east = outward_directions(camera, IVec3::new(5, 0, 0));
        assert!(east.contains(Direction::East));
        assert!(!east.contains(Direction::West));
        // off-axis directions stay available on the shared planes
        assert!(east.contains(Direction::Up));
        assert!(east.contains(Direction::Down));
        assert!(east.contains(Direction::North));
        assert!(east.contains(Direction::South));

        // diagonal: only the outward half-space of each displaced axis
        let corner = outward_directions(camera, IVec3::new(2, -3, 4));
        assert!(corner.contains(Direction::East));
        assert!(!corner.contains(Direction::West));
        assert!(corner.contains(Direction::Down));
        assert!(!corner.contains(Direction::Up));
        assert!(corner.contains(Direction::South));
        assert!(!corner.contains(Direction::North));
    }

    #[test]
    fn render_distance_splits_horizontal_and_vertical() {
        let camera = CameraTransform::new(glam::DVec3::new(8.0, 8.0, 8.0));

        // sections at increasing horizontal offsets; spans start at x=16, 32
        assert!(is_within_render_distance(&camera, 10.0, IVec3::new(1, 0, 0)));
        assert!(!is_within_render_distance(&camera, 10.0, IVec3::new(2, 0, 0)));

        // vertical uses the linear cutoff: |dy| = 8 at section y=1
        assert!(is_within_render_distance(&camera, 10.0, IVec3::new(0, 1, 0)));
        assert!(!is_within_render_distance(&camera, 8.0, IVec3::new(0, 1, 0)));

        // the camera's own section is at distance zero
        assert!(is_within_render_distance(&camera, 0.5, IVec3::ZERO));
    }
}
