pub mod camera;
/// Section Visibility - Graph-traversal occlusion culling for sectioned voxel worlds
/// Built with compartmentalized benchmarkable components
pub mod occlusion;
pub mod perf;
pub mod section;
pub mod world;

pub use camera::{Camera, CameraTransform, Frustum, Viewport};
pub use occlusion::{
    Direction, DirectionSet, FaceVisibility, OcclusionCuller, SectionVisitor, VisibilityData,
};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use section::{
    section_center, section_origin, world_to_section_coord, Section, SectionKey, SECTION_SIZE,
};
pub use world::{SectionGrid, WorldBounds};
