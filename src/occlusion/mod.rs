/// Graph-based occlusion culling
/// Face connectivity data, work queues, and the breadth-first search engine
pub mod culler;
pub mod direction;
pub mod queue;
pub mod visibility;

pub use culler::{OcclusionCuller, SectionVisitor};
pub use direction::{Direction, DirectionSet, DIRECTION_COUNT};
pub use queue::{DoubleBufferedQueue, SearchQueue};
pub use visibility::{FaceVisibility, VisibilityData};
