//! Spatial partitioning of rigid bodies
//!
//! Provides the broad phase for world queries and path finding: given a
//! query box, which bodies may touch it.

mod partition;
mod partition_none;
mod octree;

pub use partition::{create_partition, Partition};
pub use partition_none::PartitionNone;
pub use octree::{CellKey, PartitionOctTree, PartitionTreeNode, OVERSIZED_LEAF_COUNT};
