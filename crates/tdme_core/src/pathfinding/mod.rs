//! Path finding for actors walking over rigid bodies
//!
//! [`PathFinding`] runs an incremental A* search on samples of the ground
//! below the actor. Searches are bounded by a step budget and can be driven
//! one step per frame by the caller.

mod node;
mod path_finding;


pub use custom_test::PathFindingCustomTest;
pub use node::{NodeKey, PathFindingNode};
pub use path_finding::{PathFinding, PathFindingState, PathRequest};
