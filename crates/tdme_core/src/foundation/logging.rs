//! Logging utilities and structured logging support
//!
//! The core only emits records through the `log` facade. Partition and
//! path finding records use the `partition` and `pathfinding` targets so
//! they can be filtered separately, e.g. `RUST_LOG=pathfinding=debug`.

pub use log::{debug, info, warn, error, trace};

/// Log target used by the spatial partitions
pub const PARTITION_TARGET: &str = "partition";

/// Log target used by the path finding engine
pub const PATHFINDING_TARGET: &str = "pathfinding";

/// Log target used by the world registry
pub const WORLD_TARGET: &str = "world";

/// Initialize the logging system from `RUST_LOG`
///
/// Binaries call this once at startup.
pub fn init() {
    env_logger::init();
}

/// Initialize a test logger, ignoring repeated initialization
///
/// Output is captured by the test harness and only shown for failing tests.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
