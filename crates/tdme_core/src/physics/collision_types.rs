//! Collision type bits for filtering bodies in queries
//!
//! Every rigid body carries exactly the bits describing what it is, queries
//! carry a mask of what they care about. A body takes part in a query when
//! the two share at least one bit.

use bitflags::bitflags;

bitflags! {
    /// Collision type bits of a body, or a query mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CollisionTypes: u32 {
        /// Static environment geometry
        const STATIC = 1 << 0;
        /// Moving bodies driven by simulation or game logic
        const DYNAMIC = 1 << 1;
        /// Characters that walk paths
        const ACTOR = 1 << 2;
        /// Trigger volumes (never block movement by default)
        const TRIGGER = 1 << 3;
        /// Projectiles
        const PROJECTILE = 1 << 4;

        // User-defined custom bits (8-15)
        /// Custom bit 8
        const CUSTOM_8 = 1 << 8;
        /// Custom bit 9
        const CUSTOM_9 = 1 << 9;
        /// Custom bit 10
        const CUSTOM_10 = 1 << 10;
        /// Custom bit 11
        const CUSTOM_11 = 1 << 11;
        /// Custom bit 12
        const CUSTOM_12 = 1 << 12;
        /// Custom bit 13
        const CUSTOM_13 = 1 << 13;
        /// Custom bit 14
        const CUSTOM_14 = 1 << 14;
        /// Custom bit 15
        const CUSTOM_15 = 1 << 15;

        /// Mask matching every body
        const ALL = u32::MAX;
    }
}

impl CollisionTypes {
    /// Geometry an actor cannot walk through
    pub const BLOCKING: Self = Self::STATIC.union(Self::DYNAMIC);

    /// Check if a body of type `body` is selected by this mask
    pub fn selects(self, body: CollisionTypes) -> bool {
        self.intersects(body)
    }
}

impl Default for CollisionTypes {
    fn default() -> Self {
        Self::STATIC
    }
}
