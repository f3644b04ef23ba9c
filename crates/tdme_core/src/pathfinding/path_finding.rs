//! A* search over walkable samples of a world
//!
//! Samples lie on a lattice spanned by the actor's horizontal forward and
//! side directions, `step_size` apart. The height of every sample comes from
//! a vertical probe into the world, so paths follow ramps and ledges within
//! the actor's step limits.

use std::collections::{BinaryHeap, HashMap};

use super::custom_test::PathFindingCustomTest;
use super::node::{NodeKey, OpenEntry, PathFindingNode};
use crate::config::PathFindingConfig;
use crate::foundation::logging::{debug, trace, PATHFINDING_TARGET};
use crate::foundation::math::{utils::try_normalize, Transform, Vec3, EPSILON};
use crate::physics::{BoundingVolume, CollisionTypes, RigidBody, World};

/// Lattice offsets as (side, forward) multiples of the step size
const NEIGHBOR_OFFSETS: [(f32, f32); 8] = [
    (0.0, 1.0),
    (1.0, 0.0),
    (0.0, -1.0),
    (-1.0, 0.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (-1.0, 1.0),
];

/// Step layer height used when step-up is disabled, so the floor is not an obstacle
const FLOOR_CLEARANCE: f32 = 0.01;

/// Search progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFindingState {
    /// No search started
    Idle,
    /// Open set not exhausted yet
    Searching,
    /// Path available through [`PathFinding::path`]
    Found,
    /// Goal unreachable, or not reached within the step budget
    NoPath,
}

/// Everything a single search needs to know about the actor
#[derive(Clone, Copy)]
pub struct PathRequest<'a> {
    /// Actor shape in model space, origin at the feet
    pub actor_volume: &'a BoundingVolume,
    /// Actor placement; the position is the start of the path
    pub actor_transform: &'a Transform,
    /// Goal position
    pub end: Vec3,
    /// Body types that support or obstruct the actor
    ///
    /// A rigid body registered for the actor itself obstructs its own first
    /// moves when selected here; leave its type out of the mask or reject it
    /// in the custom test.
    pub collision_types: CollisionTypes,
    /// Optional caller exceptions
    pub custom_test: Option<&'a dyn PathFindingCustomTest>,
}

impl std::fmt::Debug for PathRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRequest")
            .field("actor_volume", self.actor_volume)
            .field("actor_transform", self.actor_transform)
            .field("end", &self.end)
            .field("collision_types", &self.collision_types)
            .field("custom_test", &self.custom_test.is_some())
            .finish()
    }
}

impl PathRequest<'_> {
    fn considers(&self, body: &RigidBody) -> bool {
        body.matches(self.collision_types)
            && self.custom_test.map_or(true, |test| test.is_rigid_body_considered(body))
    }
}

/// Incremental A* path finder bound to one world
///
/// The world is borrowed for the finder's lifetime, so it cannot change
/// while a search is in progress. Drive a search with [`start`](Self::start)
/// and [`step`](Self::step), or run it to completion with
/// [`find_path`](Self::find_path).
#[derive(Debug)]
pub struct PathFinding<'w> {
    world: &'w World,
    config: PathFindingConfig,
    request: Option<PathRequest<'w>>,
    forward: Vec3,
    side: Vec3,
    end_key: NodeKey,
    state: PathFindingState,
    nodes: Vec<PathFindingNode>,
    index: HashMap<NodeKey, usize>,
    open: BinaryHeap<OpenEntry>,
    next_order: u64,
    steps: usize,
    path: Vec<Vec3>,
}

impl<'w> PathFinding<'w> {
    /// Create an idle finder over `world`
    pub fn new(world: &'w World, config: PathFindingConfig) -> Self {
        Self {
            world,
            config,
            request: None,
            forward: Vec3::z(),
            side: Vec3::x(),
            end_key: NodeKey(0, 0, 0),
            state: PathFindingState::Idle,
            nodes: Vec::new(),
            index: HashMap::new(),
            open: BinaryHeap::new(),
            next_order: 0,
            steps: 0,
            path: Vec::new(),
        }
    }

    /// Settings this finder was built with
    pub fn config(&self) -> &PathFindingConfig {
        &self.config
    }

    /// Current search state
    pub fn state(&self) -> PathFindingState {
        self.state
    }

    /// Steps taken by the current search
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Nodes discovered by the current search
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Waypoints of the last successful search, start first
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    /// Drop the current search and return to [`PathFindingState::Idle`]
    pub fn reset(&mut self) {
        self.request = None;
        self.state = PathFindingState::Idle;
        self.nodes.clear();
        self.index.clear();
        self.open.clear();
        self.next_order = 0;
        self.steps = 0;
        self.path.clear();
    }

    /// Begin a search from the actor position to `request.end`
    pub fn start(&mut self, request: PathRequest<'w>) {
        self.reset();

        let start = request.actor_transform.position;
        let heading = request.actor_transform.forward();
        self.forward = try_normalize(Vec3::new(heading.x, 0.0, heading.z)).unwrap_or_else(Vec3::z);
        self.side = Vec3::y().cross(&self.forward);
        self.end_key = NodeKey::from_position(request.end, self.config.node_quantization);

        debug!(
            target: PATHFINDING_TARGET,
            "Searching path from {:?} to {:?} (budget {} steps)",
            start, request.end, self.config.steps_max
        );

        let key = NodeKey::from_position(start, self.config.node_quantization);
        let h = (request.end - start).magnitude();
        self.nodes.push(PathFindingNode::new(key, start, 0.0, h, None));
        self.index.insert(key, 0);
        self.push_open(0);

        self.request = Some(request);
        self.state = PathFindingState::Searching;
    }

    /// Expand one node and report the resulting state
    pub fn step(&mut self) -> PathFindingState {
        if self.state != PathFindingState::Searching {
            return self.state;
        }
        let Some(request) = self.request else {
            self.state = PathFindingState::Idle;
            return self.state;
        };
        if self.steps >= self.config.steps_max {
            debug!(target: PATHFINDING_TARGET, "Step budget of {} exhausted", self.config.steps_max);
            self.state = PathFindingState::NoPath;
            return self.state;
        }
        self.steps += 1;

        let Some(current) = self.pop_open() else {
            debug!(target: PATHFINDING_TARGET, "Open set exhausted after {} steps", self.steps);
            self.state = PathFindingState::NoPath;
            return self.state;
        };
        self.nodes[current].closed = true;

        if self.reached_end(current, request.end) {
            self.build_path(current, request.end);
            debug!(
                target: PATHFINDING_TARGET,
                "Path found after {} steps with {} waypoints",
                self.steps,
                self.path.len()
            );
            self.state = PathFindingState::Found;
            return self.state;
        }

        let origin = self.nodes[current].position;
        let g = self.nodes[current].g;
        for (side, forward) in NEIGHBOR_OFFSETS {
            let lateral = origin + (self.side * side + self.forward * forward) * self.config.step_size;
            let Some(height) = self.walkable_height(&request, lateral.x, origin.y, lateral.z) else {
                continue;
            };
            let candidate = Vec3::new(lateral.x, height, lateral.z);
            self.relax(current, candidate, g + (candidate - origin).magnitude(), request.end);
        }

        self.state
    }

    /// Run a full search; on success `path` receives the waypoints
    ///
    /// `path` is left untouched when no path is found. See
    /// [`PathRequest::collision_types`] about the actor's own rigid body.
    pub fn find_path(
        &mut self,
        actor_volume: &'w BoundingVolume,
        actor_transform: &'w Transform,
        end: Vec3,
        collision_types: CollisionTypes,
        custom_test: Option<&'w dyn PathFindingCustomTest>,
        path: &mut Vec<Vec3>,
    ) -> bool {
        self.start(PathRequest {
            actor_volume,
            actor_transform,
            end,
            collision_types,
            custom_test,
        });
        loop {
            match self.step() {
                PathFindingState::Searching => {}
                PathFindingState::Found => {
                    path.clear();
                    path.extend_from_slice(&self.path);
                    return true;
                }
                PathFindingState::NoPath | PathFindingState::Idle => return false,
            }
        }
    }

    /// Standing height for the actor at column (`x`, `z`) coming from `from_height`
    ///
    /// The surface must lie within the step-up and step-down limits, the
    /// actor's world box above its step-up height must not overlap a
    /// considered body, and the custom test must accept the sample.
    pub fn is_walkable(
        &self,
        actor_volume: &BoundingVolume,
        x: f32,
        from_height: f32,
        z: f32,
        collision_types: CollisionTypes,
        custom_test: Option<&dyn PathFindingCustomTest>,
    ) -> Option<f32> {
        let considers = |body: &RigidBody| {
            body.matches(collision_types)
                && custom_test.map_or(true, |test| test.is_rigid_body_considered(body))
        };
        self.walkable_height_with(actor_volume, x, from_height, z, considers, custom_test)
    }

    fn walkable_height(&self, request: &PathRequest<'_>, x: f32, from_height: f32, z: f32) -> Option<f32> {
        self.walkable_height_with(
            request.actor_volume,
            x,
            from_height,
            z,
            |body| request.considers(body),
            request.custom_test,
        )
    }

    fn walkable_height_with(
        &self,
        actor_volume: &BoundingVolume,
        x: f32,
        from_height: f32,
        z: f32,
        considers: impl Fn(&RigidBody) -> bool,
        custom_test: Option<&dyn PathFindingCustomTest>,
    ) -> Option<f32> {
        let height = self.world.determine_height(
            CollisionTypes::ALL,
            self.config.actor_step_up_max,
            self.config.actor_step_down_max,
            Vec3::new(x, from_height, z),
            &considers,
        )?;

        let clearance = self.clearance_volume(actor_volume, x, height, z);
        let obstructed = self
            .world
            .get_objects_near_to(&clearance)
            .any(|(_, body)| considers(body) && body.volume().intersects(&clearance));
        if obstructed {
            trace!(target: PATHFINDING_TARGET, "Sample ({}, {}, {}) obstructed", x, height, z);
            return None;
        }

        let position = Vec3::new(x, height, z);
        if custom_test.is_some_and(|test| !test.is_walkable(position)) {
            return None;
        }
        Some(height)
    }

    /// World box of the actor standing at `height`, minus its step layer
    ///
    /// Anything lower than the step-up height is climbable, so only the part
    /// of the actor above it has to be free. The top stays at the actor's
    /// real height.
    fn clearance_volume(&self, actor_volume: &BoundingVolume, x: f32, height: f32, z: f32) -> BoundingVolume {
        let lift = if self.config.actor_step_up_max > 0.0 {
            self.config.actor_step_up_max
        } else {
            FLOOR_CLEARANCE
        };
        let step_top = height + lift;
        let mut aabb = actor_volume.translated(Vec3::new(x, height, z)).world_aabb();
        aabb.min.y = (step_top + EPSILON * step_top.abs().max(1.0)).min(aabb.max.y);
        BoundingVolume::AxisAlignedBox(aabb)
    }

    /// Exact key identity or within `step_size_last` of the goal
    fn reached_end(&self, index: usize, end: Vec3) -> bool {
        let node = &self.nodes[index];
        node.key == self.end_key || (node.position - end).magnitude() <= self.config.step_size_last
    }

    fn build_path(&mut self, last: usize, end: Vec3) {
        let mut waypoints = Vec::new();
        let mut cursor = Some(last);
        while let Some(index) = cursor {
            waypoints.push(self.nodes[index].position);
            cursor = self.nodes[index].previous;
        }
        waypoints.reverse();

        if self.nodes[last].key == self.end_key {
            if let Some(final_waypoint) = waypoints.last_mut() {
                *final_waypoint = end;
            }
        } else {
            waypoints.push(end);
        }
        self.path = waypoints;
    }

    fn relax(&mut self, from: usize, candidate: Vec3, g: f32, end: Vec3) {
        let key = NodeKey::from_position(candidate, self.config.node_quantization);
        match self.index.get(&key).copied() {
            Some(existing) => {
                let node = &mut self.nodes[existing];
                if g < node.g {
                    node.g = g;
                    node.f = g + node.h;
                    node.previous = Some(from);
                    node.closed = false;
                    self.push_open(existing);
                }
            }
            None => {
                let h = (end - candidate).magnitude();
                let index = self.nodes.len();
                self.nodes.push(PathFindingNode::new(key, candidate, g, h, Some(from)));
                self.index.insert(key, index);
                self.push_open(index);
            }
        }
    }

    fn push_open(&mut self, index: usize) {
        let order = self.next_order;
        self.next_order += 1;
        let node = &mut self.nodes[index];
        node.open_order = order;
        self.open.push(OpenEntry { f: node.f, order, index });
    }

    /// Pop the best live entry, skipping superseded ones
    fn pop_open(&mut self) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let node = &self.nodes[entry.index];
            if !node.closed && node.open_order == entry.order {
                return Some(entry.index);
            }
        }
        None
    }
}
