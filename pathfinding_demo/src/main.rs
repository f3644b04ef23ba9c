//! Path Finding Demo
//!
//! Builds a walled courtyard scattered with random pillars, then walks an
//! actor across it:
//! - World and path finder settings come from an optional `.toml`/`.ron` file
//! - The search runs incrementally, a few steps per simulated frame
//! - A patrolling crate is moved between searches and picked up on tick
//!
//! Usage: `pathfinding_demo [config.toml|config.ron] [seed]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tdme_core::prelude::*;

// Courtyard layout
const GROUND_HALF_SIZE: f32 = 30.0;
const NUM_PILLARS: usize = 40;
const PILLAR_HEIGHT: f32 = 2.5;
const START: Vec3 = Vec3::new(-20.0, 0.0, -20.0);
const GOAL: Vec3 = Vec3::new(20.0, 0.0, 20.0);

// Incremental search pacing
const STEPS_PER_FRAME: usize = 50;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("Invalid seed: {0}")]
    Seed(String),
}

fn load_config(path: Option<&str>) -> Result<WorldConfig, DemoError> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            Ok(WorldConfig::load_from_file(path)?)
        }
        None => {
            let mut config = WorldConfig::default();
            config.path_finding.steps_max = 20_000;
            Ok(config)
        }
    }
}

fn build_world(config: &WorldConfig, seed: u64) -> Result<World, DemoError> {
    let mut world = World::from_config(&config.partition);
    world.add_rigid_body(RigidBody::new_static(
        "ground",
        BoundingVolume::aabb(
            Vec3::new(-GROUND_HALF_SIZE, -1.0, -GROUND_HALF_SIZE),
            Vec3::new(GROUND_HALF_SIZE, 0.0, GROUND_HALF_SIZE),
        ),
    ))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut placed = 0;
    while placed < NUM_PILLARS {
        let center = Vec3::new(
            rng.gen_range(-GROUND_HALF_SIZE + 2.0..GROUND_HALF_SIZE - 2.0),
            PILLAR_HEIGHT * 0.5,
            rng.gen_range(-GROUND_HALF_SIZE + 2.0..GROUND_HALF_SIZE - 2.0),
        );
        // Keep start and goal free
        if (center - START).magnitude() < 3.0 || (center - GOAL).magnitude() < 3.0 {
            continue;
        }
        let half_extents = Vec3::new(rng.gen_range(0.5..2.0), PILLAR_HEIGHT * 0.5, rng.gen_range(0.5..2.0));
        let volume = if rng.gen_bool(0.3) {
            let yaw = rng.gen_range(0.0..std::f32::consts::PI);
            BoundingVolume::oriented_box(center, Quat::from_axis_angle(&Vec3::y_axis(), yaw), half_extents)
        } else {
            BoundingVolume::aabb_from_center(center, half_extents)
        };
        world.add_rigid_body(RigidBody::new_static(format!("pillar_{placed}"), volume))?;
        placed += 1;
    }

    world.add_rigid_body(RigidBody::new(
        "patrol_crate",
        BoundingVolume::aabb_from_center(Vec3::new(0.0, 0.5, 0.0), Vec3::repeat(0.5)),
        CollisionTypes::DYNAMIC,
    ))?;

    log::info!("World built with {} rigid bodies (seed {})", world.len(), seed);
    Ok(world)
}

fn walk(world: &World, config: &PathFindingConfig, label: &str) -> Option<Vec<Vec3>> {
    let actor = BoundingVolume::aabb(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.8, 0.3));
    let transform = Transform::from_position(START);
    let mut path_finding = PathFinding::new(world, config.clone());
    path_finding.start(PathRequest {
        actor_volume: &actor,
        actor_transform: &transform,
        end: GOAL,
        collision_types: CollisionTypes::BLOCKING,
        custom_test: None,
    });

    let mut frame = 0;
    let state = loop {
        frame += 1;
        for _ in 0..STEPS_PER_FRAME {
            if path_finding.step() != PathFindingState::Searching {
                break;
            }
        }
        if path_finding.state() != PathFindingState::Searching {
            break path_finding.state();
        }
        log::debug!("[{}] frame {}: {} nodes discovered", label, frame, path_finding.node_count());
    };

    match state {
        PathFindingState::Found => {
            let path = path_finding.path().to_vec();
            let length: f32 = path.windows(2).map(|pair| (pair[1] - pair[0]).magnitude()).sum();
            log::info!(
                "[{}] path found in {} steps over {} frames: {} waypoints, length {:.2}",
                label,
                path_finding.steps(),
                frame,
                path.len(),
                length
            );
            Some(path)
        }
        _ => {
            log::warn!("[{}] no path after {} steps", label, path_finding.steps());
            None
        }
    }
}

fn main() -> Result<(), DemoError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let seed = match args.get(1) {
        Some(seed) => seed.parse().map_err(|_| DemoError::Seed(seed.clone()))?,
        None => 7,
    };

    let mut world = build_world(&config, seed)?;
    if let Some(path) = walk(&world, &config.path_finding, "initial") {
        for waypoint in path.iter().step_by(10) {
            log::info!("  waypoint ({:.2}, {:.2}, {:.2})", waypoint.x, waypoint.y, waypoint.z);
        }
    }

    // The crate only reaches its new cell on the next tick
    world.set_rigid_body_position("patrol_crate", Vec3::new(-15.0, 0.5, -15.0))?;
    world.update();
    walk(&world, &config.path_finding, "after patrol");

    Ok(())
}
