//! Trackside Demo
//!
//! Drives a car down a small track, logs every contact and checks that a
//! replay of the same run lands on the same state hash.
//!
//! Usage: `trackside-demo [SCENE_JSON] [TICKS] [CONFIG_JSON]`

use std::env;
use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use glam::Vec3;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use trackside::{
    CategoryKind, CollisionWorld, HookRegistry, ReactHook, SceneDesc, StateHash, WorldConfig,
    TICK_RATE, VERSION,
};

const DEMO_SCENE: &str = include_str!("../assets/demo_scene.json");
const DEFAULT_TICKS: u64 = 10 * TICK_RATE as u64;

/// Name of the node the demo throttle drives.
const PLAYER: &str = "Car";
const THROTTLE: f32 = 0.6;
const MAX_SPEED: f32 = 12.0;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Trackside Physics v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = env::args().skip(1);
    let scene = match args.next() {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("reading scene {path}"))?,
        None => DEMO_SCENE.to_owned(),
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };
    let config = match args.next() {
        Some(path) => {
            let json =
                fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            WorldConfig::from_json(&json)?
        }
        None => WorldConfig::default(),
    };

    info!("=== Starting Demo Run ===");
    let hash = run(&scene, config, ticks, true)?;
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let replay_hash = run(&scene, config, ticks, false)?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: hashes differ");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Build the scene, drive it for `ticks` steps and return the final hash.
fn run(scene: &str, config: WorldConfig, ticks: u64, report: bool) -> anyhow::Result<StateHash> {
    let cone_hits = Arc::new(AtomicU32::new(0));
    let mut hooks = HookRegistry::new();
    {
        let cone_hits = Arc::clone(&cone_hits);
        hooks.register(
            "cone_hit",
            ReactHook::new(move || {
                cone_hits.fetch_add(1, Ordering::Relaxed);
                debug!(sound = "cone_hit", "playing reaction");
            }),
        );
    }

    let graph = SceneDesc::from_json(scene)?.build(&hooks)?;
    let player = graph.find(PLAYER);
    if player.is_none() && report {
        info!("no node named {PLAYER:?}, running without throttle");
    }

    let mut world = CollisionWorld::new(graph, config)?;
    let dt = 1.0 / TICK_RATE as f32;
    let mut total_contacts = 0usize;

    for _ in 0..ticks {
        if let Some(id) = player {
            let node = world.graph().node(id)?;
            let speed = node.velocity.dot(node.forward());
            if speed < MAX_SPEED {
                let forward = node.forward();
                world.accelerate(id, forward * THROTTLE)?;
            }
        }

        world.update(dt);
        total_contacts += world.contacts().len();

        if !report {
            continue;
        }
        for contact in world.contacts() {
            let body = &world.graph().node(contact.body)?.name;
            let partner = &world.graph().node(contact.partner)?.name;
            match contact.kind {
                CategoryKind::Obstacle => info!(
                    "Tick {}: {} stopped by {} ({:?} {:.3})",
                    contact.tick, body, partner, contact.direction, contact.distance
                ),
                CategoryKind::Free => info!(
                    "Tick {}: {} bumped {} ({:?} {:.3})",
                    contact.tick, body, partner, contact.direction, contact.distance
                ),
                CategoryKind::Trigger => {
                    debug!("Tick {}: {} touched {}", contact.tick, body, partner)
                }
                CategoryKind::None => {}
            }
        }
    }

    if report {
        info!("=== Run Results ===");
        info!("Ticks: {}, contacts: {}", world.tick(), total_contacts);
        info!("Cone reactions: {}", cone_hits.load(Ordering::Relaxed));
        if let Some(id) = player {
            let node = world.graph().node(id)?;
            let Vec3 { x, y, z } = node.translation;
            info!("{} rests at ({:.2}, {:.2}, {:.2})", PLAYER, x, y, z);
        }
    }

    Ok(world.state_hash())
}
