//! Crabfolio Headless Simulation Harness
//!
//! Runs the scripted scenarios and a seeded random input sweep against the
//! session engine. Runs entirely in-process with no rendering or audio.
//!
//! Usage:
//!   cargo run -p crabfolio-simtest
//!   cargo run -p crabfolio-simtest -- --verbose --seed 7 --ticks 50000

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crabfolio_core::engine::SessionEngine;
use crabfolio_core::scene::{InteractionAction, SceneConfig};
use crabfolio_logic::constants::catalog;
use crabfolio_logic::discovery::DiscoverySet;
use crabfolio_logic::door::{DoorError, DoorProgression};
use crabfolio_logic::geometry::{collides, is_within_bounds, Aabb, BoundsRect, Vec3};
use crabfolio_logic::keypad::KeypadFeedback;
use crabfolio_logic::movement::{CharacterController, MoveInput, MovementConfig, MovementMode};
use crabfolio_logic::proximity::{InteractiveGroup, ProximityIndex};
use crabfolio_logic::unlocks::{AccessoryId, UnlockRegistry};

#[derive(Parser, Debug)]
#[command(name = "crabfolio-simtest")]
#[command(about = "Headless scenario and invariant harness for the crab office")]
struct Cli {
    /// Print passing checks too (and default logging to info)
    #[arg(long)]
    verbose: bool,
    /// Seed for the random input sweep
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Ticks in the random input sweep
    #[arg(long, default_value_t = 20_000)]
    ticks: usize,
    /// Scene JSON to load instead of the built-in office
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Also write the results as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let scene = match &cli.scene {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneConfig::office().context("built-in office scene is invalid")?,
    };
    log::info!("running harness on scene '{}' (seed {})", scene.name, cli.seed);

    println!("=== Crabfolio Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scene data
    results.extend(validate_scene(&scene));

    // 2. Movement resolver
    results.extend(validate_movement());

    // 3. Proximity index
    results.extend(validate_proximity());

    // 4. Discovery + unlocks
    results.extend(validate_unlocks());

    // 5. Door progression
    results.extend(validate_door());

    // 6. Session walkthrough
    results.extend(validate_session(&scene)?);

    // 7. Random input sweep
    results.extend(run_random_sweep(&scene, cli.seed, cli.ticks)?);

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    println!();
    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }
    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── 1. Scene ────────────────────────────────────────────────────────────

fn validate_scene(scene: &SceneConfig) -> Vec<TestResult> {
    println!("--- Scene ---");
    let mut results = Vec::new();

    results.push(check(
        "scene_valid",
        scene.validate().is_ok(),
        format!(
            "{} obstacles, {} groups, {} meshes",
            scene.obstacles.len(),
            scene.groups.len(),
            scene.meshes.len()
        ),
    ));

    let empty_groups: Vec<&str> = scene
        .groups
        .iter()
        .filter(|g| !scene.meshes.iter().any(|m| m.group == g.key))
        .map(|g| g.key.as_str())
        .collect();
    results.push(check(
        "scene_groups_have_meshes",
        empty_groups.is_empty(),
        if empty_groups.is_empty() {
            "every group has at least one mesh".to_string()
        } else {
            format!("groups without meshes: {}", empty_groups.join(", "))
        },
    ));

    let undiscoverable: Vec<&str> = scene
        .catalog
        .iter()
        .filter(|id| !scene.groups.iter().any(|g| g.discovers.as_ref() == Some(*id)))
        .map(String::as_str)
        .collect();
    results.push(check(
        "scene_catalog_reachable",
        undiscoverable.is_empty(),
        format!("{} catalog ids, {} without a group", scene.catalog.len(), undiscoverable.len()),
    ));

    results
}

// ── 2. Movement ─────────────────────────────────────────────────────────

fn unit_box() -> Aabb {
    Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
}

fn validate_movement() -> Vec<TestResult> {
    println!("--- Movement ---");
    let mut results = Vec::new();
    let forward = MoveInput {
        forward: true,
        ..Default::default()
    };

    // Start inside an obstacle: no move on the first tick
    let mut ctrl = CharacterController::new(
        Vec3::new(0.0, 0.5, 0.0),
        BoundsRect::default(),
        vec![unit_box()],
        MovementConfig::default(),
    );
    let snap = ctrl.update(&forward, 0.016);
    results.push(check(
        "move_blocked_inside_obstacle",
        snap.position == Vec3::new(0.0, 0.5, 0.0),
        format!("position after tick: {:?}", snap.position),
    ));

    // Approach from outside: slide along the face, never enter
    let mut ctrl = CharacterController::new(
        Vec3::new(2.0, 0.5, 0.0),
        BoundsRect::default(),
        vec![unit_box()],
        MovementConfig::default(),
    );
    let diagonal = MoveInput {
        forward: true,
        left: true,
        ..Default::default()
    };
    let mut entered = false;
    for _ in 0..40 {
        ctrl.update(&diagonal, 0.016);
        let cfg = ctrl.config();
        entered |= collides(
            ctrl.transform().position,
            ctrl.obstacles(),
            cfg.collision_radius,
            cfg.crab_height,
            cfg.collision_margin,
        );
    }
    let p = ctrl.transform().position;
    results.push(check(
        "move_wall_slide",
        !entered && p.z < -0.5,
        format!("ended at ({:.2}, {:.2}), entered={}", p.x, p.z, entered),
    ));

    // Damping reaches exactly zero
    let mut ctrl = CharacterController::new(
        Vec3::new(0.0, 0.5, 0.0),
        BoundsRect::default(),
        Vec::new(),
        MovementConfig::default(),
    );
    ctrl.update(&forward, 0.016);
    let mut ticks = 0;
    while ctrl.transform().velocity != Vec3::ZERO && ticks < 500 {
        ctrl.update(&MoveInput::default(), 0.016);
        ticks += 1;
    }
    results.push(check(
        "move_damping_to_zero",
        ctrl.transform().velocity == Vec3::ZERO && ctrl.mode() == MovementMode::Idle,
        format!("stopped after {} idle ticks", ticks),
    ));

    // Bounds edge is inclusive
    let rect = BoundsRect::default();
    results.push(check(
        "bounds_inclusive",
        is_within_bounds(Vec3::new(rect.max_x, 0.0, rect.min_z), &rect)
            && !is_within_bounds(Vec3::new(rect.max_x + 0.001, 0.0, 0.0), &rect),
        "max edge in, just past it out",
    ));

    results
}

// ── 3. Proximity ────────────────────────────────────────────────────────

fn validate_proximity() -> Vec<TestResult> {
    println!("--- Proximity ---");
    let index = ProximityIndex::new(
        vec![
            InteractiveGroup::new("far", vec![Vec3::new(1.2, 1.0, 0.0)]),
            InteractiveGroup::new("near", vec![Vec3::new(0.0, 1.0, 0.5)]),
        ],
        1.5,
    );
    let at_origin = index.nearest(Vec3::ZERO).map(|s| s.key);
    let moved_away = index.nearest(Vec3::new(0.0, 0.0, 8.0));
    vec![
        check(
            "proximity_nearest",
            at_origin.as_deref() == Some("near"),
            format!("selected {:?}", at_origin),
        ),
        check(
            "proximity_out_of_range",
            moved_away.is_none(),
            "nothing selected 8 units away",
        ),
    ]
}

// ── 4. Unlocks ──────────────────────────────────────────────────────────

fn validate_unlocks() -> Vec<TestResult> {
    println!("--- Discovery & Unlocks ---");
    let mut discovery = DiscoverySet::new();
    let mut registry = UnlockRegistry::new();

    for id in &catalog::ALL[..7] {
        discovery.discover(id);
    }
    discovery.discover(catalog::ALL[0]);
    let early = registry.check_all(&discovery, catalog::ALL.len());

    discovery.discover(catalog::ALL[7]);
    let granted = registry.check_all(&discovery, catalog::ALL.len());
    let again = registry.check_all(&discovery, catalog::ALL.len());

    vec![
        check(
            "discover_idempotent",
            discovery.size() == catalog::ALL.len(),
            format!("{} ids after a duplicate discover", discovery.size()),
        ),
        check(
            "unlock_seven_of_eight_locked",
            early.is_empty(),
            format!("{:?} granted early", early),
        ),
        check(
            "unlock_eighth_grants_once",
            granted == vec![AccessoryId::HatPokemon] && again.is_empty(),
            format!("first {:?}, second {:?}", granted, again),
        ),
    ]
}

// ── 5. Door ─────────────────────────────────────────────────────────────

fn validate_door() -> Vec<TestResult> {
    println!("--- Door ---");
    let mut results = Vec::new();

    let mut door = DoorProgression::default();
    let passwords: Vec<String> = crabfolio_logic::constants::DOOR_PASSWORDS
        .iter()
        .map(|p| p.to_string())
        .collect();

    let skip = door.submit(&passwords[2]);
    results.push(check(
        "door_no_skip",
        matches!(skip, Err(DoorError::IncorrectPassword { stage: 0, .. })) && door.stage() == 0,
        format!("{:?}", skip),
    ));

    let stages: Vec<usize> = passwords
        .iter()
        .filter_map(|pw| door.submit(pw).ok().map(|a| a.new_stage))
        .collect();
    results.push(check(
        "door_linear_progression",
        stages == vec![1, 2, 3, 4, 5] && door.is_unlocked(),
        format!("stages {:?}", stages),
    ));

    let after = door.submit(&passwords[4]);
    results.push(check(
        "door_already_complete",
        matches!(after, Err(DoorError::AlreadyComplete { total: 5 })),
        format!("{:?}", after),
    ));

    results
}

// ── 6. Session ──────────────────────────────────────────────────────────

fn validate_session(scene: &SceneConfig) -> Result<Vec<TestResult>> {
    println!("--- Session ---");
    let mut results = Vec::new();
    let mut engine = SessionEngine::new(scene.clone())?;

    // Walk forward until the desk stops the crab, then interact
    engine.key_down("w");
    for _ in 0..90 {
        engine.tick(0.016);
    }
    engine.key_up("w");
    let selected = engine.tick(0.016).selected;
    engine.key_down("e");
    let fired = engine.tick(0.016).activated;
    engine.key_up("e");
    results.push(check(
        "session_walk_and_interact",
        fired.is_some(),
        format!("selected {:?}, fired {:?}", selected, fired.map(|i| i.action.as_str())),
    ));

    // Door group stays hidden until the keypad is solved
    let denied = "000000".chars().map(|c| engine.keypad_press(c)).last();
    let granted = scene.keypad_code.chars().map(|c| engine.keypad_press(c)).last();
    results.push(check(
        "session_keypad",
        denied == Some(KeypadFeedback::Denied) && granted == Some(KeypadFeedback::Granted),
        format!("wrong code {:?}, right code {:?}", denied, granted),
    ));

    let crisis = (0..5).map(|_| engine.whoami()).last();
    results.push(check(
        "session_whoami_hat",
        crisis == Some(true) && engine.is_unlocked(AccessoryId::HatCrisis),
        format!("{} whoami queries", engine.whoami_count()),
    ));

    let mut bytes = Vec::new();
    engine.save(&mut bytes)?;
    let mut resumed = SessionEngine::new(scene.clone())?;
    resumed.load(bytes.as_slice())?;
    results.push(check(
        "session_save_load",
        resumed.keypad_granted()
            && resumed.is_unlocked(AccessoryId::HatCrisis)
            && resumed.discovery() == engine.discovery(),
        format!("{} byte save", bytes.len()),
    ));

    Ok(results)
}

// ── 7. Random sweep ─────────────────────────────────────────────────────

const SWEEP_KEYS: [&str; 9] = ["w", "a", "s", "d", "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "e"];
const KEYPAD_BUTTONS: &[u8] = b"0123456789*";

fn run_random_sweep(scene: &SceneConfig, seed: u64, ticks: usize) -> Result<Vec<TestResult>> {
    println!("--- Random sweep (seed {}, {} ticks) ---", seed, ticks);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut engine = SessionEngine::new(scene.clone())?;
    let obstacles = scene.obstacle_boxes();
    let m = &scene.movement;
    let radius = scene.interaction.activation_radius;

    let mut held: HashSet<&str> = HashSet::new();
    let mut position_violations = 0usize;
    let mut door_violations = 0usize;
    let mut discovery_violations = 0usize;
    let mut unlock_violations = 0usize;
    let mut selection_violations = 0usize;
    let mut interactions = 0usize;
    let mut terminal_opens = 0usize;

    let mut last_stage = 0usize;
    let mut last_discovered = 0usize;
    let mut ever_unlocked: HashSet<AccessoryId> = HashSet::new();

    for _ in 0..ticks {
        // Input noise
        if rng.gen_bool(0.05) {
            let key = SWEEP_KEYS[rng.gen_range(0..SWEEP_KEYS.len())];
            if held.remove(key) {
                engine.key_up(key);
            } else {
                held.insert(key);
                engine.key_down(key);
            }
        }
        if rng.gen_bool(0.01) {
            engine.set_joystick(rng.gen_range(-1.0f32..=1.0), rng.gen_range(-1.0f32..=1.0));
        }
        if rng.gen_bool(0.01) {
            engine.release_joystick();
        }
        if rng.gen_bool(0.002) {
            engine.blur();
            held.clear();
        }

        // Progression noise
        if rng.gen_bool(0.01) {
            let pw = if rng.gen_bool(0.5) {
                scene.door_passwords[rng.gen_range(0..scene.door_passwords.len())].clone()
            } else {
                "hunter2".to_string()
            };
            let _ = engine.submit_password(&pw);
        }
        if rng.gen_bool(0.005) {
            let button = KEYPAD_BUTTONS[rng.gen_range(0..KEYPAD_BUTTONS.len())] as char;
            engine.keypad_press(button);
        }
        if rng.gen_bool(0.002) {
            engine.whoami();
        }

        let dt = if rng.gen_bool(0.01) {
            rng.gen_range(0.05f32..1.0)
        } else {
            rng.gen_range(0.0f32..0.034)
        };
        let report = engine.tick(dt);

        // Invariants
        let p = report.snapshot.position;
        if !is_within_bounds(p, &scene.bounds)
            || collides(p, &obstacles, m.collision_radius, m.crab_height, m.collision_margin)
        {
            position_violations += 1;
        }

        let status = engine.door_status();
        if status.stage < last_stage || status.stage > status.total || status.unlocked != (status.stage == status.total) {
            door_violations += 1;
        }
        last_stage = status.stage;

        let discovered = engine.discovery().size();
        if discovered < last_discovered {
            discovery_violations += 1;
        }
        last_discovered = discovered;

        for id in AccessoryId::ALL {
            if engine.is_unlocked(id) {
                ever_unlocked.insert(id);
            } else if ever_unlocked.contains(&id) {
                unlock_violations += 1;
            }
        }

        if let Some(key) = &report.selected {
            let nearest = scene
                .meshes
                .iter()
                .filter(|mesh| &mesh.group == key)
                .map(|mesh| p.distance_xz(&mesh.position))
                .fold(f32::INFINITY, f32::min);
            if nearest > radius + 1e-4 {
                selection_violations += 1;
            }
        }

        if let Some(interaction) = report.activated {
            interactions += 1;
            if interaction.action == InteractionAction::Terminal {
                terminal_opens += 1;
            }
        }
    }

    let progress = engine.catalog_progress();
    log::info!(
        "sweep finished: {} interactions, {:.0}% discovered, door {}/{}",
        interactions,
        progress.percentage(),
        last_stage,
        engine.door_status().total
    );

    Ok(vec![
        check(
            "sweep_position_valid",
            position_violations == 0,
            format!("{} ticks out of bounds or inside an obstacle", position_violations),
        ),
        check(
            "sweep_door_monotonic",
            door_violations == 0,
            format!("door ended at stage {}, {} violations", last_stage, door_violations),
        ),
        check(
            "sweep_discovery_monotonic",
            discovery_violations == 0,
            format!(
                "{} discovered ({:.0}%), {} violations",
                last_discovered,
                progress.percentage(),
                discovery_violations
            ),
        ),
        check(
            "sweep_unlock_ratchet",
            unlock_violations == 0,
            format!("{} unlocked, {} violations", ever_unlocked.len(), unlock_violations),
        ),
        check(
            "sweep_selection_in_range",
            selection_violations == 0,
            format!(
                "{} interactions ({} terminal), {} out-of-range selections",
                interactions, terminal_opens, selection_violations
            ),
        ),
    ])
}
