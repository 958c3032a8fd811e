//! Integration tests across the logic modules.
//!
//! Exercises: input → CharacterController → ProximityIndex → InteractTrigger
//! → DiscoverySet → UnlockRegistry, plus the door/keypad/mailbox chain.
//!
//! All tests are pure logic with no ECS and no rendering.

use crabfolio_logic::constants::{catalog, physics, DOOR_PASSWORDS};
use crabfolio_logic::discovery::DiscoverySet;
use crabfolio_logic::door::{DoorError, DoorProgression};
use crabfolio_logic::geometry::{collides, is_within_bounds, Aabb, BoundsRect, Vec3};
use crabfolio_logic::input::{KeyboardLayout, KeyboardState};
use crabfolio_logic::keypad::{KeypadFeedback, SecurityKeypad};
use crabfolio_logic::movement::{CharacterController, MoveInput, MovementConfig, MovementMode};
use crabfolio_logic::proximity::{InteractTrigger, InteractiveGroup, ProximityIndex};
use crabfolio_logic::unlocks::{AccessoryId, UnlockRegistry};

// ── Helpers ────────────────────────────────────────────────────────────

fn aabb(min: [f32; 3], max: [f32; 3]) -> Aabb {
    Aabb::new(min.into(), max.into())
}

/// The office walls and furniture.
fn office_obstacles() -> Vec<Aabb> {
    vec![
        aabb([-6.0, 0.0, 3.0], [6.0, 3.0, 4.0]),
        aabb([-6.0, 0.0, -5.5], [6.0, 3.0, -4.5]),
        aabb([-6.5, 0.0, -5.0], [-5.5, 3.0, 5.0]),
        aabb([5.5, 0.0, -5.0], [6.5, 3.0, 5.0]),
        aabb([-1.8, 0.0, -4.0], [1.8, 1.0, -2.3]),
        aabb([4.2, 0.0, -5.0], [5.0, 1.5, -3.0]),
        aabb([-5.0, 0.0, -4.0], [-4.0, 2.0, -3.0]),
    ]
}

fn office_controller() -> CharacterController {
    CharacterController::new(
        Vec3::new(0.0, physics::GROUND_Y, 0.0),
        BoundsRect::default(),
        office_obstacles(),
        MovementConfig::default(),
    )
}

fn assert_valid(ctrl: &CharacterController) {
    let cfg = ctrl.config();
    let p = ctrl.transform().position;
    assert!(is_within_bounds(p, ctrl.bounds()), "out of bounds at {p:?}");
    assert!(
        !collides(p, ctrl.obstacles(), cfg.collision_radius, cfg.crab_height, cfg.collision_margin),
        "inside an obstacle at {p:?}"
    );
}

// ── Movement ───────────────────────────────────────────────────────────

#[test]
fn start_inside_obstacle_never_moves() {
    let mut ctrl = CharacterController::new(
        Vec3::new(0.0, 0.5, 0.0),
        BoundsRect::default(),
        vec![aabb([-1.0, 0.0, -1.0], [1.0, 1.0, 1.0])],
        MovementConfig::default(),
    );
    let input = MoveInput {
        forward: true,
        ..Default::default()
    };
    let snap = ctrl.update(&input, 0.016);
    assert_eq!(snap.position, Vec3::new(0.0, 0.5, 0.0));
    assert_eq!(snap.velocity, Vec3::ZERO);
}

#[test]
fn approach_from_outside_slides_instead_of_passing_through() {
    let obstacle = aabb([-1.0, 0.0, -1.0], [1.0, 1.0, 1.0]);
    let mut ctrl = CharacterController::new(
        Vec3::new(2.0, 0.5, 0.0),
        BoundsRect::default(),
        vec![obstacle],
        MovementConfig::default(),
    );
    // Push into the box (left) while also moving along its face (forward)
    let input = MoveInput {
        forward: true,
        left: true,
        ..Default::default()
    };
    for _ in 0..30 {
        ctrl.update(&input, 0.016);
        assert_valid(&ctrl);
    }
    let p = ctrl.transform().position;
    assert!(p.x > 1.79, "x should stop at the box face, got {}", p.x);
    assert!(p.z < -0.5, "z should keep sliding, got {}", p.z);
}

#[test]
fn scripted_walk_around_office_stays_valid() {
    let mut ctrl = office_controller();
    let mut keys = KeyboardState::default();
    let pattern = ["w", "a", "s", "d", "w", "d", "s", "a"];
    for (i, key) in pattern.iter().cycle().take(64).enumerate() {
        keys.clear();
        keys.key_down(KeyboardLayout::Qwerty, key);
        if i % 3 == 0 {
            keys.key_down(KeyboardLayout::Qwerty, pattern[(i + 1) % pattern.len()]);
        }
        for _ in 0..40 {
            let snap = ctrl.update(&keys.move_input(None), 0.016);
            assert_eq!(snap.position.y, physics::GROUND_Y);
            assert_valid(&ctrl);
        }
    }
}

#[test]
fn release_decays_to_idle() {
    let mut ctrl = office_controller();
    let walk = MoveInput {
        right: true,
        ..Default::default()
    };
    assert_eq!(ctrl.update(&walk, 0.016).mode, MovementMode::Walking);
    let mut snap = ctrl.snapshot();
    for _ in 0..100 {
        snap = ctrl.update(&MoveInput::default(), 0.016);
    }
    assert_eq!(snap.mode, MovementMode::Idle);
    assert_eq!(snap.velocity, Vec3::ZERO);
}

// ── Interaction → progression ──────────────────────────────────────────

#[test]
fn walking_up_to_the_mug_discovers_it() {
    let groups = vec![
        InteractiveGroup::new("laptop", vec![Vec3::new(0.3, 1.05, -2.6)]),
        InteractiveGroup::new("mug", vec![Vec3::new(-1.2, 1.05, -2.5)]),
    ];
    let index = ProximityIndex::with_default_radius(groups);
    let mut ctrl = office_controller();
    let mut trigger = InteractTrigger::new();
    let mut discovery = DiscoverySet::new();

    // Nothing in range at spawn
    assert!(index.nearest(ctrl.transform().position).is_none());

    // Walk up-left until blocked by the desk
    let input = MoveInput {
        forward: true,
        left: true,
        ..Default::default()
    };
    for _ in 0..60 {
        ctrl.update(&input, 0.016);
    }
    let selected = index.nearest(ctrl.transform().position).map(|s| s.key);
    assert_eq!(selected.as_deref(), Some("mug"));

    if let Some(key) = trigger.update(true, selected.as_deref()) {
        discovery.discover(&key);
    }
    assert!(discovery.is_discovered("mug"));
}

#[test]
fn discover_all_then_check_unlocks_pokemon_hat() {
    let mut discovery = DiscoverySet::new();
    let mut registry = UnlockRegistry::new();
    for id in &catalog::ALL[..7] {
        discovery.discover(id);
        assert!(registry.check_all(&discovery, catalog::ALL.len()).is_empty());
    }
    discovery.discover(catalog::ALL[7]);
    let granted = registry.check_all(&discovery, catalog::ALL.len());
    assert_eq!(granted, vec![AccessoryId::HatPokemon]);
    assert!(registry.check_all(&discovery, catalog::ALL.len()).is_empty());
    registry.equip(Some(AccessoryId::HatPokemon)).unwrap();
}

#[test]
fn keypad_then_full_door_run() {
    let mut pad = SecurityKeypad::default();
    let mut door = DoorProgression::default();

    let results: Vec<KeypadFeedback> = "*1337*".chars().map(|c| pad.press(c)).collect();
    assert_eq!(results.last(), Some(&KeypadFeedback::Granted));

    assert!(door.submit(DOOR_PASSWORDS[2]).is_err());
    for (stage, pw) in DOOR_PASSWORDS.iter().enumerate() {
        assert_eq!(door.status().stage, stage);
        door.submit(pw).unwrap();
    }
    assert!(door.status().unlocked);
    // Welcome mail, one per stage, plus the double delivery on stage two
    assert_eq!(door.mail_count(), 2 + DOOR_PASSWORDS.len() as u32);
    assert_eq!(
        door.submit(DOOR_PASSWORDS[4]),
        Err(DoorError::AlreadyComplete { total: 5 })
    );
}
