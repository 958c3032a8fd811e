//! Character controller: raw input to a collision-resolved crab transform.
//!
//! Algorithm per tick: "try three moves, keep the best"
//! 1. Direction from the joystick override, else the keyboard flags; normalized
//! 2. Held direction sets velocity = direction × speed; no input damps it
//! 3. Test X-only, Z-only and combined moves against bounds + obstacles
//! 4. Combined if clear, else slide along the one free axis, else stop
//! 5. Face the input direction even when the move was refused
//! 6. Pin Y to the ground, refresh the cached wall proximity
//!
//! The controller owns its [`Transform`]; consumers only ever receive
//! [`CrabSnapshot`] copies.

use serde::{Deserialize, Serialize};

use crate::constants::{movement, physics, wall_probe};
use crate::geometry::{collides, is_within_bounds, Aabb, BoundsRect, Vec3};

/// What the crab is doing, for animation and footstep selection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Idle,
    Walking,
    Interacting,
}

impl MovementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementMode::Idle => "idle",
            MovementMode::Walking => "walking",
            MovementMode::Interacting => "interacting",
        }
    }
}

/// Directional input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Touch joystick direction on the XZ plane. When present it replaces
    /// the keyboard flags entirely.
    pub joystick: Option<Vec3>,
}

impl MoveInput {
    /// Unit-length direction on the XZ plane, or zero.
    pub fn direction(&self) -> Vec3 {
        let raw = match self.joystick {
            Some(j) => Vec3::new(j.x, 0.0, j.z),
            None => {
                let mut d = Vec3::ZERO;
                if self.forward {
                    d.z -= 1.0;
                }
                if self.backward {
                    d.z += 1.0;
                }
                if self.left {
                    d.x -= 1.0;
                }
                if self.right {
                    d.x += 1.0;
                }
                d
            }
        };
        raw.normalize()
    }
}

/// Position, facing and velocity of the crab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation around Y, radians. 0 faces +Z.
    pub yaw: f32,
    pub velocity: Vec3,
}

/// Read-only copy handed to the renderer, camera and UI once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrabSnapshot {
    pub position: Vec3,
    pub yaw: f32,
    pub velocity: Vec3,
    pub mode: MovementMode,
    /// 0 when nothing is ahead, approaching 1 right against a wall.
    pub wall_proximity: f32,
}

impl CrabSnapshot {
    /// Claw rotation offset the animation layer eases towards.
    pub fn claw_target(&self) -> f32 {
        -self.wall_proximity * wall_probe::CLAW_RAISE
    }
}

/// Tuning for [`CharacterController`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub speed: f32,
    pub damping: f32,
    pub min_velocity: f32,
    pub max_delta: f32,
    pub facing_threshold: f32,
    pub collision_radius: f32,
    pub crab_height: f32,
    pub collision_margin: f32,
    pub ground_y: f32,
    pub probe_max_distance: f32,
    pub probe_step: f32,
    pub probe_first_sample: f32,
    pub probe_height: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: movement::SPEED,
            damping: movement::DAMPING,
            min_velocity: movement::MIN_VELOCITY,
            max_delta: movement::MAX_DELTA,
            facing_threshold: movement::FACING_THRESHOLD,
            collision_radius: physics::COLLISION_RADIUS,
            crab_height: physics::CRAB_HEIGHT,
            collision_margin: physics::COLLISION_MARGIN,
            ground_y: physics::GROUND_Y,
            probe_max_distance: wall_probe::MAX_DISTANCE,
            probe_step: wall_probe::STEP,
            probe_first_sample: wall_probe::FIRST_SAMPLE,
            probe_height: wall_probe::HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ProbeCacheEntry {
    position: Vec3,
    yaw: f32,
    value: f32,
}

/// Kinematic controller for the crab. Bounds and obstacles are fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct CharacterController {
    transform: Transform,
    mode: MovementMode,
    bounds: BoundsRect,
    obstacles: Vec<Aabb>,
    config: MovementConfig,
    wall_proximity: f32,
    probe_cache: Option<ProbeCacheEntry>,
    probe_casts: u64,
}

impl CharacterController {
    pub fn new(start: Vec3, bounds: BoundsRect, obstacles: Vec<Aabb>, config: MovementConfig) -> Self {
        Self {
            transform: Transform {
                position: start,
                ..Transform::default()
            },
            mode: MovementMode::Idle,
            bounds,
            obstacles,
            config,
            wall_proximity: 0.0,
            probe_cache: None,
            probe_casts: 0,
        }
    }

    /// Advance one tick. `delta_seconds` is clamped to `max_delta`.
    pub fn update(&mut self, input: &MoveInput, delta_seconds: f32) -> CrabSnapshot {
        let dt = delta_seconds.clamp(0.0, self.config.max_delta);
        let direction = input.direction();
        let has_direction = direction.length() > 0.0;

        let velocity = &mut self.transform.velocity;
        if has_direction {
            velocity.x = direction.x * self.config.speed;
            velocity.z = direction.z * self.config.speed;
            self.mode = MovementMode::Walking;
        } else {
            *velocity = *velocity * self.config.damping;
            if velocity.length() < self.config.min_velocity {
                *velocity = Vec3::ZERO;
                self.mode = MovementMode::Idle;
            }
        }

        let pos = self.transform.position;
        let dx = self.transform.velocity.x * dt;
        let dz = self.transform.velocity.z * dt;

        let test_x = Vec3::new(pos.x + dx, pos.y, pos.z);
        let test_z = Vec3::new(pos.x, pos.y, pos.z + dz);
        let test_both = Vec3::new(pos.x + dx, pos.y, pos.z + dz);

        let can_x = self.can_occupy(test_x);
        let can_z = self.can_occupy(test_z);
        let can_both = self.can_occupy(test_both);

        if can_both {
            self.transform.position = test_both;
        } else if can_x && !can_z {
            self.transform.position = test_x;
            self.transform.velocity.z = 0.0;
        } else if can_z && !can_x {
            self.transform.position = test_z;
            self.transform.velocity.x = 0.0;
        } else {
            self.transform.velocity.x = 0.0;
            self.transform.velocity.z = 0.0;
        }

        // Facing follows input, not the resolved move.
        if direction.length() > self.config.facing_threshold {
            self.transform.yaw = direction.x.atan2(direction.z);
        }

        self.transform.position.y = self.config.ground_y;
        self.wall_proximity = self.wall_proximity();

        self.snapshot()
    }

    /// Inside the playable rect and clear of every obstacle.
    pub fn can_occupy(&self, point: Vec3) -> bool {
        is_within_bounds(point, &self.bounds)
            && !collides(
                point,
                &self.obstacles,
                self.config.collision_radius,
                self.config.crab_height,
                self.config.collision_margin,
            )
    }

    /// Proximity of the nearest obstacle straight ahead, in [0, 1].
    ///
    /// Cached on exact (position, yaw) equality; an unchanged transform
    /// never re-casts the probe.
    pub fn wall_proximity(&mut self) -> f32 {
        let position = self.transform.position;
        let yaw = self.transform.yaw;
        if let Some(entry) = self.probe_cache {
            if entry.position == position && entry.yaw == yaw {
                return entry.value;
            }
        }
        let value = self.cast_probe(position, yaw);
        self.probe_casts += 1;
        self.probe_cache = Some(ProbeCacheEntry {
            position,
            yaw,
            value,
        });
        value
    }

    fn cast_probe(&self, position: Vec3, yaw: f32) -> f32 {
        let cfg = &self.config;
        if cfg.probe_step <= 0.0 || cfg.probe_max_distance <= 0.0 {
            return 0.0;
        }
        let (dir_x, dir_z) = (yaw.sin(), yaw.cos());
        let samples = ((cfg.probe_max_distance - cfg.probe_first_sample) / cfg.probe_step)
            .floor()
            .max(0.0) as usize
            + 1;

        for i in 0..samples {
            let distance = cfg.probe_first_sample + cfg.probe_step * i as f32;
            if distance >= cfg.probe_max_distance {
                break;
            }
            let sample = Vec3::new(
                position.x + dir_x * distance,
                position.y + cfg.probe_height,
                position.z + dir_z * distance,
            );
            if self.obstacles.iter().any(|o| o.contains_point(sample)) {
                return (1.0 - distance / cfg.probe_max_distance).clamp(0.0, 1.0);
            }
        }
        0.0
    }

    pub fn snapshot(&self) -> CrabSnapshot {
        CrabSnapshot {
            position: self.transform.position,
            yaw: self.transform.yaw,
            velocity: self.transform.velocity,
            mode: self.mode,
            wall_proximity: self.wall_proximity,
        }
    }

    /// Copy of the current transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn bounds(&self) -> &BoundsRect {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Number of probe casts actually performed (cache misses).
    pub fn probe_casts(&self) -> u64 {
        self.probe_casts
    }

    /// Teleport to `position`, stopped and facing +Z.
    pub fn reset(&mut self, position: Vec3) {
        self.transform = Transform {
            position,
            ..Transform::default()
        };
        self.mode = MovementMode::Idle;
        self.wall_proximity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn open_floor(start: Vec3) -> CharacterController {
        CharacterController::new(start, BoundsRect::default(), vec![], MovementConfig::default())
    }

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    fn keys(forward: bool, backward: bool, left: bool, right: bool) -> MoveInput {
        MoveInput {
            forward,
            backward,
            left,
            right,
            joystick: None,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // --- Direction ---

    #[test]
    fn forward_is_negative_z() {
        let d = keys(true, false, false, false).direction();
        assert_eq!(d, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn diagonal_is_normalized() {
        let d = keys(true, false, false, true).direction();
        assert!(close(d.length(), 1.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        assert_eq!(keys(true, true, true, true).direction(), Vec3::ZERO);
    }

    #[test]
    fn joystick_overrides_keys() {
        let input = MoveInput {
            forward: true,
            joystick: Some(Vec3::new(0.5, 0.0, 0.0)),
            ..MoveInput::default()
        };
        assert_eq!(input.direction(), Vec3::new(1.0, 0.0, 0.0));
    }

    // --- Free movement ---

    #[test]
    fn free_move_forward() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        let s = c.update(&keys(true, false, false, false), DT);
        assert!(close(s.position.z, -3.0 * DT));
        assert!(close(s.position.x, 0.0));
        assert_eq!(s.mode, MovementMode::Walking);
        assert!(close(s.yaw, std::f32::consts::PI));
    }

    #[test]
    fn delta_is_clamped() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        let s = c.update(&keys(false, false, false, true), 1.0);
        assert!(close(s.position.x, 3.0 * 0.05), "x={}", s.position.x);
    }

    #[test]
    fn negative_delta_does_not_move() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        let s = c.update(&keys(false, false, false, true), -0.5);
        assert_eq!(s.position.x, 0.0);
    }

    #[test]
    fn y_pinned_to_ground() {
        let mut c = open_floor(Vec3::new(0.0, 3.0, 0.0));
        let s = c.update(&MoveInput::default(), DT);
        assert_eq!(s.position.y, physics::GROUND_Y);
    }

    // --- Damping ---

    #[test]
    fn release_damps_then_stops_exactly() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        c.update(&keys(false, false, false, true), DT);

        let s = c.update(&MoveInput::default(), DT);
        assert!(close(s.velocity.x, 3.0 * 0.85));
        assert_eq!(s.mode, MovementMode::Walking, "still coasting");

        let mut last = s;
        for _ in 0..60 {
            last = c.update(&MoveInput::default(), DT);
        }
        assert_eq!(last.velocity, Vec3::ZERO);
        assert_eq!(last.mode, MovementMode::Idle);
    }

    // --- Collisions ---

    #[test]
    fn start_inside_obstacle_stays_put() {
        let mut c = CharacterController::new(
            Vec3::new(0.0, 0.5, 0.0),
            BoundsRect::default(),
            vec![unit_box()],
            MovementConfig::default(),
        );
        let s = c.update(&keys(true, false, false, false), DT);
        assert_eq!(s.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn blocked_crab_still_turns() {
        let mut c = CharacterController::new(
            Vec3::new(0.0, 0.5, 0.0),
            BoundsRect::default(),
            vec![unit_box()],
            MovementConfig::default(),
        );
        let s = c.update(&keys(false, false, false, true), DT);
        assert_eq!(s.position.x, 0.0);
        assert!(close(s.yaw, std::f32::consts::FRAC_PI_2));
    }

    #[test]
    fn diagonal_into_box_slides_along_x() {
        // Body half-extent is 0.8; at z=1.85 the body clears the box by 0.05.
        let mut c = CharacterController::new(
            Vec3::new(0.0, 0.5, 1.85),
            BoundsRect::default(),
            vec![unit_box()],
            MovementConfig::default(),
        );
        let s = c.update(&keys(true, false, false, true), 0.05);
        let step = 3.0 * 0.05 / 2f32.sqrt();
        assert!(close(s.position.x, step), "x={}", s.position.x);
        assert_eq!(s.position.z, 1.85);
        assert_eq!(s.velocity.z, 0.0);
        assert!(s.velocity.x > 0.0);
        assert!(!collides(s.position, &[unit_box()], 0.55, 0.8, 0.25));
    }

    #[test]
    fn corner_of_bounds_blocks_both_axes() {
        let bounds = BoundsRect::new(-1.0, 1.0, -1.0, 1.0);
        let mut c =
            CharacterController::new(Vec3::new(1.0, 0.5, -1.0), bounds, vec![], MovementConfig::default());
        let s = c.update(&keys(true, false, false, true), DT);
        assert_eq!(s.position.x, 1.0);
        assert_eq!(s.position.z, -1.0);
        assert_eq!(s.velocity, Vec3::ZERO);
    }

    #[test]
    fn slides_along_boundary_edge() {
        let bounds = BoundsRect::new(-1.0, 1.0, -1.0, 1.0);
        let mut c =
            CharacterController::new(Vec3::new(1.0, 0.5, 0.0), bounds, vec![], MovementConfig::default());
        let s = c.update(&keys(true, false, false, false), DT);
        assert_eq!(s.position.x, 1.0, "edge is in bounds");
        assert!(s.position.z < 0.0);
    }

    // --- Wall proximity ---

    fn wall_ahead() -> CharacterController {
        // Facing +Z (yaw 0), wall face at z=1.0
        let wall = Aabb::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 2.0, 2.0));
        CharacterController::new(
            Vec3::new(0.0, 0.5, 0.0),
            BoundsRect::default(),
            vec![wall],
            MovementConfig::default(),
        )
    }

    #[test]
    fn proximity_from_first_hit() {
        let mut c = wall_ahead();
        // Samples at 0.1, 0.3, ... first inside the wall is 1.1
        let p = c.wall_proximity();
        assert!(close(p, 1.0 - 1.1 / 2.0), "p={p}");
    }

    #[test]
    fn proximity_zero_when_clear() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(c.wall_proximity(), 0.0);
    }

    #[test]
    fn proximity_cached_until_transform_changes() {
        let mut c = wall_ahead();
        c.wall_proximity();
        c.wall_proximity();
        assert_eq!(c.probe_casts(), 1);

        c.reset(Vec3::new(0.0, 0.5, -0.6));
        let p = c.wall_proximity();
        assert_eq!(c.probe_casts(), 2);
        assert!(close(p, 1.0 - 1.7 / 2.0), "p={p}");
    }

    #[test]
    fn idle_ticks_reuse_probe() {
        let mut c = wall_ahead();
        c.update(&MoveInput::default(), DT);
        c.update(&MoveInput::default(), DT);
        c.update(&MoveInput::default(), DT);
        assert_eq!(c.probe_casts(), 1);
    }

    #[test]
    fn claw_target_scales_with_proximity() {
        let s = CrabSnapshot {
            wall_proximity: 0.5,
            ..CrabSnapshot::default()
        };
        assert!(close(s.claw_target(), -0.75));
    }

    #[test]
    fn reset_stops_and_idles() {
        let mut c = open_floor(Vec3::new(0.0, 0.5, 0.0));
        c.update(&keys(true, false, false, false), DT);
        c.reset(Vec3::new(2.0, 0.5, 2.0));
        let t = c.transform();
        assert_eq!(t.position, Vec3::new(2.0, 0.5, 2.0));
        assert_eq!(t.velocity, Vec3::ZERO);
        assert_eq!(c.mode(), MovementMode::Idle);
    }
}
