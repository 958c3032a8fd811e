//! Game constants: movement tuning, scene bounds, catalog ids, secrets.
//!
//! Plain `const` values with no engine dependency. The session engine and
//! the headless simtest both read these; config structs elsewhere use them
//! for their `Default` impls.

pub mod movement {
    /// Crab walking speed (units/second).
    pub const SPEED: f32 = 3.0;
    /// Multiplicative velocity decay per tick while no direction is held.
    pub const DAMPING: f32 = 0.85;
    /// Below this speed the crab snaps to a full stop.
    pub const MIN_VELOCITY: f32 = 0.01;
    /// Largest delta (seconds) a single tick may integrate.
    pub const MAX_DELTA: f32 = 0.05;
    /// Direction magnitude required before the crab turns to face it.
    pub const FACING_THRESHOLD: f32 = 0.1;
}

pub mod physics {
    /// Horizontal half-width of the crab, claws included.
    pub const COLLISION_RADIUS: f32 = 0.55;
    /// Height of the crab's collision box above its feet.
    pub const CRAB_HEIGHT: f32 = 0.8;
    /// Extra horizontal padding so the crab never hugs obstacles.
    pub const COLLISION_MARGIN: f32 = 0.25;
    /// The crab's Y is pinned here every tick (sits above the desk legs).
    pub const GROUND_Y: f32 = 0.5;
}

pub mod wall_probe {
    /// Furthest distance sampled in front of the crab.
    pub const MAX_DISTANCE: f32 = 2.0;
    /// Spacing between samples.
    pub const STEP: f32 = 0.2;
    /// Distance of the first sample.
    pub const FIRST_SAMPLE: f32 = 0.1;
    /// Sample height above the crab's origin.
    pub const HEIGHT: f32 = 0.4;
    /// Claw rotation offset at full proximity (radians, negated when applied).
    pub const CLAW_RAISE: f32 = 1.5;
}

pub mod scene_bounds {
    pub const MIN_X: f32 = -10.0;
    pub const MAX_X: f32 = 10.0;
    pub const MIN_Z: f32 = -7.5;
    pub const MAX_Z: f32 = 7.5;
}

pub mod interaction {
    /// Nearest group must be at most this far (XZ plane) to be selected.
    pub const ACTIVATION_RADIUS: f32 = 1.5;
    /// Emissive color applied to the selected group.
    pub const HIGHLIGHT_COLOR: u32 = 0x9575cd;
    pub const HIGHLIGHT_INTENSITY: f32 = 2.4;
    /// Interval of the safety-net unlock poll.
    pub const UNLOCK_POLL_SECONDS: f32 = 5.0;
    /// Seconds without activity before the crab yawns.
    pub const IDLE_SECONDS: f64 = 60.0;
    /// `whoami` count that earns the crisis hat.
    pub const WHOAMI_THRESHOLD: u32 = 5;
    /// The crab dances on every Nth mug click.
    pub const DANCE_EVERY: u32 = 3;
    /// Joystick components below this magnitude are ignored.
    pub const JOYSTICK_DEAD_ZONE: f32 = 0.1;
}

/// Discovery catalog ids (the progress map's master list).
pub mod catalog {
    pub const COMPUTER: &str = "computer";
    pub const POSTER_1: &str = "poster_1";
    pub const POSTER_2: &str = "poster_2";
    pub const CV_SHEET: &str = "cv_sheet";
    pub const MUG: &str = "mug";
    pub const LAMP: &str = "lamp";
    pub const KEYPAD: &str = "keypad";
    pub const SWITCH: &str = "switch";

    pub const ALL: [&str; 8] = [
        COMPUTER, POSTER_1, POSTER_2, CV_SHEET, MUG, LAMP, KEYPAD, SWITCH,
    ];
}

/// Door passwords, in stage order.
pub const DOOR_PASSWORDS: [&str; 5] = [
    "cr4b_m4st3r_2025",
    "m4st3rp13c3",
    "k33p_sm1l1ng",
    "k0n4m1_c0d3",
    "50_m374",
];

/// Security keypad code; checked once the buffer reaches its length.
pub const KEYPAD_CODE: &str = "*1337*";

/// Unread mails in the inbox before any door stage is cleared.
pub const INITIAL_MAIL_COUNT: u32 = 1;

/// Clearing a stage while this many mails are in the inbox delivers two,
/// so mail 3 never arrives on its own.
pub const DOUBLE_MAIL_AT: u32 = 2;
