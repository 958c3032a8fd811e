//! Easter-egg counters that feed external triggers and animation cues.
//!
//! - [`KonamiTracker`]: up up down down left right left right b a
//! - [`IdentityQueryCounter`]: repeated `whoami` earns the crisis hat
//! - [`MugCounter`]: every third coffee makes the crab dance
//! - [`IdleTracker`]: a minute without activity makes the crab yawn once

use serde::{Deserialize, Serialize};

use crate::constants::interaction::{DANCE_EVERY, IDLE_SECONDS, WHOAMI_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KonamiStep {
    Up,
    Down,
    Left,
    Right,
    B,
    A,
}

const KONAMI_SEQUENCE: [KonamiStep; 10] = [
    KonamiStep::Up,
    KonamiStep::Up,
    KonamiStep::Down,
    KonamiStep::Down,
    KonamiStep::Left,
    KonamiStep::Right,
    KonamiStep::Left,
    KonamiStep::Right,
    KonamiStep::B,
    KonamiStep::A,
];

/// Watches key presses for the Konami sequence. Works with arrows and both
/// WASD and ZQSD; `a` is read as left or as the final `a` depending on
/// where the sequence is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KonamiTracker {
    index: usize,
    activated: bool,
}

impl KonamiTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn step_for(&self, key: &str) -> Option<KonamiStep> {
        match key.to_lowercase().as_str() {
            "a" => match self.index {
                4 | 6 => Some(KonamiStep::Left),
                9 => Some(KonamiStep::A),
                _ => None,
            },
            "b" => Some(KonamiStep::B),
            "arrowup" | "w" | "z" => Some(KonamiStep::Up),
            "arrowdown" | "s" => Some(KonamiStep::Down),
            "arrowleft" | "q" => Some(KonamiStep::Left),
            "arrowright" | "d" => Some(KonamiStep::Right),
            _ => None,
        }
    }

    /// Feed one key-down. Returns true on the press that completes the
    /// sequence for the first time.
    pub fn press(&mut self, key: &str) -> bool {
        if self.activated {
            return false;
        }
        if self.step_for(key) == Some(KONAMI_SEQUENCE[self.index]) {
            self.index += 1;
            if self.index == KONAMI_SEQUENCE.len() {
                self.index = 0;
                self.activated = true;
                return true;
            }
        } else {
            self.index = 0;
        }
        false
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

/// Counts `whoami` queries in the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityQueryCounter {
    count: u32,
}

impl IdentityQueryCounter {
    /// Returns true once the threshold is reached (and on every query after).
    pub fn query(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count >= WHOAMI_THRESHOLD
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MugCounter {
    count: u32,
}

impl MugCounter {
    /// Register a coffee. Returns true when the crab should dance.
    pub fn click(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.should_dance()
    }

    pub fn should_dance(&self) -> bool {
        self.count > 0 && self.count % DANCE_EVERY == 0
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Inactivity detector. Times are session seconds supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleTracker {
    threshold: f64,
    last_activity: f64,
    yawned: bool,
}

impl IdleTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_activity: 0.0,
            yawned: false,
        }
    }

    pub fn touch(&mut self, now: f64) {
        self.last_activity = now;
        self.yawned = false;
    }

    pub fn is_idle(&self, now: f64) -> bool {
        now - self.last_activity >= self.threshold
    }

    /// True exactly once per idle period.
    pub fn poll_yawn(&mut self, now: f64) -> bool {
        if self.is_idle(now) && !self.yawned {
            self.yawned = true;
            return true;
        }
        false
    }

    pub fn last_activity(&self) -> f64 {
        self.last_activity
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new(IDLE_SECONDS)
    }
}
