//! Pure interaction logic for the crab portfolio office.
//!
//! Everything here is independent of rendering, audio and any ECS. Functions
//! take plain data and return results, so the session engine, the headless
//! simtest and unit tests all drive the same code.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Movement tuning, scene bounds, catalog ids, door secrets |
//! | [`discovery`] | Monotonic discovery set and catalog completion |
//! | [`door`] | Linear, non-skippable door password progression + mailbox |
//! | [`easter_eggs`] | Konami, `whoami`, mug and idle counters |
//! | [`geometry`] | Vectors, boxes, bounds and obstacle predicates |
//! | [`input`] | Keyboard layouts, held-key state, joystick conversion |
//! | [`keypad`] | Security keypad that unlocks the door group |
//! | [`movement`] | Character controller with wall-sliding and wall probe |
//! | [`proximity`] | Nearest interactive group, highlight, interact edge trigger |
//! | [`unlocks`] | Accessory catalog, unlock ratchet, equip |

pub mod constants;
pub mod discovery;
pub mod door;
pub mod easter_eggs;
pub mod geometry;
pub mod input;
pub mod keypad;
pub mod movement;
pub mod proximity;
pub mod unlocks;
