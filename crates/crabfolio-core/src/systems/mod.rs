//! Systems - logic that operates on components

mod highlight;
mod interactives;

pub use highlight::*;
pub use interactives::*;
