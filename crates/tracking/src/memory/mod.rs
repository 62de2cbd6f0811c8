//! In-memory collaborators.
//!
//! Used by the tests and by the command line demo:
//! - [`MemoryMap`] records every map operation
//! - [`ScriptedLocationSource`] plays back a fixed list of fixes
//! - [`RandomWalk`] generates jittered fixes around a start point

mod map;
mod random_walk;
mod scripted;

pub use map::*;
pub use random_walk::*;
pub use scripted::*;
