// CoursePulse - app/mod.rs
//
// Application layer: snapshot caching, analysis state, report assembly.
// Dependencies: core, platform.

pub mod report;
pub mod snapshot;
pub mod state;
