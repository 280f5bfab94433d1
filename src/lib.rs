// CoursePulse - lib.rs
//
// Library entry point, exposing the analysis pipeline for integration
// testing and programmatic use.
//
// Text rendering lives in the binary (`render.rs`) and is not part of the
// library surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
