// qdebug - core/mod.rs
//
// Core logic: argument-name recovery, value rendering, session grouping and
// line layout.
// Must NOT depend on: app.

pub mod compose;
pub mod locator;
pub mod model;
pub mod render;
pub mod session;
