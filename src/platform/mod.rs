// qdebug - platform/mod.rs
//
// Platform abstraction layer: temp directory, file access, configuration.
// Must NOT depend on: core, app, ui.

pub mod config;
pub mod fs;
