// qdebug - ui/mod.rs
//
// Presentation layer: terminal colours only.
// No dependencies on app state or business logic.

pub mod theme;
