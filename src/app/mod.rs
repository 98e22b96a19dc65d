// qdebug - app/mod.rs
//
// Application layer: the logger behind `q!` and the tail helper behind
// `qtail`.
// Dependencies: core, platform, util.

pub mod logger;
pub mod tail;
