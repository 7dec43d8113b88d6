//! **mazeframes** generates perfect mazes with the recursive backtracker and
//! renders every step of the carving as tile-based frames, suitable for
//! animated gif capture.

pub mod generators;
pub mod grid;
pub mod renderers;
pub mod rooms;
pub mod schedulers;
pub mod units;
