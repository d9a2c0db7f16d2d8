//! L-System Studio
//!
//! Procedural line drawings from Lindenmayer systems:
//! - `lsystem`: cached derivation with per-symbol recursion counts
//! - `turtle`: symbols → line-strip vertices
//! - `size`: output size bounds by matrix exponentiation
//! - `painter`: per-vertex color strategies, composable
//!
//! `pipeline`, `presets`, `config` and `export` wire these into scenes.

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod interpretation;
pub mod logging;
pub mod lsystem;
pub mod painter;
pub mod pipeline;
pub mod presets;
pub mod rule_map;
pub mod size;
pub mod turtle;

pub use color::Color;
pub use error::{LsysError, Result};
pub use interpretation::{InterpretationMap, Order};
pub use lsystem::{Derivation, LSystem};
pub use painter::VertexPainter;
pub use turtle::{BoundingBox, DrawingParameters, Vertex, VertexStream};
