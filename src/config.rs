//! Configuration loader - YAML scene files + .env limits

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::interpretation::{InterpretationMap, Order};
use crate::lsystem::LSystem;
use crate::painter::VertexPainter;
use crate::turtle::DrawingParameters;

/// One drawing: grammar, turtle table, turtle parameters and painter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub name: String,
    pub axiom: String,
    #[serde(default)]
    pub rules: BTreeMap<char, String>,
    /// Symbols that bump the recursion count, e.g. "FX".
    #[serde(default)]
    pub iteration_predecessors: String,
    /// Replaces the default F/+/-/[/] table when present.
    #[serde(default)]
    pub interpretation: Option<BTreeMap<char, Order>>,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub painter: VertexPainter,
}

/// Turtle parameters as written by people: angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersConfig {
    pub start_position: [f64; 2],
    pub start_angle_degrees: f64,
    pub delta_angle_degrees: f64,
    pub step: f64,
    pub iterations: usize,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0],
            start_angle_degrees: 0.0,
            delta_angle_degrees: 90.0,
            step: 10.0,
            iterations: 4,
        }
    }
}

impl From<&ParametersConfig> for DrawingParameters {
    fn from(p: &ParametersConfig) -> Self {
        DrawingParameters {
            start_position: p.start_position,
            start_angle: p.start_angle_degrees.to_radians(),
            delta_angle: p.delta_angle_degrees.to_radians(),
            step: p.step,
            iterations: p.iterations,
        }
    }
}

impl SceneConfig {
    /// Load a scene from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scene: SceneConfig = serde_yaml::from_str(&content)?;
        Ok(scene)
    }

    /// Write the scene back out, e.g. a preset as an editable starting point
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn lsystem(&self) -> LSystem {
        LSystem::new(
            self.axiom.clone(),
            self.rules.iter().map(|(&p, s)| (p, s.clone())),
            self.iteration_predecessors.chars(),
        )
    }

    pub fn interpretation_map(&self) -> InterpretationMap {
        match &self.interpretation {
            Some(orders) => orders.iter().map(|(&symbol, &order)| (symbol, order)).collect(),
            None => InterpretationMap::with_defaults(),
        }
    }

    pub fn drawing_parameters(&self) -> DrawingParameters {
        DrawingParameters::from(&self.parameters)
    }
}

/// Resource ceilings and paths loaded from .env
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max_vertices: u64,
    pub max_symbols: u64,
    pub log_dir: String,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vertices: 10_000_000,
            max_symbols: 50_000_000,
            log_dir: "logs".to_string(),
        }
    }
}

impl Limits {
    /// Load limits from .env / the environment, falling back to defaults
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Limits {
            max_vertices: std::env::var("LSYS_MAX_VERTICES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_vertices),
            max_symbols: std::env::var("LSYS_MAX_SYMBOLS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_symbols),
            log_dir: std::env::var("LSYS_LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }
}
