//! Drawing pipeline - single owner of one scene
//!
//! estimate → size guard → derive → turtle → paint

use thiserror::Error;

use crate::config::{Limits, SceneConfig};
use crate::error::LsysError;
use crate::interpretation::InterpretationMap;
use crate::lsystem::LSystem;
use crate::painter::VertexPainter;
use crate::size::{compute_max_size, SizeEstimate};
use crate::turtle::{compute_vertices, BoundingBox, DrawingParameters, VertexStream};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] LsysError),

    #[error("{iterations} iterations overflow the size estimate")]
    Overflow { iterations: usize },

    #[error("{iterations} iterations would produce up to {count} {what}, limit is {limit}")]
    TooLarge {
        what: &'static str,
        count: u64,
        limit: u64,
        iterations: usize,
    },
}

/// One rendered, painted scene
#[derive(Debug, Clone)]
pub struct Drawing {
    pub stream: VertexStream,
    pub bounding_box: BoundingBox,
    pub estimate: SizeEstimate,
    pub iterations: usize,
}

/// Owns the grammar, turtle table, parameters and painter of one scene
pub struct Studio {
    pub lsystem: LSystem,
    pub interpretation: InterpretationMap,
    pub parameters: DrawingParameters,
    pub painter: VertexPainter,
    limits: Limits,
}

impl Studio {
    pub fn new(
        lsystem: LSystem,
        interpretation: InterpretationMap,
        parameters: DrawingParameters,
        painter: VertexPainter,
        limits: Limits,
    ) -> Self {
        Self {
            lsystem,
            interpretation,
            parameters,
            painter,
            limits,
        }
    }

    pub fn from_scene(scene: &SceneConfig, limits: Limits) -> Self {
        tracing::debug!("Building studio for scene '{}'", scene.name);
        Self::new(
            scene.lsystem(),
            scene.interpretation_map(),
            scene.drawing_parameters(),
            scene.painter.clone(),
            limits,
        )
    }

    /// Upper bounds for the configured iteration count
    pub fn estimate(&self) -> Result<SizeEstimate, PipelineError> {
        let estimate =
            compute_max_size(&self.lsystem, &self.interpretation, self.parameters.iterations)?;
        Ok(estimate)
    }

    /// Estimate and reject sizes over the configured limits
    pub fn check_size(&self) -> Result<SizeEstimate, PipelineError> {
        let iterations = self.parameters.iterations;
        let estimate = self.estimate()?;
        if estimate.overflow {
            tracing::warn!(iterations, "size estimate overflowed");
            return Err(PipelineError::Overflow { iterations });
        }
        if estimate.symbol_count > self.limits.max_symbols {
            return Err(PipelineError::TooLarge {
                what: "symbols",
                count: estimate.symbol_count,
                limit: self.limits.max_symbols,
                iterations,
            });
        }
        if estimate.vertex_count > self.limits.max_vertices {
            return Err(PipelineError::TooLarge {
                what: "vertices",
                count: estimate.vertex_count,
                limit: self.limits.max_vertices,
                iterations,
            });
        }
        Ok(estimate)
    }

    /// Derive, interpret and paint at the configured iteration count
    pub fn render(&mut self) -> Result<Drawing, PipelineError> {
        let estimate = self.check_size()?;
        let iterations = self.parameters.iterations;

        let derivation = self.lsystem.produce(iterations);
        tracing::debug!(
            iterations,
            symbols = derivation.recursion.len(),
            max_recursion = derivation.max_recursion,
            "derived"
        );

        let mut stream = compute_vertices(
            derivation.string,
            derivation.recursion,
            &self.interpretation,
            &self.parameters,
        )?;
        let bounding_box = stream.bounding_box();
        self.painter.paint_vertices(
            &mut stream.vertices,
            &stream.iteration_depths,
            &stream.transparency,
            stream.max_iteration_depth,
            &bounding_box,
        )?;

        tracing::info!(
            iterations,
            vertices = stream.len(),
            estimated = estimate.vertex_count,
            "rendered"
        );

        Ok(Drawing {
            stream,
            bounding_box,
            estimate,
            iterations,
        })
    }

    /// Re-color an existing drawing with the current painter
    pub fn repaint(&self, drawing: &mut Drawing) -> Result<(), PipelineError> {
        let stream = &mut drawing.stream;
        self.painter.paint_vertices(
            &mut stream.vertices,
            &stream.iteration_depths,
            &stream.transparency,
            stream.max_iteration_depth,
            &drawing.bounding_box,
        )?;
        Ok(())
    }
}
