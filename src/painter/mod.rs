//! Vertex painters
//!
//! A painter turns every visible vertex into a scalar in [0, 1] and asks a
//! color generator for the matching color:
//! - constant: always 0.5
//! - linear: position along an axis through the bounding box
//! - radial: distance from a center point
//! - sequential: position in the vertex sequence, repeated `factor` times
//! - iteration: iteration depth over the deepest depth
//! - block_random: one random scalar per block of consecutive vertices
//! - composite: splits the vertices between child painters
//!
//! Transparent (bridge) vertices are never written.

pub mod composite;
pub mod generator;

pub use generator::{ColorGenerator, DiscreteGradient, GradientKey, LinearGradient};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{check_len, Result};
use crate::turtle::{BoundingBox, Vertex, VertexStream};

/// Where a painter gets its colors from.
///
/// Normally the painter's own generator; the composite painter swaps in a
/// recorder to learn which child each vertex belongs to.
pub(crate) trait ColorSource {
    fn color_at(&mut self, index: usize, f: f32) -> Color;
}

struct GeneratorSource<'a>(&'a ColorGenerator);

impl ColorSource for GeneratorSource<'_> {
    fn color_at(&mut self, _index: usize, f: f32) -> Color {
        self.0.get(f)
    }
}

/// Read-only inputs shared by every painter of one pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PaintInput<'a> {
    pub iteration_depths: &'a [u8],
    pub transparency: &'a [bool],
    pub max_iteration_depth: u8,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VertexPainter {
    Constant {
        generator: ColorGenerator,
    },
    Linear {
        /// Radians, same convention as the turtle heading.
        angle: f32,
        /// Box-relative, [0.5, 0.5] is the box center.
        center: [f32; 2],
        generator: ColorGenerator,
    },
    Radial {
        center: [f32; 2],
        generator: ColorGenerator,
    },
    Sequential {
        factor: f32,
        generator: ColorGenerator,
    },
    Iteration {
        generator: ColorGenerator,
    },
    BlockRandom {
        block_size: usize,
        /// Fixed seed for reproducible output; fresh entropy when absent.
        #[serde(default)]
        seed: Option<u64>,
        generator: ColorGenerator,
    },
    Composite {
        main: Box<VertexPainter>,
        children: Vec<VertexPainter>,
    },
}

impl Default for VertexPainter {
    fn default() -> Self {
        VertexPainter::Constant {
            generator: ColorGenerator::default(),
        }
    }
}

impl VertexPainter {
    /// Color `vertices` in place.
    ///
    /// `iteration_depths` and `transparency` must be as long as `vertices`.
    pub fn paint_vertices(
        &self,
        vertices: &mut [Vertex],
        iteration_depths: &[u8],
        transparency: &[bool],
        max_iteration_depth: u8,
        bounding_box: &BoundingBox,
    ) -> Result<()> {
        check_len("iteration depth array", vertices.len(), iteration_depths.len())?;
        check_len("transparency array", vertices.len(), transparency.len())?;

        let input = PaintInput {
            iteration_depths,
            transparency,
            max_iteration_depth,
            bounding_box: *bounding_box,
        };
        self.paint_with(vertices, &input, None);
        Ok(())
    }

    /// Paint a whole interpreter output against its own bounding box.
    pub fn paint_stream(&self, stream: &mut VertexStream) -> Result<()> {
        let bounding_box = stream.bounding_box();
        self.paint_vertices(
            &mut stream.vertices,
            &stream.iteration_depths,
            &stream.transparency,
            stream.max_iteration_depth,
            &bounding_box,
        )
    }

    /// The generator this painter colors with; `None` for composites.
    pub fn generator(&self) -> Option<&ColorGenerator> {
        match self {
            VertexPainter::Constant { generator }
            | VertexPainter::Linear { generator, .. }
            | VertexPainter::Radial { generator, .. }
            | VertexPainter::Sequential { generator, .. }
            | VertexPainter::Iteration { generator }
            | VertexPainter::BlockRandom { generator, .. } => Some(generator),
            VertexPainter::Composite { .. } => None,
        }
    }

    /// Lengths are already checked. With `source` set, colors come from it
    /// instead of this painter's generator.
    pub(crate) fn paint_with(
        &self,
        vertices: &mut [Vertex],
        input: &PaintInput<'_>,
        source: Option<&mut dyn ColorSource>,
    ) {
        if let VertexPainter::Composite { main, children } = self {
            composite::paint(main, children, vertices, input, source);
            return;
        }

        match (source, self.generator()) {
            (Some(source), _) => self.paint_scalars(vertices, input, source),
            (None, Some(generator)) => {
                self.paint_scalars(vertices, input, &mut GeneratorSource(generator))
            }
            (None, None) => {}
        }
    }

    fn paint_scalars(
        &self,
        vertices: &mut [Vertex],
        input: &PaintInput<'_>,
        source: &mut dyn ColorSource,
    ) {
        let bbox = input.bounding_box;
        match self {
            VertexPainter::Constant { .. } => {
                apply(vertices, input.transparency, source, |_, _| 0.5);
            }
            VertexPainter::Linear { angle, center, .. } => {
                let c = bbox.point_at(*center);
                let (sin, cos) = angle.sin_cos();
                let axis = [cos, -sin];
                let project = |p: [f32; 2]| (p[0] - c[0]) * axis[0] + (p[1] - c[1]) * axis[1];
                let reach = bbox
                    .corners()
                    .into_iter()
                    .map(|corner| project(corner).abs())
                    .fold(0.0f32, f32::max);
                apply(vertices, input.transparency, source, |_, v| {
                    if reach > 0.0 {
                        (0.5 + project(v.position) / (2.0 * reach)).clamp(0.0, 1.0)
                    } else {
                        0.5
                    }
                });
            }
            VertexPainter::Radial { center, .. } => {
                let c = bbox.point_at(*center);
                let distance = |p: [f32; 2]| (p[0] - c[0]).hypot(p[1] - c[1]);
                let reach = bbox
                    .corners()
                    .into_iter()
                    .map(distance)
                    .fold(0.0f32, f32::max);
                apply(vertices, input.transparency, source, |_, v| {
                    if reach > 0.0 {
                        (distance(v.position) / reach).clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                });
            }
            VertexPainter::Sequential { factor, .. } => {
                let count = vertices.len() as f32;
                apply(vertices, input.transparency, source, |i, _| {
                    (i as f32 * factor / count).rem_euclid(1.0)
                });
            }
            VertexPainter::Iteration { .. } => {
                let max = input.max_iteration_depth;
                let depths = input.iteration_depths;
                apply(vertices, input.transparency, source, |i, _| {
                    if max == 0 {
                        0.0
                    } else {
                        depths[i] as f32 / max as f32
                    }
                });
            }
            VertexPainter::BlockRandom {
                block_size, seed, ..
            } => {
                let block_size = (*block_size).max(1);
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                let mut current: Option<(usize, f32)> = None;
                apply(vertices, input.transparency, source, |i, _| {
                    let block = i / block_size;
                    match current {
                        Some((b, f)) if b == block => f,
                        _ => {
                            let f = rng.gen::<f32>();
                            current = Some((block, f));
                            f
                        }
                    }
                });
            }
            // painted by composite::paint
            VertexPainter::Composite { .. } => {}
        }
    }
}

/// Run `scalar` over the visible vertices in order and store the colors.
fn apply(
    vertices: &mut [Vertex],
    transparency: &[bool],
    source: &mut dyn ColorSource,
    mut scalar: impl FnMut(usize, &Vertex) -> f32,
) {
    for (i, (vertex, &transparent)) in vertices.iter_mut().zip(transparency).enumerate() {
        if transparent {
            continue;
        }
        let f = scalar(i, vertex);
        vertex.color = source.color_at(i, f);
    }
}
