//! Turtle 2D Interpretation Engine
//!
//! Walks a produced L-system string and emits a single line-strip polyline.
//! - Forward moves append a visible vertex
//! - Turns rotate the heading by the delta angle
//! - `[` / `]` save and restore the turtle; a restore emits an invisible
//!   bridge so disjoint branches fit in one strip
//!
//! Screen convention: y grows downward, so angle 0 heads along +x and a
//! positive angle heads up the screen.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{check_len, Result};
use crate::interpretation::{InterpretationMap, Order};

/// Turtle input for one interpretation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingParameters {
    pub start_position: [f64; 2],
    /// Radians
    pub start_angle: f64,
    /// Radians
    pub delta_angle: f64,
    pub step: f64,
    pub iterations: usize,
}

impl Default for DrawingParameters {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0],
            start_angle: 0.0,
            delta_angle: std::f64::consts::FRAC_PI_2,
            step: 1.0,
            iterations: 0,
        }
    }
}

/// Position + color, laid out for a line-strip draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    fn visible(position: [f64; 2]) -> Self {
        Self {
            position: [position[0] as f32, position[1] as f32],
            color: Color::BLACK,
        }
    }

    fn invisible(position: [f64; 2]) -> Self {
        Self {
            position: [position[0] as f32, position[1] as f32],
            color: Color::TRANSPARENT,
        }
    }
}

/// Axis-aligned box in vertex space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest box enclosing every vertex (bridge vertices included).
    /// An empty slice gives the zero box.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::default();
        };

        let mut min = first.position;
        let mut max = first.position;
        for v in &vertices[1..] {
            min[0] = min[0].min(v.position[0]);
            min[1] = min[1].min(v.position[1]);
            max[0] = max[0].max(v.position[0]);
            max[1] = max[1].max(v.position[1]);
        }

        Self::new(min[0], min[1], max[0] - min[0], max[1] - min[1])
    }

    /// Map box-relative coordinates ([0, 1]² spans the box) to vertex space.
    pub fn point_at(&self, relative: [f32; 2]) -> [f32; 2] {
        [
            self.left + relative[0] * self.width,
            self.top + relative[1] * self.height,
        ]
    }

    pub fn corners(&self) -> [[f32; 2]; 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            [self.left, self.top],
            [right, self.top],
            [self.left, bottom],
            [right, bottom],
        ]
    }
}

/// Interpreter output: three parallel arrays of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexStream {
    pub vertices: Vec<Vertex>,
    pub iteration_depths: Vec<u8>,
    /// `true` for bridge vertices that must never be drawn or painted.
    pub transparency: Vec<bool>,
    pub max_iteration_depth: u8,
}

impl VertexStream {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    fn push(&mut self, vertex: Vertex, depth: u8, transparent: bool) {
        self.vertices.push(vertex);
        self.iteration_depths.push(depth);
        self.transparency.push(transparent);
        self.max_iteration_depth = self.max_iteration_depth.max(depth);
    }
}

/// Position and heading; the save stack holds copies of this.
#[derive(Debug, Clone, Copy)]
struct TurtleState {
    position: [f64; 2],
    angle: f64,
}

/// Walk `string` with the turtle
///
/// # Arguments
/// * `string` - Produced symbols
/// * `recursion` - One recursion count per symbol of `string`
/// * `map` - Symbol → order table; unmapped symbols are skipped
/// * `params` - Start position/angle, turn delta and step length
///
/// # Returns
/// The vertex stream, starting with a visible vertex at the start position.
pub fn compute_vertices(
    string: &str,
    recursion: &[u8],
    map: &InterpretationMap,
    params: &DrawingParameters,
) -> Result<VertexStream> {
    check_len("recursion array", string.chars().count(), recursion.len())?;

    let mut stream = VertexStream::default();
    let mut turtle = TurtleState {
        position: params.start_position,
        angle: params.start_angle,
    };
    let mut stack: Vec<TurtleState> = Vec::new();

    stream.push(
        Vertex::visible(turtle.position),
        recursion.first().copied().unwrap_or(0),
        false,
    );

    for (symbol, &depth) in string.chars().zip(recursion) {
        let Some(&order) = map.get(symbol) else {
            continue;
        };

        match order {
            Order::GoForward => {
                turtle.position[0] += params.step * turtle.angle.cos();
                turtle.position[1] -= params.step * turtle.angle.sin();
                stream.push(Vertex::visible(turtle.position), depth, false);
            }
            Order::TurnRight => turtle.angle += params.delta_angle,
            Order::TurnLeft => turtle.angle -= params.delta_angle,
            Order::SavePosition => stack.push(turtle),
            Order::LoadPosition => {
                if let Some(saved) = stack.pop() {
                    stream.push(Vertex::invisible(turtle.position), depth, true);
                    turtle = saved;
                    stream.push(Vertex::invisible(turtle.position), depth, true);
                    stream.push(Vertex::visible(turtle.position), depth, false);
                }
            }
        }
    }

    debug_assert_eq!(stream.vertices.len(), stream.iteration_depths.len());
    debug_assert_eq!(stream.vertices.len(), stream.transparency.len());

    tracing::trace!(
        symbols = recursion.len(),
        vertices = stream.len(),
        unclosed_saves = stack.len(),
        "turtle pass done"
    );
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn params(step: f64) -> DrawingParameters {
        DrawingParameters {
            step,
            ..Default::default()
        }
    }

    fn walk(string: &str, params: &DrawingParameters) -> VertexStream {
        let recursion = vec![0; string.chars().count()];
        compute_vertices(string, &recursion, &InterpretationMap::with_defaults(), params).unwrap()
    }

    #[test]
    fn test_forward_at_angle_zero() {
        let stream = walk("F", &params(5.0));
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.vertices[0].position, [0.0, 0.0]);
        assert_eq!(stream.vertices[1].position, [5.0, 0.0]);
    }

    #[test]
    fn test_turns_use_inverted_y() {
        // right turn by 90° from angle 0 heads to -y on screen
        let stream = walk("+F-F", &params(1.0));
        let [x1, y1] = stream.vertices[1].position;
        assert_relative_eq!(x1, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y1, -1.0, epsilon = 1e-6);
        let [x2, y2] = stream.vertices[2].position;
        assert_relative_eq!(x2, 1.0, epsilon = 1e-6);
        assert_relative_eq!(y2, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_save_load_bridge() {
        let stream = walk("F[+FF]F", &params(1.0));
        // start, F, F, F, bridge x3, F
        assert_eq!(stream.len(), 8);
        assert_eq!(
            stream.transparency,
            vec![false, false, false, false, true, true, false, false]
        );

        let tip = stream.vertices[3].position;
        assert_eq!(stream.vertices[4].position, tip);
        assert_eq!(stream.vertices[5].position, [1.0, 0.0]);
        assert_eq!(stream.vertices[6].position, [1.0, 0.0]);
        assert_eq!(stream.vertices[7].position, [2.0, 0.0]);

        assert_eq!(stream.vertices[4].color, Color::TRANSPARENT);
        assert_eq!(stream.vertices[5].color, Color::TRANSPARENT);
        assert_eq!(stream.vertices[6].color, Color::BLACK);
    }

    #[test]
    fn test_load_restores_heading() {
        let p = DrawingParameters {
            delta_angle: FRAC_PI_2,
            step: 2.0,
            ..Default::default()
        };
        // heading after ] must be angle 0 again
        let stream = walk("[++-F+F]F", &p);
        let last = stream.vertices.last().unwrap().position;
        assert_relative_eq!(last[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(last[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_load_on_empty_stack_is_noop() {
        let stream = walk("]F]", &params(1.0));
        assert_eq!(stream.len(), 2);
        assert!(stream.transparency.iter().all(|&t| !t));
    }

    #[test]
    fn test_unmapped_symbols_consume_recursion_slots() {
        let map = InterpretationMap::with_defaults();
        let stream = compute_vertices("XFYF", &[0, 1, 2, 3], &map, &params(1.0)).unwrap();
        assert_eq!(stream.iteration_depths, vec![0, 1, 3]);
        assert_eq!(stream.max_iteration_depth, 3);
    }

    #[test]
    fn test_length_mismatch() {
        let map = InterpretationMap::with_defaults();
        let err = compute_vertices("FF", &[0], &map, &params(1.0)).unwrap_err();
        assert_eq!(
            err,
            crate::error::LsysError::LengthMismatch {
                what: "recursion array",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_start_position_and_empty_string() {
        let p = DrawingParameters {
            start_position: [3.0, 4.0],
            ..Default::default()
        };
        let stream = walk("", &p);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.vertices[0].position, [3.0, 4.0]);
        assert_eq!(stream.max_iteration_depth, 0);
    }

    #[test]
    fn test_bounding_box() {
        let stream = walk("F+F+F", &params(2.0));
        let bbox = stream.bounding_box();
        assert_relative_eq!(bbox.left, 0.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.top, -2.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.width, 2.0, epsilon = 1e-6);
        assert_relative_eq!(bbox.height, 2.0, epsilon = 1e-6);
        assert_eq!(BoundingBox::from_vertices(&[]), BoundingBox::default());
    }
}
