//! Composite painter
//!
//! The main painter does not color anything itself. Its scalar for each
//! vertex picks a child pool, `floor(f * children)`. Each child then paints
//! its own pool as if it were a whole drawing, and the colors are scattered
//! back to the original positions.

use super::{ColorSource, PaintInput, VertexPainter};
use crate::color::Color;
use crate::turtle::Vertex;

/// Returned by the recorder instead of a real color. Opaque enough that
/// nothing mistakes a recorded vertex for a bridge vertex.
const POOL_MARKER: Color = Color::new(255, 255, 255, 254);

/// Records the pool of each vertex the main painter visits.
struct PoolRecorder {
    pool_count: usize,
    pools: Vec<Option<usize>>,
}

impl PoolRecorder {
    fn new(pool_count: usize, len: usize) -> Self {
        Self {
            pool_count,
            pools: vec![None; len],
        }
    }

    /// Vertices the main painter skipped (bridges) join the pool of the
    /// closest preceding recorded vertex, or pool 0 at the start.
    fn into_pools(self) -> Vec<usize> {
        let mut last = 0;
        self.pools
            .into_iter()
            .map(|pool| {
                if let Some(pool) = pool {
                    last = pool;
                }
                last
            })
            .collect()
    }
}

impl ColorSource for PoolRecorder {
    fn color_at(&mut self, index: usize, f: f32) -> Color {
        let pool = (f.clamp(0.0, 1.0) * self.pool_count as f32).floor() as usize;
        self.pools[index] = Some(pool.min(self.pool_count - 1));
        POOL_MARKER
    }
}

/// Forwards a child's local indices to the enclosing painter's indices.
struct Remapped<'a> {
    inner: &'a mut dyn ColorSource,
    indices: &'a [usize],
}

impl ColorSource for Remapped<'_> {
    fn color_at(&mut self, index: usize, f: f32) -> Color {
        self.inner.color_at(self.indices[index], f)
    }
}

/// Vertex positions of each pool, in ascending order.
pub fn partition(pools: &[usize], pool_count: usize) -> Vec<Vec<usize>> {
    let mut partition = vec![Vec::new(); pool_count];
    for (i, &pool) in pools.iter().enumerate() {
        partition[pool].push(i);
    }
    partition
}

pub(super) fn paint(
    main: &VertexPainter,
    children: &[VertexPainter],
    vertices: &mut [Vertex],
    input: &PaintInput<'_>,
    mut source: Option<&mut dyn ColorSource>,
) {
    if children.is_empty() {
        main.paint_with(vertices, input, source);
        return;
    }

    let mut recorder = PoolRecorder::new(children.len(), vertices.len());
    let mut scratch = vertices.to_vec();
    main.paint_with(&mut scratch, input, Some(&mut recorder));
    let pools = partition(&recorder.into_pools(), children.len());

    for (pool, (child, indices)) in children.iter().zip(&pools).enumerate() {
        if indices.is_empty() {
            continue;
        }
        tracing::trace!(pool, vertices = indices.len(), "painting composite pool");

        let mut sub_vertices: Vec<Vertex> = indices.iter().map(|&i| vertices[i]).collect();
        let sub_depths: Vec<u8> = indices.iter().map(|&i| input.iteration_depths[i]).collect();
        let sub_transparency: Vec<bool> = indices.iter().map(|&i| input.transparency[i]).collect();
        let sub_input = PaintInput {
            iteration_depths: &sub_depths,
            transparency: &sub_transparency,
            ..*input
        };

        match source.as_deref_mut() {
            Some(outer) => {
                let mut remapped = Remapped {
                    inner: outer,
                    indices,
                };
                child.paint_with(&mut sub_vertices, &sub_input, Some(&mut remapped));
            }
            None => child.paint_with(&mut sub_vertices, &sub_input, None),
        }

        for (&i, vertex) in indices.iter().zip(sub_vertices) {
            vertices[i] = vertex;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::ColorGenerator;
    use crate::turtle::BoundingBox;

    fn row(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex {
                position: [i as f32, 0.0],
                color: Color::BLACK,
            })
            .collect()
    }

    fn constant(color: Color) -> VertexPainter {
        VertexPainter::Constant {
            generator: ColorGenerator::constant(color),
        }
    }

    fn left_to_right() -> Box<VertexPainter> {
        Box::new(VertexPainter::Linear {
            angle: 0.0,
            center: [0.5, 0.5],
            generator: ColorGenerator::default(),
        })
    }

    fn paint_row(painter: &VertexPainter, vertices: &mut [Vertex], transparency: &[bool]) {
        let depths = vec![0; vertices.len()];
        let bbox = BoundingBox::from_vertices(vertices);
        painter
            .paint_vertices(vertices, &depths, transparency, 0, &bbox)
            .unwrap();
    }

    #[test]
    fn test_partition_covers_every_index_once() {
        let pools = [2, 0, 1, 2, 2, 0];
        let partition = partition(&pools, 4);
        assert_eq!(partition, vec![vec![1, 5], vec![2], vec![0, 3, 4], vec![]]);

        let mut seen: Vec<usize> = partition.concat();
        seen.sort_unstable();
        assert_eq!(seen, (0..pools.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_left_and_right() {
        let painter = VertexPainter::Composite {
            main: left_to_right(),
            children: vec![constant(Color::RED), constant(Color::BLUE)],
        };
        let mut vertices = row(6);
        paint_row(&painter, &mut vertices, &[false; 6]);

        let colors: Vec<Color> = vertices.iter().map(|v| v.color).collect();
        assert_eq!(
            colors,
            vec![Color::RED, Color::RED, Color::RED, Color::BLUE, Color::BLUE, Color::BLUE]
        );
    }

    #[test]
    fn test_children_see_only_their_pool() {
        // a sequential child spreads its gradient over its own pool only
        let painter = VertexPainter::Composite {
            main: left_to_right(),
            children: vec![
                constant(Color::RED),
                VertexPainter::Sequential {
                    factor: 1.0,
                    generator: ColorGenerator::linear(Color::BLACK, Color::WHITE),
                },
            ],
        };
        let mut vertices = row(4);
        paint_row(&painter, &mut vertices, &[false; 4]);

        assert_eq!(vertices[0].color, Color::RED);
        assert_eq!(vertices[1].color, Color::RED);
        assert_eq!(vertices[2].color, Color::BLACK);
        assert_eq!(vertices[3].color, Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_bridge_vertices_follow_previous_pool() {
        let mut recorder = PoolRecorder::new(3, 5);
        recorder.color_at(1, 0.9);
        recorder.color_at(3, 0.4);
        assert_eq!(recorder.into_pools(), vec![0, 2, 2, 1, 1]);
    }

    #[test]
    fn test_transparent_vertices_survive_composite() {
        let painter = VertexPainter::Composite {
            main: left_to_right(),
            children: vec![constant(Color::RED), constant(Color::BLUE)],
        };
        let mut vertices = row(4);
        vertices[1].color = Color::TRANSPARENT;
        paint_row(&painter, &mut vertices, &[false, true, false, false]);
        assert_eq!(vertices[1].color, Color::TRANSPARENT);
        assert_eq!(vertices[0].color, Color::RED);
        assert_eq!(vertices[3].color, Color::BLUE);
    }

    #[test]
    fn test_no_children_falls_back_to_main() {
        let painter = VertexPainter::Composite {
            main: Box::new(constant(Color::GREEN)),
            children: vec![],
        };
        let mut vertices = row(3);
        paint_row(&painter, &mut vertices, &[false; 3]);
        assert!(vertices.iter().all(|v| v.color == Color::GREEN));
    }

    #[test]
    fn test_nested_composites() {
        // outer split by x, the right half split again into thirds of the sequence
        let inner = VertexPainter::Composite {
            main: Box::new(VertexPainter::Sequential {
                factor: 1.0,
                generator: ColorGenerator::default(),
            }),
            children: vec![constant(Color::GREEN), constant(Color::BLUE)],
        };
        let painter = VertexPainter::Composite {
            main: left_to_right(),
            children: vec![constant(Color::RED), inner],
        };
        let mut vertices = row(8);
        paint_row(&painter, &mut vertices, &[false; 8]);

        let colors: Vec<Color> = vertices.iter().map(|v| v.color).collect();
        assert_eq!(&colors[..4], &[Color::RED; 4]);
        assert_eq!(&colors[4..], &[Color::GREEN, Color::GREEN, Color::BLUE, Color::BLUE]);
    }

    #[test]
    fn test_composite_as_main_of_composite() {
        // the inner composite decides the outer pools through its children
        let splitter = VertexPainter::Composite {
            main: left_to_right(),
            children: vec![
                VertexPainter::Constant {
                    generator: ColorGenerator::default(),
                },
                VertexPainter::Iteration {
                    generator: ColorGenerator::default(),
                },
            ],
        };
        let painter = VertexPainter::Composite {
            main: Box::new(splitter),
            children: vec![constant(Color::RED), constant(Color::BLUE)],
        };
        let mut vertices = row(4);
        paint_row(&painter, &mut vertices, &[false; 4]);

        // left half: constant scalar 0.5 -> pool 1; right half: depth 0 -> pool 0
        let colors: Vec<Color> = vertices.iter().map(|v| v.color).collect();
        assert_eq!(colors, vec![Color::BLUE, Color::BLUE, Color::RED, Color::RED]);
    }
}
