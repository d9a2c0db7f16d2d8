//! Export - PNG rasterization and JSON vertex dumps
//!
//! The PNG is a software line-strip render: consecutive visible vertices
//! are joined by a segment whose color runs from one endpoint to the other.
//! Transparent bridge vertices break the strip.

use anyhow::Result;
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::info;

use crate::color::Color;
use crate::pipeline::Drawing;
use crate::turtle::{BoundingBox, Vertex};

/// Fraction of the image left empty on every side
const MARGIN: f32 = 0.05;

/// Maps vertex space onto a square image, keeping the aspect ratio.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    scale: f32,
    offset: [f32; 2],
    origin: [f32; 2],
}

impl Viewport {
    fn fit(bbox: &BoundingBox, size: u32) -> Self {
        let size = size as f32;
        let usable = size * (1.0 - 2.0 * MARGIN);
        let extent = bbox.width.max(bbox.height);
        let scale = if extent > 0.0 { usable / extent } else { 1.0 };
        // center the drawing on both axes
        let offset = [
            (size - bbox.width * scale) / 2.0,
            (size - bbox.height * scale) / 2.0,
        ];
        Self {
            scale,
            offset,
            origin: [bbox.left, bbox.top],
        }
    }

    fn project(&self, p: [f32; 2]) -> [f32; 2] {
        [
            (p[0] - self.origin[0]) * self.scale + self.offset[0],
            (p[1] - self.origin[1]) * self.scale + self.offset[1],
        ]
    }
}

/// Alpha-blend `color` over the pixel at (x, y), ignoring out-of-bounds.
fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    let a = color.a as f32 / 255.0;
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
    let Rgba([r, g, b, dst_a]) = *pixel;
    *pixel = Rgba([
        mix(color.r, r),
        mix(color.g, g),
        mix(color.b, b),
        dst_a.max(color.a),
    ]);
}

fn draw_segment(img: &mut RgbaImage, from: [f32; 2], to: [f32; 2], c0: Color, c1: Color) {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (from[0] + dx * t).round() as i64;
        let y = (from[1] + dy * t).round() as i64;
        blend(img, x, y, c0.lerp(c1, t));
    }
}

/// Rasterize a vertex strip into a `size`×`size` image.
pub fn rasterize(vertices: &[Vertex], bbox: &BoundingBox, size: u32, background: Color) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(
        size,
        size,
        Rgba([background.r, background.g, background.b, background.a]),
    );
    let viewport = Viewport::fit(bbox, size);

    if let [only] = vertices {
        if !only.color.is_transparent() {
            let [x, y] = viewport.project(only.position);
            blend(&mut img, x.round() as i64, y.round() as i64, only.color);
        }
        return img;
    }

    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.color.is_transparent() || b.color.is_transparent() {
            continue;
        }
        draw_segment(
            &mut img,
            viewport.project(a.position),
            viewport.project(b.position),
            a.color,
            b.color,
        );
    }
    img
}

/// Render a drawing to a PNG file
pub fn write_png(drawing: &Drawing, path: &Path, size: u32, background: Color) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let img = rasterize(&drawing.stream.vertices, &drawing.bounding_box, size, background);
    img.save(path)?;
    info!("Wrote {} ({}x{})", path.display(), size, size);
    Ok(())
}

/// JSON document with the painted vertices and their per-vertex data
pub fn drawing_json(drawing: &Drawing, scene_name: &str) -> serde_json::Value {
    let stream = &drawing.stream;
    let vertices: Vec<serde_json::Value> = stream
        .vertices
        .iter()
        .zip(&stream.iteration_depths)
        .zip(&stream.transparency)
        .map(|((v, depth), transparent)| {
            serde_json::json!({
                "position": v.position,
                "color": v.color,
                "iteration_depth": depth,
                "transparent": transparent,
            })
        })
        .collect();

    serde_json::json!({
        "generated": chrono::Local::now().to_rfc3339(),
        "scene": scene_name,
        "iterations": drawing.iterations,
        "estimate": drawing.estimate,
        "bounding_box": drawing.bounding_box,
        "max_iteration_depth": stream.max_iteration_depth,
        "vertices": vertices,
    })
}

/// Write [`drawing_json`] to a file
pub fn write_json(drawing: &Drawing, scene_name: &str, path: &Path) -> Result<()> {
    let doc = drawing_json(drawing, scene_name);
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    info!("Wrote {}", path.display());
    Ok(())
}
