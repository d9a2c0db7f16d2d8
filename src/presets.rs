//! Built-in scenes - classic L-systems ready to render
//!
//! - Dragon curve, Koch snowflake, Sierpinski arrowhead
//! - Hilbert, Peano and Gosper space-filling curves
//! - A bracketed plant, the one preset that exercises save/load

use std::collections::BTreeMap;

use crate::color::Color;
use crate::config::{ParametersConfig, SceneConfig};
use crate::interpretation::{Order, DEFAULT_ORDERS};
use crate::painter::{ColorGenerator, DiscreteGradient, LinearGradient, VertexPainter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Dragon,
    Koch,
    Sierpinski,
    Hilbert,
    Peano,
    Gosper,
    Plant,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Dragon,
        Preset::Koch,
        Preset::Sierpinski,
        Preset::Hilbert,
        Preset::Peano,
        Preset::Gosper,
        Preset::Plant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Dragon => "dragon",
            Preset::Koch => "koch",
            Preset::Sierpinski => "sierpinski",
            Preset::Hilbert => "hilbert",
            Preset::Peano => "peano",
            Preset::Gosper => "gosper",
            Preset::Plant => "plant",
        }
    }

    /// Parse a preset name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Dragon => "Heighway dragon: F → F+G, G → F-G, 90°",
            Preset::Koch => "Koch snowflake: F--F--F, F → F+F--F+F, 60°",
            Preset::Sierpinski => "Sierpinski arrowhead: F → G-F-G, G → F+G+F, 60°",
            Preset::Hilbert => "Hilbert curve: A → -BF+AFA+FB-, B → +AF-BFB-FA+, 90°",
            Preset::Peano => "Peano curve: F → F+F-F-F-F+F+F+F-F, 90°",
            Preset::Gosper => "Gosper flowsnake: A → A-B--B+A++AA+B-, B → +A-BB--B-A++A+B, 60°",
            Preset::Plant => "Fractal plant: X → F+[[X]-X]-F[-FX]+X, F → FF, 25°",
        }
    }

    /// Full scene for this preset, painter included
    pub fn scene(self) -> SceneConfig {
        match self {
            Preset::Dragon => SceneConfig {
                name: self.name().to_string(),
                axiom: "F".to_string(),
                rules: rules(&[('F', "F+G"), ('G', "F-G")]),
                iteration_predecessors: "F".to_string(),
                interpretation: Some(with_extra_forward(&['G'])),
                parameters: parameters(0.0, 90.0, 14),
                painter: VertexPainter::Sequential {
                    factor: 1.0,
                    generator: ColorGenerator::linear(Color::rgb(20, 40, 160), Color::rgb(240, 80, 40)),
                },
            },
            Preset::Koch => SceneConfig {
                name: self.name().to_string(),
                axiom: "F--F--F".to_string(),
                rules: rules(&[('F', "F+F--F+F")]),
                iteration_predecessors: "F".to_string(),
                interpretation: None,
                parameters: parameters(0.0, 60.0, 5),
                painter: VertexPainter::Radial {
                    center: [0.5, 0.5],
                    generator: ColorGenerator::linear(Color::WHITE, Color::rgb(30, 90, 200)),
                },
            },
            Preset::Sierpinski => SceneConfig {
                name: self.name().to_string(),
                axiom: "F".to_string(),
                rules: rules(&[('F', "G-F-G"), ('G', "F+G+F")]),
                iteration_predecessors: "F".to_string(),
                interpretation: Some(with_extra_forward(&['G'])),
                parameters: parameters(0.0, 60.0, 9),
                painter: VertexPainter::Linear {
                    angle: std::f32::consts::FRAC_PI_2,
                    center: [0.5, 0.5],
                    generator: ColorGenerator::linear(Color::rgb(200, 30, 30), Color::rgb(250, 210, 40)),
                },
            },
            Preset::Hilbert => SceneConfig {
                name: self.name().to_string(),
                axiom: "A".to_string(),
                rules: rules(&[('A', "-BF+AFA+FB-"), ('B', "+AF-BFB-FA+")]),
                iteration_predecessors: "AB".to_string(),
                interpretation: None,
                parameters: parameters(0.0, 90.0, 6),
                painter: VertexPainter::Sequential {
                    factor: 4.0,
                    generator: rainbow(),
                },
            },
            Preset::Peano => SceneConfig {
                name: self.name().to_string(),
                axiom: "F".to_string(),
                rules: rules(&[('F', "F+F-F-F-F+F+F+F-F")]),
                iteration_predecessors: "F".to_string(),
                interpretation: None,
                parameters: parameters(0.0, 90.0, 4),
                painter: VertexPainter::BlockRandom {
                    block_size: 9,
                    seed: Some(9),
                    generator: rainbow(),
                },
            },
            Preset::Gosper => SceneConfig {
                name: self.name().to_string(),
                axiom: "A".to_string(),
                rules: rules(&[('A', "A-B--B+A++AA+B-"), ('B', "+A-BB--B-A++A+B")]),
                iteration_predecessors: "AB".to_string(),
                interpretation: Some(with_extra_forward(&['A', 'B'])),
                parameters: parameters(0.0, 60.0, 4),
                painter: VertexPainter::Composite {
                    main: Box::new(VertexPainter::Linear {
                        angle: 0.0,
                        center: [0.5, 0.5],
                        generator: ColorGenerator::default(),
                    }),
                    children: vec![
                        VertexPainter::Sequential {
                            factor: 2.0,
                            generator: ColorGenerator::linear(Color::rgb(0, 60, 120), Color::rgb(0, 200, 200)),
                        },
                        VertexPainter::Radial {
                            center: [0.5, 0.5],
                            generator: ColorGenerator::linear(Color::rgb(120, 0, 60), Color::rgb(250, 140, 0)),
                        },
                    ],
                },
            },
            Preset::Plant => SceneConfig {
                name: self.name().to_string(),
                axiom: "X".to_string(),
                rules: rules(&[('X', "F+[[X]-X]-F[-FX]+X"), ('F', "FF")]),
                iteration_predecessors: "X".to_string(),
                interpretation: None,
                parameters: parameters(65.0, 25.0, 6),
                painter: VertexPainter::Iteration {
                    generator: plant_greens(),
                },
            },
        }
    }
}

fn rules(pairs: &[(char, &str)]) -> BTreeMap<char, String> {
    pairs.iter().map(|&(p, s)| (p, s.to_string())).collect()
}

/// Default table plus extra drawing symbols
fn with_extra_forward(symbols: &[char]) -> BTreeMap<char, Order> {
    DEFAULT_ORDERS
        .into_iter()
        .chain(symbols.iter().map(|&s| (s, Order::GoForward)))
        .collect()
}

fn parameters(start_angle_degrees: f64, delta_angle_degrees: f64, iterations: usize) -> ParametersConfig {
    ParametersConfig {
        start_angle_degrees,
        delta_angle_degrees,
        iterations,
        ..Default::default()
    }
}

fn rainbow() -> ColorGenerator {
    let mut gradient = LinearGradient::new(Color::RED, Color::rgb(160, 0, 255));
    gradient.add_key(Color::rgb(255, 200, 0), 0.25);
    gradient.add_key(Color::GREEN, 0.5);
    gradient.add_key(Color::BLUE, 0.75);
    ColorGenerator::LinearGradient(gradient)
}

fn plant_greens() -> ColorGenerator {
    let shades = [
        Color::rgb(90, 60, 20),
        Color::rgb(60, 100, 30),
        Color::rgb(40, 140, 40),
        Color::rgb(80, 190, 60),
        Color::rgb(150, 230, 90),
    ];
    match DiscreteGradient::from_colors(shades) {
        Ok(gradient) => ColorGenerator::DiscreteGradient(gradient),
        Err(_) => ColorGenerator::linear(shades[0], shades[4]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::compute_max_size;
    use crate::turtle::compute_vertices;

    #[test]
    fn test_from_name() {
        assert_eq!(Preset::from_name("dragon"), Some(Preset::Dragon));
        assert_eq!(Preset::from_name("Koch"), Some(Preset::Koch));
        assert_eq!(Preset::from_name("mandelbrot"), None);
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
    }

    #[test]
    fn test_iteration_predecessors_have_rules() {
        for preset in Preset::ALL {
            let scene = preset.scene();
            assert_eq!(scene.name, preset.name());
            assert!(!scene.rules.is_empty(), "{} has no rules", preset.name());
            for p in scene.iteration_predecessors.chars() {
                assert!(scene.rules.contains_key(&p), "{}: '{}' never rewrites", preset.name(), p);
            }
        }
    }

    #[test]
    fn test_dragon_draws_g() {
        let scene = Preset::Dragon.scene();
        let mut lsystem = scene.lsystem();
        let map = scene.interpretation_map();
        let mut params = scene.drawing_parameters();
        params.iterations = 3;

        let d = lsystem.produce(params.iterations);
        let stream = compute_vertices(d.string, d.recursion, &map, &params).unwrap();
        // 2^3 segments
        assert_eq!(stream.len(), 9);
    }

    #[test]
    fn test_default_iterations_stay_small() {
        for preset in Preset::ALL {
            let scene = preset.scene();
            let estimate = compute_max_size(
                &scene.lsystem(),
                &scene.interpretation_map(),
                scene.parameters.iterations,
            )
            .unwrap();
            assert!(!estimate.overflow);
            assert!(
                estimate.vertex_count < 2_000_000,
                "{}: {} vertices",
                preset.name(),
                estimate.vertex_count
            );
        }
    }

    #[test]
    fn test_scenes_survive_yaml() {
        for preset in Preset::ALL {
            let scene = preset.scene();
            let yaml = serde_yaml::to_string(&scene).unwrap();
            let back: SceneConfig = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(back, scene, "{}", preset.name());
        }
    }
}
