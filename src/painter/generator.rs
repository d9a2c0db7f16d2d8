//! Color generators: scalar in [0, 1] → color

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{LsysError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorGenerator {
    Constant { color: Color },
    LinearGradient(LinearGradient),
    DiscreteGradient(DiscreteGradient),
}

impl ColorGenerator {
    pub fn constant(color: Color) -> Self {
        ColorGenerator::Constant { color }
    }

    pub fn linear(start: Color, end: Color) -> Self {
        ColorGenerator::LinearGradient(LinearGradient::new(start, end))
    }

    /// Color for `f`; values outside [0, 1] are clamped.
    pub fn get(&self, f: f32) -> Color {
        match self {
            ColorGenerator::Constant { color } => *color,
            ColorGenerator::LinearGradient(gradient) => gradient.get(f),
            ColorGenerator::DiscreteGradient(gradient) => gradient.get(f),
        }
    }
}

impl Default for ColorGenerator {
    fn default() -> Self {
        ColorGenerator::constant(Color::BLACK)
    }
}

/// Gradient key at a position in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    pub color: Color,
    pub position: f32,
}

/// Serialized form of [`LinearGradient`].
#[derive(Serialize, Deserialize)]
pub struct LinearKeys {
    pub keys: Vec<GradientKey>,
}

/// Continuous gradient
///
/// Keys stay sorted by position, the first sits at 0 and the last at 1.
/// Both are re-established after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinearKeys", into = "LinearKeys")]
pub struct LinearGradient {
    keys: Vec<GradientKey>,
}

impl LinearGradient {
    pub fn new(start: Color, end: Color) -> Self {
        Self {
            keys: vec![
                GradientKey {
                    color: start,
                    position: 0.0,
                },
                GradientKey {
                    color: end,
                    position: 1.0,
                },
            ],
        }
    }

    pub fn from_keys(keys: Vec<GradientKey>) -> Result<Self> {
        if keys.len() < 2 {
            return Err(LsysError::GradientTooShort);
        }
        let mut gradient = Self { keys };
        gradient.normalize();
        Ok(gradient)
    }

    pub fn keys(&self) -> &[GradientKey] {
        &self.keys
    }

    pub fn add_key(&mut self, color: Color, position: f32) {
        self.keys.push(GradientKey { color, position });
        self.normalize();
    }

    pub fn remove_key(&mut self, slot: usize) -> Result<GradientKey> {
        if slot >= self.keys.len() {
            return Err(LsysError::NoSuchKey(slot));
        }
        if self.keys.len() <= 2 {
            return Err(LsysError::GradientTooShort);
        }
        let removed = self.keys.remove(slot);
        self.normalize();
        Ok(removed)
    }

    pub fn set_key_color(&mut self, slot: usize, color: Color) -> Result<()> {
        let key = self.keys.get_mut(slot).ok_or(LsysError::NoSuchKey(slot))?;
        key.color = color;
        Ok(())
    }

    pub fn set_key_position(&mut self, slot: usize, position: f32) -> Result<()> {
        let key = self.keys.get_mut(slot).ok_or(LsysError::NoSuchKey(slot))?;
        key.position = position;
        self.normalize();
        Ok(())
    }

    pub fn get(&self, f: f32) -> Color {
        let f = f.clamp(0.0, 1.0);
        let upper = self.keys.partition_point(|k| k.position < f);
        if upper == 0 {
            return self.keys[0].color;
        }
        let (a, b) = (self.keys[upper - 1], self.keys[upper]);
        let span = b.position - a.position;
        let t = if span > 0.0 {
            (f - a.position) / span
        } else {
            1.0
        };
        a.color.lerp(b.color, t)
    }

    fn normalize(&mut self) {
        self.keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        if let Some(first) = self.keys.first_mut() {
            first.position = 0.0;
        }
        if let Some(last) = self.keys.last_mut() {
            last.position = 1.0;
        }
        for key in self.keys.iter_mut() {
            key.position = key.position.clamp(0.0, 1.0);
        }
    }
}

impl TryFrom<LinearKeys> for LinearGradient {
    type Error = LsysError;

    fn try_from(def: LinearKeys) -> Result<Self> {
        Self::from_keys(def.keys)
    }
}

impl From<LinearGradient> for LinearKeys {
    fn from(gradient: LinearGradient) -> Self {
        LinearKeys {
            keys: gradient.keys,
        }
    }
}

/// Gradient key at an integer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteKey {
    pub color: Color,
    pub index: u32,
}

/// Serialized form of [`DiscreteGradient`].
#[derive(Serialize, Deserialize)]
pub struct DiscreteKeys {
    pub keys: Vec<DiscreteKey>,
}

/// Largest discrete key index, so the expanded palette holds at most
/// 4096 colors.
pub const MAX_DISCRETE_INDEX: u32 = 4095;

/// Stepped gradient
///
/// Key indices start at 0, strictly increase and never exceed
/// [`MAX_DISCRETE_INDEX`]. The palette holds one color per index from 0 to
/// the last key, interpolated between keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiscreteKeys", into = "DiscreteKeys")]
pub struct DiscreteGradient {
    keys: Vec<DiscreteKey>,
    #[serde(skip)]
    colors: Vec<Color>,
}

impl DiscreteGradient {
    pub fn from_keys(keys: Vec<DiscreteKey>) -> Result<Self> {
        if keys.len() < 2 {
            return Err(LsysError::GradientTooShort);
        }
        let mut gradient = Self {
            keys: normalized(keys)?,
            colors: Vec::new(),
        };
        gradient.expand();
        Ok(gradient)
    }

    /// Keys at consecutive indices: no interpolated steps in between.
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Result<Self> {
        let keys = colors
            .into_iter()
            .zip(0u32..)
            .map(|(color, index)| DiscreteKey { color, index })
            .collect();
        Self::from_keys(keys)
    }

    pub fn keys(&self) -> &[DiscreteKey] {
        &self.keys
    }

    /// Expanded palette, one entry per index.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Insert a key. A key already at `index` moves up by one, together
    /// with every key above it. Fails without changes when a key would
    /// land past [`MAX_DISCRETE_INDEX`].
    pub fn insert_key(&mut self, color: Color, index: u32) -> Result<()> {
        let mut keys = self.keys.clone();
        if keys.iter().any(|k| k.index == index) {
            for key in keys.iter_mut().filter(|k| k.index >= index) {
                key.index = bump(key.index)?;
            }
        }
        keys.push(DiscreteKey { color, index });
        self.keys = normalized(keys)?;
        self.expand();
        Ok(())
    }

    pub fn remove_key(&mut self, slot: usize) -> Result<DiscreteKey> {
        if slot >= self.keys.len() {
            return Err(LsysError::NoSuchKey(slot));
        }
        if self.keys.len() <= 2 {
            return Err(LsysError::GradientTooShort);
        }
        let mut keys = self.keys.clone();
        let removed = keys.remove(slot);
        self.keys = normalized(keys)?;
        self.expand();
        Ok(removed)
    }

    pub fn set_key_color(&mut self, slot: usize, color: Color) -> Result<()> {
        let key = self.keys.get_mut(slot).ok_or(LsysError::NoSuchKey(slot))?;
        key.color = color;
        self.expand();
        Ok(())
    }

    pub fn get(&self, f: f32) -> Color {
        let len = self.colors.len();
        let bucket = (f.clamp(0.0, 1.0) * len as f32).floor() as usize;
        self.colors[bucket.min(len - 1)]
    }

    fn expand(&mut self) {
        self.colors.clear();
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let steps = b.index - a.index;
            for step in 0..steps {
                self.colors
                    .push(a.color.lerp(b.color, step as f32 / steps as f32));
            }
        }
        if let Some(last) = self.keys.last() {
            self.colors.push(last.color);
        }
    }
}

fn bump(index: u32) -> Result<u32> {
    index
        .checked_add(1)
        .filter(|&next| next <= MAX_DISCRETE_INDEX)
        .ok_or(LsysError::GradientTooLarge {
            index: u64::from(index) + 1,
            max: MAX_DISCRETE_INDEX,
        })
}

/// Sorted, first at 0, strictly increasing, bounded.
fn normalized(mut keys: Vec<DiscreteKey>) -> Result<Vec<DiscreteKey>> {
    keys.sort_by_key(|k| k.index);
    if let Some(first) = keys.first_mut() {
        first.index = 0;
    }
    for i in 1..keys.len() {
        if keys[i].index <= keys[i - 1].index {
            keys[i].index = bump(keys[i - 1].index)?;
        }
    }
    match keys.last() {
        Some(last) if last.index > MAX_DISCRETE_INDEX => Err(LsysError::GradientTooLarge {
            index: u64::from(last.index),
            max: MAX_DISCRETE_INDEX,
        }),
        _ => Ok(keys),
    }
}

impl TryFrom<DiscreteKeys> for DiscreteGradient {
    type Error = LsysError;

    fn try_from(def: DiscreteKeys) -> Result<Self> {
        Self::from_keys(def.keys)
    }
}

impl From<DiscreteGradient> for DiscreteKeys {
    fn from(gradient: DiscreteGradient) -> Self {
        DiscreteKeys {
            keys: gradient.keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(color: Color, position: f32) -> GradientKey {
        GradientKey { color, position }
    }

    #[test]
    fn test_constant_ignores_scalar() {
        let g = ColorGenerator::constant(Color::RED);
        assert_eq!(g.get(0.0), Color::RED);
        assert_eq!(g.get(0.9), Color::RED);
    }

    #[test]
    fn test_linear_interpolation() {
        let g = ColorGenerator::linear(Color::BLACK, Color::WHITE);
        assert_eq!(g.get(0.0), Color::BLACK);
        assert_eq!(g.get(1.0), Color::WHITE);
        assert_eq!(g.get(0.5), Color::rgb(128, 128, 128));
        assert_eq!(g.get(-3.0), Color::BLACK);
    }

    #[test]
    fn test_linear_keys_forced_to_unit_range() {
        let g = LinearGradient::from_keys(vec![
            key(Color::BLUE, 0.8),
            key(Color::RED, 0.3),
            key(Color::GREEN, 0.5),
        ])
        .unwrap();
        let positions: Vec<f32> = g.keys().iter().map(|k| k.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);
        assert_eq!(g.keys()[0].color, Color::RED);
        assert_eq!(g.get(0.5), Color::GREEN);
        assert_eq!(g.get(0.75), Color::GREEN.lerp(Color::BLUE, 0.5));
    }

    #[test]
    fn test_linear_mutations() {
        let mut g = LinearGradient::new(Color::BLACK, Color::WHITE);
        g.add_key(Color::RED, 0.25);
        assert_eq!(g.keys()[1].color, Color::RED);

        g.set_key_position(1, 0.75).unwrap();
        assert_eq!(g.keys()[1].position, 0.75);

        // removing an end key promotes the next one to the boundary
        g.remove_key(0).unwrap();
        assert_eq!(g.keys()[0].color, Color::RED);
        assert_eq!(g.keys()[0].position, 0.0);

        assert_eq!(g.remove_key(0), Err(LsysError::GradientTooShort));
        assert_eq!(g.set_key_color(9, Color::RED), Err(LsysError::NoSuchKey(9)));
        assert_eq!(
            LinearGradient::from_keys(vec![key(Color::RED, 0.0)]),
            Err(LsysError::GradientTooShort)
        );
    }

    #[test]
    fn test_discrete_expansion() {
        let g = DiscreteGradient::from_keys(vec![
            DiscreteKey {
                color: Color::BLACK,
                index: 2,
            },
            DiscreteKey {
                color: Color::WHITE,
                index: 6,
            },
        ])
        .unwrap();
        // first key forced to 0
        assert_eq!(g.keys()[0].index, 0);
        assert_eq!(g.colors().len(), 7);
        assert_eq!(g.colors()[0], Color::BLACK);
        assert_eq!(g.colors()[3], Color::rgb(128, 128, 128));
        assert_eq!(g.colors()[6], Color::WHITE);

        assert_eq!(g.get(0.0), Color::BLACK);
        assert_eq!(g.get(1.0), Color::WHITE);
        // floor(0.5 * 7) = 3
        assert_eq!(g.get(0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_discrete_insert_renumbers() {
        let mut g = DiscreteGradient::from_colors([Color::RED, Color::GREEN, Color::BLUE]).unwrap();
        g.insert_key(Color::WHITE, 1).unwrap();
        let indices: Vec<u32> = g.keys().iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(g.keys()[1].color, Color::WHITE);
        assert_eq!(g.keys()[2].color, Color::GREEN);

        g.insert_key(Color::BLACK, 10).unwrap();
        assert_eq!(g.colors().len(), 11);

        g.remove_key(0).unwrap();
        assert_eq!(g.keys()[0].index, 0);
        assert_eq!(g.keys()[0].color, Color::WHITE);
    }

    #[test]
    fn test_duplicate_indices_become_increasing() {
        let g = DiscreteGradient::from_keys(vec![
            DiscreteKey {
                color: Color::RED,
                index: 0,
            },
            DiscreteKey {
                color: Color::GREEN,
                index: 0,
            },
            DiscreteKey {
                color: Color::BLUE,
                index: 0,
            },
        ])
        .unwrap();
        let indices: Vec<u32> = g.keys().iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(g.colors(), &[Color::RED, Color::GREEN, Color::BLUE]);
    }

    #[test]
    fn test_generator_serde() {
        let yaml = r#"
type: discrete_gradient
keys:
  - { color: { r: 0, g: 0, b: 0, a: 255 }, index: 0 }
  - { color: { r: 255, g: 255, b: 255, a: 255 }, index: 2 }
"#;
        let g: ColorGenerator = serde_yaml::from_str(yaml).unwrap();
        match &g {
            ColorGenerator::DiscreteGradient(d) => assert_eq!(d.colors().len(), 3),
            other => panic!("unexpected generator {:?}", other),
        }

        let json = serde_json::to_string(&ColorGenerator::linear(Color::RED, Color::BLUE)).unwrap();
        let back: ColorGenerator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorGenerator::linear(Color::RED, Color::BLUE));
    }

    #[test]
    fn test_oversized_discrete_gradient_rejected() {
        let yaml = r#"
type: discrete_gradient
keys:
  - { color: { r: 0, g: 0, b: 0, a: 255 }, index: 0 }
  - { color: { r: 255, g: 0, b: 0, a: 255 }, index: 4294967295 }
  - { color: { r: 0, g: 0, b: 255, a: 255 }, index: 4294967295 }
"#;
        let err = serde_yaml::from_str::<ColorGenerator>(yaml).unwrap_err();
        assert!(err.to_string().contains("exceeds the largest palette index"), "{err}");

        let too_far = DiscreteGradient::from_keys(vec![
            DiscreteKey {
                color: Color::BLACK,
                index: 0,
            },
            DiscreteKey {
                color: Color::WHITE,
                index: MAX_DISCRETE_INDEX + 1,
            },
        ]);
        assert_eq!(
            too_far,
            Err(LsysError::GradientTooLarge {
                index: u64::from(MAX_DISCRETE_INDEX) + 1,
                max: MAX_DISCRETE_INDEX,
            })
        );
    }

    #[test]
    fn test_insert_past_last_index_keeps_gradient() {
        let mut g = DiscreteGradient::from_colors([Color::RED, Color::BLUE]).unwrap();
        assert!(g.insert_key(Color::WHITE, u32::MAX).is_err());
        assert!(g.insert_key(Color::GREEN, u32::MAX).is_err());
        assert_eq!(g.keys().len(), 2);
        assert_eq!(g.colors(), &[Color::RED, Color::BLUE]);

        // the full palette is reachable, one step further is not
        g.insert_key(Color::WHITE, MAX_DISCRETE_INDEX).unwrap();
        assert_eq!(g.colors().len(), MAX_DISCRETE_INDEX as usize + 1);
        assert!(g.insert_key(Color::GREEN, MAX_DISCRETE_INDEX).is_err());
        assert_eq!(g.keys().last().map(|k| k.index), Some(MAX_DISCRETE_INDEX));
    }
}
