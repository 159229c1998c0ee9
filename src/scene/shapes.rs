//! ASCII-art sprites, palettes and player colors.
//!
//! A sprite is a block of text where each character indexes a palette. The
//! engine renders it at `spriteSize` pixels per cell. Sprites that rotate
//! with their owner carry one block per orientation (N, E, S, W).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigurationError;

pub type Rgb = [u8; 3];
pub type Rgba = [u8; 4];
pub type Palette = BTreeMap<char, Rgba>;

pub const ALPHA: Rgba = [0, 0, 0, 0];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];
pub const DARK_GRAY: Rgba = [60, 60, 60, 255];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SpriteShape {
    Static(String),
    /// One block per orientation, in N, E, S, W order.
    Oriented(Vec<String>),
}

impl SpriteShape {
    pub fn rows(&self) -> Vec<&str> {
        let block = match self {
            SpriteShape::Static(s) => s.as_str(),
            SpriteShape::Oriented(blocks) => blocks.first().map(|s| s.as_str()).unwrap_or(""),
        };
        block.lines().filter(|l| !l.is_empty()).collect()
    }

    /// The first block as newline-delimited rows.
    pub fn text(&self) -> String {
        let mut text = String::from("\n");
        for row in self.rows() {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    /// Characters used by the sprite, each of which must be in its palette.
    pub fn symbols(&self) -> Vec<char> {
        let blocks: Vec<&str> = match self {
            SpriteShape::Static(s) => vec![s.as_str()],
            SpriteShape::Oriented(blocks) => blocks.iter().map(|s| s.as_str()).collect(),
        };
        let mut symbols: Vec<char> = blocks
            .iter()
            .flat_map(|b| b.chars())
            .filter(|c| *c != '\n')
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        symbols
    }
}

pub const CUTE_AVATAR_N: &str = "
xxxxxxxx
xx*xx*xx
xx****xx
xx&&&&xx
x******x
x&****&x
xx****xx
xx&xx&xx
";

pub const CUTE_AVATAR_E: &str = "
xxxxxxxx
xx*x*xxx
xx****xx
xx*O*Oxx
x**##*&x
x&****&x
xx****xx
xx&&x&xx
";

pub const CUTE_AVATAR_S: &str = "
xxxxxxxx
xx*xx*xx
xx****xx
xxO**Oxx
x&*##*&x
x&****&x
xx****xx
xx&xx&xx
";

pub const CUTE_AVATAR_W: &str = "
xxxxxxxx
xxx*x*xx
xx****xx
xxO*O*xx
x&*##**x
x&****&x
xx****xx
xx&x&&xx
";

pub fn cute_avatar() -> SpriteShape {
    SpriteShape::Oriented(
        [CUTE_AVATAR_N, CUTE_AVATAR_E, CUTE_AVATAR_S, CUTE_AVATAR_W]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

/// Player colors, indexed by 0-based player slot.
pub const PLAYER_COLORS: [Rgb; 16] = [
    [125, 50, 200],
    [200, 50, 50],
    [50, 200, 200],
    [200, 200, 50],
    [50, 200, 50],
    [200, 120, 50],
    [50, 50, 200],
    [200, 50, 200],
    [120, 200, 120],
    [200, 150, 150],
    [100, 100, 100],
    [150, 100, 50],
    [50, 120, 80],
    [220, 220, 220],
    [90, 50, 120],
    [160, 200, 60],
];

/// Color of a 0-based player slot. Wraps around past the end of the table.
pub fn player_color(index: usize) -> Rgb {
    PLAYER_COLORS[index % PLAYER_COLORS.len()]
}

/// Scales the RGB channels of a color, clamped to 255. Alpha is replaced when given.
pub fn scale_color(color: Rgba, factor: f64, alpha: Option<u8>) -> Rgba {
    let scale = |c: u8| (c as f64 * factor).min(255.0) as u8;
    [
        scale(color[0]),
        scale(color[1]),
        scale(color[2]),
        alpha.unwrap_or(color[3]),
    ]
}

/// Palette for the avatar shapes, derived from a base color.
pub fn get_palette(color: Rgb) -> Palette {
    let base = [color[0], color[1], color[2], 255];
    let rotated = [color[0], color[2], color[1], 255];
    let mut palette = Palette::new();
    palette.insert('*', base);
    palette.insert('&', scale_color(base, 0.75, Some(255)));
    palette.insert('o', scale_color(base, 0.55, Some(255)));
    palette.insert('!', scale_color(base, 0.65, Some(255)));
    palette.insert('~', scale_color(base, 0.9, Some(255)));
    palette.insert('@', scale_color(base, 1.25, Some(255)));
    palette.insert('r', rotated);
    palette.insert('R', scale_color(rotated, 1.25, Some(255)));
    palette.insert('%', [178, 206, 234, 255]);
    palette.insert('#', WHITE);
    palette.insert('O', DARK_GRAY);
    palette.insert(',', BLACK);
    palette.insert('x', ALPHA);
    palette
}

/// Moves a sprite down by `rows`, padding the top with `fill` and dropping the bottom rows.
pub fn shift_down(shape: &str, rows: usize, fill: char) -> String {
    let lines: Vec<&str> = shape.lines().filter(|l| !l.is_empty()).collect();
    let width = lines.first().map(|l| l.chars().count()).unwrap_or(0);
    let keep = lines.len().saturating_sub(rows);
    let mut shifted = String::from("\n");
    for _ in 0..rows.min(lines.len()) {
        shifted.extend(std::iter::repeat(fill).take(width));
        shifted.push('\n');
    }
    for line in &lines[..keep] {
        shifted.push_str(line);
        shifted.push('\n');
    }
    shifted
}

/// Named sprites and palettes for one substrate.
///
/// Built once while the substrate is constructed and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ShapeLibrary {
    shapes: BTreeMap<String, SpriteShape>,
    palettes: BTreeMap<String, Palette>,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, name: &str, shape: SpriteShape) -> Self {
        self.shapes.insert(name.to_string(), shape);
        self
    }

    pub fn sprite(self, name: &str, shape: &str) -> Self {
        self.shape(name, SpriteShape::Static(shape.to_string()))
    }

    pub fn palette(mut self, name: &str, palette: Palette) -> Self {
        self.palettes.insert(name.to_string(), palette);
        self
    }

    pub fn get_shape(&self, name: &str) -> Result<&SpriteShape, ConfigurationError> {
        self.shapes
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingSprite {
                prefab: "<shape library>".to_string(),
                sprite: name.to_string(),
            })
    }

    pub fn get_palette(&self, name: &str) -> Result<&Palette, ConfigurationError> {
        self.palettes
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingPalette(name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scale_color_clamps() {
        assert_eq!(scale_color([200, 100, 10, 7], 1.5, None), [255, 150, 15, 7]);
        assert_eq!(scale_color([200, 100, 10, 7], 0.5, Some(255)), [100, 50, 5, 255]);
    }

    #[test]
    fn test_palette_covers_avatar() {
        let palette = get_palette(player_color(0));
        for symbol in cute_avatar().symbols() {
            assert!(palette.contains_key(&symbol), "missing {symbol:?}");
        }
        assert_eq!(palette[&'*'], [125, 50, 200, 255]);
        assert_eq!(palette[&'r'], [125, 200, 50, 255]);
    }

    #[test]
    fn test_player_color_wraps() {
        assert_eq!(player_color(16), player_color(0));
    }

    #[test]
    fn test_shift_down() {
        let shape = "\nab\ncd\nef\n";
        assert_eq!(shift_down(shape, 1, '~'), "\n~~\nab\ncd\n");
        assert_eq!(shift_down(shape, 0, '~'), "\nab\ncd\nef\n");
    }

    #[test]
    fn test_missing_lookups() {
        let library = ShapeLibrary::new().sprite("wall", "\n##\n##\n");
        assert!(library.get_shape("wall").is_ok());
        assert!(matches!(
            library.get_shape("floor"),
            Err(ConfigurationError::MissingSprite { .. })
        ));
        assert!(matches!(
            library.get_palette("wall"),
            Err(ConfigurationError::MissingPalette(_))
        ));
    }
}
