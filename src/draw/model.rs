use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const YELLOW: Self = Self::rgba(255, 255, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// How new paint combines with pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositing {
    /// Paint over existing pixels, weighted by opacity.
    SourceOver,
    /// Remove existing pixels towards full transparency.
    DestinationOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    #[default]
    Pen,
    Eraser,
    Highlighter,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Pen, DrawMode::Eraser, DrawMode::Highlighter];

    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Pen => "Pen",
            DrawMode::Eraser => "Eraser",
            DrawMode::Highlighter => "Highlighter",
        }
    }

    /// Resolve the fixed parameters of this mode against the user's pen settings.
    pub fn config(self, pen: PenSettings) -> ModeConfig {
        match self {
            DrawMode::Pen => ModeConfig {
                compositing: Compositing::SourceOver,
                opacity: 1.0,
                width: pen.size.max(1),
                color: pen.color,
            },
            DrawMode::Eraser => ModeConfig {
                compositing: Compositing::DestinationOut,
                opacity: 1.0,
                width: ERASER_WIDTH,
                color: Color::BLACK,
            },
            DrawMode::Highlighter => ModeConfig {
                compositing: Compositing::SourceOver,
                opacity: HIGHLIGHTER_OPACITY,
                width: HIGHLIGHTER_WIDTH,
                color: Color::YELLOW,
            },
        }
    }
}

pub const ERASER_WIDTH: u32 = 20;
pub const HIGHLIGHTER_WIDTH: u32 = 15;
pub const HIGHLIGHTER_OPACITY: f32 = 0.3;

/// User-selected pen color and size. Only the pen mode reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenSettings {
    pub color: Color,
    pub size: u32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 3,
        }
    }
}

/// Everything a render target needs to paint one stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeConfig {
    pub compositing: Compositing,
    pub opacity: f32,
    pub width: u32,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgba(255, 128, 0, 255)));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::rgba(0, 255, 0, 255)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
        assert_eq!(Color::rgba(18, 52, 86, 255).to_hex(), "#123456");
    }

    #[test]
    fn only_pen_mode_follows_user_settings() {
        let pen = PenSettings {
            color: Color::rgba(10, 20, 30, 255),
            size: 7,
        };
        let pen_cfg = DrawMode::Pen.config(pen);
        assert_eq!(pen_cfg.color, pen.color);
        assert_eq!(pen_cfg.width, 7);

        let eraser = DrawMode::Eraser.config(pen);
        assert_eq!(eraser.compositing, Compositing::DestinationOut);
        assert_eq!(eraser.width, ERASER_WIDTH);

        let highlighter = DrawMode::Highlighter.config(pen);
        assert_eq!(highlighter.color, Color::YELLOW);
        assert_eq!(highlighter.opacity, HIGHLIGHTER_OPACITY);
    }
}
