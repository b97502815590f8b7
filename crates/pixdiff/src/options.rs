use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u8 = 30;
pub const DEFAULT_FLAG_COLOR: Rgba<u8> = Rgba([255, 0, 0, 128]);

/// How the common comparison grid is chosen when the inputs differ in size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizePolicy {
    /// Differing sizes are an error.
    RequireEqual,
    /// Adopt the "before" image's dimensions.
    #[default]
    ResizeToBefore,
    /// Adopt the per-axis minimum of both images.
    ResizeToSmaller,
}

impl SizePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireEqual => "require-equal",
            Self::ResizeToBefore => "resize-to-before",
            Self::ResizeToSmaller => "resize-to-smaller",
        }
    }
}

impl FromStr for SizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "require-equal" => Ok(Self::RequireEqual),
            "resize-to-before" => Ok(Self::ResizeToBefore),
            "resize-to-smaller" => Ok(Self::ResizeToSmaller),
            other => Err(format!(
                "unknown size policy '{other}' \
                 (expected require-equal, resize-to-before or resize-to-smaller)"
            )),
        }
    }
}

/// How an input is placed onto a grid of a different size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fit {
    /// Anchor at the top-left corner. Positions outside the image read as
    /// transparent black.
    #[default]
    Crop,
    /// Resample to the grid size (nearest neighbour) before comparing.
    Stretch,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Stretch => "stretch",
        }
    }
}

impl FromStr for Fit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crop" => Ok(Self::Crop),
            "stretch" => Ok(Self::Stretch),
            other => Err(format!("unknown fit '{other}' (expected crop or stretch)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    /// A pixel is changed when any of its R, G, B channels differs by
    /// strictly more than this.
    pub threshold: u8,
    /// Written into the overlay at changed positions.
    pub flag_color: Rgba<u8>,
    pub size_policy: SizePolicy,
    pub fit: Fit,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            flag_color: DEFAULT_FLAG_COLOR,
            size_policy: SizePolicy::default(),
            fit: Fit::default(),
        }
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional). Six digits imply
/// an opaque color.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, String> {
    let hex = s.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!(
            "color must be #rrggbb or #rrggbbaa in hex, got '{s}'"
        ));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("{e}"));
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Inverse of [`parse_color`], always with an alpha component.
pub fn format_color(c: Rgba<u8>) -> String {
    let Rgba([r, g, b, a]) = c;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}
