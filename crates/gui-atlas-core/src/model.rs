use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AtlasError, Result};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
///
/// Serialized as `{x, y, width, height}` to match the atlas interchange format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "width")]
    pub w: u32,
    #[serde(rename = "height")]
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the pixel `(px, py)` lies inside the rectangle.
    pub fn contains_point(&self, px: u32, py: u32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w && py < self.y + self.h
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x + r.w || r.x >= self.x + self.w || self.y >= r.y + r.h || r.y >= self.y + self.h)
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Nine-slice insets, in pixels, measured inwards from each edge of a state's bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NineSlice {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl NineSlice {
    pub fn uniform(vertical: u32, horizontal: u32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
    /// True if the insets leave a non-negative centre region inside `bounds`.
    pub fn fits(&self, bounds: &Rect) -> bool {
        self.left.saturating_add(self.right) <= bounds.w
            && self.top.saturating_add(self.bottom) <= bounds.h
    }
}

/// Derived classification of a sprite. Not authoritative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpriteCategory {
    Button,
    Panel,
    Icon,
    Background,
    Other,
}

impl SpriteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Panel => "panel",
            Self::Icon => "icon",
            Self::Background => "background",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SpriteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named visual variant of a sprite (`normal`, `hover`, `pressed`, `state_N`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpriteState {
    pub name: String,
    /// Pixel bounds inside the source image.
    pub bounds: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nine_slice: Option<NineSlice>,
}

/// A logical UI element; `states[0]` is the canonical `normal` state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprite {
    pub name: String,
    pub states: Vec<SpriteState>,
    pub category: SpriteCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AtlasMetadata {
    /// Caller-supplied timestamp (RFC 3339). The core never reads the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Atlas format version.
    pub version: String,
    pub total_sprites: usize,
}

/// Description of every sprite detected in one source image.
///
/// This is the interchange document between the core and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Atlas {
    pub source_image: String,
    pub image_width: u32,
    pub image_height: u32,
    pub sprites: Vec<Sprite>,
    pub metadata: AtlasMetadata,
}

/// Current atlas format version written into [`AtlasMetadata::version`].
pub const ATLAS_FORMAT_VERSION: &str = "1.0.0";

impl Atlas {
    /// Iterates `(sprite, state)` pairs in atlas order.
    pub fn states(&self) -> impl Iterator<Item = (&Sprite, &SpriteState)> {
        self.sprites
            .iter()
            .flat_map(|s| s.states.iter().map(move |st| (s, st)))
    }

    pub fn state_count(&self) -> usize {
        self.sprites.iter().map(|s| s.states.len()).sum()
    }

    /// Checks the structural invariants the packer and layout engine rely on.
    ///
    /// An atlas without sprites is valid. A sprite without states, a zero-sized
    /// bounds, or a nine-slice that does not fit its bounds is rejected.
    pub fn validate(&self) -> Result<()> {
        for sprite in &self.sprites {
            if sprite.states.is_empty() {
                return Err(AtlasError::InvalidAtlas(format!(
                    "sprite '{}' has no states",
                    sprite.name
                )));
            }
            for state in &sprite.states {
                if state.bounds.is_empty() {
                    return Err(AtlasError::InvalidAtlas(format!(
                        "{}_{} has non-positive bounds {}x{}",
                        sprite.name, state.name, state.bounds.w, state.bounds.h
                    )));
                }
                if let Some(ns) = &state.nine_slice {
                    if !ns.fits(&state.bounds) {
                        return Err(AtlasError::InvalidAtlas(format!(
                            "{}_{} nine-slice exceeds its {}x{} bounds",
                            sprite.name, state.name, state.bounds.w, state.bounds.h
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Counts sprites, states and categories (categories in first-seen order).
    pub fn summary(&self) -> AtlasSummary {
        let mut categories: Vec<(SpriteCategory, usize)> = Vec::new();
        for sprite in &self.sprites {
            match categories.iter_mut().find(|(c, _)| *c == sprite.category) {
                Some((_, n)) => *n += 1,
                None => categories.push((sprite.category, 1)),
            }
        }
        AtlasSummary {
            num_sprites: self.sprites.len(),
            num_states: self.state_count(),
            categories,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasSummary {
    pub num_sprites: usize,
    pub num_states: usize,
    pub categories: Vec<(SpriteCategory, usize)>,
}

/// One sprite state placed inside a packed atlas page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackedRect {
    pub name: String,
    pub state: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Where the pixels come from in the source image.
    pub original_bounds: Rect,
}

impl PackedRect {
    /// Placed rectangle within the page.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A sprite state that did not fit in any free region of the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackingOverflow {
    pub name: String,
    pub state: String,
    pub width: u32,
    pub height: u32,
}

/// Result of packing one page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackedAtlas {
    /// Tight bounding width over all placements (not the configured maximum).
    pub page_width: u32,
    pub page_height: u32,
    pub placements: Vec<PackedRect>,
    pub overflow: Vec<PackingOverflow>,
}

/// Result of packing with page rollover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackedPages {
    pub pages: Vec<PackedAtlas>,
    /// Rectangles larger than an empty page.
    pub overflow: Vec<PackingOverflow>,
}

/// Statistics about packing efficiency of a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of placed rectangles.
    pub num_frames: usize,
    /// Number of rectangles that did not fit.
    pub num_overflow: usize,
    /// Page area (width * height).
    pub page_area: u64,
    /// Sum of placed rectangle areas.
    pub used_area: u64,
    /// used_area / page_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl PackedAtlas {
    /// Computes packing statistics for this page.
    pub fn stats(&self) -> PackStats {
        let page_area = (self.page_width as u64) * (self.page_height as u64);
        let used_area: u64 = self.placements.iter().map(|p| p.frame().area()).sum();
        let occupancy = if page_area > 0 {
            used_area as f64 / page_area as f64
        } else {
            0.0
        };
        PackStats {
            num_frames: self.placements.len(),
            num_overflow: self.overflow.len(),
            page_area,
            used_area,
            occupancy,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Frames: {}, Overflow: {}, Occupancy: {:.2}%, Page Area: {} px², Used Area: {} px²",
            self.num_frames,
            self.num_overflow,
            self.occupancy * 100.0,
            self.page_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.page_area.saturating_sub(self.used_area)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// A sprite state positioned on the preview canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlacement {
    pub sprite: String,
    pub category: SpriteCategory,
    pub state: String,
    /// Source bounds of the state in the spritesheet.
    pub source: Rect,
    pub position: Position,
    /// Drawn size on the canvas (source size times `scale`, floored).
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl LayoutPlacement {
    /// Drawn rectangle on the canvas.
    pub fn frame(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn label(&self) -> String {
        format!("{}_{}", self.sprite, self.state)
    }
}

/// A sprite state left out of the preview because it could not be shrunk enough to fit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutOverflow {
    pub sprite: String,
    pub state: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placements: Vec<LayoutPlacement>,
    pub skipped: Vec<LayoutOverflow>,
}
