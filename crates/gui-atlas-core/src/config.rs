//! Configuration for each stage of the engine.
//! Key notes:
//!   - `ExtractOptions` carries the analysis hints plus the injected `generated_at` timestamp
//!   - `PackConfig` selects the page size and the order rectangles are fed to the packer
//!   - `LayoutConfig` controls the preview canvas and the scale-down fallback

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AtlasError, Result};

/// Sorting orders applied before packing. Sorts are stable, so ties keep atlas order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AreaDesc,
    MaxSideDesc,
    HeightDesc,
    WidthDesc,
    /// Sprite name, then state name, compared as plain strings.
    NameAsc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "height_desc" => Ok(Self::HeightDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Thresholds used when grouping boxes into sprites and categorizing them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Max width/height difference (px) between boxes of the same sprite.
    pub size_tolerance: u32,
    /// Both sides strictly greater than this => panel.
    pub panel_min_side: u32,
    /// Both sides less than or equal to this => icon.
    pub icon_max_side: u32,
    /// Either side strictly greater than this => background.
    pub background_min_side: u32,
    /// Upper bound of a nine-slice inset.
    pub nine_slice_max: u32,
    /// Inset is `side / nine_slice_divisor`, capped by `nine_slice_max`.
    pub nine_slice_divisor: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            size_tolerance: 2,
            panel_min_side: 32,
            icon_max_side: 16,
            background_min_side: 64,
            nine_slice_max: 4,
            nine_slice_divisor: 4,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        // two insets per axis must fit inside the box
        if self.nine_slice_divisor < 2 {
            return Err(AtlasError::InvalidConfig(format!(
                "nine_slice_divisor must be at least 2, got {}",
                self.nine_slice_divisor
            )));
        }
        Ok(())
    }
}

/// Analysis hints and injected metadata for [`crate::extract_atlas`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    /// Reference to the source image recorded in the atlas (a path or URL; never opened by the core).
    pub source_image: String,
    /// Drop boxes whose width or height is below this. `None` or 0 disables the filter.
    pub min_sprite_size: Option<u32>,
    /// Keep only the first N discovered boxes. `None` or 0 disables the cap.
    pub max_sprites: Option<usize>,
    /// Group similar boxes into multi-state sprites. When false every box is its own sprite.
    pub detect_states: bool,
    /// Timestamp written to the atlas metadata.
    pub generated_at: Option<String>,
    pub classifier: ClassifierConfig,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            source_image: String::new(),
            min_sprite_size: None,
            max_sprites: None,
            detect_states: true,
            generated_at: None,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()
    }

    /// Create a fluent builder for `ExtractOptions`.
    pub fn builder() -> ExtractOptionsBuilder {
        ExtractOptionsBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExtractOptionsBuilder {
    opts: ExtractOptions,
}

impl ExtractOptionsBuilder {
    pub fn source_image(mut self, v: impl Into<String>) -> Self {
        self.opts.source_image = v.into();
        self
    }
    pub fn min_sprite_size(mut self, v: Option<u32>) -> Self {
        self.opts.min_sprite_size = v;
        self
    }
    pub fn max_sprites(mut self, v: Option<usize>) -> Self {
        self.opts.max_sprites = v;
        self
    }
    pub fn detect_states(mut self, v: bool) -> Self {
        self.opts.detect_states = v;
        self
    }
    pub fn generated_at(mut self, v: impl Into<String>) -> Self {
        self.opts.generated_at = Some(v.into());
        self
    }
    pub fn classifier(mut self, v: ClassifierConfig) -> Self {
        self.opts.classifier = v;
        self
    }
    pub fn build(self) -> ExtractOptions {
        self.opts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackConfig {
    /// Page width and height in pixels.
    pub max_size: u32,
    pub sort_order: SortOrder,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            max_size: 1024,
            sort_order: SortOrder::AreaDesc,
        }
    }
}

impl PackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.max_size,
                height: self.max_size,
            });
        }
        Ok(())
    }

    pub fn builder() -> PackConfigBuilder {
        PackConfigBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PackConfigBuilder {
    cfg: PackConfig,
}

impl PackConfigBuilder {
    pub fn max_size(mut self, v: u32) -> Self {
        self.cfg.max_size = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn build(self) -> PackConfig {
        self.cfg
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Preview canvas width in pixels.
    pub width: u32,
    /// Preview canvas height in pixels.
    pub height: u32,
    /// Gap around and between sprites.
    pub margin: u32,
    /// Strip reserved under each row for labels.
    pub label_height: u32,
    /// Largest scale used when a sprite has to be shrunk.
    pub max_scale: f64,
    /// Sprites whose fallback scale is at or below this are skipped.
    pub min_scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 10,
            label_height: 20,
            max_scale: 0.5,
            min_scale: 0.1,
        }
    }
}

impl LayoutConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Canvas dimensions are zero
    /// - Scales are not finite or not ordered as `0 <= min_scale < max_scale <= 1`
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.min_scale.is_finite() || !self.max_scale.is_finite() {
            return Err(AtlasError::InvalidConfig(
                "layout scales must be finite".into(),
            ));
        }
        if self.min_scale < 0.0 || self.min_scale >= self.max_scale || self.max_scale > 1.0 {
            return Err(AtlasError::InvalidConfig(format!(
                "expected 0 <= min_scale < max_scale <= 1, got min_scale={} max_scale={}",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn with_canvas(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn label_height(mut self, v: u32) -> Self {
        self.cfg.label_height = v;
        self
    }
    pub fn max_scale(mut self, v: f64) -> Self {
        self.cfg.max_scale = v;
        self
    }
    pub fn min_scale(mut self, v: f64) -> Self {
        self.cfg.min_scale = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}
