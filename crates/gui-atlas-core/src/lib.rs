//! Core library for analyzing GUI spritesheets.
//!
//! - Extraction: opaque-pixel mask, 4-connected components, greedy state grouping
//! - Classification: size-based categories and nine-slice insets for panels
//! - Packing: first-fit guillotine repack of every sprite state onto one page (or several)
//! - Layout: row-flow preview placement with scale-down and skip
//! - Data model is serde-serializable; report and mapping helpers live in `export`.
//!
//! Quick example:
//! ```ignore
//! use gui_atlas_core::{ExtractOptions, PackConfig, extract_atlas_from_image, pack_atlas};
//! # fn main() -> anyhow::Result<()> {
//! let img = image::open("gui.png")?.to_rgba8();
//! let opts = ExtractOptions::builder().source_image("gui.png").build();
//! let atlas = extract_atlas_from_image(&img, &opts)?;
//! let packed = pack_atlas(&atlas, &PackConfig::default())?;
//! println!("sprites: {} overflow: {}", atlas.sprites.len(), packed.overflow.len());
//! # Ok(()) }
//! ```

pub mod classify;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod mask;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use mask::PixelMask;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `gui_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        ClassifierConfig, ExtractOptions, ExtractOptionsBuilder, LayoutConfig, LayoutConfigBuilder,
        PackConfig, PackConfigBuilder, SortOrder,
    };
    pub use crate::error::{AtlasError, Result};
    pub use crate::mask::PixelMask;
    pub use crate::model::{
        Atlas, Layout, NineSlice, PackedAtlas, PackedPages, Rect, Sprite, SpriteCategory,
        SpriteState,
    };
    pub use crate::{extract_atlas, layout_atlas, pack_atlas, pack_atlas_pages};
}
