use crate::classify::classify_sprites;
use crate::components::{apply_hints, find_components};
use crate::config::{ExtractOptions, LayoutConfig, PackConfig, SortOrder};
use crate::error::Result;
use crate::layout::layout_sprites;
use crate::mask::PixelMask;
use crate::model::{
    ATLAS_FORMAT_VERSION, Atlas, AtlasMetadata, Layout, PackedAtlas, PackedPages, PackedRect,
    PackingOverflow, Rect,
};
use crate::packer::{Packer, guillotine::GuillotinePacker};
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[instrument(skip_all, fields(width = width, height = height))]
/// Analyzes a decoded RGBA8 buffer and returns the atlas description.
///
/// Notes:
/// - `pixels.len()` must equal `width * height * 4`, otherwise `InvalidBuffer`.
/// - Component discovery is row-major and drives sprite naming, so the result is deterministic.
pub fn extract_atlas(
    pixels: &[u8],
    width: u32,
    height: u32,
    opts: &ExtractOptions,
) -> Result<Atlas> {
    let mask = PixelMask::from_rgba(width, height, pixels)?;
    extract_atlas_from_mask(&mask, opts)
}

/// Same as [`extract_atlas`] for an already decoded image.
#[cfg(feature = "image")]
pub fn extract_atlas_from_image(image: &image::RgbaImage, opts: &ExtractOptions) -> Result<Atlas> {
    extract_atlas_from_mask(&PixelMask::from_image(image), opts)
}

/// Runs component extraction and classification over a prepared mask.
pub fn extract_atlas_from_mask(mask: &PixelMask, opts: &ExtractOptions) -> Result<Atlas> {
    opts.validate()?;
    let boxes = find_components(mask);
    let found = boxes.len();
    let boxes = apply_hints(boxes, opts.min_sprite_size, opts.max_sprites);
    debug!(found, kept = boxes.len(), "connected components");

    let sprites = classify_sprites(&boxes, opts.detect_states, &opts.classifier);
    debug!(sprites = sprites.len(), "sprites classified");

    Ok(Atlas {
        source_image: opts.source_image.clone(),
        image_width: mask.width(),
        image_height: mask.height(),
        metadata: AtlasMetadata {
            generated_at: opts.generated_at.clone(),
            version: ATLAS_FORMAT_VERSION.into(),
            total_sprites: sprites.len(),
        },
        sprites,
    })
}

/// One spritesheet for batch extraction.
pub struct SheetInput {
    pub source_image: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Extracts several independent sheets. Results keep input order.
///
/// `opts.source_image` is replaced by each input's own reference. With the
/// `parallel` feature sheets are processed on the rayon pool.
pub fn extract_atlases(inputs: &[SheetInput], opts: &ExtractOptions) -> Vec<Result<Atlas>> {
    let run = |sheet: &SheetInput| {
        let mut o = opts.clone();
        o.source_image = sheet.source_image.clone();
        extract_atlas(&sheet.pixels, sheet.width, sheet.height, &o)
    };
    #[cfg(feature = "parallel")]
    {
        inputs.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(run).collect()
    }
}

// ---------------- Packing ----------------

struct Item {
    name: String,
    state: String,
    bounds: Rect,
}

fn prepare_items(atlas: &Atlas, order: &SortOrder) -> Vec<Item> {
    let mut items: Vec<Item> = atlas
        .states()
        .map(|(sprite, state)| Item {
            name: sprite.name.clone(),
            state: state.name.clone(),
            bounds: state.bounds,
        })
        .collect();
    // stable sorts: equal keys keep atlas order
    match order {
        SortOrder::None => {}
        SortOrder::AreaDesc => items.sort_by(|a, b| b.bounds.area().cmp(&a.bounds.area())),
        SortOrder::MaxSideDesc => items.sort_by(|a, b| {
            b.bounds
                .w
                .max(b.bounds.h)
                .cmp(&a.bounds.w.max(a.bounds.h))
        }),
        SortOrder::HeightDesc => items.sort_by(|a, b| b.bounds.h.cmp(&a.bounds.h)),
        SortOrder::WidthDesc => items.sort_by(|a, b| b.bounds.w.cmp(&a.bounds.w)),
        // plain string order: `sprite_10` sorts before `sprite_2`
        SortOrder::NameAsc => items.sort_by(|a, b| {
            a.name.cmp(&b.name).then_with(|| a.state.cmp(&b.state))
        }),
    }
    items
}

/// Packs `items` (already ordered) onto one page; returns the page and the indices left over.
fn pack_page(items: &[Item], indices: &[usize], page_size: u32) -> (PackedAtlas, Vec<usize>) {
    let mut packer = GuillotinePacker::new(page_size);
    let mut placements = Vec::new();
    let mut leftover = Vec::new();
    for &idx in indices {
        let it = &items[idx];
        match packer.pack(idx, it.bounds.w, it.bounds.h) {
            Some(p) => placements.push(PackedRect {
                name: it.name.clone(),
                state: it.state.clone(),
                x: p.frame.x,
                y: p.frame.y,
                width: p.frame.w,
                height: p.frame.h,
                original_bounds: it.bounds,
            }),
            None => leftover.push(idx),
        }
    }
    let (page_w, page_h) = compute_page_size(&placements);
    (
        PackedAtlas {
            page_width: page_w,
            page_height: page_h,
            placements,
            overflow: Vec::new(),
        },
        leftover,
    )
}

fn overflow_of(it: &Item) -> PackingOverflow {
    warn!(
        sprite = %it.name,
        state = %it.state,
        width = it.bounds.w,
        height = it.bounds.h,
        "could not place sprite in atlas"
    );
    PackingOverflow {
        name: it.name.clone(),
        state: it.state.clone(),
        width: it.bounds.w,
        height: it.bounds.h,
    }
}

#[instrument(skip_all)]
/// Repacks every sprite state of `atlas` into one page of `cfg.max_size` squared.
///
/// Notes:
/// - Rectangles are fed largest area first (by default) to a first-fit guillotine packer.
/// - A rectangle that fits no free region is reported in `overflow`; no new page is opened.
/// - Page dimensions are the tight bounding box of the placements.
pub fn pack_atlas(atlas: &Atlas, cfg: &PackConfig) -> Result<PackedAtlas> {
    cfg.validate()?;
    atlas.validate()?;

    let items = prepare_items(atlas, &cfg.sort_order);
    let all: Vec<usize> = (0..items.len()).collect();
    let (mut page, leftover) = pack_page(&items, &all, cfg.max_size);
    page.overflow = leftover.iter().map(|&i| overflow_of(&items[i])).collect();
    debug!(
        placed = page.placements.len(),
        overflow = page.overflow.len(),
        page_width = page.page_width,
        page_height = page.page_height,
        "atlas packed"
    );
    Ok(page)
}

#[instrument(skip_all)]
/// Like [`pack_atlas`], but rectangles that do not fit roll over to fresh pages.
///
/// Only rectangles larger than an empty page end up in `PackedPages::overflow`.
pub fn pack_atlas_pages(atlas: &Atlas, cfg: &PackConfig) -> Result<PackedPages> {
    cfg.validate()?;
    atlas.validate()?;

    let items = prepare_items(atlas, &cfg.sort_order);
    let mut remaining: Vec<usize> = (0..items.len()).collect();
    let mut pages = Vec::new();
    let mut overflow = Vec::new();

    while !remaining.is_empty() {
        let (page, leftover) = pack_page(&items, &remaining, cfg.max_size);
        if page.placements.is_empty() {
            // nothing fits even an empty page
            overflow = leftover.iter().map(|&i| overflow_of(&items[i])).collect();
            break;
        }
        debug!(id = pages.len(), placed = page.placements.len(), "page packed");
        pages.push(page);
        remaining = leftover;
    }
    Ok(PackedPages { pages, overflow })
}

/// Tight page size: the furthest right and bottom edges over all placements.
fn compute_page_size(placements: &[PackedRect]) -> (u32, u32) {
    let mut page_w = 0u32;
    let mut page_h = 0u32;
    for p in placements {
        page_w = page_w.max(p.x + p.width);
        page_h = page_h.max(p.y + p.height);
    }
    (page_w, page_h)
}

// ---------------- Layout ----------------

#[instrument(skip_all)]
/// Positions every sprite state of `atlas` on a `cfg.width` x `cfg.height` preview canvas.
pub fn layout_atlas(atlas: &Atlas, cfg: &LayoutConfig) -> Result<Layout> {
    cfg.validate()?;
    atlas.validate()?;
    let layout = layout_sprites(atlas, cfg);
    debug!(
        placed = layout.placements.len(),
        skipped = layout.skipped.len(),
        "layout computed"
    );
    Ok(layout)
}
