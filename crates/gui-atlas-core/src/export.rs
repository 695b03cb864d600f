use crate::model::{Atlas, Layout, PackedAtlas, PackedPages, PackedRect};
use serde_json::{Value, json};
use std::fmt::Write;

fn sprite_entry(p: &PackedRect) -> Value {
    let ob = &p.original_bounds;
    json!({
        "name": p.name,
        "state": p.state,
        "x": p.x,
        "y": p.y,
        "width": p.width,
        "height": p.height,
        "originalBounds": {"x": ob.x, "y": ob.y, "width": ob.w, "height": ob.h},
    })
}

/// Mapping document for a single packed page.
/// Shape: `{ atlas: { width, height, image }, sprites: [ { name, state, x, y, width, height, originalBounds } ] }`.
pub fn to_packed_mapping(packed: &PackedAtlas, image: &str) -> Value {
    let sprites: Vec<Value> = packed.placements.iter().map(sprite_entry).collect();
    json!({
        "atlas": {"width": packed.page_width, "height": packed.page_height, "image": image},
        "sprites": sprites,
    })
}

/// Mapping document for multi-page packing; `images[i]` names page `i`.
/// Shape: `{ pages: [ { id, width, height, image, sprites } ], overflow: [...] }`.
pub fn to_packed_pages_mapping(packed: &PackedPages, images: &[String]) -> Value {
    let pages: Vec<Value> = packed
        .pages
        .iter()
        .enumerate()
        .map(|(id, page)| {
            let image = images
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("packed_atlas_{}.png", id));
            let sprites: Vec<Value> = page.placements.iter().map(sprite_entry).collect();
            json!({
                "id": id,
                "width": page.page_width,
                "height": page.page_height,
                "image": image,
                "sprites": sprites,
            })
        })
        .collect();
    json!({ "pages": pages, "overflow": &packed.overflow })
}

/// One line per category, in first-seen order: `- button : 3 sprite(s)`.
pub fn category_summary(atlas: &Atlas) -> String {
    atlas
        .summary()
        .categories
        .iter()
        .map(|(category, count)| format!("- {} : {} sprite(s)", category, count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain-text report of an atlas and its preview layout.
pub fn layout_report(atlas: &Atlas, layout: &Layout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GUI Layout Report");
    let _ = writeln!(out, "=================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Source image : {}", atlas.source_image);
    let _ = writeln!(out, "Atlas size : {}x{}", atlas.image_width, atlas.image_height);
    let _ = writeln!(out, "Total sprites : {}", atlas.sprites.len());
    let _ = writeln!(out, "Total states : {}", layout.placements.len());
    if !layout.skipped.is_empty() {
        let _ = writeln!(out, "Skipped states : {}", layout.skipped.len());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Categories :");
    let _ = writeln!(out, "{}", category_summary(atlas));
    let _ = writeln!(out);
    let _ = writeln!(out, "Sprites :");
    for sprite in &atlas.sprites {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({}) :", sprite.name, sprite.category);
        for state in &sprite.states {
            let b = &state.bounds;
            let _ = writeln!(
                out,
                "  - {} : {}x{} at ({}, {})",
                state.name, b.w, b.h, b.x, b.y
            );
            if let Some(ns) = &state.nine_slice {
                let _ = writeln!(
                    out,
                    "    * 9-slice : T={}, R={}, B={}, L={}",
                    ns.top, ns.right, ns.bottom, ns.left
                );
            }
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Preview placement :");
    for p in &layout.placements {
        if p.scale < 1.0 {
            let _ = writeln!(
                out,
                "{} : ({}, {}) scaled {:.2}",
                p.label(),
                p.position.x,
                p.position.y,
                p.scale
            );
        } else {
            let _ = writeln!(out, "{} : ({}, {})", p.label(), p.position.x, p.position.y);
        }
    }
    for s in &layout.skipped {
        let _ = writeln!(out, "{}_{} : skipped ({}x{})", s.sprite, s.state, s.width, s.height);
    }
    out
}
