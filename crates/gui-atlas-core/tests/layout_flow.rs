use gui_atlas_core::config::LayoutConfig;
use gui_atlas_core::layout_atlas;
use gui_atlas_core::model::{
    ATLAS_FORMAT_VERSION, Atlas, AtlasMetadata, Position, Rect, Sprite, SpriteCategory,
    SpriteState,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn atlas_of(sizes: &[(u32, u32)]) -> Atlas {
    let sprites: Vec<Sprite> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Sprite {
            name: format!("sprite_{}", i + 1),
            states: vec![SpriteState {
                name: "normal".into(),
                bounds: Rect::new(0, 0, w, h),
                nine_slice: None,
            }],
            category: SpriteCategory::Button,
        })
        .collect();
    Atlas {
        source_image: "sheet.png".into(),
        image_width: 2048,
        image_height: 2048,
        metadata: AtlasMetadata {
            generated_at: None,
            version: ATLAS_FORMAT_VERSION.into(),
            total_sprites: sprites.len(),
        },
        sprites,
    }
}

#[test]
fn first_row_places_with_margin() {
    let atlas = atlas_of(&[(100, 50); 3]);
    let layout = layout_atlas(&atlas, &LayoutConfig::default()).expect("layout");
    let positions: Vec<Position> = layout.placements.iter().map(|p| p.position).collect();
    assert_eq!(
        positions,
        vec![
            Position { x: 10, y: 10 },
            Position { x: 120, y: 10 },
            Position { x: 230, y: 10 },
        ]
    );
    assert!(layout.placements.iter().all(|p| p.scale == 1.0));
    assert!(layout.skipped.is_empty());
    assert_eq!((layout.canvas_width, layout.canvas_height), (800, 600));
}

#[test]
fn row_wraps_below_tallest_item_and_label() {
    let atlas = atlas_of(&[(100, 50), (100, 70), (100, 50)]);
    let cfg = LayoutConfig::builder().with_canvas(300, 600).build();
    let layout = layout_atlas(&atlas, &cfg).expect("layout");
    assert_eq!(layout.placements[1].position, Position { x: 120, y: 10 });
    // 10 + 70 + 10 + 20
    assert_eq!(layout.placements[2].position, Position { x: 10, y: 110 });
}

#[test]
fn tall_sprite_is_scaled_to_max_scale() {
    let atlas = atlas_of(&[(400, 1000)]);
    let layout = layout_atlas(&atlas, &LayoutConfig::default()).expect("layout");
    let p = &layout.placements[0];
    assert_eq!(p.position, Position { x: 10, y: 10 });
    assert_eq!(p.scale, 0.5);
    assert_eq!((p.width, p.height), (200, 500));
    assert_eq!(p.source, Rect::new(0, 0, 400, 1000));
}

#[test]
fn scale_is_limited_by_remaining_height() {
    // remaining height under the cursor is 600 - 10 - 20 - 10 = 560
    let atlas = atlas_of(&[(100, 2240)]);
    let layout = layout_atlas(&atlas, &LayoutConfig::default()).expect("layout");
    let p = &layout.placements[0];
    assert_eq!(p.scale, 0.25);
    assert_eq!((p.width, p.height), (25, 560));
}

#[test]
fn hopeless_sprite_is_skipped() {
    let atlas = atlas_of(&[(2000, 2000), (20, 20)]);
    let cfg = LayoutConfig::builder().with_canvas(100, 100).build();
    let layout = layout_atlas(&atlas, &cfg).expect("layout");
    assert_eq!(layout.skipped.len(), 1);
    assert_eq!(layout.skipped[0].sprite, "sprite_1");
    assert_eq!((layout.skipped[0].width, layout.skipped[0].height), (2000, 2000));
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.placements[0].sprite, "sprite_2");
}

#[test]
fn sliver_that_shrinks_below_a_pixel_is_skipped() {
    // 560 / 2000 = 0.28 keeps the height but floors the width to zero
    let atlas = atlas_of(&[(1, 2000), (20, 20)]);
    let layout = layout_atlas(&atlas, &LayoutConfig::default()).expect("layout");
    assert_eq!(layout.skipped.len(), 1);
    assert_eq!(layout.skipped[0].sprite, "sprite_1");
    assert_eq!((layout.skipped[0].width, layout.skipped[0].height), (1, 2000));
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.placements[0].sprite, "sprite_2");
    assert_eq!(layout.placements[0].position, Position { x: 10, y: 10 });
}

#[test]
fn too_wide_sprite_is_scaled_on_a_fresh_row() {
    let atlas = atlas_of(&[(1000, 40)]);
    let cfg = LayoutConfig::builder().with_canvas(300, 600).build();
    let layout = layout_atlas(&atlas, &cfg).expect("layout");
    let p = &layout.placements[0];
    // the first item wraps even on an empty row
    assert_eq!(p.position, Position { x: 10, y: 40 });
    assert!(p.scale < 1.0);
    assert!(p.position.x + p.width <= 300);
}

#[test]
fn every_state_is_placed_or_skipped_inside_canvas() {
    let mut rng = StdRng::seed_from_u64(0x1A70);
    for _ in 0..30 {
        let n = rng.gen_range(0..80);
        let sizes: Vec<(u32, u32)> = (0..n)
            .map(|_| (rng.gen_range(1..=500), rng.gen_range(1..=500)))
            .collect();
        let atlas = atlas_of(&sizes);
        let cfg = LayoutConfig::builder()
            .with_canvas(rng.gen_range(50..=1200), rng.gen_range(50..=900))
            .margin(rng.gen_range(0..=16))
            .label_height(rng.gen_range(0..=24))
            .build();
        let layout = layout_atlas(&atlas, &cfg).expect("layout");

        assert_eq!(layout.placements.len() + layout.skipped.len(), n);
        for p in &layout.placements {
            assert!(p.position.x + p.width <= cfg.width);
            assert!(p.position.y + p.height <= cfg.height);
            assert!(p.scale > cfg.min_scale && p.scale <= 1.0);
            assert!(p.width >= 1 && p.height >= 1);
        }
    }
}

#[test]
fn invalid_layout_config_is_rejected() {
    let atlas = atlas_of(&[(10, 10)]);
    let zero = LayoutConfig::builder().with_canvas(0, 600).build();
    assert!(layout_atlas(&atlas, &zero).is_err());
    let inverted = LayoutConfig::builder().max_scale(0.1).min_scale(0.5).build();
    assert!(layout_atlas(&atlas, &inverted).is_err());
}

#[test]
fn multi_state_sprites_lay_out_in_state_order() {
    let mut atlas = atlas_of(&[(40, 20)]);
    for (i, name) in ["hover", "pressed"].iter().enumerate() {
        atlas.sprites[0].states.push(SpriteState {
            name: (*name).into(),
            bounds: Rect::new(50 * (i as u32 + 1), 0, 40, 20),
            nine_slice: None,
        });
    }
    let layout = layout_atlas(&atlas, &LayoutConfig::default()).expect("layout");
    let labels: Vec<String> = layout.placements.iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        vec!["sprite_1_normal", "sprite_1_hover", "sprite_1_pressed"]
    );
}
