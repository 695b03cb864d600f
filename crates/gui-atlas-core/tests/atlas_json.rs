use gui_atlas_core::model::{Atlas, NineSlice, Rect, SpriteCategory};
use gui_atlas_core::{ExtractOptions, extract_atlas};
use serde_json::{Value, json};

fn sample_atlas() -> Atlas {
    // a 40x40 panel and a row of three 20x20 buttons below it
    let (w, h) = (120u32, 80u32);
    let mut px = vec![0u8; (w * h * 4) as usize];
    let rects = [
        Rect::new(0, 0, 40, 40),
        Rect::new(0, 50, 20, 20),
        Rect::new(30, 50, 20, 20),
        Rect::new(60, 50, 20, 20),
    ];
    for r in rects {
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                px[((y * w + x) * 4 + 3) as usize] = 255;
            }
        }
    }
    let opts = ExtractOptions::builder()
        .source_image("ui/gui.png")
        .generated_at("2024-05-01T12:00:00Z")
        .build();
    extract_atlas(&px, w, h, &opts).expect("extract")
}

#[test]
fn atlas_serializes_with_camel_case_keys() {
    let atlas = sample_atlas();
    let v = serde_json::to_value(&atlas).expect("json");
    assert_eq!(v["sourceImage"], "ui/gui.png");
    assert_eq!(v["imageWidth"], 120);
    assert_eq!(v["imageHeight"], 80);
    assert_eq!(v["metadata"]["generatedAt"], "2024-05-01T12:00:00Z");
    assert_eq!(v["metadata"]["version"], "1.0.0");
    assert_eq!(v["metadata"]["totalSprites"], 2);

    let panel = &v["sprites"][0];
    assert_eq!(panel["name"], "sprite_1");
    assert_eq!(panel["category"], "panel");
    assert_eq!(
        panel["states"][0],
        json!({
            "name": "normal",
            "bounds": {"x": 0, "y": 0, "width": 40, "height": 40},
            "nineSlice": {"top": 4, "right": 4, "bottom": 4, "left": 4},
        })
    );

    let button = &v["sprites"][1];
    assert_eq!(button["category"], "button");
    assert_eq!(button["states"].as_array().map(|a| a.len()), Some(3));
    // absent nine-slice is omitted, not null
    assert!(button["states"][0].get("nineSlice").is_none());
}

#[test]
fn atlas_round_trips_through_json() {
    let atlas = sample_atlas();
    let text = serde_json::to_string_pretty(&atlas).expect("json");
    let back: Atlas = serde_json::from_str(&text).expect("parse");
    assert_eq!(atlas, back);
}

#[test]
fn hand_written_document_is_accepted() {
    let doc = r#"{
        "sourceImage": "menu.png",
        "imageWidth": 256,
        "imageHeight": 128,
        "sprites": [
            {
                "name": "close",
                "category": "icon",
                "states": [
                    {"name": "normal", "bounds": {"x": 1, "y": 2, "width": 12, "height": 12}}
                ]
            }
        ],
        "metadata": {"version": "1.0.0", "totalSprites": 1}
    }"#;
    let atlas: Atlas = serde_json::from_str(doc).expect("parse");
    assert!(atlas.validate().is_ok());
    assert_eq!(atlas.sprites[0].category, SpriteCategory::Icon);
    assert_eq!(atlas.sprites[0].states[0].bounds, Rect::new(1, 2, 12, 12));
    assert_eq!(atlas.metadata.generated_at, None);
}

#[test]
fn validate_rejects_broken_atlases() {
    let mut atlas = sample_atlas();
    atlas.sprites[0].states[0].nine_slice = Some(NineSlice::uniform(30, 4));
    assert!(atlas.validate().is_err());

    let mut atlas = sample_atlas();
    atlas.sprites[1].states[2].bounds.w = 0;
    assert!(atlas.validate().is_err());

    let mut atlas = sample_atlas();
    atlas.sprites[1].states.clear();
    assert!(atlas.validate().is_err());
}

#[test]
fn summary_counts_categories_in_first_seen_order() {
    let atlas = sample_atlas();
    let s = atlas.summary();
    assert_eq!(s.num_sprites, 2);
    assert_eq!(s.num_states, 4);
    assert_eq!(
        s.categories,
        vec![(SpriteCategory::Panel, 1), (SpriteCategory::Button, 1)]
    );
    let v: Value = serde_json::to_value(&atlas.sprites[0].category).expect("json");
    assert_eq!(v, "panel");
}
