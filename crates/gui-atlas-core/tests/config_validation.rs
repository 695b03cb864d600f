use gui_atlas_core::config::{
    ClassifierConfig, ExtractOptions, LayoutConfig, PackConfig, SortOrder,
};
use gui_atlas_core::error::AtlasError;

#[test]
fn defaults_are_valid() {
    assert!(ExtractOptions::default().validate().is_ok());
    assert!(PackConfig::default().validate().is_ok());
    assert!(LayoutConfig::default().validate().is_ok());
}

#[test]
fn zero_pack_size_reports_dimensions() {
    let cfg = PackConfig {
        max_size: 0,
        ..Default::default()
    };
    match cfg.validate() {
        Err(AtlasError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 0);
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn zero_canvas_reports_dimensions() {
    let cfg = LayoutConfig {
        width: 640,
        height: 0,
        ..Default::default()
    };
    match cfg.validate() {
        Err(AtlasError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 640);
            assert_eq!(height, 0);
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn layout_scales_must_be_ordered() {
    for (min, max) in [(0.5, 0.5), (0.6, 0.5), (-0.1, 0.5), (0.1, 1.5), (0.1, f64::NAN)] {
        let cfg = LayoutConfig {
            min_scale: min,
            max_scale: max,
            ..Default::default()
        };
        assert!(
            matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))),
            "min={} max={}",
            min,
            max
        );
    }
    let full = LayoutConfig {
        min_scale: 0.0,
        max_scale: 1.0,
        ..Default::default()
    };
    assert!(full.validate().is_ok());
}

#[test]
fn nine_slice_divisor_below_two_is_rejected() {
    let opts = ExtractOptions {
        classifier: ClassifierConfig {
            nine_slice_divisor: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    match opts.validate() {
        Err(AtlasError::InvalidConfig(msg)) => assert!(msg.contains("nine_slice_divisor")),
        _ => panic!("Expected InvalidConfig error"),
    }
    let px = vec![255u8; 4 * 4 * 4];
    assert!(gui_atlas_core::extract_atlas(&px, 4, 4, &opts).is_err());
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: ExtractOptions =
        serde_json::from_str(r#"{"min_sprite_size": 4, "classifier": {"size_tolerance": 5}}"#)
            .expect("parse");
    assert_eq!(opts.min_sprite_size, Some(4));
    assert_eq!(opts.max_sprites, None);
    assert!(opts.detect_states);
    assert_eq!(opts.classifier.size_tolerance, 5);
    assert_eq!(opts.classifier.panel_min_side, 32);

    let pack: PackConfig = serde_json::from_str(r#"{"sort_order": "name_asc"}"#).expect("parse");
    assert_eq!(pack.max_size, 1024);
    assert_eq!(pack.sort_order, SortOrder::NameAsc);
}

#[test]
fn sort_order_parses_from_str() {
    assert_eq!("area_desc".parse::<SortOrder>(), Ok(SortOrder::AreaDesc));
    assert_eq!("MAX_SIDE_DESC".parse::<SortOrder>(), Ok(SortOrder::MaxSideDesc));
    assert_eq!("none".parse::<SortOrder>(), Ok(SortOrder::None));
    assert!("biggest".parse::<SortOrder>().is_err());
}

#[test]
fn builders_set_fields() {
    let layout = LayoutConfig::builder()
        .with_canvas(1024, 768)
        .margin(4)
        .label_height(12)
        .max_scale(0.75)
        .min_scale(0.2)
        .build();
    assert_eq!((layout.width, layout.height), (1024, 768));
    assert_eq!((layout.margin, layout.label_height), (4, 12));
    assert!(layout.validate().is_ok());

    let opts = ExtractOptions::builder()
        .source_image("a.png")
        .min_sprite_size(Some(3))
        .max_sprites(Some(9))
        .detect_states(false)
        .generated_at("2024-01-01T00:00:00Z")
        .classifier(ClassifierConfig::default())
        .build();
    assert_eq!(opts.source_image, "a.png");
    assert_eq!(opts.max_sprites, Some(9));
    assert!(!opts.detect_states);
    assert_eq!(opts.generated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
}
