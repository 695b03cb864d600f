use gui_atlas_core::error::AtlasError;
use gui_atlas_core::{ExtractOptions, PixelMask, extract_atlas};

#[test]
fn buffer_length_mismatch_is_rejected() {
    let pixels = vec![0u8; 10 * 10 * 4 - 1];
    match PixelMask::from_rgba(10, 10, &pixels) {
        Err(AtlasError::InvalidBuffer { expected, actual }) => {
            assert_eq!(expected, 400);
            assert_eq!(actual, 399);
        }
        other => panic!("Expected InvalidBuffer error, got {:?}", other),
    }
}

#[test]
fn extract_propagates_buffer_error() {
    let pixels = vec![255u8; 8];
    let result = extract_atlas(&pixels, 4, 4, &ExtractOptions::default());
    assert!(matches!(result, Err(AtlasError::InvalidBuffer { .. })));
}

#[test]
fn only_alpha_decides_opacity() {
    // RGB is ignored: a white pixel with alpha 0 is transparent, black with alpha 1 is opaque
    let pixels = vec![255, 255, 255, 0, 0, 0, 0, 1];
    let mask = PixelMask::from_rgba(2, 1, &pixels).expect("mask");
    assert!(!mask.is_opaque(0, 0));
    assert!(mask.is_opaque(1, 0));
    assert_eq!(mask.opaque_count(), 1);
}

#[test]
fn out_of_bounds_is_transparent() {
    let pixels = vec![255u8; 2 * 2 * 4];
    let mask = PixelMask::from_rgba(2, 2, &pixels).expect("mask");
    assert!(mask.is_opaque(1, 1));
    assert!(!mask.is_opaque(2, 0));
    assert!(!mask.is_opaque(0, 2));
}

#[test]
fn zero_sized_image_yields_empty_atlas() {
    let atlas = extract_atlas(&[], 0, 0, &ExtractOptions::default()).expect("extract");
    assert!(atlas.sprites.is_empty());
    assert_eq!(atlas.metadata.total_sprites, 0);
}

#[test]
fn fully_transparent_image_yields_empty_atlas() {
    let pixels = vec![0u8; 32 * 32 * 4];
    let atlas = extract_atlas(&pixels, 32, 32, &ExtractOptions::default()).expect("extract");
    assert!(atlas.sprites.is_empty());
    assert_eq!(atlas.image_width, 32);
    assert_eq!(atlas.image_height, 32);
}

#[cfg(feature = "image")]
#[test]
fn mask_from_image_matches_raw_buffer() {
    let mut img = image::RgbaImage::new(3, 2);
    img.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
    img.put_pixel(2, 1, image::Rgba([0, 0, 0, 7]));
    let from_img = PixelMask::from_image(&img);
    let from_raw = PixelMask::from_rgba(3, 2, img.as_raw()).expect("mask");
    assert_eq!(from_img, from_raw);
    assert_eq!(from_img.opaque_count(), 2);
}
