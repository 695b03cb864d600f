use gui_atlas_core::{ExtractOptions, SheetInput, extract_atlas, extract_atlases};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_sheet(rng: &mut StdRng, name: &str) -> SheetInput {
    let (w, h) = (rng.gen_range(16..96), rng.gen_range(16..96));
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    for _ in 0..rng.gen_range(0..12) {
        let (bw, bh) = (rng.gen_range(1..12), rng.gen_range(1..12));
        let (bx, by) = (rng.gen_range(0..w - bw), rng.gen_range(0..h - bh));
        for y in by..by + bh {
            for x in bx..bx + bw {
                pixels[((y * w + x) * 4 + 3) as usize] = 255;
            }
        }
    }
    SheetInput {
        source_image: name.to_string(),
        width: w,
        height: h,
        pixels,
    }
}

#[test]
fn batch_matches_single_extraction_in_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut inputs: Vec<SheetInput> = (0..8)
        .map(|i| random_sheet(&mut rng, &format!("sheet_{}.png", i)))
        .collect();
    // one broken buffer in the middle
    inputs[3].pixels.pop();

    let opts = ExtractOptions::builder().generated_at("2024-01-01T00:00:00Z").build();
    let results = extract_atlases(&inputs, &opts);
    assert_eq!(results.len(), inputs.len());

    for (input, result) in inputs.iter().zip(&results) {
        let mut single = opts.clone();
        single.source_image = input.source_image.clone();
        let expected = extract_atlas(&input.pixels, input.width, input.height, &single);
        match (result, expected) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a, &b);
                assert_eq!(a.source_image, input.source_image);
            }
            (Err(_), Err(_)) => {}
            _ => panic!("batch and single extraction disagree for {}", input.source_image),
        }
    }
    assert!(results[3].is_err());
}

#[test]
fn extraction_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(99);
    let sheet = random_sheet(&mut rng, "a.png");
    let opts = ExtractOptions::default();
    let a = extract_atlas(&sheet.pixels, sheet.width, sheet.height, &opts).expect("extract");
    let b = extract_atlas(&sheet.pixels, sheet.width, sheet.height, &opts).expect("extract");
    assert_eq!(a, b);
    assert!(a.validate().is_ok());
    assert_eq!(a.metadata.total_sprites, a.sprites.len());
}
