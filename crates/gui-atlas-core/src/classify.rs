use crate::config::ClassifierConfig;
use crate::model::{NineSlice, Rect, Sprite, SpriteCategory, SpriteState};

/// Positional state name: `normal`, `hover`, `pressed`, then `state_{index}`.
pub fn state_name(index: usize) -> String {
    match index {
        0 => "normal".into(),
        1 => "hover".into(),
        2 => "pressed".into(),
        n => format!("state_{}", n),
    }
}

/// Category derived from a single box; the first matching rule wins.
pub fn categorize(b: &Rect, cfg: &ClassifierConfig) -> SpriteCategory {
    if b.w > cfg.panel_min_side && b.h > cfg.panel_min_side {
        SpriteCategory::Panel
    } else if b.w <= cfg.icon_max_side && b.h <= cfg.icon_max_side {
        SpriteCategory::Icon
    } else if b.w > cfg.background_min_side || b.h > cfg.background_min_side {
        SpriteCategory::Background
    } else {
        SpriteCategory::Button
    }
}

/// Nine-slice insets for a panel box: `min(max, side / divisor)` per axis.
///
/// The divisor is used as configured; `ClassifierConfig::validate` rejects
/// values below 2. A zero divisor yields zero insets.
pub fn infer_nine_slice(b: &Rect, cfg: &ClassifierConfig) -> NineSlice {
    let div = cfg.nine_slice_divisor;
    let vertical = cfg.nine_slice_max.min(b.h.checked_div(div).unwrap_or(0));
    let horizontal = cfg.nine_slice_max.min(b.w.checked_div(div).unwrap_or(0));
    NineSlice::uniform(vertical, horizontal)
}

fn is_similar(seed: &Rect, c: &Rect, tol: u32) -> bool {
    seed.w.abs_diff(c.w) <= tol
        && seed.h.abs_diff(c.h) <= tol
        && (c.y == seed.y || c.y.abs_diff(seed.y) <= seed.h)
}

/// Groups boxes (in discovery order) into sprites with positional state names.
///
/// Grouping is greedy: the first unclaimed box seeds a group that claims every
/// later unclaimed box of similar size on a nearby row. A claimed box never seeds
/// or joins another group, so the result depends on input order.
/// With `detect_states == false` each box becomes its own single-state sprite.
pub fn classify_sprites(
    boxes: &[Rect],
    detect_states: bool,
    cfg: &ClassifierConfig,
) -> Vec<Sprite> {
    let mut claimed = vec![false; boxes.len()];
    let mut sprites = Vec::new();

    for (i, seed) in boxes.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        let members: Vec<usize> = if detect_states {
            (i..boxes.len())
                .filter(|&j| !claimed[j] && is_similar(seed, &boxes[j], cfg.size_tolerance))
                .collect()
        } else {
            vec![i]
        };
        for &j in &members {
            claimed[j] = true;
        }

        let category = categorize(seed, cfg);
        let mut states: Vec<SpriteState> = members
            .iter()
            .enumerate()
            .map(|(k, &j)| SpriteState {
                name: state_name(k),
                bounds: boxes[j],
                nine_slice: None,
            })
            .collect();
        if category == SpriteCategory::Panel {
            if let Some(first) = states.first_mut() {
                first.nine_slice = Some(infer_nine_slice(seed, cfg));
            }
        }

        sprites.push(Sprite {
            name: format!("sprite_{}", sprites.len() + 1),
            states,
            category,
        });
    }
    sprites
}
