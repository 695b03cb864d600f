use tracing::warn;

use crate::config::LayoutConfig;
use crate::model::{Atlas, Layout, LayoutOverflow, LayoutPlacement, Position, Sprite, SpriteState};

/// Row-flow cursor over the preview canvas.
struct Cursor {
    x: i64,
    y: i64,
    row_max: i64,
}

/// Places every sprite state of `atlas` on the preview canvas, in atlas order.
///
/// Rows fill left to right starting at `(margin, margin)`; a state that would
/// cross the right edge wraps to a new row, which advances by the tallest item
/// of the previous row plus the margin and label strip. A state that does not fit
/// vertically is shrunk to at most `max_scale`; if the usable scale is at or
/// below `min_scale`, or the shrunk size floors to zero on either axis, it is
/// skipped and reported in `Layout::skipped`.
///
/// Callers are expected to have validated `cfg` and `atlas`.
pub fn layout_sprites(atlas: &Atlas, cfg: &LayoutConfig) -> Layout {
    let canvas_w = cfg.width as i64;
    let canvas_h = cfg.height as i64;
    let margin = cfg.margin as i64;
    let label = cfg.label_height as i64;

    let mut cur = Cursor {
        x: margin,
        y: margin,
        row_max: 0,
    };
    let mut placements = Vec::with_capacity(atlas.state_count());
    let mut skipped = Vec::new();

    for (sprite, state) in atlas.states() {
        let w = state.bounds.w as i64;
        let h = state.bounds.h as i64;

        if cur.x + w + margin > canvas_w {
            cur.x = margin;
            cur.y += cur.row_max + margin + label;
            cur.row_max = 0;
        }

        let remaining_w = canvas_w - cur.x - margin;
        let remaining_h = canvas_h - cur.y - label - margin;

        let scale = if cur.y + h + label + margin > canvas_h {
            // vertical overflow: shrink to the space left under the cursor
            (remaining_h as f64 / h as f64)
                .min(cfg.max_scale)
                .min(remaining_w as f64 / w as f64)
        } else if w > remaining_w {
            // wider than an empty row
            (remaining_w as f64 / w as f64).min(cfg.max_scale)
        } else {
            1.0
        };

        let (draw_w, draw_h) = if scale < 1.0 {
            ((w as f64 * scale).floor() as i64, (h as f64 * scale).floor() as i64)
        } else {
            (w, h)
        };
        // a state that shrinks below one pixel on either axis cannot be drawn
        if scale <= cfg.min_scale || draw_w < 1 || draw_h < 1 {
            warn!(
                sprite = %sprite.name,
                state = %state.name,
                width = state.bounds.w,
                height = state.bounds.h,
                scale,
                "sprite does not fit the preview canvas, skipped"
            );
            skipped.push(LayoutOverflow {
                sprite: sprite.name.clone(),
                state: state.name.clone(),
                width: state.bounds.w,
                height: state.bounds.h,
            });
            continue;
        }

        placements.push(placement(sprite, state, &cur, draw_w, draw_h, scale));
        cur.x += draw_w + margin;
        cur.row_max = cur.row_max.max(draw_h);
    }

    Layout {
        canvas_width: cfg.width,
        canvas_height: cfg.height,
        placements,
        skipped,
    }
}

fn placement(
    sprite: &Sprite,
    state: &SpriteState,
    cur: &Cursor,
    w: i64,
    h: i64,
    scale: f64,
) -> LayoutPlacement {
    LayoutPlacement {
        sprite: sprite.name.clone(),
        category: sprite.category,
        state: state.name.clone(),
        source: state.bounds,
        position: Position {
            x: cur.x as u32,
            y: cur.y as u32,
        },
        width: w as u32,
        height: h as u32,
        scale,
    }
}
