use crate::mask::PixelMask;
use crate::model::Rect;

/// 4-connected components of a mask, in row-major discovery order.
#[derive(Debug, Clone)]
pub struct Components {
    /// Bounding box of each component; index = component id.
    pub boxes: Vec<Rect>,
    /// Opaque pixel count of each component.
    pub pixel_counts: Vec<usize>,
    width: u32,
    // 0 = transparent, otherwise component id + 1
    labels: Vec<u32>,
}

impl Components {
    /// Component id owning the pixel, if it is opaque.
    pub fn label_at(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width {
            return None;
        }
        let idx = (y as usize) * (self.width as usize) + x as usize;
        match self.labels.get(idx).copied() {
            Some(0) | None => None,
            Some(l) => Some(l as usize - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Labels every 4-connected group of opaque pixels.
///
/// Scans rows top-to-bottom, left-to-right; each unvisited opaque pixel seeds an
/// iterative flood fill over an explicit stack. Every pixel is visited once.
pub fn label_components(mask: &PixelMask) -> Components {
    let (w, h) = (mask.width(), mask.height());
    let bits = mask.bits();
    let mut labels = vec![0u32; bits.len()];
    let mut boxes = Vec::new();
    let mut pixel_counts = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let seed = mask.index(x, y);
            if !bits[seed] || labels[seed] != 0 {
                continue;
            }
            let label = boxes.len() as u32 + 1;
            labels[seed] = label;
            stack.push((x, y));
            let (mut x1, mut y1, mut x2, mut y2) = (x, y, x, y);
            let mut count = 0usize;

            while let Some((cx, cy)) = stack.pop() {
                count += 1;
                x1 = x1.min(cx);
                x2 = x2.max(cx);
                y1 = y1.min(cy);
                y2 = y2.max(cy);

                let mut visit = |nx: u32, ny: u32| {
                    let ni = mask.index(nx, ny);
                    if bits[ni] && labels[ni] == 0 {
                        labels[ni] = label;
                        stack.push((nx, ny));
                    }
                };
                if cx + 1 < w {
                    visit(cx + 1, cy);
                }
                if cx > 0 {
                    visit(cx - 1, cy);
                }
                if cy + 1 < h {
                    visit(cx, cy + 1);
                }
                if cy > 0 {
                    visit(cx, cy - 1);
                }
            }

            boxes.push(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1));
            pixel_counts.push(count);
        }
    }

    Components {
        boxes,
        pixel_counts,
        width: w,
        labels,
    }
}

/// Bounding boxes of all 4-connected opaque regions, in discovery order.
pub fn find_components(mask: &PixelMask) -> Vec<Rect> {
    label_components(mask).boxes
}

/// Drops boxes whose width or height is below `min_size`. Order is preserved.
pub fn filter_min_size(boxes: Vec<Rect>, min_size: u32) -> Vec<Rect> {
    boxes
        .into_iter()
        .filter(|b| b.w >= min_size && b.h >= min_size)
        .collect()
}

/// Applies the size filter, then caps the list to the first `max_sprites` boxes.
///
/// The cap keeps discovery order; it is not a quality-based selection.
/// A zero hint is treated as unset.
pub fn apply_hints(
    mut boxes: Vec<Rect>,
    min_sprite_size: Option<u32>,
    max_sprites: Option<usize>,
) -> Vec<Rect> {
    if let Some(min) = min_sprite_size.filter(|m| *m > 0) {
        boxes = filter_min_size(boxes, min);
    }
    if let Some(max) = max_sprites.filter(|m| *m > 0) {
        boxes.truncate(max);
    }
    boxes
}
