use super::{Packer, Placement};
use crate::model::Rect;

/// First-fit guillotine packer over a square page.
///
/// Free regions ("bins") are scanned in insertion order and the first one large
/// enough wins; the rectangle goes to the bin's origin and the leftover space is
/// cut into at most two new bins appended to the list. Bins are never merged back.
pub struct GuillotinePacker {
    free: Vec<Rect>,
}

impl GuillotinePacker {
    pub fn new(page_size: u32) -> Self {
        Self {
            free: vec![Rect::new(0, 0, page_size, page_size)],
        }
    }

    /// Current free regions in scan order.
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    fn choose(&self, w: u32, h: u32) -> Option<usize> {
        self.free.iter().position(|fr| fr.w >= w && fr.h >= h)
    }

    fn split(fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = fr.w - placed.w;
        let h_bottom = fr.h - placed.h;
        match (w_right > 0, h_bottom > 0) {
            // right strip as tall as the placement, bottom strip spans the whole bin
            (true, true) => (
                Some(Rect::new(fr.x + placed.w, fr.y, w_right, placed.h)),
                Some(Rect::new(fr.x, fr.y + placed.h, fr.w, h_bottom)),
            ),
            (true, false) => (Some(Rect::new(fr.x + placed.w, fr.y, w_right, fr.h)), None),
            (false, true) => (None, Some(Rect::new(fr.x, fr.y + placed.h, fr.w, h_bottom))),
            (false, false) => (None, None),
        }
    }

    fn place(&mut self, idx: usize, placed: &Rect) {
        let fr = self.free.remove(idx);
        let (right, bottom) = Self::split(&fr, placed);
        if let Some(r) = right {
            self.free.push(r);
        }
        if let Some(r) = bottom {
            self.free.push(r);
        }
    }
}

impl<K> Packer<K> for GuillotinePacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        w > 0 && h > 0 && self.choose(w, h).is_some()
    }

    fn pack(&mut self, key: K, w: u32, h: u32) -> Option<Placement<K>> {
        if w == 0 || h == 0 {
            return None;
        }
        let idx = self.choose(w, h)?;
        let fr = self.free[idx];
        let frame = Rect::new(fr.x, fr.y, w, h);
        self.place(idx, &frame);
        Some(Placement { key, frame })
    }
}
