use gui_atlas_core::model::{Layout, PackedAtlas, Rect, SpriteCategory};
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

/// Border thickness drawn around each previewed sprite.
pub const BORDER_WIDTH: u32 = 2;
/// Height of the label strip under each previewed sprite.
pub const LABEL_STRIP_HEIGHT: u32 = 20;
const LABEL_CHAR_WIDTH: u32 = 8;
const LABEL_OFFSET: u32 = 2;
const LABEL_SHADE: Rgba<u8> = Rgba([0, 0, 0, 128]);

pub fn category_color(category: SpriteCategory) -> Rgba<u8> {
    match category {
        SpriteCategory::Button => Rgba([255, 0, 0, 255]),
        SpriteCategory::Panel => Rgba([0, 255, 0, 255]),
        SpriteCategory::Icon => Rgba([0, 0, 255, 255]),
        SpriteCategory::Background => Rgba([255, 255, 0, 255]),
        SpriteCategory::Other => Rgba([128, 128, 128, 255]),
    }
}

/// Copies the `region` of `src` into `canvas` with its top-left at (dx, dy).
/// Pixels outside either image are skipped.
pub fn blit_region(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, region: &Rect) {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    for yy in 0..region.h {
        let iy = region.y.saturating_add(yy);
        let ty = dy.saturating_add(yy);
        if iy >= sh || ty >= ch {
            break;
        }
        for xx in 0..region.w {
            let ix = region.x.saturating_add(xx);
            let tx = dx.saturating_add(xx);
            if ix >= sw || tx >= cw {
                break;
            }
            canvas.put_pixel(tx, ty, *src.get_pixel(ix, iy));
        }
    }
}

/// Cuts `region` out of `src`; the result is clipped to the source bounds.
pub fn crop(src: &RgbaImage, region: &Rect) -> RgbaImage {
    imageops::crop_imm(src, region.x, region.y, region.w, region.h).to_image()
}

/// Draws a `thickness`-wide outline just inside `frame`.
pub fn outline(canvas: &mut RgbaImage, frame: &Rect, thickness: u32, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    for y in frame.y..frame.y.saturating_add(frame.h).min(ch) {
        for x in frame.x..frame.x.saturating_add(frame.w).min(cw) {
            let dx = (x - frame.x).min(frame.x + frame.w - 1 - x);
            let dy = (y - frame.y).min(frame.y + frame.h - 1 - y);
            if dx < thickness || dy < thickness {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Alpha-blends `color` over the pixels of `area`.
pub fn shade(canvas: &mut RgbaImage, area: &Rect, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    for y in area.y..area.y.saturating_add(area.h).min(ch) {
        for x in area.x..area.x.saturating_add(area.w).min(cw) {
            canvas.get_pixel_mut(x, y).blend(&color);
        }
    }
}

/// Composites one packed page from the source spritesheet.
pub fn render_packed_page(src: &RgbaImage, page: &PackedAtlas) -> RgbaImage {
    let mut canvas = RgbaImage::new(page.page_width, page.page_height);
    for p in &page.placements {
        blit_region(src, &mut canvas, p.x, p.y, &p.original_bounds);
    }
    canvas
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewStyle {
    pub bounds: bool,
    pub labels: bool,
}

/// Renders the preview canvas: each placed state is drawn at its layout
/// position (resized when scaled), then optionally outlined in its category
/// colour and underlined by a translucent label strip.
pub fn render_preview(src: &RgbaImage, layout: &Layout, style: PreviewStyle) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.canvas_width, layout.canvas_height);
    for p in &layout.placements {
        if p.width == 0 || p.height == 0 {
            continue;
        }
        let (x, y) = (p.position.x, p.position.y);
        if p.scale < 1.0 {
            let sprite = crop(src, &p.source);
            let scaled = imageops::resize(&sprite, p.width, p.height, FilterType::Triangle);
            let full = Rect::new(0, 0, p.width, p.height);
            blit_region(&scaled, &mut canvas, x, y, &full);
        } else {
            blit_region(src, &mut canvas, x, y, &p.source);
        }

        if style.bounds {
            outline(&mut canvas, &p.frame(), BORDER_WIDTH, category_color(p.category));
        }
        if style.labels {
            let text_w = (p.label().chars().count() as u32).saturating_mul(LABEL_CHAR_WIDTH);
            let strip = Rect::new(
                x,
                y.saturating_add(p.height).saturating_add(LABEL_OFFSET),
                p.width.min(text_w),
                LABEL_STRIP_HEIGHT,
            );
            shade(&mut canvas, &strip, LABEL_SHADE);
        }
    }
    canvas
}
