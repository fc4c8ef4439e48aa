// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 画面叠加: 运动框 + 时间戳
use super::font::OverlayFont;
use crate::config::RenderConfig;
use crate::detection::BBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Outlines the rectangle spanning `(x, y)` to `(x + width, y + height)`
/// inclusive. Extra strokes grow outwards; anything off-canvas is clipped.
pub fn draw_rectangle(canvas: &mut RgbImage, bbox: &BBox, color: Rgb<u8>, thickness: u32) {
    for i in 0..thickness.max(1) {
        let rect = Rect::at(bbox.x as i32 - i as i32, bbox.y as i32 - i as i32)
            .of_size(bbox.width + 1 + 2 * i, bbox.height + 1 + 2 * i);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// 文字左下角(基线)位于 `origin`, 粗细通过偏移叠绘实现
pub fn draw_text(
    canvas: &mut RgbImage,
    font: &OverlayFont,
    text: &str,
    origin: (i32, i32),
    scale: f32,
    color: Rgb<u8>,
    thickness: u32,
) {
    let strokes = thickness.max(1) as i32;
    for dy in 0..strokes {
        for dx in 0..strokes {
            font.draw(canvas, text, origin.0 + dx, origin.1 + dy, scale, color);
        }
    }
}

pub struct Overlay {
    font: OverlayFont,
    box_color: Rgb<u8>,
    box_thickness: u32,
    text_origin: (i32, i32),
    text_scale: f32,
    text_color: Rgb<u8>,
    text_thickness: u32,
}

impl Overlay {
    pub fn new(config: &RenderConfig) -> Self {
        Self::with_font(config, OverlayFont::load(config.font_path.as_deref()))
    }

    pub fn with_font(config: &RenderConfig, font: OverlayFont) -> Self {
        Self {
            font,
            box_color: Rgb(config.box_color),
            box_thickness: config.box_thickness,
            text_origin: config.text_origin,
            text_scale: config.text_scale,
            text_color: Rgb(config.text_color),
            text_thickness: config.text_thickness,
        }
    }

    /// Boxes first, then the timestamp on top.
    pub fn annotate(&self, frame: &mut RgbImage, bboxes: &[BBox], timestamp: &str) {
        for bbox in bboxes {
            draw_rectangle(frame, bbox, self.box_color, self.box_thickness);
        }
        draw_text(
            frame,
            &self.font,
            timestamp,
            self.text_origin,
            self.text_scale,
            self.text_color,
            self.text_thickness,
        );
    }
}
