// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 叠加文字字体
/// Outline font when one can be loaded, otherwise a built-in 5x7 bitmap font
/// covering the timestamp alphabet.
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::path::{Path, PathBuf};

/// 常见系统字体路径
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

pub enum OverlayFont {
    Outline(FontVec),
    Bitmap,
}

impl OverlayFont {
    /// Tries `preferred` first, then the usual system locations.
    pub fn load(preferred: Option<&Path>) -> Self {
        if let Some(path) = preferred {
            match Self::from_file(path) {
                Some(font) => return font,
                None => log::warn!("⚠️ 字体加载失败: {}, 尝试系统字体", path.display()),
            }
        }

        for candidate in SYSTEM_FONTS.iter().map(PathBuf::from) {
            if let Some(font) = Self::from_file(&candidate) {
                log::info!("✅ 字体加载成功: {}", candidate.display());
                return font;
            }
        }

        log::info!("未找到可用字体, 使用内置点阵字体");
        Self::Bitmap
    }

    pub fn bitmap() -> Self {
        Self::Bitmap
    }

    fn from_file(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        FontVec::try_from_vec(bytes).ok().map(Self::Outline)
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap)
    }

    /// Draws `text` with its baseline at `(x, baseline)`.
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: i32,
        baseline: i32,
        scale: f32,
        color: Rgb<u8>,
    ) {
        match self {
            Self::Outline(font) => {
                let px = PxScale::from(scale);
                let ascent = font.as_scaled(px).ascent().round() as i32;
                draw_text_mut(canvas, color, x, baseline - ascent, px, font, text);
            }
            Self::Bitmap => draw_bitmap_text(canvas, text, x, baseline, bitmap_cell(scale), color),
        }
    }
}

/// 点阵放大倍数: 约使字高与 `scale` 像素相当
fn bitmap_cell(scale: f32) -> u32 {
    ((scale / 8.0).round() as u32).max(1)
}

fn draw_bitmap_text(
    canvas: &mut RgbImage,
    text: &str,
    x: i32,
    baseline: i32,
    cell: u32,
    color: Rgb<u8>,
) {
    let top = baseline - (GLYPH_H * cell) as i32;
    let advance = ((GLYPH_W + 1) * cell) as i32;

    for (i, ch) in text.chars().enumerate() {
        let origin_x = x + i as i32 * advance;
        let rows = glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + (col * cell) as i32;
                let py = top + (row as u32 * cell) as i32;
                fill_cell(canvas, px, py, cell, color);
            }
        }
    }
}

fn fill_cell(canvas: &mut RgbImage, x: i32, y: i32, cell: u32, color: Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    for dy in 0..cell as i32 {
        for dx in 0..cell as i32 {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        ' ' => [0; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}
