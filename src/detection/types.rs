// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 运动检测系统数据结构定义
/// Data structures shared by the pipeline stages
use image::RgbImage;

// ========== 数据结构 ==========

/// 运动区域框 (axis-aligned, pixel coordinates, inclusive origin)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn x2(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &BBox) -> bool {
        other.x >= self.x && other.y >= self.y && other.x2() <= self.x2() && other.y2() <= self.y2()
    }
}

/// 已解码帧 (采集线程 → 检测线程)
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    pub image: RgbImage,
    pub frame_id: u64, // 帧序号, 从1开始
}

impl DecodedFrame {
    pub fn new(image: RgbImage, frame_id: u64) -> Self {
        Self { image, frame_id }
    }
}

/// 渲染数据 (检测线程 → 渲染线程): 原始彩色帧 + 本帧检测结果, 不可拆分
#[derive(Clone, Debug)]
pub struct RenderData {
    pub frame: DecodedFrame,
    pub bboxes: Vec<BBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_edges_and_area() {
        let b = BBox::new(98, 98, 34, 34);
        assert_eq!(b.x2(), 132);
        assert_eq!(b.y2(), 132);
        assert_eq!(b.area(), 34 * 34);
        assert!(b.contains(&BBox::new(100, 100, 30, 30)));
        assert!(!b.contains(&BBox::new(90, 100, 30, 30)));
    }
}
