// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 图像基元运算
/// Image primitives used by motion detection. Pure functions over buffers.
use super::types::BBox;
use crate::error::PipelineError;
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::map::{map_colors, map_colors2};
use imageproc::point::Point;

pub type Contour = Vec<Point<i32>>;

/// 彩色帧 → 单通道亮度帧
pub fn to_intensity(frame: &RgbImage) -> Result<GrayImage, PipelineError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(PipelineError::primitive("grayscale", "frame has no pixels"));
    }
    Ok(image::imageops::grayscale(frame))
}

/// 逐像素绝对差 |a - b|
pub fn abs_diff(current: &GrayImage, previous: &GrayImage) -> Result<GrayImage, PipelineError> {
    if current.dimensions() != previous.dimensions() {
        let (cw, ch) = current.dimensions();
        let (pw, ph) = previous.dimensions();
        return Err(PipelineError::primitive(
            "absdiff",
            format!("frame size changed from {}x{} to {}x{}", pw, ph, cw, ch),
        ));
    }
    Ok(map_colors2(current, previous, |p: Luma<u8>, q: Luma<u8>| {
        Luma([p[0].abs_diff(q[0])])
    }))
}

/// 二值化: 大于 `thresh` 的像素置为 `max_value`, 其余置 0
pub fn threshold_binary(image: &GrayImage, thresh: u8, max_value: u8) -> GrayImage {
    map_colors(image, |p: Luma<u8>| {
        if p[0] > thresh {
            Luma([max_value])
        } else {
            Luma([0])
        }
    })
}

/// 膨胀: `iterations` 次 3x3 矩形核膨胀等价于半径为 `iterations` 的 L∞ 膨胀
pub fn dilate(image: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return image.clone();
    }
    imageproc::morphology::dilate(image, Norm::LInf, iterations)
}

/// 提取外轮廓 (只保留最外层边界), 并压缩水平/垂直/对角线段
pub fn external_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| compress_chain(&c.points))
        .collect()
}

/// 去掉同方向连续段的中间点, 只保留拐点
pub fn compress_chain(points: &[Point<i32>]) -> Contour {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let kept: Contour = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur.x - prev.x, cur.y - prev.y) != (next.x - cur.x, next.y - cur.y)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        points
    } else {
        kept
    }
}

/// 多边形面积 (鞋带公式)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// 外接矩形 (包含两端像素)
pub fn bounding_rect(points: &[Point<i32>]) -> Option<BBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BBox::new(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn square(width: u32, height: u32, x: u32, y: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |px, py| {
            if px >= x && px < x + side && py >= y && py < y + side {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn intensity_rejects_empty_frames() {
        assert!(to_intensity(&RgbImage::new(0, 10)).is_err());
        let gray = to_intensity(&RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]))).unwrap();
        assert_eq!(gray.dimensions(), (4, 3));
        assert!(gray.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn abs_diff_is_symmetric_and_checks_size() {
        let a = GrayImage::from_pixel(2, 2, Luma([10]));
        let b = GrayImage::from_pixel(2, 2, Luma([200]));
        assert_eq!(abs_diff(&a, &b).unwrap().get_pixel(0, 0)[0], 190);
        assert_eq!(abs_diff(&b, &a).unwrap().get_pixel(1, 1)[0], 190);

        let c = GrayImage::new(3, 2);
        assert!(matches!(
            abs_diff(&a, &c),
            Err(PipelineError::ImagePrimitive { op: "absdiff", .. })
        ));
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let img = GrayImage::from_raw(3, 1, vec![25, 26, 0]).unwrap();
        let out = threshold_binary(&img, 25, 255);
        assert_eq!(out.into_raw(), vec![0, 255, 0]);
    }

    #[test]
    fn dilation_grows_by_iterations() {
        let img = square(20, 20, 10, 10, 1);
        let grown = dilate(&img, 2);
        let on = grown.pixels().filter(|p| p[0] == 255).count();
        assert_eq!(on, 25);
        assert_eq!(grown.get_pixel(8, 8)[0], 255);
        assert_eq!(grown.get_pixel(7, 10)[0], 0);
        assert_eq!(dilate(&img, 0), img);
    }

    #[test]
    fn square_contour_is_four_corners() {
        let img = square(40, 40, 5, 5, 10);
        let contours = external_contours(&img);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.len(), 4);
        assert_eq!(contour_area(c), 81.0);
        assert_eq!(bounding_rect(c), Some(BBox::new(5, 5, 10, 10)));
    }

    #[test]
    fn nested_regions_report_only_outer_border() {
        // 空心方框 + 内部实心块: 只返回最外层轮廓
        let mut img = square(40, 40, 2, 2, 30);
        for y in 6..28 {
            for x in 6..28 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        for y in 12..20 {
            for x in 12..20 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let contours = external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(bounding_rect(&contours[0]), Some(BBox::new(2, 2, 30, 30)));
    }

    #[test]
    fn compress_keeps_turning_points() {
        let pts: Vec<Point<i32>> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let out = compress_chain(&pts);
        assert_eq!(
            out,
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(2, 2),
                Point::new(0, 2)
            ]
        );
    }

    #[test]
    fn degenerate_contours_have_zero_area() {
        assert_eq!(contour_area(&[Point::new(3, 3)]), 0.0);
        assert_eq!(contour_area(&[Point::new(0, 0), Point::new(5, 0)]), 0.0);
        assert_eq!(bounding_rect(&[]), None);
        assert_eq!(bounding_rect(&[Point::new(3, 4)]), Some(BBox::new(3, 4, 1, 1)));
    }
}
