// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 帧差法运动检测
/// Frame-differencing motion detector with one frame of history
use super::primitives::{
    abs_diff, bounding_rect, contour_area, dilate, external_contours, threshold_binary,
    to_intensity,
};
use super::types::BBox;
use crate::error::PipelineError;
use image::{GrayImage, RgbImage};

/// 运动检测参数
#[derive(Clone, Debug, PartialEq)]
pub struct MotionParams {
    pub threshold: u8,       // 差值阈值 (严格大于)
    pub max_value: u8,       // 二值化前景值
    pub dilate_iterations: u8,
    pub min_area: f64,       // 轮廓面积 <= min_area 视为噪声
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            threshold: 25,
            max_value: 255,
            dilate_iterations: 2,
            min_area: 500.0,
        }
    }
}

pub struct MotionDetector {
    params: MotionParams,
    previous: Option<GrayImage>,
}

impl MotionDetector {
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            previous: None,
        }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Whether a previous intensity frame is retained.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Compares `frame` with the previously seen frame.
    ///
    /// Returns `Ok(None)` for the very first frame, which only primes the
    /// history. The retained frame is replaced on every successful call.
    pub fn process(&mut self, frame: &RgbImage) -> Result<Option<Vec<BBox>>, PipelineError> {
        let gray = to_intensity(frame)?;

        let bboxes = match self.previous.as_ref() {
            None => None,
            Some(previous) => Some(self.detect(&gray, previous)?),
        };

        self.previous = Some(gray);
        Ok(bboxes)
    }

    fn detect(
        &self,
        current: &GrayImage,
        previous: &GrayImage,
    ) -> Result<Vec<BBox>, PipelineError> {
        let diff = abs_diff(current, previous)?;
        let mask = threshold_binary(&diff, self.params.threshold, self.params.max_value);
        let mask = dilate(&mask, self.params.dilate_iterations);

        Ok(external_contours(&mask)
            .iter()
            .filter(|contour| contour_area(contour) > self.params.min_area)
            .filter_map(|contour| bounding_rect(contour))
            .collect())
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(MotionParams::default())
    }
}
