// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检测系统 (Detection System)
///
/// 帧差法运动检测, 由检测线程独占使用
/// - Primitives: 灰度/差分/阈值/膨胀/轮廓
/// - Motion:     运动检测器 (保留上一帧)
/// - Types:      线程间传递的数据结构
pub mod motion;
pub mod primitives;
pub mod types;

pub use motion::{MotionDetector, MotionParams};
pub use types::{BBox, DecodedFrame, RenderData};
