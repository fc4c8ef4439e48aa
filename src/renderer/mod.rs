// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 渲染系统 (Render System)
///
/// - Overlay:  运动框与时间戳叠加到帧缓冲
/// - Font:     轮廓字体 / 内置点阵字体
/// - Headless: 无窗口显示面 (测试/服务器)
/// - Window:   macroquad 窗口 (feature: window)
pub mod font;
pub mod headless;
pub mod overlay;
#[cfg(feature = "window")]
pub mod window;

pub use font::OverlayFont;
pub use headless::HeadlessDisplay;
pub use overlay::{draw_rectangle, draw_text, Overlay};
#[cfg(feature = "window")]
pub use window::WindowDisplay;

use crate::error::PipelineError;
use image::RgbImage;
use std::time::Duration;

/// 显示面接口
///
/// `poll_key` is async so that a frame-driven window can hand control back to
/// its event loop while waiting.
#[allow(async_fn_in_trait)]
pub trait Display {
    fn show(&mut self, frame: &RgbImage) -> Result<(), PipelineError>;

    /// Waits at most `timeout` for a key press.
    async fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>, PipelineError>;

    fn close(&mut self);
}
