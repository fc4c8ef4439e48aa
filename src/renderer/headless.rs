// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 无窗口显示面
/// Counts presented frames and never reports a key press.
use super::Display;
use crate::error::PipelineError;
use image::RgbImage;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    presented: u64,
    closed: bool,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), PipelineError> {
        if self.closed {
            return Err(PipelineError::Display("surface already closed".into()));
        }
        self.presented += 1;
        Ok(())
    }

    async fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>, PipelineError> {
        if !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
        Ok(None)
    }

    fn close(&mut self) {
        if !self.closed {
            log::info!("🖥️ 无窗口显示关闭: 共显示 {} 帧", self.presented);
        }
        self.closed = true;
    }
}
