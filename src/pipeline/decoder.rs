// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 采集线程 (Ingest)
/// 职责: 打开视频源 → 逐帧读取 → 发送DecodedFrame → 结束标记
use super::channel::{CancelToken, Interrupted, Outlet};
use super::{Stage, StageExit, StageReport};
use crate::detection::DecodedFrame;
use crate::error::PipelineError;
use crate::input::{SourceOpener, VideoSource};
use crate::utils::FpsCounter;
use std::time::Duration;

pub struct Decoder {
    opener: Option<SourceOpener>,
    outlet: Outlet<DecodedFrame>,
    cancel: CancelToken,
    interval: Duration, // 每帧之间的固定节流间隔
    sent: u64,
    fps: FpsCounter,
}

impl Decoder {
    pub fn new(
        opener: SourceOpener,
        outlet: Outlet<DecodedFrame>,
        cancel: CancelToken,
        interval: Duration,
    ) -> Self {
        Self {
            opener: Some(opener),
            outlet,
            cancel,
            interval,
            sent: 0,
            fps: FpsCounter::new(),
        }
    }

    pub fn run(mut self) -> StageReport {
        log::info!("🎬 采集线程启动");

        let exit = match self.stream() {
            Ok(exit) => exit,
            Err(e) => {
                log::error!("❌ 采集线程失败: {}", e);
                StageExit::Failed(e)
            }
        };

        // 任何退出路径都发送结束标记 (取消时除外)
        if !matches!(exit, StageExit::Cancelled) && self.outlet.finish().is_ok() {
            log::debug!("采集线程已发送结束标记");
        }

        log::info!("✅ 采集线程退出: 共发送 {} 帧", self.sent);
        StageReport::new(Stage::Ingest, self.sent, exit)
    }

    fn stream(&mut self) -> Result<StageExit, PipelineError> {
        let opener = match self.opener.take() {
            Some(opener) => opener,
            None => return Ok(StageExit::Completed),
        };
        let mut source = opener(&self.cancel)?;
        log::info!("📹 视频源已打开: {}", source.name());

        let result = self.pump(source.as_mut());
        source.release();
        result
    }

    fn pump(&mut self, source: &mut dyn VideoSource) -> Result<StageExit, PipelineError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(StageExit::Cancelled);
            }

            let image = match source.read_next()? {
                Some(image) => image,
                // 阻塞读取被取消唤醒
                None if self.cancel.is_cancelled() => return Ok(StageExit::Cancelled),
                None => {
                    log::info!("📭 视频源结束");
                    return Ok(StageExit::Completed);
                }
            };

            let frame = DecodedFrame::new(image, self.sent + 1);
            match self.outlet.send(frame) {
                Ok(()) => self.sent += 1,
                Err(Interrupted::Cancelled) => return Ok(StageExit::Cancelled),
                Err(Interrupted::Disconnected) => {
                    log::warn!("⚠️ 检测线程已退出, 停止采集");
                    return Ok(StageExit::Completed);
                }
            }

            if let Some(fps) = self.fps.tick() {
                log::info!("📺 采集统计: 已发送{}帧 | 实际{:.1}fps", self.sent, fps);
            }

            if self.cancel.sleep(self.interval) {
                return Ok(StageExit::Cancelled);
            }
        }
    }
}
