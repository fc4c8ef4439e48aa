// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 渲染线程 (Renderer, 主线程)
/// 职责: 接收RenderData → 叠加运动框与时间戳 → 显示 → 检查退出键
use super::channel::{CancelToken, Inlet, Interrupted, Message};
use super::{Stage, StageExit, StageReport};
use crate::config::RenderConfig;
use crate::detection::RenderData;
use crate::error::PipelineError;
use crate::renderer::{Display, Overlay};
use crate::utils::FpsCounter;
use std::time::Duration;

pub struct Renderer {
    inlet: Inlet<RenderData>,
    cancel: CancelToken,
    overlay: Overlay,
    key_wait: Duration,
    quit_key: char,
    presented: u64,
    fps: FpsCounter,
}

impl Renderer {
    pub fn new(inlet: Inlet<RenderData>, cancel: CancelToken, config: &RenderConfig) -> Self {
        Self::with_overlay(inlet, cancel, config, Overlay::new(config))
    }

    pub fn with_overlay(
        inlet: Inlet<RenderData>,
        cancel: CancelToken,
        config: &RenderConfig,
        overlay: Overlay,
    ) -> Self {
        Self {
            inlet,
            cancel,
            overlay,
            key_wait: config.key_wait,
            quit_key: config.quit_key,
            presented: 0,
            fps: FpsCounter::new(),
        }
    }

    /// Runs until the sentinel, the quit key, cancellation or a display
    /// failure. Any stop other than the sentinel cancels the upstream stages.
    pub async fn run<D: Display>(mut self, display: &mut D) -> StageReport {
        log::info!("🎨 渲染线程启动");

        let exit = match self.render_loop(display).await {
            Ok(exit) => exit,
            Err(e) => {
                log::error!("❌ 渲染线程失败: {}", e);
                StageExit::Failed(e)
            }
        };
        display.close();

        if !matches!(exit, StageExit::Completed) {
            self.cancel.cancel();
        }

        log::info!("✅ 渲染线程退出: 共显示 {} 帧", self.presented);
        StageReport::new(Stage::Render, self.presented, exit)
    }

    async fn render_loop<D: Display>(
        &mut self,
        display: &mut D,
    ) -> Result<StageExit, PipelineError> {
        loop {
            let RenderData { mut frame, bboxes } = match self.inlet.recv() {
                Ok(Message::Item(item)) => item,
                Ok(Message::EndOfStream) => {
                    log::info!("📭 收到结束标记, 渲染结束");
                    return Ok(StageExit::Completed);
                }
                Err(Interrupted::Cancelled) => return Ok(StageExit::Cancelled),
                Err(Interrupted::Disconnected) => {
                    log::warn!("⚠️ 检测线程未发送结束标记即退出");
                    return Ok(StageExit::Completed);
                }
            };

            self.overlay.annotate(&mut frame.image, &bboxes, &crate::timestamp());
            display.show(&frame.image)?;
            self.presented += 1;
            log::debug!("🖼️ [帧{}] 显示, 运动区域 {} 个", frame.frame_id, bboxes.len());

            if let Some(fps) = self.fps.tick() {
                log::info!("🎨 渲染统计: 已显示{}帧 | 实际{:.1}fps", self.presented, fps);
            }

            if display.poll_key(self.key_wait).await? == Some(self.quit_key) {
                log::info!("🛑 收到退出键 '{}'", self.quit_key);
                return Ok(StageExit::Quit);
            }
        }
    }
}
