// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测线程 (Detector)
//! 职责: 接收DecodedFrame → 帧差运动检测 → 发送RenderData

use std::time::{Duration, Instant};

use super::channel::{CancelToken, Inlet, Interrupted, Message, Outlet};
use super::{Stage, StageExit, StageReport};
use crate::detection::{DecodedFrame, MotionDetector, MotionParams, RenderData};
use crate::error::PipelineError;
use crate::utils::FpsCounter;

pub struct Detector {
    inlet: Inlet<DecodedFrame>,
    outlet: Outlet<RenderData>,
    cancel: CancelToken,
    motion: MotionDetector,
    interval: Duration,

    // 统计
    received: u64,
    emitted: u64,
    fps: FpsCounter,
}

impl Detector {
    pub fn new(
        inlet: Inlet<DecodedFrame>,
        outlet: Outlet<RenderData>,
        cancel: CancelToken,
        params: MotionParams,
        interval: Duration,
    ) -> Self {
        Self {
            inlet,
            outlet,
            cancel,
            motion: MotionDetector::new(params),
            interval,
            received: 0,
            emitted: 0,
            fps: FpsCounter::new(),
        }
    }

    pub fn run(mut self) -> StageReport {
        log::info!("🔍 检测线程启动 ({:?})", self.motion.params());

        let exit = match self.detect_loop() {
            Ok(exit) => exit,
            Err(e) => {
                log::error!("❌ 检测线程失败: {}", e);
                StageExit::Failed(e)
            }
        };

        if !matches!(exit, StageExit::Cancelled) && self.outlet.finish().is_ok() {
            log::debug!("检测线程已转发结束标记");
        }

        log::info!(
            "✅ 检测线程退出: 收到{}帧, 输出{}项",
            self.received,
            self.emitted
        );
        StageReport::new(Stage::Detection, self.emitted, exit)
    }

    fn detect_loop(&mut self) -> Result<StageExit, PipelineError> {
        loop {
            let frame = match self.inlet.recv() {
                Ok(Message::Item(frame)) => frame,
                Ok(Message::EndOfStream) => return Ok(StageExit::Completed),
                Err(Interrupted::Cancelled) => return Ok(StageExit::Cancelled),
                Err(Interrupted::Disconnected) => {
                    log::warn!("⚠️ 采集线程未发送结束标记即退出");
                    return Ok(StageExit::Completed);
                }
            };
            self.received += 1;

            let start = Instant::now();
            let Some(bboxes) = self.motion.process(&frame.image)? else {
                log::debug!("首帧 #{} 仅作为参考帧", frame.frame_id);
                continue;
            };
            let detect_ms = start.elapsed().as_secs_f64() * 1000.0;

            if !bboxes.is_empty() {
                log::debug!(
                    "🎯 [帧{}] 检测到 {} 个运动区域 ({:.1}ms)",
                    frame.frame_id,
                    bboxes.len(),
                    detect_ms
                );
            }

            match self.outlet.send(RenderData { frame, bboxes }) {
                Ok(()) => self.emitted += 1,
                Err(Interrupted::Cancelled) => return Ok(StageExit::Cancelled),
                Err(Interrupted::Disconnected) => {
                    log::warn!("⚠️ 渲染线程已退出, 停止检测");
                    return Ok(StageExit::Completed);
                }
            }

            if let Some(fps) = self.fps.tick() {
                log::info!(
                    "📊 检测统计: 输出{}项 | 实际{:.1}fps | 每帧{:.1}ms",
                    self.emitted,
                    fps,
                    detect_ms
                );
            }

            if self.cancel.sleep(self.interval) {
                return Ok(StageExit::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::channel::hand_off;
    use image::{Rgb, RgbImage};

    fn spawn_detector(
        frames: Vec<RgbImage>,
    ) -> (StageReport, Vec<RenderData>, usize) {
        let cancel = CancelToken::new();
        let (mut in_tx, in_rx) = hand_off(16, &cancel);
        let (out_tx, out_rx) = hand_off(16, &cancel);
        for (i, image) in frames.into_iter().enumerate() {
            in_tx.send(DecodedFrame::new(image, i as u64 + 1)).unwrap();
        }
        in_tx.finish().unwrap();

        let report =
            Detector::new(in_rx, out_tx, cancel, MotionParams::default(), Duration::ZERO).run();

        let mut items = Vec::new();
        let mut sentinels = 0;
        while let Ok(msg) = out_rx.recv() {
            match msg {
                Message::Item(item) => items.push(item),
                Message::EndOfStream => sentinels += 1,
            }
        }
        (report, items, sentinels)
    }

    #[test]
    fn first_frame_produces_no_item() {
        let frames = vec![RgbImage::new(64, 64); 4];
        let (report, items, sentinels) = spawn_detector(frames);
        assert!(matches!(report.exit, StageExit::Completed));
        assert_eq!(items.len(), 3);
        assert_eq!(sentinels, 1);
        let ids: Vec<u64> = items.iter().map(|i| i.frame.frame_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(items.iter().all(|i| i.bboxes.is_empty()));
    }

    #[test]
    fn empty_stream_forwards_sentinel() {
        let (report, items, sentinels) = spawn_detector(Vec::new());
        assert_eq!(report.processed, 0);
        assert!(items.is_empty());
        assert_eq!(sentinels, 1);
    }

    #[test]
    fn colour_frame_is_forwarded_unmodified() {
        let mut moved = RgbImage::new(64, 64);
        for y in 10..40 {
            for x in 10..40 {
                moved.put_pixel(x, y, Rgb([200, 10, 10]));
            }
        }
        let (_, items, _) = spawn_detector(vec![RgbImage::new(64, 64), moved.clone()]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].frame.image, moved);
        assert_eq!(items[0].bboxes.len(), 1);
    }

    #[test]
    fn primitive_failure_is_fatal_but_propagates_sentinel() {
        let frames = vec![RgbImage::new(64, 64), RgbImage::new(32, 32), RgbImage::new(64, 64)];
        let (report, items, sentinels) = spawn_detector(frames);
        assert!(matches!(
            report.exit,
            StageExit::Failed(PipelineError::ImagePrimitive { .. })
        ));
        assert!(items.is_empty());
        assert_eq!(sentinels, 1);
    }
}
