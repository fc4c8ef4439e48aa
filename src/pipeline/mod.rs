// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 视频处理流水线 (Video Processing Pipeline)
///
/// 三线程架构, 通过有界通道通信:
/// - Decoder:  视频采集 (独立线程)
/// - Detector: 运动检测 (独立线程)
/// - Renderer: 渲染显示 (主线程)
pub mod channel;
pub mod decoder;
pub mod detector;
pub mod renderer;

use crate::config::PipelineConfig;
use crate::detection::RenderData;
use crate::error::PipelineError;
use crate::input::SourceOpener;
use crate::renderer::Display;
use channel::{hand_off, CancelToken, Inlet};
use decoder::Decoder;
use detector::Detector;
use renderer::Renderer;
use std::fmt;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Detection,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Ingest => "ingest",
            Stage::Detection => "detection",
            Stage::Render => "render",
        })
    }
}

/// 线程退出原因
#[derive(Debug)]
pub enum StageExit {
    /// 正常结束 (结束标记)
    Completed,
    /// 用户按下退出键或关闭窗口
    Quit,
    /// 取消令牌触发
    Cancelled,
    Failed(PipelineError),
}

impl StageExit {
    pub fn is_failure(&self) -> bool {
        matches!(self, StageExit::Failed(_))
    }
}

#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    /// 已输出的数据项数
    pub processed: u64,
    pub exit: StageExit,
}

impl StageReport {
    pub fn new(stage: Stage, processed: u64, exit: StageExit) -> Self {
        Self {
            stage,
            processed,
            exit,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.exit {
            StageExit::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub ingest: StageReport,
    pub detection: StageReport,
    pub render: StageReport,
}

impl PipelineReport {
    pub fn stages(&self) -> [&StageReport; 3] {
        [&self.ingest, &self.detection, &self.render]
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageReport> {
        self.stages().into_iter().filter(|r| r.exit.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// 0 on success, 1 when any stage failed.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn log_summary(&self) {
        for report in self.stages() {
            match report.error() {
                Some(e) => log::error!("❌ {} 线程失败: {}", report.stage, e),
                None => log::info!(
                    "📊 {} 线程: {} 项, 退出 {:?}",
                    report.stage,
                    report.processed,
                    report.exit
                ),
            }
        }
    }
}

/// 已启动的流水线: 采集与检测线程在后台运行, 渲染由调用方驱动
pub struct Pipeline {
    cancel: CancelToken,
    ingest: JoinHandle<StageReport>,
    detection: JoinHandle<StageReport>,
    renderer: Renderer,
}

impl Pipeline {
    pub fn spawn(opener: SourceOpener, config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::spawn_with(opener, config, |inlet, cancel| {
            Renderer::new(inlet, cancel, &config.render)
        })
    }

    /// Like [`Pipeline::spawn`] with a caller-built render stage.
    pub fn spawn_with(
        opener: SourceOpener,
        config: &PipelineConfig,
        make_renderer: impl FnOnce(Inlet<RenderData>, CancelToken) -> Renderer,
    ) -> Result<Self, PipelineError> {
        let cancel = CancelToken::new();
        let (frame_tx, frame_rx) = hand_off(config.channel_capacity, &cancel);
        let (render_tx, render_rx) = hand_off(config.channel_capacity, &cancel);

        // ========== 启动采集线程 ==========
        let decoder = Decoder::new(opener, frame_tx, cancel.clone(), config.ingest_interval);
        let ingest = thread::Builder::new()
            .name("ingest".into())
            .spawn(move || decoder.run())
            .map_err(|e| PipelineError::Spawn {
                stage: Stage::Ingest,
                reason: e.to_string(),
            })?;

        // ========== 启动检测线程 ==========
        let detector = Detector::new(
            frame_rx,
            render_tx,
            cancel.clone(),
            config.motion.clone(),
            config.detect_interval,
        );
        let detection = match thread::Builder::new()
            .name("detection".into())
            .spawn(move || detector.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                cancel.cancel();
                let _ = ingest.join();
                return Err(PipelineError::Spawn {
                    stage: Stage::Detection,
                    reason: e.to_string(),
                });
            }
        };

        let renderer = make_renderer(render_rx, cancel.clone());
        log::info!("✅ 流水线已启动, 通道容量 {}", config.channel_capacity);

        Ok(Self {
            cancel,
            ingest,
            detection,
            renderer,
        })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drives the render stage on the calling thread, then joins the workers.
    pub async fn render<D: Display>(self, display: &mut D) -> PipelineReport {
        let Pipeline {
            cancel,
            ingest,
            detection,
            renderer,
        } = self;

        let render = renderer.run(display).await;
        // 渲染结束后不再有消费者
        cancel.cancel();

        let ingest = join(ingest, Stage::Ingest);
        let detection = join(detection, Stage::Detection);
        let report = PipelineReport {
            ingest,
            detection,
            render,
        };
        report.log_summary();
        report
    }
}

fn join(handle: JoinHandle<StageReport>, stage: Stage) -> StageReport {
    handle.join().unwrap_or_else(|_| {
        StageReport::new(stage, 0, StageExit::Failed(PipelineError::Panicked(stage)))
    })
}
