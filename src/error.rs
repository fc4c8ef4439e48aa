// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 流水线错误类型
/// Pipeline error taxonomy. Every variant is fatal to the stage that raises it.
use crate::pipeline::Stage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// 视频源无法打开
    #[error("cannot open video source `{location}`: {reason}")]
    SourceOpen { location: String, reason: String },

    /// 读帧失败 (非正常结束)
    #[error("failed to read frame #{frame}: {reason}")]
    Decode { frame: u64, reason: String },

    /// 图像基元运算失败
    #[error("image primitive `{op}` failed: {reason}")]
    ImagePrimitive { op: &'static str, reason: String },

    /// 显示窗口错误
    #[error("display error: {0}")]
    Display(String),

    /// 工作线程无法启动
    #[error("failed to spawn {stage} thread: {reason}")]
    Spawn { stage: Stage, reason: String },

    #[error("{0} stage panicked")]
    Panicked(Stage),
}

impl PipelineError {
    pub fn source_open(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceOpen {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(frame: u64, reason: impl ToString) -> Self {
        Self::Decode {
            frame,
            reason: reason.to_string(),
        }
    }

    pub fn primitive(op: &'static str, reason: impl ToString) -> Self {
        Self::ImagePrimitive {
            op,
            reason: reason.to_string(),
        }
    }
}
