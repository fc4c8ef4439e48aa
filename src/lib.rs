// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 运行参数
pub mod detection; // 运动检测系统
pub mod error; // 错误类型
pub mod input; // 视频输入系统
pub mod pipeline; // 三线程流水线
pub mod renderer; // 画面叠加与显示
pub mod utils; // 工具模块

pub use crate::config::{Args, PipelineConfig, RenderConfig};
pub use crate::detection::{BBox, DecodedFrame, MotionDetector, MotionParams, RenderData};
pub use crate::error::PipelineError;
pub use crate::input::{open_source, SourceOpener, VideoSource};
pub use crate::pipeline::{Pipeline, PipelineReport, Stage, StageExit, StageReport};
pub use crate::renderer::{Display, HeadlessDisplay};

/// 叠加到画面上的本地时间
pub fn timestamp() -> String {
    gen_time_string(chrono::Local::now())
}

pub fn gen_time_string<Tz: chrono::TimeZone>(t: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}
