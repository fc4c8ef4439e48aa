// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 运行参数 (Configuration)
///
/// 命令行只有视频源一项, 其余可调参数集中在 `PipelineConfig`
use crate::detection::MotionParams;
use crate::input::DEFAULT_VIDEO;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// 运动哨兵参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "运动哨兵 - 帧差法运动检测", long_about = None)]
pub struct Args {
    /// 视频文件 / GIF / 图片序列目录
    #[arg(short, long, env = "MOTION_VIDEO", default_value = DEFAULT_VIDEO)]
    pub video: String,
}

/// 线程间通道容量
pub const CHANNEL_CAPACITY: usize = 30;
/// 采集线程每帧间隔
pub const INGEST_INTERVAL: Duration = Duration::from_millis(30);
/// 检测线程每帧间隔
pub const DETECT_INTERVAL: Duration = Duration::from_millis(10);
/// 渲染线程等待按键时间
pub const KEY_WAIT: Duration = Duration::from_millis(1);

pub const WINDOW_TITLE: &str = "Video with Detections";
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

/// 字体路径环境变量
pub const FONT_ENV: &str = "MOTION_FONT";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub channel_capacity: usize,
    pub ingest_interval: Duration,
    pub detect_interval: Duration,
    pub motion: MotionParams,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: CHANNEL_CAPACITY,
            ingest_interval: INGEST_INTERVAL,
            detect_interval: DETECT_INTERVAL,
            motion: MotionParams::default(),
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// No pacing delays. Used by tests and offline runs.
    pub fn unpaced() -> Self {
        Self {
            ingest_interval: Duration::ZERO,
            detect_interval: Duration::ZERO,
            render: RenderConfig {
                key_wait: Duration::ZERO,
                ..RenderConfig::default()
            },
            ..Self::default()
        }
    }
}

/// 渲染参数
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub box_color: [u8; 3],
    pub box_thickness: u32,
    /// 文字基线左端
    pub text_origin: (i32, i32),
    /// 字高 (像素)
    pub text_scale: f32,
    pub text_color: [u8; 3],
    pub text_thickness: u32,
    pub key_wait: Duration,
    pub quit_key: char,
    pub window_title: String,
    pub window_size: (u32, u32),
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            box_color: [0, 255, 0],
            box_thickness: 2,
            text_origin: (10, 30),
            text_scale: 28.0,
            text_color: [255, 255, 255],
            text_thickness: 2,
            key_wait: KEY_WAIT,
            quit_key: 'q',
            window_title: WINDOW_TITLE.to_string(),
            window_size: (WINDOW_WIDTH, WINDOW_HEIGHT),
            font_path: None,
        }
    }
}

impl RenderConfig {
    /// Picks up the overlay font from `MOTION_FONT` when set.
    pub fn with_env_font(mut self) -> Self {
        if let Some(path) = std::env::var_os(FONT_ENV).filter(|p| !p.is_empty()) {
            self.font_path = Some(PathBuf::from(path));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_defaults_and_overrides() {
        let args = Args::try_parse_from(["sentinel"]).unwrap();
        if std::env::var_os("MOTION_VIDEO").is_none() {
            assert_eq!(args.video, DEFAULT_VIDEO);
        }

        let args = Args::try_parse_from(["sentinel", "-v", "clip.gif"]).unwrap();
        assert_eq!(args.video, "clip.gif");
        let args = Args::try_parse_from(["sentinel", "--video", "frames/"]).unwrap();
        assert_eq!(args.video, "frames/");
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["sentinel", "--model", "m"]).is_err());
    }

    #[test]
    fn defaults_match_pipeline_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.channel_capacity, 30);
        assert_eq!(config.ingest_interval, Duration::from_millis(30));
        assert_eq!(config.detect_interval, Duration::from_millis(10));
        assert_eq!(config.render.quit_key, 'q');
        assert_eq!(config.render.text_origin, (10, 30));

        let fast = PipelineConfig::unpaced();
        assert!(fast.ingest_interval.is_zero() && fast.render.key_wait.is_zero());
        assert_eq!(fast.channel_capacity, 30);
    }
}
