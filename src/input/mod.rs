// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 视频输入系统 (Video Input System)
///
/// 在采集线程内打开并逐帧读取视频源
/// - Memory:    内存帧序列 (测试/嵌入)
/// - Sequence:  图片序列目录
/// - Animation: GIF 动画
/// - Decoder:   FFmpeg 容器解码 (feature: ffmpeg)
pub mod animation;
#[cfg(feature = "ffmpeg")]
pub mod decode_filter;
#[cfg(feature = "ffmpeg")]
pub mod decoder;
pub mod memory;
pub mod sequence;

pub use animation::AnimationSource;
#[cfg(feature = "ffmpeg")]
pub use decoder::FfmpegSource;
pub use memory::MemorySource;
pub use sequence::ImageSequenceSource;

use crate::error::PipelineError;
use crate::pipeline::channel::CancelToken;
use image::RgbImage;
use std::path::Path;

/// 默认视频源
pub const DEFAULT_VIDEO: &str = "People_Video.mp4";

/// 视频源接口
///
/// `read_next` yields `Ok(None)` once the stream is exhausted. Errors are
/// mid-stream failures and end ingestion.
pub trait VideoSource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError>;

    /// Releases the underlying handle. Called once before ingest exits.
    fn release(&mut self) {}

    fn name(&self) -> &str;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        (**self).read_next()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Opens the source on the ingest thread.
///
/// Sources that block on an external producer keep the token and return
/// `Ok(None)` from `read_next` once it is cancelled.
pub type SourceOpener =
    Box<dyn FnOnce(&CancelToken) -> Result<Box<dyn VideoSource>, PipelineError> + Send>;

/// 根据路径选择解码方式
pub fn open_source(
    location: &str,
    cancel: &CancelToken,
) -> Result<Box<dyn VideoSource>, PipelineError> {
    let path = Path::new(location);
    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path)?));
    }

    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);
    if is_gif {
        return Ok(Box::new(AnimationSource::open(path)?));
    }

    #[cfg(feature = "ffmpeg")]
    {
        Ok(Box::new(FfmpegSource::open(location, cancel)?))
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        let _ = cancel;
        if !path.exists() {
            return Err(PipelineError::source_open(location, "no such file or directory"));
        }
        Err(PipelineError::source_open(
            location,
            "container decoding requires the `ffmpeg` feature",
        ))
    }
}

/// Hands an already constructed source to the ingest thread.
pub fn ready<S: VideoSource + Send + 'static>(source: S) -> SourceOpener {
    Box::new(move |_: &CancelToken| Ok(Box::new(source) as Box<dyn VideoSource>))
}

/// Boxes [`open_source`] for the given location.
pub fn opener(location: impl Into<String>) -> SourceOpener {
    let location = location.into();
    Box::new(move |cancel: &CancelToken| open_source(&location, cancel))
}
