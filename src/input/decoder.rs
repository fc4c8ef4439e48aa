// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// FFmpeg 视频解码器
/// FFmpeg-backed video source (files, devices, network streams)
use super::decode_filter::{DecodeFilter, DecodedResult};
use super::VideoSource;
use crate::error::PipelineError;
use crate::pipeline::channel::CancelToken;
use crossbeam_channel::{bounded, select_biased, Receiver};
use ez_ffmpeg::core::context::null_output::create_null_output;
use ez_ffmpeg::filter::frame_pipeline_builder::FramePipelineBuilder;
use ez_ffmpeg::{AVMediaType, FfmpegContext};
use image::RgbImage;
use std::time::Duration;

/// 释放后等待 FFmpeg 调度器退出的上限
const SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

pub struct FfmpegSource {
    location: String,
    frames: Option<Receiver<DecodedResult>>,
    finished: Option<Receiver<Result<(), String>>>,
    cancel: CancelToken,
    read: u64,
}

impl FfmpegSource {
    pub fn open(location: &str, cancel: &CancelToken) -> Result<Self, PipelineError> {
        // 容量1: FFmpeg 最多领先采集线程一帧
        let (tx, rx) = bounded::<DecodedResult>(1);
        let filter = DecodeFilter::new(tx);

        let pipe: FramePipelineBuilder = AVMediaType::AVMEDIA_TYPE_VIDEO.into();
        let pipe = pipe.filter("decode", Box::new(filter));
        let out = create_null_output().add_frame_pipeline(pipe);

        let ctx = FfmpegContext::builder()
            .input(location)
            .filter_desc("format=rgb24")
            .output(out)
            .build()
            .map_err(|e| PipelineError::source_open(location, format!("构建失败: {}", e)))?;

        let sch = ctx
            .start()
            .map_err(|e| PipelineError::source_open(location, format!("启动失败: {}", e)))?;

        let (done_tx, done_rx) = bounded(1);
        std::thread::Builder::new()
            .name("ffmpeg-wait".into())
            .spawn(move || {
                let result = sch.wait().map_err(|e| e.to_string());
                let _ = done_tx.send(result);
            })
            .map_err(|e| PipelineError::source_open(location, e))?;

        log::info!("✅ FFmpeg 解码启动: {}", location);
        Ok(Self {
            location: location.to_string(),
            frames: Some(rx),
            finished: Some(done_rx),
            cancel: cancel.clone(),
            read: 0,
        })
    }

    /// Drops the frame receiver and waits up to `timeout` for the scheduler.
    /// Returns `true` once FFmpeg has stopped.
    fn shutdown(&mut self, timeout: Duration) -> bool {
        // 过滤器下一次发送失败后 FFmpeg 停止
        self.frames = None;
        let Some(finished) = self.finished.take() else {
            return true;
        };
        match finished.recv_timeout(timeout) {
            Ok(result) => {
                if let Err(reason) = result {
                    log::debug!("FFmpeg 调度器退出: {}", reason);
                }
                true
            }
            Err(_) => {
                log::warn!("⚠️ FFmpeg 未在 {:?} 内停止: {}", timeout, self.location);
                false
            }
        }
    }
}

impl VideoSource for FfmpegSource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        let Some(frames) = self.frames.as_ref() else {
            return Ok(None);
        };
        let received = select_biased! {
            recv(self.cancel.signal()) -> _ => {
                log::debug!("FFmpeg 读取被取消: {}", self.location);
                return Ok(None);
            }
            recv(frames) -> msg => msg,
        };
        match received {
            Ok(Ok(image)) => {
                self.read += 1;
                Ok(Some(image))
            }
            Ok(Err(reason)) => Err(PipelineError::decode(self.read + 1, reason)),
            Err(_) => {
                // 过滤器已退出: 区分正常结束与解码失败
                self.frames = None;
                match self.finished.take().map(|rx| rx.recv()) {
                    Some(Ok(Err(reason))) => Err(PipelineError::decode(self.read + 1, reason)),
                    _ => Ok(None),
                }
            }
        }
    }

    fn release(&mut self) {
        self.shutdown(SHUTDOWN_WAIT);
    }

    fn name(&self) -> &str {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    fn write_clip(dir: &Path, shades: &[u8]) -> PathBuf {
        let path = dir.join("clip.gif");
        let file = File::create(&path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames = shades.iter().map(|&v| {
            Frame::from_parts(
                RgbaImage::from_pixel(16, 16, Rgba([v, v, v, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
        path
    }

    fn open(path: &Path, cancel: &CancelToken) -> FfmpegSource {
        FfmpegSource::open(path.to_str().unwrap(), cancel).unwrap()
    }

    #[test]
    fn clip_yields_every_frame_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(dir.path(), &[0, 255, 0]);
        let mut source = open(&clip, &CancelToken::new());

        let mut shades = Vec::new();
        while let Some(frame) = source.read_next().unwrap() {
            assert_eq!(frame.dimensions(), (16, 16));
            shades.push(frame.get_pixel(8, 8)[0]);
        }
        assert_eq!(shades.len(), 3);
        assert!(shades[0] < 16 && shades[1] > 239 && shades[2] < 16);
        assert!(source.read_next().unwrap().is_none());
        source.release();
    }

    #[test]
    fn missing_or_garbage_input_fails_to_open() {
        let cancel = CancelToken::new();
        assert!(matches!(
            FfmpegSource::open("/definitely/not/here.mp4", &cancel),
            Err(PipelineError::SourceOpen { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.mp4");
        std::fs::write(&garbage, [0x5a_u8; 4096]).unwrap();
        assert!(matches!(
            FfmpegSource::open(garbage.to_str().unwrap(), &cancel),
            Err(PipelineError::SourceOpen { .. })
        ));
    }

    #[test]
    fn release_mid_stream_stops_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(dir.path(), &[40; 30]);
        let mut source = open(&clip, &CancelToken::new());
        assert!(source.read_next().unwrap().is_some());

        let started = Instant::now();
        assert!(source.shutdown(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(source.read_next().unwrap().is_none());
    }

    #[test]
    fn cancelled_read_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(dir.path(), &[40; 30]);
        let cancel = CancelToken::new();
        let mut source = open(&clip, &cancel);

        cancel.cancel();
        for _ in 0..8 {
            assert!(source.read_next().unwrap().is_none());
        }
        assert_eq!(source.read, 0);
        source.release();
    }
}
