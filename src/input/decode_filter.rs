// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// FFmpeg解码过滤器模块
/// FFmpeg decode filter: rgb24 frames → RgbImage, handed to the ingest thread
use crossbeam_channel::Sender;
use ez_ffmpeg::filter::frame_filter::FrameFilter;
use ez_ffmpeg::filter::frame_filter_context::FrameFilterContext;
use ez_ffmpeg::{AVMediaType, Frame};
use image::RgbImage;

/// 解码结果: 一帧图像或不可恢复的解码错误
pub type DecodedResult = Result<RgbImage, String>;

pub struct DecodeFilter {
    tx: Sender<DecodedResult>,
    pub total_frames: u64,
}

impl DecodeFilter {
    pub fn new(tx: Sender<DecodedResult>) -> Self {
        Self { tx, total_frames: 0 }
    }

    /// 复制 rgb24 平面 (考虑行跨度)
    unsafe fn copy_rgb24(frame: &Frame) -> Result<RgbImage, String> {
        let raw = frame.as_ptr();
        let w = (*raw).width as u32;
        let h = (*raw).height as u32;
        if w == 0 || h == 0 {
            return Err(format!("invalid frame size {}x{}", w, h));
        }

        let data = (*raw).data[0];
        let stride = (*raw).linesize[0] as usize;
        if data.is_null() || stride < w as usize * 3 {
            return Err("frame is not packed rgb24".to_string());
        }

        let row_bytes = w as usize * 3;
        let mut buf = Vec::with_capacity(row_bytes * h as usize);
        for y in 0..h as usize {
            let row = std::slice::from_raw_parts(data.add(y * stride), row_bytes);
            buf.extend_from_slice(row);
        }
        RgbImage::from_raw(w, h, buf).ok_or_else(|| "rgb24 buffer size mismatch".to_string())
    }
}

impl FrameFilter for DecodeFilter {
    fn media_type(&self) -> AVMediaType {
        AVMediaType::AVMEDIA_TYPE_VIDEO
    }

    fn init(&mut self, _ctx: &FrameFilterContext) -> Result<(), String> {
        log::debug!("✅ FFmpeg 解码过滤器启动");
        Ok(())
    }

    fn filter_frame(
        &mut self,
        frame: Frame,
        _ctx: &FrameFilterContext,
    ) -> Result<Option<Frame>, String> {
        if frame.as_ptr().is_null() || frame.is_empty() {
            return Ok(Some(frame));
        }
        self.total_frames += 1;

        let decoded = if frame.is_corrupt() {
            Err(format!("frame #{} is corrupt", self.total_frames))
        } else {
            unsafe { Self::copy_rgb24(&frame) }
        };
        let failed = decoded.is_err();

        // 阻塞发送: 采集线程读得慢时 FFmpeg 也随之放慢
        if self.tx.send(decoded).is_err() {
            return Err("video source released".to_string());
        }
        if failed {
            return Err("decode failed".to_string());
        }
        Ok(Some(frame))
    }

    fn uninit(&mut self, _ctx: &FrameFilterContext) {
        log::debug!("FFmpeg 解码过滤器退出 ({} 帧)", self.total_frames);
    }
}
