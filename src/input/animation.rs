// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// GIF 动画逐帧解码
use super::VideoSource;
use crate::error::PipelineError;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frames, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct AnimationSource {
    name: String,
    frames: Option<Frames<'static>>,
    read: u64,
}

impl AnimationSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| PipelineError::source_open(&name, e))?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| PipelineError::source_open(&name, e))?;

        log::info!("🎞️ GIF 动画: {}", name);
        Ok(Self {
            name,
            frames: Some(decoder.into_frames()),
            read: 0,
        })
    }
}

impl VideoSource for AnimationSource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        let Some(frames) = self.frames.as_mut() else {
            return Ok(None);
        };
        match frames.next() {
            None => Ok(None),
            Some(Ok(frame)) => {
                self.read += 1;
                Ok(Some(DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8()))
            }
            Some(Err(e)) => Err(PipelineError::decode(self.read + 1, e)),
        }
    }

    fn release(&mut self) {
        self.frames = None;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};

    #[test]
    fn decodes_every_frame_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GifEncoder::new(file);
            let frames = [0u8, 255, 0].map(|v| {
                Frame::from_parts(
                    RgbaImage::from_pixel(8, 8, Rgba([v, v, v, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(40, 1),
                )
            });
            encoder.encode_frames(frames).unwrap();
        }

        let mut source = AnimationSource::open(&path).unwrap();
        let mut shades = Vec::new();
        while let Some(frame) = source.read_next().unwrap() {
            assert_eq!(frame.dimensions(), (8, 8));
            shades.push(frame.get_pixel(4, 4)[0]);
        }
        // 调色板量化可能带来微小偏差
        assert_eq!(shades.len(), 3);
        assert!(shades[0] < 16 && shades[1] > 239 && shades[2] < 16);

        source.release();
        assert!(source.read_next().unwrap().is_none());
    }

    #[test]
    fn non_gif_bytes_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"not a gif").unwrap();
        assert!(matches!(
            AnimationSource::open(&path),
            Err(PipelineError::SourceOpen { .. })
        ));
    }
}
