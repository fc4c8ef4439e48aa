// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 图片序列目录: 按文件名排序, 每个图片文件为一帧
use super::VideoSource;
use crate::error::PipelineError;
use image::{ImageFormat, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub struct ImageSequenceSource {
    name: String,
    pending: VecDeque<PathBuf>,
    read: u64,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        let name = dir.display().to_string();
        let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::source_open(&name, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::source_open(&name, e))?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                files.push(path);
            }
        }
        files.sort();

        log::info!("📂 图片序列: {} ({} 帧)", name, files.len());
        Ok(Self {
            name,
            pending: files.into(),
            read: 0,
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl VideoSource for ImageSequenceSource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        self.read += 1;
        let image = image::open(&path)
            .map_err(|e| PipelineError::decode(self.read, format!("{}: {}", path.display(), e)))?;
        Ok(Some(image.to_rgb8()))
    }

    fn release(&mut self) {
        self.pending.clear();
    }

    fn name(&self) -> &str {
        &self.name
    }
}
