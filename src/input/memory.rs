// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 内存帧序列
use super::VideoSource;
use crate::error::PipelineError;
use image::RgbImage;
use std::collections::VecDeque;

pub struct MemorySource {
    frames: VecDeque<RgbImage>,
    released: bool,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            released: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl VideoSource for MemorySource {
    fn read_next(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        if self.released {
            return Ok(None);
        }
        Ok(self.frames.pop_front())
    }

    fn release(&mut self) {
        self.released = true;
        self.frames.clear();
    }

    fn name(&self) -> &str {
        "memory"
    }
}
