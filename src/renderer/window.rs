// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// macroquad 窗口显示面
/// Must be created and driven from inside the macroquad event loop.
use super::Display;
use crate::config::RenderConfig;
use crate::error::PipelineError;
use image::RgbImage;
use macroquad::prelude::{
    clear_background, draw_texture_ex, get_char_pressed, is_quit_requested, next_frame,
    prevent_quit, screen_height, screen_width, vec2, DrawTextureParams, FilterMode, Texture2D,
    BLACK, WHITE,
};
use macroquad::window::Conf;
use std::time::{Duration, Instant};

/// 窗口配置
pub fn window_conf(config: &RenderConfig) -> Conf {
    Conf {
        window_title: config.window_title.clone(),
        window_width: config.window_size.0 as i32,
        window_height: config.window_size.1 as i32,
        window_resizable: true,
        ..Default::default()
    }
}

pub struct WindowDisplay {
    texture: Option<Texture2D>,
    rgba: Vec<u8>,
    quit_key: char, // 关闭窗口视同按下退出键
    presented: u64,
    closed: bool,
}

impl WindowDisplay {
    pub fn new(config: &RenderConfig) -> Self {
        // 关闭请求交给渲染循环处理
        prevent_quit();
        log::info!("🪟 窗口已创建: {}", config.window_title);
        Self {
            texture: None,
            rgba: Vec::new(),
            quit_key: config.quit_key,
            presented: 0,
            closed: false,
        }
    }

    fn upload(&mut self, frame: &RgbImage) -> Result<(), PipelineError> {
        let (w, h) = frame.dimensions();
        if w > u16::MAX as u32 || h > u16::MAX as u32 {
            return Err(PipelineError::Display(format!(
                "frame {}x{} exceeds texture limits",
                w, h
            )));
        }

        self.rgba.clear();
        self.rgba.reserve(w as usize * h as usize * 4);
        for p in frame.pixels() {
            self.rgba.extend_from_slice(&[p[0], p[1], p[2], 255]);
        }

        // 只在分辨率变化时重建纹理
        let needs_rebuild = match &self.texture {
            Some(tex) => tex.width() != w as f32 || tex.height() != h as f32,
            None => true,
        };
        if needs_rebuild {
            let texture = Texture2D::from_rgba8(w as u16, h as u16, &self.rgba);
            texture.set_filter(FilterMode::Linear);
            self.texture = Some(texture);
        } else if let Some(tex) = &self.texture {
            tex.update_from_bytes(w, h, &self.rgba);
        }
        Ok(())
    }

    /// 按比例缩放并居中
    fn draw(&self) {
        clear_background(BLACK);
        let Some(texture) = &self.texture else {
            return;
        };

        let scale = (screen_width() / texture.width()).min(screen_height() / texture.height());
        let (dw, dh) = (texture.width() * scale, texture.height() * scale);
        draw_texture_ex(
            texture,
            (screen_width() - dw) / 2.0,
            (screen_height() - dh) / 2.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dw, dh)),
                ..Default::default()
            },
        );
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, frame: &RgbImage) -> Result<(), PipelineError> {
        if self.closed {
            return Err(PipelineError::Display("window already closed".into()));
        }
        self.upload(frame)?;
        self.presented += 1;
        Ok(())
    }

    async fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>, PipelineError> {
        let deadline = Instant::now() + timeout;
        loop {
            self.draw();
            next_frame().await;

            if is_quit_requested() {
                log::info!("🪟 窗口关闭请求");
                return Ok(Some(self.quit_key));
            }
            if let Some(key) = get_char_pressed() {
                return Ok(Some(key));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            log::info!("🪟 窗口关闭: 共显示 {} 帧", self.presented);
        }
        self.texture = None;
        self.closed = true;
    }
}
