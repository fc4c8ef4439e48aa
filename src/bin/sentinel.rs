// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 运动哨兵 (Motion Sentinel)
///
/// 帧差法运动检测
///
/// 系统架构:
/// 1. 采集线程: 视频解码 (独立工作线程)
/// 2. 检测线程: 帧差运动检测 (独立工作线程)
/// 3. 主线程:   叠加与显示 (macroquad事件循环, 或无窗口模式)
use anyhow::Context;
use clap::Parser;
use motion_sentinel::config::{Args, PipelineConfig, RenderConfig};
use motion_sentinel::{input, Pipeline};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = PipelineConfig {
        render: RenderConfig::default().with_env_font(),
        ..PipelineConfig::default()
    };

    log::info!("🚀 运动哨兵启动");
    log::info!("📹 视频源: {}", args.video);

    let pipeline = Pipeline::spawn(input::opener(args.video.clone()), &config)
        .context("failed to start pipeline")?;

    let cancel = pipeline.cancel_token();
    ctrlc::set_handler(move || {
        log::warn!("🛑 收到 Ctrl-C, 停止流水线");
        cancel.cancel();
    })
    .context("failed to install Ctrl-C handler")?;

    log::info!("✅ 系统就绪, 开始检测...");
    present(pipeline, config)
}

/// 主线程: macroquad 窗口
#[cfg(feature = "window")]
fn present(pipeline: Pipeline, config: PipelineConfig) -> anyhow::Result<()> {
    use motion_sentinel::renderer::window::{window_conf, WindowDisplay};

    macroquad::Window::from_config(window_conf(&config.render), async move {
        let mut display = WindowDisplay::new(&config.render);
        let report = pipeline.render(&mut display).await;
        std::process::exit(report.exit_code());
    });
    Ok(())
}

/// 主线程: 无窗口
#[cfg(all(not(feature = "window"), feature = "headless"))]
fn present(pipeline: Pipeline, _config: PipelineConfig) -> anyhow::Result<()> {
    use motion_sentinel::HeadlessDisplay;

    let mut display = HeadlessDisplay::new();
    let report = pollster::block_on(pipeline.render(&mut display));
    std::process::exit(report.exit_code());
}

#[cfg(not(any(feature = "window", feature = "headless")))]
fn present(pipeline: Pipeline, _config: PipelineConfig) -> anyhow::Result<()> {
    pipeline.cancel_token().cancel();
    anyhow::bail!("no display compiled in: enable the `window` or `headless` feature")
}
