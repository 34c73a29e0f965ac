use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config;
use crate::error::BrowserError;

/// 本进程内已启动的浏览器数量，用于区分用户数据目录
static LAUNCHES: AtomicUsize = AtomicUsize::new(0);

/// 每次启动独立的用户数据目录，导出会话和栅格化会话可以同时存在
fn user_data_dir() -> PathBuf {
    let n = LAUNCHES.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("qcm_export-{}-{}", std::process::id(), n))
}

/// 启动无头浏览器
///
/// 返回浏览器和事件处理任务。调用方负责关闭浏览器并中止该任务。
pub async fn launch_headless_browser(
    settings: &config::BrowserConfig,
) -> Result<(Browser, JoinHandle<()>)> {
    info!("🚀 启动浏览器 (无头: {})...", settings.headless);

    let viewport = Viewport {
        width: settings.viewport_width,
        height: settings.viewport_height,
        ..Default::default()
    };

    let mut builder = BrowserConfig::builder()
        .viewport(viewport)
        .user_data_dir(user_data_dir())
        .args(vec![
            "--disable-gpu",           // 无头模式下禁用 GPU
            "--no-sandbox",            // 容器内没有沙盒权限
            "--disable-dev-shm-usage", // 防止共享内存不足
        ]);
    if !settings.headless {
        builder = builder.with_head();
    }
    if let Some(path) = settings.chrome_executable.as_deref() {
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        BrowserError::LaunchFailed(e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    Ok((browser, handle))
}
