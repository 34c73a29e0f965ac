//! HTML → PDF
//!
//! 每个文档使用一个临时浏览器，与登录会话互不影响

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetEmulatedMediaParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use tracing::debug;

use crate::browser::BrowserSession;
use crate::config::BrowserConfig;

/// A4，单位英寸
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// 10 mm
const MARGIN_IN: f64 = 10.0 / 25.4;

/// 把静态 HTML 转为 PDF 字节
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>>;
}

/// 打印参数：A4、打印背景、四边 10 mm
pub fn print_params() -> PrintToPdfParams {
    PrintToPdfParams::builder()
        .print_background(true)
        .paper_width(A4_WIDTH_IN)
        .paper_height(A4_HEIGHT_IN)
        .margin_top(MARGIN_IN)
        .margin_bottom(MARGIN_IN)
        .margin_left(MARGIN_IN)
        .margin_right(MARGIN_IN)
        .build()
}

/// 基于 Chromium 的栅格化器
pub struct ChromiumRasterizer {
    settings: BrowserConfig,
}

impl ChromiumRasterizer {
    /// 总是启动新的无头实例，不连接调试端口
    pub fn new(settings: &BrowserConfig) -> Self {
        let mut settings = settings.clone();
        settings.debug_port = None;
        settings.headless = true;
        Self { settings }
    }

    async fn print(page: &Page, html: &str) -> Result<Vec<u8>> {
        page.set_content(html).await.context("载入 HTML 失败")?;
        page.execute(SetEmulatedMediaParams::builder().media("print").build())
            .await
            .context("切换打印媒体失败")?;
        page.pdf(print_params()).await.context("打印 PDF 失败")
    }
}

#[async_trait]
impl Rasterizer for ChromiumRasterizer {
    async fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let mut session = BrowserSession::open(&self.settings).await?;

        let result = match session.new_page().await {
            Ok(page) => Self::print(&page, html).await,
            Err(e) => Err(e),
        };

        session.close().await;
        let bytes = result?;
        debug!("PDF 生成完成，{} 字节", bytes.len());
        Ok(bytes)
    }
}
