//! 浏览器会话
//!
//! 一次导出期间独占的浏览器资源。无论成功与否，结束时都要释放。

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{connect_to_browser, launch_headless_browser};
use crate::config::BrowserConfig;

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 自己启动的浏览器才关闭进程；连接的外部浏览器只关闭自己开的页面
    owned: bool,
    pages: Vec<Page>,
}

impl BrowserSession {
    /// 按配置启动无头浏览器或连接已有浏览器
    pub async fn open(settings: &BrowserConfig) -> Result<Self> {
        let (browser, handler, owned) = match settings.debug_port {
            Some(port) => {
                let (browser, handler) = connect_to_browser(port).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = launch_headless_browser(settings).await?;
                (browser, handler, true)
            }
        };
        Ok(Self {
            browser,
            handler,
            owned,
            pages: Vec::new(),
        })
    }

    /// 新建空白页面
    pub async fn new_page(&mut self) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("创建页面失败")?;
        self.pages.push(page.clone());
        Ok(page)
    }

    /// 关闭会话
    pub async fn close(mut self) {
        for page in self.pages.drain(..) {
            if let Err(e) = page.close().await {
                debug!("关闭页面失败: {}", e);
            }
        }
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        debug!("浏览器会话已释放");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // 未调用 close() 的路径：Browser 自身的 Drop 会结束子进程
        self.handler.abort();
    }
}
