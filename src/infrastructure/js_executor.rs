//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，实现 `PageHandle` 的全部原语

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::scripts::{build_click_js, build_fill_js, READY_STATE_JS, SCROLL_BOTTOM_JS};
use super::{ClickTarget, PageHandle};
use crate::utils::{poll_until, PollPolicy};

/// 等待 readyState 的最大检查次数
const READY_POLLS: u32 = 40;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 evaluate() 能力
/// - 不认识 Question / Quiz
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
    interval: Duration,
    settle: Duration,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    ///
    /// # 参数
    /// - `page`: 浏览器页面
    /// - `interval`: 等待加载时的轮询间隔
    /// - `settle`: 加载完成后的额外等待
    pub fn new(page: Page, interval: Duration, settle: Duration) -> Self {
        Self {
            page,
            interval,
            settle,
        }
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl AsRef<str>) -> Result<T> {
        let json_value = self.evaluate(js_code.as_ref()).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    async fn is_ready(&self) -> bool {
        matches!(
            self.eval_as::<String>(READY_STATE_JS).await.as_deref(),
            Ok("complete")
        )
    }
}

#[async_trait]
impl PageHandle for JsExecutor {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn evaluate(&self, js: &str) -> Result<JsonValue> {
        let result = self.page.evaluate(js.to_string()).await?;
        Ok(result.into_value()?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn content(&self) -> Result<String> {
        let html = self.page.content().await.context("读取页面 DOM 失败")?;
        Ok(html)
    }

    async fn wait_until_idle(&self) -> Result<()> {
        // 单页应用的跳转不一定触发导航事件，这里只等 readyState
        let ready = poll_until(PollPolicy::attempts(self.interval, READY_POLLS), || {
            self.is_ready()
        })
        .await;
        if !ready {
            debug!("页面未在预期时间内进入 complete 状态，继续执行");
        }
        sleep(self.settle).await;
        Ok(())
    }

    async fn click(&self, target: &ClickTarget) -> Result<()> {
        let clicked: bool = self.eval_as(build_click_js(target)?).await?;
        if !clicked {
            bail!("未找到可点击元素: {}", target);
        }
        debug!("已点击: {}", target);
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let filled: bool = self.eval_as(build_fill_js(selector, value)?).await?;
        if !filled {
            bail!("未找到输入框: {}", selector);
        }
        Ok(())
    }

    async fn press_key(&self, selector: Option<&str>, key: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector.unwrap_or("body"))
            .await
            .with_context(|| format!("未找到按键目标: {:?}", selector))?;
        element.press_key(key).await?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.evaluate(SCROLL_BOTTOM_JS).await?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.page.reload().await.context("重新加载页面失败")?;
        Ok(())
    }
}
