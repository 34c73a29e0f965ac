//! 页面句柄 - 基础设施层
//!
//! 所有组件通过 `&dyn PageHandle` 访问同一个浏览器页面，
//! 不存在全局会话对象。

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::fmt::Display;

/// 页面中的一个可点击目标
///
/// 在 DOM 快照里用 `selector` 找到的第 `nth` 个元素（文档顺序），
/// 与浏览器里 `querySelectorAll(selector)[nth]` 对应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub selector: String,
    pub nth: usize,
}

impl ClickTarget {
    pub fn new(selector: impl Into<String>, nth: usize) -> Self {
        Self {
            selector: selector.into(),
            nth,
        }
    }
}

impl Display for ClickTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.selector, self.nth)
    }
}

/// 页面能力
///
/// 只暴露导航、执行脚本、点击、快照等原语，不认识题目和试卷
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// 导航到 URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// 当前 URL
    async fn current_url(&self) -> Result<String>;

    /// 在页面中执行一段 JS，返回其结果
    async fn evaluate(&self, js: &str) -> Result<JsonValue>;

    /// 当前渲染后的 DOM（outerHTML）
    async fn content(&self) -> Result<String>;

    /// 等待页面加载完成并稳定
    async fn wait_until_idle(&self) -> Result<()>;

    /// 点击目标元素，元素不存在时返回错误
    async fn click(&self, target: &ClickTarget) -> Result<()>;

    /// 填写输入框并触发 input/change 事件
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// 发送按键；`selector` 为空时发往 body
    async fn press_key(&self, selector: Option<&str>, key: &str) -> Result<()>;

    /// 滚动到页面底部
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// 重新加载当前页面
    async fn reload(&self) -> Result<()>;
}
