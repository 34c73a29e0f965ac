//! 翻页驱动 - 业务能力层
//!
//! 两个状态 {批改视图, 作答视图}，一个动作 advance。
//! 站点没有题号，只能靠指纹判断翻页是否生效。

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::fmt::Display;
use tracing::{debug, info, warn};

use super::dom::{is_disabled, nth_of, sel, text_of, NEXT_TEXT_RE};
use super::fingerprint::{fingerprint, fingerprint_kind};
use super::view::ViewKind;
use super::view_locator::ViewLocator;
use crate::config::{Config, TimingConfig};
use crate::infrastructure::{ClickTarget, PageHandle};
use crate::utils::{poll_until, resolve_href};

const PRIMARY_BUTTONS: &str =
    "button#btn-next, button#next, button.btn-next, button.next-question, button[name=next]";
const SECONDARY_ANCHORS: &str = "a#btn-next, a#next, a.btn-next, a.next-question, a.next";
const TEXT_CONTROLS: &str = "a, button";
const PAGINATION_NEXT: &str = ".pagination li.next a, a[rel=next], li.next a";

static PRIMARY: Lazy<Selector> = Lazy::new(|| sel(PRIMARY_BUTTONS));
static SECONDARY: Lazy<Selector> = Lazy::new(|| sel(SECONDARY_ANCHORS));
static TEXTUAL: Lazy<Selector> = Lazy::new(|| sel(TEXT_CONTROLS));
static PAGINATION: Lazy<Selector> = Lazy::new(|| sel(PAGINATION_NEXT));
static NEXT_URL_ATTR: Lazy<Selector> = Lazy::new(|| sel("[data-next-url]"));
static NEXT_LINK: Lazy<Selector> = Lazy::new(|| sel("link[rel=next][href]"));

/// 一个候选的翻页动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceAction {
    /// 点击页面元素
    Click {
        label: &'static str,
        target: ClickTarget,
    },
    /// 直接打开 DOM 中给出的下一题地址
    Navigate(String),
    /// 键盘兜底
    Key(&'static str),
}

impl Display for AdvanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceAction::Click { label, target } => write!(f, "{} {}", label, target),
            AdvanceAction::Navigate(href) => write!(f, "navigate {}", href),
            AdvanceAction::Key(key) => write!(f, "key {}", key),
        }
    }
}

/// advance 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// 指纹变化，已进入下一题的批改视图
    Advanced,
    /// 没有可执行的翻页动作，试卷结束
    EndOfQuiz,
    /// 重新加载后指纹仍未变化
    Stalled,
}

/// 快照中可用的翻页候选，按优先级排列
///
/// 同一个元素只出现一次；被禁用的控件不计入
pub fn discover_dom_candidates(doc: &Html) -> Vec<AdvanceAction> {
    let mut seen = Vec::new();
    let mut actions = Vec::new();

    let mut push_click =
        |label: &'static str, selector: &'static str, compiled: &Selector, el: ElementRef<'_>| {
            if is_disabled(el) || seen.contains(&el.id()) {
                return;
            }
            if let Some(nth) = nth_of(doc, compiled, el) {
                seen.push(el.id());
                actions.push(AdvanceAction::Click {
                    label,
                    target: ClickTarget::new(selector, nth),
                });
            }
        };

    if let Some(el) = doc.select(&PRIMARY).find(|e| !is_disabled(*e)) {
        push_click("primary", PRIMARY_BUTTONS, &*PRIMARY, el);
    }
    if let Some(el) = doc.select(&SECONDARY).find(|e| !is_disabled(*e)) {
        push_click("secondary", SECONDARY_ANCHORS, &*SECONDARY, el);
    }
    if let Some(el) = doc
        .select(&TEXTUAL)
        .find(|e| !is_disabled(*e) && NEXT_TEXT_RE.is_match(&text_of(*e)))
    {
        push_click("text", TEXT_CONTROLS, &*TEXTUAL, el);
    }
    if let Some(el) = doc.select(&PAGINATION).find(|e| !is_disabled(*e)) {
        push_click("pagination", PAGINATION_NEXT, &*PAGINATION, el);
    }

    let direct = doc
        .select(&NEXT_URL_ATTR)
        .find_map(|e| e.value().attr("data-next-url"))
        .or_else(|| doc.select(&NEXT_LINK).find_map(|e| e.value().attr("href")))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"));
    if let Some(href) = direct {
        actions.push(AdvanceAction::Navigate(href.to_string()));
    }

    actions
}

/// 翻页驱动
pub struct Paginator {
    timing: TimingConfig,
    locator: ViewLocator,
}

impl Paginator {
    pub fn new(config: &Config) -> Self {
        Self {
            timing: config.timing.clone(),
            locator: ViewLocator::new(config),
        }
    }

    pub fn locator(&self) -> &ViewLocator {
        &self.locator
    }

    /// 翻到下一题
    ///
    /// 1. 确保在批改视图，记录 F_before
    /// 2. 滚动到底部，按优先级尝试候选动作，第一个执行成功的为准
    /// 3. 拉回批改视图，轮询等待指纹变化
    /// 4. 未变化则重新加载页面再等一轮，仍未变化视为停滞
    pub async fn advance(&self, page: &dyn PageHandle) -> AdvanceOutcome {
        if !self.locator.ensure(page).await {
            debug!("翻页前未能确认批改视图");
        }
        let before = read_fingerprint(page).await.unwrap_or_default();

        if let Err(e) = page.scroll_to_bottom().await {
            debug!("滚动失败: {}", e);
        }

        let actions = self.candidates(page).await;
        if actions.is_empty() {
            info!("🏁 没有翻页控件，试卷结束");
            return AdvanceOutcome::EndOfQuiz;
        }

        let mut performed = false;
        for action in &actions {
            match self.perform(page, action).await {
                Ok(()) => {
                    debug!("翻页动作已执行: {}", action);
                    performed = true;
                    break;
                }
                Err(e) => debug!("翻页动作失败 {}: {}", action, e),
            }
        }
        if !performed {
            info!("🏁 所有翻页动作都不可用，试卷结束");
            return AdvanceOutcome::EndOfQuiz;
        }

        if self.confirm_progress(page, &before).await {
            return AdvanceOutcome::Advanced;
        }

        warn!("⚠️ 指纹未变化，重新加载页面");
        if let Err(e) = page.reload().await {
            debug!("重新加载失败: {}", e);
        }
        let _ = page.wait_until_idle().await;

        if self.confirm_progress(page, &before).await {
            return AdvanceOutcome::Advanced;
        }

        warn!("⚠️ 重新加载后仍无法翻页，按试卷结束处理");
        AdvanceOutcome::Stalled
    }

    async fn candidates(&self, page: &dyn PageHandle) -> Vec<AdvanceAction> {
        let mut actions = match page.content().await {
            Ok(html) => discover_dom_candidates(&Html::parse_document(&html)),
            Err(e) => {
                debug!("读取页面失败: {}", e);
                Vec::new()
            }
        };
        if self.timing.keyboard_fallback && !actions.is_empty() {
            actions.push(AdvanceAction::Key("ArrowRight"));
        }
        actions
    }

    async fn perform(&self, page: &dyn PageHandle, action: &AdvanceAction) -> anyhow::Result<()> {
        match action {
            AdvanceAction::Click { target, .. } => page.click(target).await?,
            AdvanceAction::Navigate(href) => {
                let current = page.current_url().await?;
                page.goto(&resolve_href(&current, href)?).await?;
            }
            AdvanceAction::Key(key) => page.press_key(None, key).await?,
        }
        let _ = page.wait_until_idle().await;
        Ok(())
    }

    /// 拉回批改视图后等待 F_after ≠ F_before 且 F_after 为批改视图
    async fn confirm_progress(&self, page: &dyn PageHandle, before: &str) -> bool {
        self.locator.ensure(page).await;
        poll_until(self.timing.fingerprint_policy(), || async move {
            match read_fingerprint(page).await {
                Some(after) => after != before && fingerprint_kind(&after) == ViewKind::Correction,
                None => false,
            }
        })
        .await
    }
}

async fn read_fingerprint(page: &dyn PageHandle) -> Option<String> {
    page.content().await.ok().map(|html| fingerprint(&html))
}
