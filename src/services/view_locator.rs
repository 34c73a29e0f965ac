//! 批改视图定位 - 业务能力层
//!
//! 站点在某些操作后会不确定地退回作答视图，这里负责把页面"拉回"批改视图。
//! `ensure` 可以在每轮循环里重复调用。

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::dom::{is_disabled, nth_of, sel};
use super::view::{classify, ViewKind};
use crate::config::{Config, SiteConfig, TimingConfig};
use crate::infrastructure::{ClickTarget, PageHandle};
use crate::models::QuizId;
use crate::utils::{poll_until, PollPolicy};

/// 按 id 识别的"进入批改"链接
const CORRECTION_ANCHOR_IDS: &str = "a#lien-correction, a#correction, a#btn-correction, a[id*=correction]";

const ANCHORS_WITH_HREF: &str = "a[href]";

static BY_ID: Lazy<Selector> = Lazy::new(|| sel(CORRECTION_ANCHOR_IDS));
static BY_HREF: Lazy<Selector> = Lazy::new(|| sel(ANCHORS_WITH_HREF));

static CORRECTION_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/correction/").expect("correction 链接正则"));

/// 在快照中寻找"进入批改视图"的链接
///
/// 优先按 id 匹配，其次匹配 href 形如 `/correction/` 的任意链接
pub fn find_correction_affordance(html: &str) -> Option<ClickTarget> {
    let doc = Html::parse_document(html);

    if let Some(anchor) = doc.select(&BY_ID).find(|a| !is_disabled(*a)) {
        let nth = nth_of(&doc, &BY_ID, anchor)?;
        return Some(ClickTarget::new(CORRECTION_ANCHOR_IDS, nth));
    }

    doc.select(&BY_HREF)
        .position(|a| {
            !is_disabled(a)
                && a.value()
                    .attr("href")
                    .map(|href| CORRECTION_HREF_RE.is_match(href))
                    .unwrap_or(false)
        })
        .map(|nth| ClickTarget::new(ANCHORS_WITH_HREF, nth))
}

/// 批改视图定位器
#[derive(Debug, Clone)]
pub struct ViewLocator {
    base_url: String,
    site: SiteConfig,
    timing: TimingConfig,
}

impl ViewLocator {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.request.base_url.clone(),
            site: config.site.clone(),
            timing: config.timing.clone(),
        }
    }

    /// 打开试卷并进入批改视图
    ///
    /// 只有识别器确认进入批改视图时才返回 true
    pub async fn locate(&self, page: &dyn PageHandle, identifier: &QuizId) -> bool {
        let quiz_url = match self.site.quiz_url(&self.base_url, identifier.as_str()) {
            Ok(url) => url,
            Err(e) => {
                warn!("[试卷 {}] {}", identifier, e);
                return false;
            }
        };
        info!("[试卷 {}] 📂 打开题目页: {}", identifier, quiz_url);

        if let Err(e) = page.goto(&quiz_url).await {
            warn!("[试卷 {}] 打开题目页失败: {}", identifier, e);
        }
        let _ = page.wait_until_idle().await;

        if self.in_correction(page).await {
            return true;
        }

        if self.click_affordance(page).await {
            if self.wait_for_correction(page, self.timing.ensure_policy()).await {
                info!("[试卷 {}] ✓ 通过页面链接进入批改视图", identifier);
                return true;
            }
            debug!("[试卷 {}] 点击批改链接后未识别到批改视图", identifier);
        }

        let correction_url = match self.site.correction_url(&self.base_url, identifier.as_str()) {
            Ok(url) => url,
            Err(e) => {
                warn!("[试卷 {}] {}", identifier, e);
                return false;
            }
        };
        info!("[试卷 {}] ↪ 直接打开批改页: {}", identifier, correction_url);
        if let Err(e) = page.goto(&correction_url).await {
            warn!("[试卷 {}] 打开批改页失败: {}", identifier, e);
            return false;
        }
        let _ = page.wait_until_idle().await;

        let reached = self.wait_for_correction(page, self.timing.locate_policy()).await;
        if reached {
            info!("[试卷 {}] ✓ 已进入批改视图", identifier);
        }
        reached
    }

    /// 确保当前处于批改视图
    ///
    /// 已在批改视图时立即返回；否则重新点击批改链接并等待
    pub async fn ensure(&self, page: &dyn PageHandle) -> bool {
        if self.in_correction(page).await {
            return true;
        }
        if !self.click_affordance(page).await {
            debug!("不在批改视图，且找不到批改链接");
            return false;
        }
        self.wait_for_correction(page, self.timing.ensure_policy()).await
    }

    /// 当前快照是否为批改视图，读取失败视为否
    pub async fn in_correction(&self, page: &dyn PageHandle) -> bool {
        match page.content().await {
            Ok(html) => classify(&html) == ViewKind::Correction,
            Err(e) => {
                debug!("读取页面失败: {}", e);
                false
            }
        }
    }

    async fn click_affordance(&self, page: &dyn PageHandle) -> bool {
        let Ok(html) = page.content().await else {
            return false;
        };
        let Some(target) = find_correction_affordance(&html) else {
            return false;
        };
        debug!("点击批改链接 {}", target);
        match page.click(&target).await {
            Ok(()) => {
                let _ = page.wait_until_idle().await;
                true
            }
            Err(e) => {
                debug!("点击批改链接失败: {}", e);
                false
            }
        }
    }

    async fn wait_for_correction(&self, page: &dyn PageHandle, policy: PollPolicy) -> bool {
        poll_until(policy, || self.in_correction(page)).await
    }
}
