//! 抓取循环 - 流程层
//!
//! 核心职责：定义"一张试卷"的完整抓取流程
//!
//! 流程顺序：
//! 1. 定位批改视图（失败则跳过该试卷）
//! 2. 抽取当前题目 → 按指纹去重后收录
//! 3. 翻页，直到试卷结束或无法继续

use scraper::Html;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::NavigationError;
use crate::infrastructure::PageHandle;
use crate::models::CapturedSet;
use crate::services::extractor::extract_document;
use crate::services::fingerprint::fingerprint_document;
use crate::services::view::{classify_document, ViewKind};
use crate::services::{AdvanceOutcome, Paginator};
use crate::workflow::QuizCtx;

/// 一次快照的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    /// 新题目已收录
    Captured,
    /// 指纹已出现过
    Duplicate,
    /// 不在批改视图或没有抽到选项
    Nothing,
}

/// 抓取循环
///
/// - 不持有任何资源（page 由调用方传入）
/// - 只依赖业务能力（services）
pub struct CaptureLoop {
    paginator: Paginator,
    max_questions: usize,
}

impl CaptureLoop {
    pub fn new(config: &Config) -> Self {
        Self {
            paginator: Paginator::new(config),
            max_questions: config.timing.max_questions.max(1),
        }
    }

    /// 抓取一张试卷的全部题目
    ///
    /// 无法进入批改视图时返回错误；翻页停滞不是错误，已抓到的部分照常返回
    pub async fn run(
        &self,
        page: &dyn PageHandle,
        ctx: &QuizCtx,
    ) -> Result<CapturedSet, NavigationError> {
        if !self.paginator.locator().locate(page, &ctx.identifier).await {
            return Err(NavigationError::CorrectionViewUnreachable {
                identifier: ctx.identifier.to_string(),
            });
        }

        let mut captured = CapturedSet::new(ctx.identifier.clone());
        let mut iterations = 0usize;

        loop {
            iterations += 1;

            match page.content().await {
                Ok(html) => match capture_snapshot(&html, &mut captured) {
                    Snapshot::Captured => info!(
                        "{} ✓ 收录第 {} 题",
                        ctx,
                        captured.len()
                    ),
                    Snapshot::Duplicate => debug!("{} 指纹已存在，跳过", ctx),
                    Snapshot::Nothing => debug!("{} 本轮没有可收录的内容", ctx),
                },
                Err(e) => debug!("{} 读取页面失败: {}", ctx, e),
            }

            if iterations >= self.max_questions {
                warn!("{} ⚠️ 达到单卷上限 {}，停止翻页", ctx, self.max_questions);
                break;
            }

            match self.paginator.advance(page).await {
                AdvanceOutcome::Advanced => continue,
                AdvanceOutcome::EndOfQuiz => break,
                AdvanceOutcome::Stalled => {
                    warn!("{} ⚠️ 无法继续翻页，保留已抓取的 {} 题", ctx, captured.len());
                    break;
                }
            }
        }

        info!("{} 🏁 抓取结束，共 {} 题", ctx, captured.len());
        Ok(captured)
    }
}

/// 对一次快照做分类、指纹、抽取与收录
fn capture_snapshot(html: &str, captured: &mut CapturedSet) -> Snapshot {
    let doc = Html::parse_document(html);
    if classify_document(&doc) != ViewKind::Correction {
        return Snapshot::Nothing;
    }

    let fingerprint = fingerprint_document(&doc);
    if captured.has_seen(&fingerprint) {
        return Snapshot::Duplicate;
    }

    match extract_document(&doc) {
        Some(record) => {
            if captured.push(&fingerprint, record) {
                Snapshot::Captured
            } else {
                Snapshot::Nothing
            }
        }
        None => Snapshot::Nothing,
    }
}
