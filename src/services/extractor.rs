//! 题目抽取 - 业务能力层
//!
//! 只处理批改视图的单个快照，输出一道题或 `None`

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::dom::{
    contains_marker, first_heading, has_class, has_class_prefix, item_label_letter, item_labels,
    sel, short_text_of, Marker, ENUNCIATION_RE,
};
use crate::models::{ItemRecord, Letter, QuestionRecord, Verdict};
use crate::utils::html_to_text;

static CONTAINERS: Lazy<Selector> = Lazy::new(|| {
    sel(".question-container, .card-body, .panel-body, .question, article, section, main")
});

static PROMPT: Lazy<Selector> =
    Lazy::new(|| sel(".enonce, .enunciation, .question-enonce, .question-text, .stem"));

/// 容器选择策略，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStrategy {
    /// 包含 "Item A–E" 标签最多的候选
    ItemLabels,
    /// 包含 "Énoncé" 标题的候选
    EnunciationTitle,
    /// 文档顺序中最后一个候选
    LastCandidate,
}

pub const STRATEGIES: [ContainerStrategy; 3] = [
    ContainerStrategy::ItemLabels,
    ContainerStrategy::EnunciationTitle,
    ContainerStrategy::LastCandidate,
];

impl ContainerStrategy {
    pub fn select<'a>(self, doc: &'a Html) -> Option<ElementRef<'a>> {
        let candidates: Vec<ElementRef<'a>> = doc.select(&CONTAINERS).collect();
        match self {
            ContainerStrategy::ItemLabels => {
                let counted: Vec<(usize, ElementRef<'a>)> =
                    candidates.iter().map(|c| (item_labels(*c).len(), *c)).collect();
                let best = counted.iter().map(|(n, _)| *n).max().unwrap_or(0);
                if best == 0 {
                    return None;
                }
                // 数量相同取更深（文档顺序靠后）的容器
                counted
                    .into_iter()
                    .rev()
                    .find(|(n, _)| *n == best)
                    .map(|(_, c)| c)
            }
            ContainerStrategy::EnunciationTitle => candidates
                .iter()
                .rev()
                .find(|c| has_enunciation_label(**c))
                .copied(),
            ContainerStrategy::LastCandidate => candidates
                .last()
                .copied()
                .or_else(|| doc.select(&sel("body")).next()),
        }
    }
}

fn has_enunciation_label(container: ElementRef<'_>) -> bool {
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| is_enunciation_label(e))
}

fn is_enunciation_label(el: ElementRef<'_>) -> bool {
    match short_text_of(el, 4 * 40) {
        Some(text) => text.chars().count() <= 40 && ENUNCIATION_RE.is_match(&text),
        None => false,
    }
}

/// 从批改视图快照中抽取当前题目
///
/// 依次尝试各容器策略，第一个能抽出至少一个选项的容器胜出。
pub fn extract(html: &str) -> Option<QuestionRecord> {
    let doc = Html::parse_document(html);
    extract_document(&doc)
}

pub fn extract_document(doc: &Html) -> Option<QuestionRecord> {
    for strategy in STRATEGIES {
        let Some(container) = strategy.select(doc) else {
            continue;
        };
        if let Some(record) = extract_from_container(doc, container) {
            debug!("容器策略 {:?} 命中，{} 个选项", strategy, record.items.len());
            return Some(record);
        }
    }
    None
}

fn extract_from_container(doc: &Html, container: ElementRef<'_>) -> Option<QuestionRecord> {
    let items: Vec<ItemRecord> = item_labels(container)
        .into_iter()
        .filter_map(|(letter, label)| {
            let row = row_after(label)?;
            Some(item_from_row(letter, row))
        })
        .collect();
    if items.is_empty() {
        return None;
    }

    let title = first_heading(container)
        .or_else(|| first_heading(doc.root_element()))
        .unwrap_or_default();
    let prompt_html = prompt_of(container).map(|p| p.inner_html()).unwrap_or_default();
    let prompt_text = html_to_text(&prompt_html);

    Some(QuestionRecord {
        title,
        prompt_html,
        prompt_text,
        items,
    })
}

/// 标签之后的第一个 `.row` 兄弟元素
///
/// 在找到 row 之前遇到另一个选项标签，说明这一项缺行，跳过。
pub fn row_after(label: ElementRef<'_>) -> Option<ElementRef<'_>> {
    for sibling in label.next_siblings().filter_map(ElementRef::wrap) {
        if item_label_letter(sibling).is_some() {
            return None;
        }
        if has_class(sibling, "row") {
            return Some(sibling);
        }
    }
    None
}

/// 行的直接子列：0 = 陈述，1 = 解析 + 判定，2 = 作答
pub fn columns_of(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| has_class_prefix(*c, "col"))
        .take(3)
        .collect()
}

/// 判定列中的正/负标记
pub fn column_verdict(column: ElementRef<'_>) -> Verdict {
    Verdict::from_markers(
        contains_marker(column, Marker::Positive),
        contains_marker(column, Marker::Negative),
    )
}

fn item_from_row(letter: Letter, row: ElementRef<'_>) -> ItemRecord {
    let columns = columns_of(row);
    let text_at = |i: usize| {
        columns
            .get(i)
            .map(|c| html_to_text(&c.inner_html()))
            .unwrap_or_default()
    };

    ItemRecord {
        letter,
        subject_text: text_at(0),
        correction_text: text_at(1),
        user_answer_text: text_at(2),
        verdict: columns
            .get(1)
            .map(|c| column_verdict(*c))
            .unwrap_or(Verdict::Unknown),
    }
}

/// 题干：优先带 énoncé 类名的元素，其次 "Énoncé" 标题后的兄弟元素
fn prompt_of(container: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if let Some(prompt) = container.select(&PROMPT).next() {
        return Some(prompt);
    }
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.id() != container.id())
        .find(|e| is_enunciation_label(*e))
        .and_then(|label| label.next_siblings().filter_map(ElementRef::wrap).next())
}
