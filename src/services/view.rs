//! 视图识别
//!
//! 批改视图没有可靠的标识，只能组合多个信号判断。宁可漏判（多一次重试），
//! 也不能把作答视图当成批改视图（会静默抓到错误数据）。

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::fmt::Display;

use super::dom::{exam_title, item_labels, sel};
use super::paginator::discover_dom_candidates;

static ANSWER_INPUTS: Lazy<Selector> = Lazy::new(|| {
    sel("form input[type=checkbox], form input[type=radio], input[type=checkbox][name*=reponse], input[type=radio][name*=reponse]")
});

/// 当前显示的视图类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// 批改视图：题目 + 判定 + 解析
    Correction,
    /// 作答视图：题目 + 勾选框
    Quiz,
    /// 加载中或无法识别
    Unknown,
}

impl ViewKind {
    pub fn tag(self) -> &'static str {
        match self {
            ViewKind::Correction => "correction",
            ViewKind::Quiz => "quiz",
            ViewKind::Unknown => "unknown",
        }
    }
}

impl Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// 信号 1："下一题"控件 + 至少一个选项标签
fn next_control_with_items(doc: &Html) -> bool {
    !discover_dom_candidates(doc).is_empty() && !item_labels(doc.root_element()).is_empty()
}

/// 信号 2：标题像题号
fn numbered_title(doc: &Html) -> bool {
    exam_title(doc).is_some()
}

/// 作答视图的特征：选项带勾选框
fn has_answer_inputs(doc: &Html) -> bool {
    doc.select(&ANSWER_INPUTS).next().is_some()
}

/// 对解析好的快照分类
pub fn classify_document(doc: &Html) -> ViewKind {
    if has_answer_inputs(doc) {
        return ViewKind::Quiz;
    }
    if next_control_with_items(doc) || numbered_title(doc) {
        return ViewKind::Correction;
    }
    ViewKind::Unknown
}

/// 对 DOM 快照分类
pub fn classify(html: &str) -> ViewKind {
    classify_document(&Html::parse_document(html))
}

/// 快照是否为批改视图
pub fn is_correction_view(html: &str) -> bool {
    classify(html) == ViewKind::Correction
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRECTION_LAST: &str = r#"<html><body>
        <h2>Question n°3</h2>
        <div class="card-body"><div>Item A</div><div class="row"><div class="col">x</div></div></div>
    </body></html>"#;

    const CORRECTION_UNTITLED: &str = r#"<html><body>
        <h2>Cardiologie</h2>
        <div class="card-body"><div>Item A</div><div class="row"><div class="col">x</div></div></div>
        <button id="btn-next">Question suivante</button>
    </body></html>"#;

    const QUIZ: &str = r#"<html><body>
        <h2>Question n°3</h2>
        <form><div>Item A</div><input type="checkbox" name="reponse[]" value="A">
        <button type="submit">Valider</button></form>
        <button id="btn-next">Question suivante</button>
    </body></html>"#;

    #[test]
    fn either_signal_recognizes_correction() {
        assert_eq!(classify(CORRECTION_LAST), ViewKind::Correction);
        assert_eq!(classify(CORRECTION_UNTITLED), ViewKind::Correction);
    }

    #[test]
    fn answer_inputs_veto_correction() {
        assert_eq!(classify(QUIZ), ViewKind::Quiz);
        assert!(!is_correction_view(QUIZ));
    }

    #[test]
    fn next_control_alone_is_not_enough() {
        let html = r#"<html><body><h2>Accueil</h2><button id="btn-next">Suivant</button></body></html>"#;
        assert_eq!(classify(html), ViewKind::Unknown);
    }
}
