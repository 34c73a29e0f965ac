//! 指纹：当前显示内容的廉价摘要
//!
//! 站点没有稳定的题目 ID，只能比较内容判断翻页是否生效

use scraper::{ElementRef, Html};

use super::dom::{first_heading, item_labels, marker_texts, text_of};
use super::view::{classify_document, ViewKind};
use crate::utils::logging::truncate_text;

/// 选项摘录长度
const SNIPPET_CHARS: usize = 80;

/// 对解析好的快照计算指纹
pub fn fingerprint_document(doc: &Html) -> String {
    let kind = classify_document(doc);
    let root = doc.root_element();

    let title = first_heading(root).unwrap_or_default();
    let labels = item_labels(root);
    let (first_label, snippet) = match labels.first() {
        Some((letter, label)) => (letter.to_string(), first_item_snippet(*label)),
        None => (String::new(), String::new()),
    };
    let markers = if kind == ViewKind::Correction {
        marker_texts(root).join(",")
    } else {
        String::new()
    };

    format!(
        "{}|{}|{}|{}|{}",
        kind.tag(),
        title,
        first_label,
        snippet,
        truncate_text(&markers, SNIPPET_CHARS)
    )
}

/// 对 DOM 快照计算指纹
pub fn fingerprint(html: &str) -> String {
    fingerprint_document(&Html::parse_document(html))
}

/// 指纹对应的视图类型
pub fn fingerprint_kind(fingerprint: &str) -> ViewKind {
    match fingerprint.split('|').next() {
        Some("correction") => ViewKind::Correction,
        Some("quiz") => ViewKind::Quiz,
        _ => ViewKind::Unknown,
    }
}

/// 标签后第一个兄弟元素的文本
fn first_item_snippet(label: ElementRef<'_>) -> String {
    label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .map(text_of)
        .find(|t| !t.is_empty())
        .map(|t| truncate_text(&t, SNIPPET_CHARS))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correction_fixture(title: &str, first_item: &str) -> String {
        format!(
            r#"<html><body>
            <h2>{title}</h2>
            <div class="card-body">
              <div class="item-label">Item A</div>
              <div class="row">
                <div class="col-md-4">{first_item}</div>
                <div class="col-md-4"><span class="vrai">Vrai</span> Explication</div>
                <div class="col-md-4">Coché</div>
              </div>
              <div class="item-label">Item B</div>
              <div class="row"><div class="col-md-4">Autre</div></div>
            </div>
            <button id="btn-next">Question suivante</button>
            </body></html>"#
        )
    }

    #[test]
    fn different_titles_give_different_fingerprints() {
        let a = fingerprint(&correction_fixture("Question n°1", "Tachycardie"));
        let b = fingerprint(&correction_fixture("Question n°2", "Tachycardie"));
        assert_ne!(a, b);
    }

    #[test]
    fn different_first_items_give_different_fingerprints() {
        let a = fingerprint(&correction_fixture("Question n°1", "Tachycardie"));
        let b = fingerprint(&correction_fixture("Question n°1", "Bradycardie"));
        assert_ne!(a, b);
    }

    #[test]
    fn identical_dom_is_stable() {
        let html = correction_fixture("Question n°1", "Tachycardie");
        assert_eq!(fingerprint(&html), fingerprint(&html));
        assert_eq!(fingerprint_kind(&fingerprint(&html)), ViewKind::Correction);
    }

    #[test]
    fn quiz_view_is_tagged_separately() {
        let quiz = r#"<html><body><h2>Question n°1</h2>
            <form><div class="item-label">Item A</div><div class="row"><div class="col-md-4">Tachycardie</div></div>
            <input type="checkbox" name="reponse[]"></form></body></html>"#;
        let fp = fingerprint(quiz);
        assert!(fp.starts_with("quiz|"));
        assert_ne!(fp, fingerprint(&correction_fixture("Question n°1", "Tachycardie")));
    }
}
