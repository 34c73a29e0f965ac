//! DOM 快照上的公共判断
//!
//! 所有函数都是纯函数：输入一个解析好的快照，不访问浏览器

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::Letter;

/// 解析静态选择器
pub fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("静态选择器无效 {css}: {e:?}"))
}

pub static ITEM_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^item\s*([a-e])\s*[:.)\-]?$").expect("item 正则"));

pub static ENUNCIATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:énoncé|enonce|enunciation)(?:\s+de\s+la\s+question)?\s*:?$").expect("énoncé 正则")
});

pub static EXAM_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:question|épreuve|epreuve|examen|dossier)\s*(?:n\s*[°o]\.?\s*)?\d+")
        .expect("标题正则")
});

pub static NEXT_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:question\s+suivante|suivante|suivant|next(?:\s+question)?)\b").expect("next 正则")
});

static HEADING: Lazy<Selector> =
    Lazy::new(|| sel("h1, h2, h3, h4, h5, .card-title, .question-title, .titre"));

/// 判定标记的 class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Positive,
    Negative,
}

pub static MARKER_CLASSES: phf::Map<&'static str, Marker> = phf_map! {
    "vrai" => Marker::Positive,
    "correct" => Marker::Positive,
    "juste" => Marker::Positive,
    "bonne-reponse" => Marker::Positive,
    "text-success" => Marker::Positive,
    "fa-check" => Marker::Positive,
    "faux" => Marker::Negative,
    "incorrect" => Marker::Negative,
    "erreur" => Marker::Negative,
    "mauvaise-reponse" => Marker::Negative,
    "text-danger" => Marker::Negative,
    "fa-times" => Marker::Negative,
};

/// 元素文本，空白折叠
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 元素自身带有的标记
pub fn marker_of(el: ElementRef<'_>) -> Option<Marker> {
    el.value().classes().find_map(|c| MARKER_CLASSES.get(c).copied())
}

/// 元素（含后代）中是否出现指定标记
pub fn contains_marker(el: ElementRef<'_>, marker: Marker) -> bool {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| marker_of(e) == Some(marker))
}

/// 文档中所有带标记元素的可见文本
pub fn marker_texts(root: ElementRef<'_>) -> Vec<String> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| marker_of(*e).is_some())
        .map(|e| {
            let text = text_of(e);
            if text.is_empty() {
                e.value().classes().collect::<Vec<_>>().join(".")
            } else {
                text
            }
        })
        .collect()
}

pub fn has_class_prefix(el: ElementRef<'_>, prefix: &str) -> bool {
    el.value().classes().any(|c| c.starts_with(prefix))
}

pub fn has_class(el: ElementRef<'_>, name: &str) -> bool {
    el.value().classes().any(|c| c == name)
}

/// 选项标签文本的最大长度（字节）
const ITEM_LABEL_MAX: usize = 24;

/// 与 `text_of` 相同的折叠规则，但超过 `limit` 字节立即放弃
pub fn short_text_of(el: ElementRef<'_>, limit: usize) -> Option<String> {
    let mut out = String::new();
    for word in el.text().flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        if out.len() > limit {
            return None;
        }
    }
    Some(out)
}

/// 元素文本是否为 "Item X"
pub fn item_label_letter(el: ElementRef<'_>) -> Option<Letter> {
    let text = short_text_of(el, ITEM_LABEL_MAX)?;
    let caps = ITEM_LABEL_RE.captures(&text)?;
    caps.get(1)?.as_str().chars().next().and_then(Letter::from_char)
}

/// 容器内的选项标签，取最外层匹配的元素，按字母去重
pub fn item_labels<'a>(container: ElementRef<'a>) -> Vec<(Letter, ElementRef<'a>)> {
    let mut labels: Vec<(Letter, ElementRef<'a>)> = Vec::new();
    for el in container.descendants().filter_map(ElementRef::wrap) {
        let Some(letter) = item_label_letter(el) else {
            continue;
        };
        let parent_matches = el
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| p.id() != container.id() && item_label_letter(p).is_some())
            .unwrap_or(false);
        if parent_matches {
            continue;
        }
        if labels.iter().all(|(l, _)| *l != letter) {
            labels.push((letter, el));
        }
    }
    labels
}

/// 第一个标题元素的文本
pub fn first_heading(root: ElementRef<'_>) -> Option<String> {
    root.select(&HEADING)
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// 文档里第一个看起来像题号的标题
pub fn exam_title(doc: &Html) -> Option<String> {
    doc.select(&HEADING)
        .map(text_of)
        .find(|t| EXAM_TITLE_RE.is_match(t))
}

/// 元素在 `selector` 全部匹配中的序号
pub fn nth_of(doc: &Html, selector: &Selector, el: ElementRef<'_>) -> Option<usize> {
    doc.select(selector).position(|e| e.id() == el.id())
}

/// 元素或其父级被禁用
pub fn is_disabled(el: ElementRef<'_>) -> bool {
    if el.value().attr("disabled").is_some() || el.value().attr("aria-disabled") == Some("true") {
        return true;
    }
    if has_class(el, "disabled") {
        return true;
    }
    el.parent()
        .and_then(ElementRef::wrap)
        .map(|p| has_class(p, "disabled"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_label_prefers_outermost_element() {
        let doc = Html::parse_document(
            r#"<div id="c"><div class="lbl"><strong>Item A</strong></div><p>Item B :</p><p>Item F</p></div>"#,
        );
        let container = doc.select(&sel("#c")).next().unwrap();
        let labels = item_labels(container);

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].0, Letter::A);
        assert!(has_class(labels[0].1, "lbl"));
        assert_eq!(labels[1].0, Letter::B);
    }

    #[test]
    fn long_elements_are_not_item_labels() {
        let doc = Html::parse_document(
            r#"<div id="c"><span>Item <b>C</b></span><p>Item A suivi d'un long paragraphe explicatif</p></div>"#,
        );
        let span = doc.select(&sel("#c span")).next().unwrap();
        let para = doc.select(&sel("#c p")).next().unwrap();

        assert_eq!(item_label_letter(span), Some(Letter::C));
        assert_eq!(item_label_letter(para), None);
        assert_eq!(short_text_of(para, 10), None);
        assert_eq!(short_text_of(span, 10).as_deref(), Some("Item C"));
    }

    #[test]
    fn exam_title_pattern() {
        let doc = Html::parse_document("<h1>Banque QCM</h1><h2>Question n°3</h2>");
        assert_eq!(exam_title(&doc).as_deref(), Some("Question n°3"));
        let doc = Html::parse_document("<h1>Accueil</h1>");
        assert_eq!(exam_title(&doc), None);
    }

    #[test]
    fn markers_are_found_in_descendants() {
        let doc = Html::parse_document(r#"<div id="c"><span><i class="fa fa-check"></i></span></div>"#);
        let col = doc.select(&sel("#c")).next().unwrap();
        assert!(contains_marker(col, Marker::Positive));
        assert!(!contains_marker(col, Marker::Negative));
    }
}
