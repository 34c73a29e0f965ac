//! 文档渲染
//!
//! 把抓到的题目渲染为自包含的 HTML，题目版不带任何判定和作答

use chrono::Local;
use std::fmt::Write;

use crate::models::{DocumentMode, ItemRecord, QuestionRecord, QuizId, RenderedDocument, Verdict};
use crate::utils::escape_html;

const STYLE: &str = r#"
    body { font-family: "DejaVu Sans", Arial, sans-serif; font-size: 11pt; color: #222; margin: 0; }
    header { border-bottom: 2px solid #333; margin-bottom: 12px; }
    header h1 { font-size: 16pt; margin: 0 0 4px 0; }
    header .meta { font-size: 9pt; color: #666; margin-bottom: 6px; }
    section.question { display: block; margin: 14px 0; }
    section.question h2 { font-size: 12pt; margin: 0 0 6px 0; }
    .prompt { margin: 0 0 8px 0; }
    ol.items { list-style: none; padding: 0; margin: 0; }
    li.item { page-break-inside: avoid; break-inside: avoid; border: 1px solid #ccc; border-radius: 4px; padding: 6px 8px; margin: 4px 0; }
    .letter { font-weight: bold; margin-right: 6px; }
    .badge { display: inline-block; font-size: 8pt; font-weight: bold; padding: 1px 6px; border-radius: 3px; margin-left: 6px; color: #fff; }
    .badge.vrai { background: #2e7d32; }
    .badge.faux { background: #c62828; }
    .badge.inconnu { background: #757575; }
    .correction { margin-top: 4px; color: #333; }
    .answer { margin-top: 2px; font-size: 9pt; color: #555; }
    @media print { section.question { page-break-before: auto; } }
"#;

/// 渲染一个试卷的一种模式
pub fn render(
    identifier: &QuizId,
    records: &[QuestionRecord],
    mode: DocumentMode,
    prefix: &str,
) -> RenderedDocument {
    let title = format!("{} — {} ({})", prefix, identifier, mode.label());
    let generated = Local::now().format("%Y-%m-%d %H:%M");

    let mut body = String::new();
    for (index, record) in records.iter().enumerate() {
        render_question(&mut body, index + 1, record, mode);
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>{title}</h1>
<div class="meta">Généré le {generated} · {count} question(s)</div>
</header>
{body}</body>
</html>
"#,
        title = escape_html(&title),
        generated = generated,
        count = records.len(),
        body = body,
    );

    RenderedDocument {
        identifier: identifier.clone(),
        mode,
        html,
    }
}

fn render_question(out: &mut String, number: usize, record: &QuestionRecord, mode: DocumentMode) {
    let heading = if record.title.is_empty() {
        format!("Question {}", number)
    } else {
        format!("{}. {}", number, record.title)
    };

    let _ = writeln!(out, r#"<section class="question">"#);
    let _ = writeln!(out, "<h2>{}</h2>", escape_html(&heading));
    if !record.prompt_text.is_empty() {
        let _ = writeln!(out, r#"<div class="prompt">{}</div>"#, escape_html(&record.prompt_text));
    }
    let _ = writeln!(out, r#"<ol class="items">"#);
    for item in &record.items {
        render_item(out, item, mode);
    }
    let _ = writeln!(out, "</ol>");
    let _ = writeln!(out, "</section>");
}

fn render_item(out: &mut String, item: &ItemRecord, mode: DocumentMode) {
    let _ = write!(
        out,
        r#"<li class="item"><span class="letter">{}.</span>{}"#,
        item.letter,
        escape_html(&item.subject_text)
    );

    if mode == DocumentMode::Corrected {
        let class = match item.verdict {
            Verdict::True => "vrai",
            Verdict::False => "faux",
            Verdict::Unknown => "inconnu",
        };
        let _ = write!(out, r#"<span class="badge {}">{}</span>"#, class, item.verdict.label());
        if !item.correction_text.is_empty() {
            let _ = write!(
                out,
                r#"<div class="correction">{}</div>"#,
                escape_html(&item.correction_text)
            );
        }
        if !item.user_answer_text.is_empty() {
            let _ = write!(
                out,
                r#"<div class="answer">Réponse : {}</div>"#,
                escape_html(&item.user_answer_text)
            );
        }
    }

    let _ = writeln!(out, "</li>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Letter;

    fn record(title: &str) -> QuestionRecord {
        QuestionRecord {
            title: title.to_string(),
            prompt_html: "Un patient <b>fébrile</b>".to_string(),
            prompt_text: "Un patient fébrile".to_string(),
            items: vec![
                ItemRecord {
                    letter: Letter::A,
                    subject_text: "Pneumopathie".to_string(),
                    correction_text: "Foyer radiologique".to_string(),
                    user_answer_text: "Coché".to_string(),
                    verdict: Verdict::True,
                },
                ItemRecord {
                    letter: Letter::B,
                    subject_text: "Angine <virale>".to_string(),
                    correction_text: String::new(),
                    user_answer_text: String::new(),
                    verdict: Verdict::False,
                },
            ],
        }
    }

    #[test]
    fn subject_mode_has_no_annotations() {
        let id = QuizId::parse("1914339").unwrap();
        let doc = render(&id, &[record("Question n°1")], DocumentMode::Subject, "qcm");

        assert!(doc.html.contains("qcm — 1914339 (Sujet)"));
        assert!(doc.html.contains("Pneumopathie"));
        assert!(!doc.html.contains("Foyer radiologique"));
        assert!(!doc.html.contains("VRAI"));
        assert!(!doc.html.contains("Coché"));
    }

    #[test]
    fn corrected_mode_includes_verdicts_and_answers() {
        let id = QuizId::parse("1914339").unwrap();
        let doc = render(&id, &[record("Question n°1")], DocumentMode::Corrected, "qcm");

        assert!(doc.html.contains("(Corrigé)"));
        assert!(doc.html.contains(r#"<span class="badge vrai">VRAI</span>"#));
        assert!(doc.html.contains(r#"<span class="badge faux">FAUX</span>"#));
        assert!(doc.html.contains("Foyer radiologique"));
        assert!(doc.html.contains("Réponse : Coché"));
    }

    #[test]
    fn captured_text_is_escaped() {
        let id = QuizId::parse("1").unwrap();
        let doc = render(&id, &[record("Q <1>")], DocumentMode::Subject, "qcm");

        assert!(doc.html.contains("Angine &lt;virale&gt;"));
        assert!(doc.html.contains("1. Q &lt;1&gt;"));
        assert_eq!(doc.html.matches(r#"<section class="question">"#).count(), 1);
    }
}
