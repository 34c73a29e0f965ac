use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;

use super::QuizId;

/// 选项字母，仅 A–E
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
        }
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 选项判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    True,
    False,
    Unknown,
}

impl Verdict {
    /// 由正/负标记推导。两者同时存在时以正标记为准
    pub fn from_markers(positive: bool, negative: bool) -> Self {
        match (positive, negative) {
            (true, _) => Verdict::True,
            (false, true) => Verdict::False,
            (false, false) => Verdict::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::True => "VRAI",
            Verdict::False => "FAUX",
            Verdict::Unknown => "?",
        }
    }
}

/// 一个带字母的选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub letter: Letter,
    /// 选项陈述
    pub subject_text: String,
    /// 解析，可能为空
    pub correction_text: String,
    /// 用户作答，可能为空
    pub user_answer_text: String,
    pub verdict: Verdict,
}

/// 一道题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    pub title: String,
    pub prompt_html: String,
    pub prompt_text: String,
    pub items: Vec<ItemRecord>,
}

/// 一个试卷已抓取的题目
///
/// 同一指纹只收录一次，空选项的题目不收录
#[derive(Debug, Clone)]
pub struct CapturedSet {
    pub identifier: QuizId,
    questions: Vec<QuestionRecord>,
    seen: HashSet<String>,
}

impl CapturedSet {
    pub fn new(identifier: QuizId) -> Self {
        Self {
            identifier,
            questions: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// 收录一道题，返回是否真正追加
    pub fn push(&mut self, fingerprint: &str, record: QuestionRecord) -> bool {
        if record.items.is_empty() || self.seen.contains(fingerprint) {
            return false;
        }
        self.seen.insert(fingerprint.to_string());
        self.questions.push(record);
        true
    }

    pub fn has_seen(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, items: usize) -> QuestionRecord {
        QuestionRecord {
            title: title.to_string(),
            prompt_html: String::new(),
            prompt_text: String::new(),
            items: (0..items)
                .map(|i| ItemRecord {
                    letter: Letter::from_char((b'A' + i as u8) as char).unwrap(),
                    subject_text: format!("proposition {i}"),
                    correction_text: String::new(),
                    user_answer_text: String::new(),
                    verdict: Verdict::Unknown,
                })
                .collect(),
        }
    }

    #[test]
    fn verdict_prefers_positive_marker() {
        assert_eq!(Verdict::from_markers(true, false), Verdict::True);
        assert_eq!(Verdict::from_markers(false, true), Verdict::False);
        assert_eq!(Verdict::from_markers(false, false), Verdict::Unknown);
        assert_eq!(Verdict::from_markers(true, true), Verdict::True);
    }

    #[test]
    fn letters_outside_a_to_e_are_rejected() {
        assert_eq!(Letter::from_char('c'), Some(Letter::C));
        assert_eq!(Letter::from_char('F'), None);
    }

    #[test]
    fn captured_set_rejects_duplicates_and_empty_records() {
        let mut set = CapturedSet::new(QuizId::parse("1").unwrap());

        assert!(set.push("fp-1", record("Q1", 5)));
        assert!(!set.push("fp-1", record("Q1 bis", 5)));
        assert!(!set.push("fp-2", record("vide", 0)));
        assert!(!set.has_seen("fp-2"));
        assert!(set.push("fp-3", record("Q2", 2)));

        assert_eq!(set.len(), 2);
        assert_eq!(set.questions()[1].title, "Q2");
    }
}
