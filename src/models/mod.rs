pub mod document;
pub mod question;
pub mod quiz_id;

pub use document::{Artifact, DocumentMode, RenderedDocument, PDF_MIME};
pub use question::{CapturedSet, ItemRecord, Letter, QuestionRecord, Verdict};
pub use quiz_id::{parse_identifiers, QuizId};
