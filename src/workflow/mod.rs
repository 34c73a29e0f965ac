pub mod capture_loop;
pub mod quiz_ctx;

pub use capture_loop::CaptureLoop;
pub use quiz_ctx::QuizCtx;
