pub mod logging;
pub mod poll;
pub mod text;

pub use poll::{poll_until, PollPolicy};
pub use text::{escape_html, html_to_text, resolve_href, sanitize_filename};
