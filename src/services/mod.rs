pub mod authenticator;
pub mod dom;
pub mod extractor;
pub mod fingerprint;
pub mod paginator;
pub mod rasterizer;
pub mod renderer;
pub mod view;
pub mod view_locator;

pub use authenticator::Authenticator;
pub use extractor::{extract, ContainerStrategy};
pub use fingerprint::fingerprint;
pub use paginator::{AdvanceAction, AdvanceOutcome, Paginator};
pub use rasterizer::{ChromiumRasterizer, Rasterizer};
pub use renderer::render;
pub use view::{classify, is_correction_view, ViewKind};
pub use view_locator::ViewLocator;
