//! Layered error taxonomy for the dispatch engine.
//!
//! Each module owns one concern and the higher-level kinds wrap the lower
//! ones with `#[from]`, so a `?` at a call site always produces the right
//! enum without manual mapping.

mod app;
mod codec;
mod event;
mod extractor;
mod handler;
mod middleware;
mod platform;
mod session;
mod update_type;

pub use app::AppError;
pub use codec::CodecError;
pub use event::EventErrorKind;
pub use extractor::ExtractorError;
pub use handler::HandlerError;
pub use middleware::MiddlewareError;
pub use platform::PlatformErrorKind;
pub use session::SessionErrorKind;
pub use update_type::UnknownUpdateType;
