//! The narrow slice of the MAX Bot API this crate needs to call back into
//! the platform for itself: long-polling for updates and enriching them
//! with `chat`/`user` lookups (see [`crate::decoder::enrich`]).
//!
//! This is deliberately not a full API client. A host application wanting
//! to send messages, manage attachments, etc. brings its own, richer
//! [`Session`] implementation (or composes one on top of [`ReqwestSession`]);
//! this crate only needs the handful of [`crate::methods`] it calls itself.

mod bot;
mod reqwest_session;
mod session;

pub use bot::Bot;
pub use reqwest_session::ReqwestSession;
pub use session::{ClientResponse, HttpMethod, Session, StatusCode, DEFAULT_TIMEOUT};
