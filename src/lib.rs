//! # drivechat
//!
//! Ask questions about precomputed driving sequences. Per-frame and
//! per-sequence statistics are fetched from the asset host, compacted into a
//! low-token text encoding, and sent with the question to a hosted
//! chat-completion endpoint whose streamed answer is decoded token by token
//! into the chat session.
//!
//! The entry point is [`store::AppStore`]; the other modules are its parts.

pub mod catalog;
pub mod cli;
pub mod compact;
pub mod completion;
pub mod config;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod sse;
pub mod stats;
pub mod store;

pub use catalog::{AuxiliaryKind, Catalog, Sequence};
pub use config::Config;
pub use error::{DriveChatError, Result};
pub use session::{ChatMessage, ChatRole, ChatSession};
pub use store::{AppStore, SendOutcome, StoreEvent, VideoOutcome};
