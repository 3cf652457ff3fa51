#![warn(missing_docs)]
#![warn(clippy::missing_panics_doc)]

//! In-process broadcaster for named channels
//!
//! Listeners register on a channel and receive a copy of every message
//! published to it from then on. Closing a channel evicts its listeners.
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> chanfan::Result<()> {
//! let broadcaster = chanfan::Broadcaster::<String>::new();
//! broadcaster.add_channel("news");
//!
//! let mut listener = broadcaster.register_listener("news", 8)?;
//! broadcaster.send("hello".to_owned(), ["news"]).await;
//! assert_eq!(listener.recv().await.as_deref(), Some("hello"));
//!
//! broadcaster.close_channel("news");
//! assert_eq!(listener.recv().await, None);
//! assert!(listener.done().is_fired());
//! # Ok(())
//! # }
//! ```

mod channel;
mod common;
mod emitter;

pub mod broadcast;
pub mod config;
pub mod error;

pub use broadcast::{Broadcaster, CancelHandle, MessageStream, Subscription, TryRecvError};
pub use common::Signal;
pub use config::{Config, DEFAULT_CHANNEL};
pub use error::{Error, Result};
