#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod engine;
#[cfg(feature = "std")]
pub mod bot;
#[cfg(feature = "std")]
mod logging;
pub mod prelude;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod router;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;

pub use engine::*;
#[cfg(feature = "std")]
pub use bot::{local_match, BotOutcome, MatchReport, RandomBot};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use protocol::{Action, ClientMessage, ProtocolError, ServerMessage};
#[cfg(feature = "std")]
pub use router::{Connection, Router};
#[cfg(feature = "std")]
pub use server::{serve_tcp, Server, ServerConfig, ServerHandle};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
