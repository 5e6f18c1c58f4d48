//! # sqlgate-tunnel
//!
//! SSH local port forwarding for the sqlgate gateway.
//!
//! The database only listens on the private network behind a jump host. This
//! crate authenticates to the jump host, binds a loopback port and forwards
//! every connection accepted there through a `direct-tcpip` channel to the
//! database address.
//!
//! ```text
//! MySQL client ─▶ 127.0.0.1:<local_port> ─▶ ssh channel ─▶ jump host ─▶ db:3306
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use sqlgate_tunnel::TunnelManager;
//!
//! let session = TunnelManager::start(&config.tunnel).await?;
//! println!("forwarding on 127.0.0.1:{}", session.local_port());
//! // ...
//! session.stop().await;
//! ```

pub mod error;
pub mod forward;
pub mod session;
mod ssh;

pub use error::TunnelError;
pub use forward::{ChannelOpener, ForwardIo, ForwardedStream};
pub use session::{TunnelManager, TunnelSession};
