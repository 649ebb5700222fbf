//! A2A client — call remote A2A agents.
//!
//! - [`A2AClient`] — typed methods for every A2A JSON-RPC method
//! - [`Transport`] / [`JsonRpcTransport`] — pluggable transport layer
//! - [`SseStream`] — decoded task updates of a streaming response
//!
//! # Quick Start
//!
//! ```no_run
//! use a2a_min::client::A2AClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::connect("http://localhost:8000/");
//!
//! let task = client.send("Hello, agent!").await?;
//! println!("Task {} — status: {}", task.id, task.status.state);
//!
//! let mut stream = client.send_streaming("Write a haiku").await?;
//! while let Some(update) = stream.next().await {
//!     println!("{:?}", update?);
//! }
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod sse;
mod transport;

pub use a2a_client::A2AClient;
pub use sse::{SseStream, SseStreamAdapter};
pub use transport::{JsonRpcTransport, Transport, TransportConfig};
