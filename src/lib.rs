//! Typed Rust client for the Postal mail server HTTP API.
//!
//! The crate is split into a domain layer of plain request/response types, a
//! transport layer for the wire format (endpoint table, response envelope, JSON
//! shapes), and a small client layer that builds, dispatches and classifies
//! requests.
//!
//! ```rust,no_run
//! use postal_client::{PostalClient, SendMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), postal_client::PostalError> {
//!     let client = PostalClient::new("https://postal.example.com", "...")?;
//!     let mut message = SendMessage::new("app@example.com", vec!["user@example.com".into()]);
//!     message.subject = Some("Welcome".into());
//!     message.plain_body = Some("Hello!".into());
//!
//!     let response = client.sending().send(message).await?;
//!     println!("queued as {}", response.data.message_id);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    ApiResponse, BoxError, BoxFuture, ErrorKind, HttpRequest, HttpResponse, HttpTransport,
    Messages, PostalClient, PostalClientBuilder, PostalError, RequestCompletionHook, ResponseMeta,
    Sending,
};
pub use domain::{
    ActivityEntries, ApiKey, ApiStatus, Delivery, Expansions, GetDeliveries, GetMessage,
    MAX_RECIPIENTS, MessageDetails, MessageId, MessageInfo, MessageInspection, MessageStatus,
    RecipientMessage, SendMessage, SendRaw, SendResult, ValidationError,
};
