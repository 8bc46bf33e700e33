//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod endpoint;
mod envelope;
mod messages;
mod send;

pub use endpoint::Endpoint;
pub use envelope::{Classified, ClassifyError, SuccessEnvelope, classify};
pub use messages::{
    DeliveryJson, MessageJsonDetails, encode_get_deliveries, encode_get_message,
};
pub use send::{SendJsonResult, encode_send_message, encode_send_raw};
