use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::value::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Envelope `status` reported by Postal.
///
/// Values outside the documented set are preserved in [`ApiStatus::Other`].
pub enum ApiStatus {
    Success,
    ParameterError,
    Error,
    Other(String),
}

impl ApiStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "parameter-error" => Self::ParameterError,
            "error" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::ParameterError => "parameter-error",
            Self::Error => "error",
            Self::Other(value) => value,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Acknowledgement returned by both send operations.
pub struct SendResult {
    /// `Message-ID` header value assigned to the message.
    pub message_id: String,
    /// Per-recipient message records, keyed by recipient address.
    pub messages: BTreeMap<String, RecipientMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientMessage {
    pub id: MessageId,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of `messages/message`.
///
/// Sections that were not requested through [`crate::Expansions`] are `None` or empty.
pub struct MessageDetails {
    pub id: MessageId,
    pub token: String,
    pub status: Option<MessageStatus>,
    pub details: Option<MessageInfo>,
    pub inspection: Option<MessageInspection>,
    pub plain_body: Option<String>,
    pub html_body: Option<String>,
    pub attachments: Vec<Value>,
    pub headers: BTreeMap<String, Value>,
    pub raw_message: Option<String>,
    pub activity_entries: Option<ActivityEntries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageStatus {
    pub status: String,
    pub last_delivery_attempt: Option<f64>,
    pub held: bool,
    pub hold_expiry: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageInfo {
    pub rcpt_to: Option<String>,
    pub mail_from: Option<String>,
    pub subject: Option<String>,
    pub message_id: Option<String>,
    pub timestamp: Option<f64>,
    pub direction: Option<String>,
    pub size: Value,
    pub bounce: bool,
    pub bounce_for_id: Option<MessageId>,
    pub tag: Value,
    pub received_with_ssl: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageInspection {
    pub inspected: bool,
    pub spam: bool,
    pub spam_score: f64,
    pub threat: bool,
    pub threat_details: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityEntries {
    pub loads: Vec<Value>,
    pub clicks: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// One delivery attempt from `messages/deliveries`.
pub struct Delivery {
    pub id: u64,
    pub status: String,
    pub details: Option<String>,
    pub output: Option<String>,
    pub sent_with_ssl: bool,
    pub log_id: Option<String>,
    /// Seconds the attempt took.
    pub time: Option<f64>,
    pub timestamp: f64,
}
