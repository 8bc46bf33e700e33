use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::domain::value::MessageId;

/// Upper bound Postal documents for each of `to`, `cc` and `bcc`.
///
/// Not enforced client-side; the server rejects oversized lists.
pub const MAX_RECIPIENTS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq)]
/// A structured message for `send/message`.
pub struct SendMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    /// Address for the `From` header.
    pub from: String,
    /// Address for the `Sender` header.
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub tag: Option<String>,
    pub reply_to: Option<String>,
    pub plain_body: Option<String>,
    pub html_body: Option<String>,
    /// Attachment objects passed through verbatim.
    pub attachments: Vec<Value>,
    /// Additional headers passed through verbatim.
    pub headers: BTreeMap<String, Value>,
    pub bounce: bool,
}

impl SendMessage {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: from.into(),
            to,
            ..Default::default()
        }
    }

    /// Append an attachment in the shape Postal expects
    /// (`name`, `content_type`, base64 `data`).
    pub fn attach(
        &mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: &[u8],
    ) -> &mut Self {
        self.attachments.push(serde_json::json!({
            "name": name.into(),
            "content_type": content_type.into(),
            "data": STANDARD.encode(content),
        }));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A complete RFC2822 message for `send/raw`.
pub struct SendRaw {
    /// Address logged as the envelope sender.
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    /// Base64 encoded message.
    pub data: String,
    pub bounce: bool,
}

impl SendRaw {
    /// Build a raw send from unencoded message bytes.
    pub fn new(mail_from: impl Into<String>, rcpt_to: Vec<String>, message: &[u8]) -> Self {
        Self::from_base64(mail_from, rcpt_to, STANDARD.encode(message))
    }

    /// Build a raw send from a message that is already base64 encoded.
    pub fn from_base64(
        mail_from: impl Into<String>,
        rcpt_to: Vec<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            mail_from: mail_from.into(),
            rcpt_to,
            data: data.into(),
            bounce: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Which nested sections `messages/message` should include.
pub enum Expansions {
    /// Only identity and token (`false`).
    #[default]
    None,
    /// Every section (`true`).
    All,
    /// The named sections, e.g. `status`, `details`, `inspection`.
    Fields(Vec<String>),
}

impl Expansions {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMessage {
    pub id: MessageId,
    pub expansions: Expansions,
}

impl GetMessage {
    pub fn new(id: u64) -> Self {
        Self {
            id: MessageId::new(id),
            expansions: Expansions::None,
        }
    }

    pub fn expand(mut self, expansions: Expansions) -> Self {
        self.expansions = expansions;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDeliveries {
    pub id: MessageId,
}

impl GetDeliveries {
    pub fn new(id: u64) -> Self {
        Self {
            id: MessageId::new(id),
        }
    }
}
