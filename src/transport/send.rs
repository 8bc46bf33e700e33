use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{MessageId, RecipientMessage, SendMessage, SendRaw, SendResult};

#[derive(Debug, Serialize)]
pub struct SendMessageJsonRequest<'a> {
    to: &'a [String],
    cc: &'a [String],
    bcc: &'a [String],
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plain_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<&'a str>,
    attachments: &'a [Value],
    headers: &'a BTreeMap<String, Value>,
    bounce: bool,
}

#[derive(Debug, Serialize)]
pub struct SendRawJsonRequest<'a> {
    mail_from: &'a str,
    rcpt_to: &'a [String],
    data: &'a str,
    bounce: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendJsonResult {
    message_id: String,
    #[serde(default)]
    messages: BTreeMap<String, RecipientJsonMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecipientJsonMessage {
    id: u64,
    token: String,
}

pub fn encode_send_message(request: &SendMessage) -> SendMessageJsonRequest<'_> {
    SendMessageJsonRequest {
        to: &request.to,
        cc: &request.cc,
        bcc: &request.bcc,
        from: &request.from,
        sender: request.sender.as_deref(),
        subject: request.subject.as_deref(),
        tag: request.tag.as_deref(),
        reply_to: request.reply_to.as_deref(),
        plain_body: request.plain_body.as_deref(),
        html_body: request.html_body.as_deref(),
        attachments: &request.attachments,
        headers: &request.headers,
        bounce: request.bounce,
    }
}

pub fn encode_send_raw(request: &SendRaw) -> SendRawJsonRequest<'_> {
    SendRawJsonRequest {
        mail_from: &request.mail_from,
        rcpt_to: &request.rcpt_to,
        data: &request.data,
        bounce: request.bounce,
    }
}

impl From<SendJsonResult> for SendResult {
    fn from(value: SendJsonResult) -> Self {
        Self {
            message_id: value.message_id,
            messages: value
                .messages
                .into_iter()
                .map(|(address, message)| {
                    (
                        address,
                        RecipientMessage {
                            id: MessageId::new(message.id),
                            token: message.token,
                        },
                    )
                })
                .collect(),
        }
    }
}
