use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{
    ActivityEntries, Delivery, Expansions, GetDeliveries, GetMessage, MessageDetails, MessageId,
    MessageInfo, MessageInspection, MessageStatus,
};

#[derive(Debug, Serialize)]
pub struct GetMessageJsonRequest<'a> {
    id: u64,
    #[serde(rename = "_expansions")]
    expansions: ExpansionsJson<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ExpansionsJson<'a> {
    Flag(bool),
    Fields(&'a [String]),
}

#[derive(Debug, Serialize)]
pub struct GetDeliveriesJsonRequest {
    id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageJsonDetails {
    id: u64,
    token: String,
    #[serde(default)]
    status: Option<StatusJson>,
    #[serde(default)]
    details: Option<DetailsJson>,
    #[serde(default)]
    inspection: Option<InspectionJson>,
    #[serde(default)]
    plain_body: Option<String>,
    #[serde(default)]
    html_body: Option<String>,
    #[serde(default)]
    attachments: Option<Vec<Value>>,
    #[serde(default)]
    headers: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    raw_message: Option<String>,
    #[serde(default)]
    activity_entries: Option<ActivityJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusJson {
    status: String,
    #[serde(default)]
    last_delivery_attempt: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    held: bool,
    #[serde(default)]
    hold_expiry: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct DetailsJson {
    #[serde(default)]
    rcpt_to: Option<String>,
    #[serde(default)]
    mail_from: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    size: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    bounce: bool,
    #[serde(default)]
    bounce_for_id: Option<u64>,
    #[serde(default)]
    tag: Value,
    #[serde(default)]
    received_with_ssl: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct InspectionJson {
    #[serde(default, deserialize_with = "null_as_default")]
    inspected: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    spam: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    spam_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    threat: bool,
    #[serde(default)]
    threat_details: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct ActivityJson {
    #[serde(default, deserialize_with = "null_as_default")]
    loads: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    clicks: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryJson {
    id: u64,
    status: String,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    sent_with_ssl: bool,
    #[serde(default)]
    log_id: Option<String>,
    #[serde(default)]
    time: Option<f64>,
    timestamp: f64,
}

/// Postal sends `null` for flags and scores it has not computed yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn encode_get_message(request: &GetMessage) -> GetMessageJsonRequest<'_> {
    let expansions = match &request.expansions {
        Expansions::None => ExpansionsJson::Flag(false),
        Expansions::All => ExpansionsJson::Flag(true),
        Expansions::Fields(fields) => ExpansionsJson::Fields(fields),
    };
    GetMessageJsonRequest {
        id: request.id.value(),
        expansions,
    }
}

pub fn encode_get_deliveries(request: &GetDeliveries) -> GetDeliveriesJsonRequest {
    GetDeliveriesJsonRequest {
        id: request.id.value(),
    }
}

impl From<MessageJsonDetails> for MessageDetails {
    fn from(value: MessageJsonDetails) -> Self {
        Self {
            id: MessageId::new(value.id),
            token: value.token,
            status: value.status.map(|status| MessageStatus {
                status: status.status,
                last_delivery_attempt: status.last_delivery_attempt,
                held: status.held,
                hold_expiry: status.hold_expiry,
            }),
            details: value.details.map(|details| MessageInfo {
                rcpt_to: details.rcpt_to,
                mail_from: details.mail_from,
                subject: details.subject,
                message_id: details.message_id,
                timestamp: details.timestamp,
                direction: details.direction,
                size: details.size,
                bounce: details.bounce,
                // Postal reports 0 when the message is not a bounce.
                bounce_for_id: details
                    .bounce_for_id
                    .filter(|id| *id != 0)
                    .map(MessageId::new),
                tag: details.tag,
                received_with_ssl: details.received_with_ssl,
            }),
            inspection: value.inspection.map(|inspection| MessageInspection {
                inspected: inspection.inspected,
                spam: inspection.spam,
                spam_score: inspection.spam_score,
                threat: inspection.threat,
                threat_details: inspection.threat_details,
            }),
            plain_body: value.plain_body,
            html_body: value.html_body,
            attachments: value.attachments.unwrap_or_default(),
            headers: value.headers.unwrap_or_default(),
            raw_message: value.raw_message,
            activity_entries: value.activity_entries.map(|activity| ActivityEntries {
                loads: activity.loads,
                clicks: activity.clicks,
            }),
        }
    }
}

impl From<DeliveryJson> for Delivery {
    fn from(value: DeliveryJson) -> Self {
        Self {
            id: value.id,
            status: value.status,
            details: value.details,
            output: value.output,
            sent_with_ssl: value.sent_with_ssl,
            log_id: value.log_id,
            time: value.time,
            timestamp: value.timestamp,
        }
    }
}
