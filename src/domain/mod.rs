//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    Expansions, GetDeliveries, GetMessage, MAX_RECIPIENTS, SendMessage, SendRaw,
};
pub use response::{
    ActivityEntries, ApiStatus, Delivery, MessageDetails, MessageInfo, MessageInspection,
    MessageStatus, RecipientMessage, SendResult,
};
pub use validation::ValidationError;
pub use value::{ApiKey, MessageId};

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use super::*;

    #[test]
    fn api_key_rejects_empty() {
        assert!(matches!(
            ApiKey::new("   "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn api_key_trims_and_rejects_header_breaking_characters() {
        assert_eq!(ApiKey::new("  abc123 ").unwrap().as_str(), "abc123");
        assert!(matches!(
            ApiKey::new("abc\r\nX-Injected: 1"),
            Err(ValidationError::InvalidHeaderValue { .. })
        ));
    }

    #[test]
    fn api_key_debug_does_not_leak_secret() {
        let key = ApiKey::new("super-secret").unwrap();
        assert!(!format!("{key:?}").contains("super-secret"));
    }

    #[test]
    fn api_status_maps_documented_and_unknown_values() {
        assert_eq!(ApiStatus::from_wire("success"), ApiStatus::Success);
        assert_eq!(
            ApiStatus::from_wire("parameter-error"),
            ApiStatus::ParameterError
        );
        assert_eq!(ApiStatus::from_wire("error"), ApiStatus::Error);

        let other = ApiStatus::from_wire("maintenance");
        assert_eq!(other, ApiStatus::Other("maintenance".to_owned()));
        assert!(!other.is_success());
        assert_eq!(other.to_string(), "maintenance");
    }

    #[test]
    fn send_raw_base64_encodes_message_bytes() {
        let raw = SendRaw::new(
            "sender@example.com",
            vec!["rcpt@example.com".to_owned()],
            b"Subject: hi\r\n\r\nbody",
        );
        assert_eq!(
            STANDARD.decode(&raw.data).unwrap(),
            b"Subject: hi\r\n\r\nbody"
        );
        assert!(!raw.bounce);
    }

    #[test]
    fn attach_appends_postal_attachment_object() {
        let mut message = SendMessage::new("from@example.com", vec!["to@example.com".to_owned()]);
        message.attach("a.txt", "text/plain", b"hello");

        assert_eq!(message.attachments.len(), 1);
        let attachment = &message.attachments[0];
        assert_eq!(attachment["name"], "a.txt");
        assert_eq!(attachment["content_type"], "text/plain");
        assert_eq!(attachment["data"], "aGVsbG8=");
    }

    #[test]
    fn expansions_default_to_none() {
        let request = GetMessage::new(7);
        assert_eq!(request.id, MessageId::new(7));
        assert_eq!(request.expansions, Expansions::None);

        let request = request.expand(Expansions::fields(["status", "details"]));
        assert_eq!(
            request.expansions,
            Expansions::Fields(vec!["status".to_owned(), "details".to_owned()])
        );
    }
}
