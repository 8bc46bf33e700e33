use reqwest::Method;

/// Postal API operations and where they live relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SendMessage,
    SendRaw,
    MessageDetails,
    MessageDeliveries,
}

impl Endpoint {
    /// Path relative to the base URL (no leading slash).
    pub const fn path(self) -> &'static str {
        match self {
            Self::SendMessage => "api/v1/send/message",
            Self::SendRaw => "api/v1/send/raw",
            Self::MessageDetails => "api/v1/messages/message",
            Self::MessageDeliveries => "api/v1/messages/deliveries",
        }
    }

    /// Postal uses POST for reads as well as writes.
    pub fn method(self) -> Method {
        Method::POST
    }
}
