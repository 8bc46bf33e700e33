use super::{ApiResponse, PostalClient, PostalError};
use crate::domain::{SendMessage, SendRaw, SendResult};
use crate::transport::{self, Endpoint, SendJsonResult};

/// The `send` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Sending<'a> {
    client: &'a PostalClient,
}

impl<'a> Sending<'a> {
    pub(super) fn new(client: &'a PostalClient) -> Self {
        Self { client }
    }

    /// Send a structured message.
    ///
    /// Recipient lists are passed through as given; Postal enforces its own limits
    /// (see [`crate::MAX_RECIPIENTS`]).
    pub async fn send(&self, request: SendMessage) -> Result<ApiResponse<SendResult>, PostalError> {
        let body = transport::encode_send_message(&request);
        self.post(Endpoint::SendMessage, &body).await
    }

    /// Send a complete RFC2822 message.
    pub async fn send_raw(&self, request: SendRaw) -> Result<ApiResponse<SendResult>, PostalError> {
        let body = transport::encode_send_raw(&request);
        self.post(Endpoint::SendRaw, &body).await
    }

    async fn post<B: serde::Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<ApiResponse<SendResult>, PostalError> {
        let request = self
            .client
            .build_request(endpoint.method(), endpoint.path(), Some(body))?;
        let response = self.client.execute::<SendJsonResult>(request).await?;
        Ok(response.map(SendResult::from))
    }
}
