use super::{ApiResponse, PostalClient, PostalError};
use crate::domain::{Delivery, GetDeliveries, GetMessage, MessageDetails};
use crate::transport::{self, DeliveryJson, Endpoint, MessageJsonDetails};

/// The `messages` endpoints. Postal serves these reads over POST.
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    client: &'a PostalClient,
}

impl<'a> Messages<'a> {
    pub(super) fn new(client: &'a PostalClient) -> Self {
        Self { client }
    }

    /// Fetch a message, with the sections selected by [`GetMessage::expansions`].
    pub async fn get_message(
        &self,
        request: GetMessage,
    ) -> Result<ApiResponse<MessageDetails>, PostalError> {
        let endpoint = Endpoint::MessageDetails;
        let body = transport::encode_get_message(&request);
        let http_request =
            self.client
                .build_request(endpoint.method(), endpoint.path(), Some(&body))?;

        let response = self
            .client
            .execute::<MessageJsonDetails>(http_request)
            .await?;
        Ok(response.map(MessageDetails::from))
    }

    /// Fetch every delivery attempt made for a message, in the order Postal returns them.
    pub async fn get_deliveries(
        &self,
        request: GetDeliveries,
    ) -> Result<ApiResponse<Vec<Delivery>>, PostalError> {
        let endpoint = Endpoint::MessageDeliveries;
        let body = transport::encode_get_deliveries(&request);
        let http_request =
            self.client
                .build_request(endpoint.method(), endpoint.path(), Some(&body))?;

        let response = self
            .client
            .execute::<Vec<DeliveryJson>>(http_request)
            .await?;
        Ok(response.map(|deliveries| deliveries.into_iter().map(Delivery::from).collect()))
    }
}
