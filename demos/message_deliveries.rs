use std::io;

use postal_client::{Expansions, GetDeliveries, GetMessage, PostalClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let id: u64 = std::env::var("POSTAL_MESSAGE_ID")
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "POSTAL_MESSAGE_ID environment variable is required",
            )
        })?
        .parse()?;

    let client = PostalClientBuilder::from_env()?.build()?;

    let details = client
        .messages()
        .get_message(GetMessage::new(id).expand(Expansions::fields(["status", "details"])))
        .await?
        .into_data();
    if let Some(status) = &details.status {
        println!("status: {} (held: {})", status.status, status.held);
    }
    if let Some(info) = &details.details {
        println!("subject: {:?}", info.subject);
    }

    let deliveries = client
        .messages()
        .get_deliveries(GetDeliveries::new(id))
        .await?
        .into_data();
    for delivery in deliveries {
        println!(
            "{} {} {:?} (ssl: {})",
            delivery.timestamp, delivery.status, delivery.output, delivery.sent_with_ssl
        );
    }

    Ok(())
}
