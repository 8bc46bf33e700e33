use std::io;

use postal_client::{PostalClientBuilder, SendMessage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let from = std::env::var("POSTAL_FROM").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTAL_FROM environment variable is required",
        )
    })?;
    let to = std::env::var("POSTAL_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSTAL_TO environment variable is required",
        )
    })?;

    let client = PostalClientBuilder::from_env()?
        .on_request_completed(|request, meta| {
            eprintln!(
                "{} {} -> {} in {:?}",
                request.method, request.url, meta.status, meta.elapsed
            );
        })
        .build()?;

    let mut message = SendMessage::new(from, vec![to]);
    message.subject = Some("Hello from postal-client".to_owned());
    message.plain_body = Some("This message was sent by the send_message demo.".to_owned());

    let response = client.sending().send(message).await?;
    println!("message_id: {}", response.data.message_id);
    for (recipient, sent) in &response.data.messages {
        println!("  {recipient}: id={} token={}", sent.id.value(), sent.token);
    }

    Ok(())
}
