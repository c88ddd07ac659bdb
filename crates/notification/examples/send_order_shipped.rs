//! Example: Send an order shipped notification as email and SMS through Azure
//! Communication Services.
//!
//! # Prerequisites
//!
//! 1. Create an Azure Communication Services resource with a verified email
//!    domain and a phone number
//! 2. Set the `AZURE_COMMUNICATION_*` environment variables
//!
//! # Usage
//!
//! ```bash
//! export AZURE_COMMUNICATION_CONNECTION_STRING="endpoint=https://<resource>.communication.azure.com/;accesskey=<key>"
//! export AZURE_COMMUNICATION_EMAIL_SENDER="DoNotReply@yourdomain.com"
//! export AZURE_COMMUNICATION_SMS_SENDER="+15550000000"
//! cargo run --example send_order_shipped
//! ```

use acs_notification::{
    Channel, ChannelKind, Client, Config, EmailMessage, Notifiable, Notification, Senders,
    SmsMessage,
};

struct User {
    email: String,
    phone: String,
}

impl Notifiable for User {
    fn route_notification_for(&self, channel: ChannelKind) -> Option<String> {
        match channel {
            ChannelKind::Mail => Some(self.email.clone()),
            ChannelKind::Sms => Some(self.phone.clone()),
        }
    }
}

struct OrderShipped {
    order_id: u64,
}

impl Notification for OrderShipped {
    fn to_combined(
        &self,
        _notifiable: &dyn Notifiable,
    ) -> Option<(Option<EmailMessage>, Option<SmsMessage>)> {
        let email = EmailMessage::new(format!("Your Order #{} Has Shipped", self.order_id))
            .html(format!("<h1>Order #{} shipped</h1><p>It is on its way.</p>", self.order_id))
            .text(format!("Order #{} shipped. It is on its way.", self.order_id));
        let sms = SmsMessage::new(format!("Your order #{} has been shipped!", self.order_id));

        Some((Some(email), Some(sms)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let channel = Channel::new(Client::from_config(&config)?, Senders::from(&config));
    tracing::info!(endpoint = channel.client().endpoint(), "Created notification channel");

    // Replace with a real recipient
    let user = User { email: "john@example.com".to_string(), phone: "+15551234567".to_string() };

    for receipt in channel.send(&user, &OrderShipped { order_id: 12345 }).await? {
        tracing::info!(channel = %receipt.channel, status = %receipt.status, "Notification accepted");
    }

    Ok(())
}
