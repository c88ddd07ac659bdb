use futures::future::OptionFuture;

use crate::{
    error::{DispatchSnafu, InvalidRecipientSnafu, NotConfiguredSnafu, UnsupportedNotificationSnafu},
    ChannelKind, Client, Config, EmailMessage, Notifiable, Notification, NotificationPayload,
    Result, SendReceipt, SmsMessage,
};

/// Verified sender identities of the resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Senders {
    /// Sender email address.
    pub email: Option<String>,
    /// Sender phone number.
    pub sms: Option<String>,
}

impl From<&Config> for Senders {
    fn from(config: &Config) -> Self {
        Self { email: config.email_sender.clone(), sms: config.sms_sender.clone() }
    }
}

/// Delivers notifications to notifiables through a [`Client`].
#[derive(Clone, Debug)]
pub struct Channel {
    client: Client,
    senders: Senders,
}

impl Channel {
    #[must_use]
    pub const fn new(client: Client, senders: Senders) -> Self { Self { client, senders } }

    #[inline]
    #[must_use]
    pub const fn client(&self) -> &Client { &self.client }

    /// Sends `notification` to `notifiable` on every channel its payload
    /// carries.
    ///
    /// When a payload carries both email and SMS, both are sent concurrently
    /// and a failure of one never prevents the other.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The notification has no payload for this channel
    ///   ([`Error::UnsupportedNotification`](crate::Error::UnsupportedNotification))
    /// - The only dispatched channel failed, with that channel's error
    /// - Any channel of a two-channel dispatch failed
    ///   ([`Error::Dispatch`](crate::Error::Dispatch)), listing the channels
    ///   that were delivered and every failure
    pub async fn send(
        &self,
        notifiable: &dyn Notifiable,
        notification: &dyn Notification,
    ) -> Result<Vec<SendReceipt>> {
        match notification.payload(notifiable) {
            NotificationPayload::Combined { email, sms } => {
                self.send_combined(notifiable, email.as_ref(), sms.as_ref()).await
            }
            NotificationPayload::EmailOnly(email) => {
                Ok(vec![self.send_email(notifiable, &email).await?])
            }
            NotificationPayload::SmsOnly(sms) => Ok(vec![self.send_sms(notifiable, &sms).await?]),
            NotificationPayload::Unsupported => {
                tracing::warn!("Notification does not provide an Azure Communication Service payload");
                UnsupportedNotificationSnafu.fail()
            }
        }
    }

    /// Sends `message` to the email address of `notifiable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notifiable has no email address, no sender
    /// address is configured, or the client fails to send.
    pub async fn send_email(
        &self,
        notifiable: &dyn Notifiable,
        message: &EmailMessage,
    ) -> Result<SendReceipt> {
        let recipient = resolve_recipient(notifiable, ChannelKind::Mail)?;
        let Some(sender) = self.senders.email.as_deref() else {
            return NotConfiguredSnafu { reason: "email sender address is not configured" }.fail();
        };

        self.client.send_email(sender, &recipient, message).await
    }

    /// Sends `message` to the phone number of `notifiable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notifiable has no phone number, no sender
    /// number is configured, the message is empty, or the client fails to
    /// send.
    pub async fn send_sms(
        &self,
        notifiable: &dyn Notifiable,
        message: &SmsMessage,
    ) -> Result<SendReceipt> {
        let recipient = resolve_recipient(notifiable, ChannelKind::Sms)?;
        let Some(sender) = self.senders.sms.as_deref() else {
            return NotConfiguredSnafu { reason: "SMS sender phone number is not configured" }.fail();
        };

        self.client.send_sms(sender, &recipient, message).await
    }

    async fn send_combined(
        &self,
        notifiable: &dyn Notifiable,
        email: Option<&EmailMessage>,
        sms: Option<&SmsMessage>,
    ) -> Result<Vec<SendReceipt>> {
        let email = OptionFuture::from(email.map(|message| self.send_email(notifiable, message)));
        let sms = OptionFuture::from(sms.map(|message| self.send_sms(notifiable, message)));
        let (email, sms) = futures::join!(email, sms);

        let mut receipts = Vec::new();
        let mut errors = Vec::new();
        for result in [email, sms].into_iter().flatten() {
            match result {
                Ok(receipt) => receipts.push(receipt),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            if receipts.is_empty() {
                tracing::debug!("Combined payload carries neither email nor SMS, nothing to send");
            }
            return Ok(receipts);
        }

        if receipts.is_empty() && errors.len() == 1 {
            if let Some(err) = errors.pop() {
                return Err(err);
            }
        }

        DispatchSnafu {
            delivered: receipts.iter().map(|receipt| receipt.channel).collect::<Vec<_>>(),
            errors,
        }
        .fail()
    }
}

fn resolve_recipient(notifiable: &dyn Notifiable, channel: ChannelKind) -> Result<String> {
    match notifiable.route_notification_for(channel) {
        Some(address) if !address.trim().is_empty() => Ok(address),
        _ => {
            tracing::warn!(%channel, "No address found for notifiable");
            InvalidRecipientSnafu { channel }.fail()
        }
    }
}
