//! Wire bodies of the email and SMS send operations.

use serde::Serialize;
use snafu::ResultExt;

use crate::{error, Attachment, ChannelKind, EmailMessage, Error, SmsMessage};

/// One email to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailRequest {
    pub sender_address: String,
    pub recipient_address: String,
    pub subject: String,
    pub html: Option<String>,
    pub plain_text: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl EmailRequest {
    #[must_use]
    pub fn new(sender_address: &str, recipient_address: &str, message: &EmailMessage) -> Self {
        Self {
            sender_address: sender_address.to_string(),
            recipient_address: recipient_address.to_string(),
            subject: message.subject().to_string(),
            html: message.html_body().map(ToString::to_string),
            plain_text: message.text_body().map(ToString::to_string),
            attachments: message.attachments().to_vec(),
        }
    }

    /// Serializes the request into the JSON body of `emails:send`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        let body = EmailBody {
            sender_address: &self.sender_address,
            content: EmailContent {
                subject: &self.subject,
                html: self.html.as_deref(),
                plain_text: self.plain_text.as_deref(),
            },
            recipients: EmailRecipients { to: [EmailAddress { address: &self.recipient_address }] },
            attachments: (!self.attachments.is_empty()).then_some(self.attachments.as_slice()),
        };

        serde_json::to_vec(&body).context(error::SerializePayloadSnafu { channel: ChannelKind::Mail })
    }
}

/// One SMS to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmsRequest {
    pub from: String,
    pub to: String,
    pub message: String,
    pub enable_delivery_report: bool,
}

impl SmsRequest {
    /// `default_delivery_report` applies when the message leaves delivery
    /// reports unset.
    #[must_use]
    pub fn new(
        sender_number: &str,
        recipient_number: &str,
        message: &SmsMessage,
        default_delivery_report: bool,
    ) -> Self {
        Self {
            from: sender_number.to_string(),
            to: recipient_number.to_string(),
            message: message.content().to_string(),
            enable_delivery_report: message.delivery_report().unwrap_or(default_delivery_report),
        }
    }

    /// Serializes the request into the JSON body of `sms/send`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        let body = SmsBody {
            from: &self.from,
            sms_recipients: [SmsRecipient { to: &self.to }],
            message: &self.message,
            sms_send_options: SmsSendOptions { enable_delivery_report: self.enable_delivery_report },
        };

        serde_json::to_vec(&body).context(error::SerializePayloadSnafu { channel: ChannelKind::Sms })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailBody<'a> {
    sender_address: &'a str,
    content: EmailContent<'a>,
    recipients: EmailRecipients<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<&'a [Attachment]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailContent<'a> {
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plain_text: Option<&'a str>,
}

#[derive(Serialize)]
struct EmailRecipients<'a> {
    to: [EmailAddress<'a>; 1],
}

#[derive(Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsBody<'a> {
    from: &'a str,
    sms_recipients: [SmsRecipient<'a>; 1],
    message: &'a str,
    sms_send_options: SmsSendOptions,
}

#[derive(Serialize)]
struct SmsRecipient<'a> {
    to: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsSendOptions {
    enable_delivery_report: bool,
}
