use base64::{prelude::BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// A file attached to an email, already base64 encoded.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub content_in_base64: String,
}

/// Email content of a notification.
///
/// ```
/// use acs_notification::EmailMessage;
///
/// let message = EmailMessage::new("Your order has shipped")
///     .html("<h1>Shipped!</h1>")
///     .text("Shipped!")
///     .attach("invoice.pdf", "application/pdf", "JVBERi0xLjQ=");
///
/// assert_eq!(message.subject(), "Your order has shipped");
/// assert_eq!(message.attachments().len(), 1);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EmailMessage {
    subject: String,
    html: Option<String>,
    text: Option<String>,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

impl EmailMessage {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), ..Self::default() }
    }

    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attaches content that is already base64 encoded.
    #[must_use]
    pub fn attach(
        mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content_in_base64: impl Into<String>,
    ) -> Self {
        self.attachments.push(Attachment {
            name: name.into(),
            content_type: content_type.into(),
            content_in_base64: content_in_base64.into(),
        });
        self
    }

    /// Attaches raw bytes, encoding them as base64.
    #[must_use]
    pub fn attach_bytes(
        self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl AsRef<[u8]>,
    ) -> Self {
        self.attach(name, content_type, BASE64_STANDARD.encode(content))
    }

    #[inline]
    #[must_use]
    pub fn subject(&self) -> &str { &self.subject }

    #[inline]
    #[must_use]
    pub fn html_body(&self) -> Option<&str> { self.html.as_deref() }

    #[inline]
    #[must_use]
    pub fn text_body(&self) -> Option<&str> { self.text.as_deref() }

    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] { &self.attachments }

    /// Whether the message has an HTML or plain text body.
    #[inline]
    #[must_use]
    pub const fn has_body(&self) -> bool { self.html.is_some() || self.text.is_some() }
}

/// SMS content of a notification.
///
/// Delivery reports follow the client default unless set explicitly.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SmsMessage {
    message: String,
    enable_delivery_report: Option<bool>,
}

impl SmsMessage {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), enable_delivery_report: None }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub const fn enable_delivery_report(mut self, enable: bool) -> Self {
        self.enable_delivery_report = Some(enable);
        self
    }

    #[inline]
    #[must_use]
    pub fn content(&self) -> &str { &self.message }

    /// The explicit delivery report setting, `None` to use the default.
    #[inline]
    #[must_use]
    pub const fn delivery_report(&self) -> Option<bool> { self.enable_delivery_report }
}
