use std::sync::{Arc, Mutex};

use acs_notification::{
    auth, Authentication, Channel, ChannelKind, Client, ConnectionDescriptor, EmailMessage, Error,
    Notifiable, Notification, Senders, SmsMessage,
};
use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine as _};
use http::{HeaderMap, Method, StatusCode};
use sha2::{Digest, Sha256};
use time::{macros::format_description, PrimitiveDateTime};

const CONNECTION_STRING: &str =
    "endpoint=https://test.communication.azure.com/;accesskey=dGVzdC1rZXk=";

#[derive(Debug)]
struct RecordedRequest {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: String,
}

type Responder =
    Box<dyn Fn(&http::Request<Vec<u8>>) -> Result<(StatusCode, String), String> + Send + Sync>;

/// Transport that records every request and answers with `responder`.
struct FakeTransport {
    responder: Responder,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&http::Request<Vec<u8>>) -> Result<(StatusCode, String), String>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()) })
    }

    fn accepting() -> Arc<Self> {
        Self::new(|_| Ok((StatusCode::ACCEPTED, r#"{"id":"operation-1","status":"Running"}"#.to_string())))
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl acs_notification::transport::Transport for FakeTransport {
    async fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<String>, acs_notification::transport::TransportError> {
        let outcome = (self.responder)(&request);

        let (parts, body) = request.into_parts();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body: String::from_utf8(body).unwrap(),
        });

        let (status, body) = outcome?;
        let mut response = http::Response::new(body);
        *response.status_mut() = status;
        Ok(response)
    }
}

struct User {
    email: Option<&'static str>,
    phone: Option<&'static str>,
}

impl User {
    const fn john() -> Self { Self { email: Some("john@example.com"), phone: Some("+15551234567") } }
}

impl Notifiable for User {
    fn route_notification_for(&self, channel: ChannelKind) -> Option<String> {
        match channel {
            ChannelKind::Mail => self.email.map(ToString::to_string),
            ChannelKind::Sms => self.phone.map(ToString::to_string),
        }
    }
}

struct Greeting;

impl Notification for Greeting {
    fn to_email(&self, _notifiable: &dyn Notifiable) -> Option<EmailMessage> {
        Some(EmailMessage::new("Hi").html("<p>Hi</p>"))
    }
}

struct VerificationCode(&'static str);

impl Notification for VerificationCode {
    fn to_sms(&self, _notifiable: &dyn Notifiable) -> Option<SmsMessage> {
        Some(SmsMessage::new(self.0))
    }
}

struct OrderShipped;

impl Notification for OrderShipped {
    fn to_combined(
        &self,
        _notifiable: &dyn Notifiable,
    ) -> Option<(Option<EmailMessage>, Option<SmsMessage>)> {
        Some((
            Some(EmailMessage::new("Your Order #12345 Has Shipped").text("Order shipped!")),
            Some(SmsMessage::new("Your order #12345 has been shipped!")),
        ))
    }
}

struct Silent;

impl Notification for Silent {}

fn descriptor() -> ConnectionDescriptor { CONNECTION_STRING.parse().unwrap() }

fn senders() -> Senders {
    Senders { email: Some("test@example.com".to_string()), sms: Some("+15550000000".to_string()) }
}

fn channel_with(transport: Arc<FakeTransport>) -> Channel {
    Channel::new(Client::with_transport(descriptor(), Authentication::HmacSha256, transport), senders())
}

#[tokio::test]
async fn test_send_email_end_to_end() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());

    let receipts = channel.send(&User::john(), &Greeting).await.unwrap();

    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].channel, ChannelKind::Mail);
    assert_eq!(receipts[0].status, StatusCode::ACCEPTED);
    assert!(receipts[0].body.contains("operation-1"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.uri,
        "https://test.communication.azure.com/emails:send?api-version=2023-03-31"
    );
    assert_eq!(
        request.body,
        r#"{"senderAddress":"test@example.com","content":{"subject":"Hi","html":"<p>Hi</p>"},"recipients":{"to":[{"address":"john@example.com"}]}}"#
    );
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(
        request.headers["x-ms-content-sha256"],
        BASE64_STANDARD.encode(Sha256::digest(request.body.as_bytes())).as_str()
    );
}

#[tokio::test]
async fn test_send_email_signs_sent_bytes() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());

    let _receipts = channel.send(&User::john(), &Greeting).await.unwrap();

    let requests = transport.requests();
    let request = &requests[0];
    let date = request.headers["x-ms-date"].to_str().unwrap();
    let timestamp = PrimitiveDateTime::parse(
        date,
        format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ),
    )
    .unwrap()
    .assume_utc();

    let expected = auth::sign(
        &Method::POST,
        &request.uri.parse().unwrap(),
        request.body.as_bytes(),
        descriptor().access_key(),
        timestamp,
    )
    .unwrap();

    assert_eq!(expected.date, date);
    assert_eq!(request.headers["authorization"], expected.authorization.as_str());
    assert!(expected
        .authorization
        .starts_with("HMAC-SHA256 SignedHeaders=date;host;x-ms-content-sha256&Signature="));
}

#[tokio::test]
async fn test_send_sms_only_notification() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());

    let receipts = channel.send(&User::john(), &VerificationCode("Your code is 123456")).await.unwrap();

    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].channel, ChannelKind::Sms);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].uri, "https://test.communication.azure.com/sms/send?api-version=2021-03-07");
    assert_eq!(
        requests[0].body,
        r#"{"from":"+15550000000","smsRecipients":[{"to":"+15551234567"}],"message":"Your code is 123456","smsSendOptions":{"enableDeliveryReport":true}}"#
    );
}

#[tokio::test]
async fn test_combined_notification_sends_email_and_sms_once() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());

    let receipts = channel.send(&User::john(), &OrderShipped).await.unwrap();

    assert_eq!(receipts.len(), 2);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests.iter().filter(|request| request.uri.contains("/emails:send")).count(), 1);
    assert_eq!(requests.iter().filter(|request| request.uri.contains("/sms/send")).count(), 1);
}

#[tokio::test]
async fn test_unsupported_notification() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());

    let err = channel.send(&User::john(), &Silent).await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedNotification));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_sms_without_recipient_fails_before_network() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());
    let user = User { email: Some("john@example.com"), phone: None };

    let err = channel.send(&user, &VerificationCode("Your code is 123456")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidRecipient { channel: ChannelKind::Sms }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_blank_address_is_not_a_recipient() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());
    let user = User { email: Some("  "), phone: None };

    let err = channel.send(&user, &Greeting).await.unwrap_err();

    assert!(matches!(err, Error::InvalidRecipient { channel: ChannelKind::Mail }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_empty_sms_is_rejected_without_network() {
    let transport = FakeTransport::accepting();
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport.clone());

    let err = client.send_sms("+15550000000", "+15551234567", &SmsMessage::new("")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidMessage { .. }));
    assert!(transport.requests().is_empty());

    let channel = channel_with(transport.clone());
    let err = channel.send(&User::john(), &VerificationCode("")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidMessage { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_missing_sender_is_not_configured() {
    let transport = FakeTransport::accepting();
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport.clone());
    let channel = Channel::new(client, Senders::default());

    let err = channel.send(&User::john(), &Greeting).await.unwrap_err();

    assert!(matches!(err, Error::NotConfigured { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_email_surfaces_response_body() {
    let transport = FakeTransport::new(|_| {
        Ok((StatusCode::BAD_REQUEST, r#"{"error":{"code":"InvalidSender"}}"#.to_string()))
    });
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport);

    let err = client
        .send_email("test@example.com", "john@example.com", &EmailMessage::new("Hi").text("Hi"))
        .await
        .unwrap_err();

    let Error::Provider { channel, status, message } = err else {
        panic!("expected provider error");
    };
    assert_eq!(channel, ChannelKind::Mail);
    assert_eq!(status, Some(StatusCode::BAD_REQUEST));
    assert!(message.contains("InvalidSender"));
}

#[tokio::test]
async fn test_success_status_other_than_accepted_is_rejected() {
    let transport = FakeTransport::new(|_| Ok((StatusCode::OK, "unexpected".to_string())));
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport);

    let err = client
        .send_sms("+15550000000", "+15551234567", &SmsMessage::new("Hi"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Provider { channel: ChannelKind::Sms, status: Some(StatusCode::OK), .. }
    ));
}

#[tokio::test]
async fn test_transport_failure_surfaces_message() {
    let transport = FakeTransport::new(|_| Err("connection reset by peer".to_string()));
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport);

    let err = client
        .send_sms("+15550000000", "+15551234567", &SmsMessage::new("Hi"))
        .await
        .unwrap_err();

    let Error::Provider { status, message, .. } = err else {
        panic!("expected provider error");
    };
    assert_eq!(status, None);
    assert_eq!(message, "connection reset by peer");
}

#[tokio::test]
async fn test_email_failure_does_not_prevent_sms() {
    let transport = FakeTransport::new(|request| {
        if request.uri().path() == "/emails:send" {
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "email service unavailable".to_string()))
        } else {
            Ok((StatusCode::ACCEPTED, String::new()))
        }
    });
    let channel = channel_with(transport.clone());

    let err = channel.send(&User::john(), &OrderShipped).await.unwrap_err();

    let Error::Dispatch { delivered, errors } = err else {
        panic!("expected dispatch error");
    };
    assert_eq!(delivered, vec![ChannelKind::Sms]);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("email service unavailable"));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_combined_dispatch_collects_every_failure() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());
    let nobody = User { email: None, phone: None };

    let err = channel.send(&nobody, &OrderShipped).await.unwrap_err();

    let Error::Dispatch { delivered, errors } = err else {
        panic!("expected dispatch error");
    };
    assert!(delivered.is_empty());
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|err| matches!(err, Error::InvalidRecipient { .. })));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_bearer_token_authentication() {
    let transport = FakeTransport::accepting();
    let client = Client::with_transport(
        descriptor(),
        Authentication::bearer_token("abc123").unwrap(),
        transport.clone(),
    );

    let _receipt = client
        .send_email("test@example.com", "john@example.com", &EmailMessage::new("Hi").text("Hi"))
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].headers["authorization"], "Bearer abc123");
    assert!(!requests[0].headers.contains_key("x-ms-date"));
    assert!(!requests[0].headers.contains_key("x-ms-content-sha256"));
}

#[tokio::test]
async fn test_client_default_delivery_report() {
    let transport = FakeTransport::accepting();
    let client = Client::with_transport(descriptor(), Authentication::HmacSha256, transport.clone())
        .with_default_delivery_report(false);

    let _receipt =
        client.send_sms("+15550000000", "+15551234567", &SmsMessage::new("Hi")).await.unwrap();
    let _receipt = client
        .send_sms("+15550000000", "+15551234567", &SmsMessage::new("Hi").enable_delivery_report(true))
        .await
        .unwrap();

    let requests = transport.requests();
    assert!(requests[0].body.contains(r#""enableDeliveryReport":false"#));
    assert!(requests[1].body.contains(r#""enableDeliveryReport":true"#));
}

#[tokio::test]
async fn test_concurrent_sends_share_one_client() {
    let transport = FakeTransport::accepting();
    let channel = channel_with(transport.clone());
    let user = User::john();

    let results = futures::future::join_all((0..8).map(|_| channel.send(&user, &Greeting))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(transport.requests().len(), 8);
}
