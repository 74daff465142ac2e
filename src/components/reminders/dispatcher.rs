use crate::error::{notification_error, MementoResult};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

/// Resend's send-email endpoint
pub const RESEND_EMAILS_ENDPOINT: &str = "https://api.resend.com/emails";

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
}

/// File attached to an email. `content` is base64.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: String,
}

/// Outbound delivery of rendered emails
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Attempt delivery once. An `Err` means the provider did not accept it.
    async fn send(&self, email: &OutgoingEmail) -> MementoResult<()>;
}

/// Sends through the Resend HTTP API
#[derive(Debug, Clone)]
pub struct ResendDispatcher {
    client: Client,
    api_key: String,
    from: String,
    endpoint: Url,
}

impl ResendDispatcher {
    /// Create a dispatcher for the public Resend endpoint
    pub fn new(api_key: &str, from: &str) -> MementoResult<Self> {
        Self::with_endpoint(api_key, from, RESEND_EMAILS_ENDPOINT)
    }

    /// Create a dispatcher posting to a custom endpoint
    pub fn with_endpoint(api_key: &str, from: &str, endpoint: &str) -> MementoResult<Self> {
        if api_key.trim().is_empty() {
            return Err(notification_error("Resend API key is empty"));
        }
        let endpoint = Url::parse(endpoint)
            .map_err(|e| notification_error(&format!("Invalid email endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            endpoint,
        })
    }

    /// JSON body Resend expects for `email`
    pub fn request_body(&self, email: &OutgoingEmail) -> serde_json::Value {
        let mut body = json!({
            "from": self.from,
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });
        if !email.attachments.is_empty() {
            body["attachments"] = json!(email.attachments);
        }
        body
    }
}

#[async_trait]
impl NotificationDispatcher for ResendDispatcher {
    async fn send(&self, email: &OutgoingEmail) -> MementoResult<()> {
        debug!("Sending '{}' to {}", email.subject, email.to);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&self.request_body(email))
            .send()
            .await
            .map_err(|e| notification_error(&format!("Failed to reach email provider: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(notification_error(&format!(
                "Email provider rejected message: HTTP {} - {}",
                status, error_body
            )));
        }

        info!("Email '{}' accepted for {}", email.subject, email.to);
        Ok(())
    }
}

/// Check an address the way the signup form does: something@domain.tld, no spaces
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "ana@example.com".to_string(),
            subject: "Hola".to_string(),
            html: "<p>Hola</p>".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let dispatcher = ResendDispatcher::new("re_test", "noreply@memento.com").unwrap();
        let body = dispatcher.request_body(&email());

        assert_eq!(body["from"], "noreply@memento.com");
        assert_eq!(body["to"][0], "ana@example.com");
        assert_eq!(body["subject"], "Hola");
        assert!(body.get("attachments").is_none());

        let mut with_file = email();
        with_file.attachments.push(EmailAttachment {
            filename: "memento-backup-2024-06-10.txt".to_string(),
            content: "ZGF0YQ==".to_string(),
        });
        let body = dispatcher.request_body(&with_file);
        assert_eq!(body["attachments"][0]["filename"], "memento-backup-2024-06-10.txt");
    }

    #[test]
    fn test_rejects_bad_setup() {
        assert!(ResendDispatcher::new("  ", "noreply@memento.com").is_err());
        assert!(ResendDispatcher::with_endpoint("re_test", "a@b.com", "not a url").is_err());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.es"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("ana @example.com"));
        assert!(!is_valid_email("ana@.com"));
    }
}
