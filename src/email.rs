//! Fire-and-forget transactional email via the SendGrid v3 HTTP API.
//!
//! Delivery is best-effort by design: the request handler spawns the send and
//! moves on, and failures are logged at `warn` without ever affecting the
//! primary response. When no API key is configured the mailer is a no-op,
//! which keeps local development and tests free of network traffic.

use reqwest::Client;
use serde_json::{json, Value};

const SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const FROM_ADDRESS: &str = "notifications@taskhive.dev";

#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_key: Option<String>,
}

impl Mailer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub fn send_welcome(&self, to: &str, name: &str) {
        self.dispatch(
            to,
            "Thanks for joining in!",
            &format!("Welcome to the app, {name}. Let me know how you get along with the app."),
        );
    }

    pub fn send_farewell(&self, to: &str, name: &str) {
        self.dispatch(
            to,
            "Sorry to see you go!",
            &format!("Goodbye, {name}. We hope to see you back sometime soon."),
        );
    }

    fn dispatch(&self, to: &str, subject: &str, body: &str) {
        let Some(api_key) = self.api_key.clone() else {
            log::debug!("notification sink disabled, skipping \"{subject}\" to {to}");
            return;
        };

        let payload = Self::message(to, subject, body);
        let client = self.client.clone();
        let to = to.to_string();

        tokio::spawn(async move {
            let result = client
                .post(SEND_URL)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await;
            match result {
                Ok(resp) if !resp.status().is_success() => {
                    log::warn!("notification sink rejected message to {to}: {}", resp.status());
                }
                Ok(_) => {}
                Err(err) => log::warn!("failed to deliver notification to {to}: {err}"),
            }
        });
    }

    fn message(to: &str, subject: &str, body: &str) -> Value {
        json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": FROM_ADDRESS },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_shape() {
        let payload = Mailer::message("ada@example.com", "Thanks for joining in!", "Welcome!");
        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "ada@example.com"
        );
        assert_eq!(payload["from"]["email"], FROM_ADDRESS);
        assert_eq!(payload["subject"], "Thanks for joining in!");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][0]["value"], "Welcome!");
    }
}
