use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use sheetbot_core::error::DeliveryError;
use sheetbot_core::render::strip_markdown;
use sheetbot_core::{NotificationSink, Rendered, Target};
use tracing::{debug, warn};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API `sendMessage`. Markdown messages the API refuses to parse are resent once as
/// plain text.
pub struct TelegramSink {
    client: Client,
    endpoint: String,
}

impl TelegramSink {
    pub fn new(api_base: &str, token: &str, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: send_message_url(api_base, token),
        })
    }

    async fn send(&self, body: &SendMessage<'_>) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;
        let status = response.status();
        let reply: ApiResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(format!("{status}: {}", e.without_url())))?;
        if reply.ok {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(
                reply.description.unwrap_or_else(|| status.to_string()),
            ))
        }
    }
}

fn send_message_url(api_base: &str, token: &str) -> String {
    format!("{}/bot{token}/sendMessage", api_base.trim_end_matches('/'))
}

impl NotificationSink for TelegramSink {
    async fn deliver(&self, message: &Rendered, target: Target) -> Result<(), DeliveryError> {
        let Target::Chat(chat_id) = target else {
            return Err(DeliveryError::Rejected("telegram needs a chat id".into()));
        };
        if !message.markdown {
            return self
                .send(&SendMessage {
                    chat_id,
                    text: &message.text,
                    parse_mode: None,
                })
                .await;
        }

        let first = self
            .send(&SendMessage {
                chat_id,
                text: &message.text,
                parse_mode: Some("Markdown"),
            })
            .await;
        match first {
            Ok(()) => {
                debug!(chat_id, "sent markdown message");
                Ok(())
            }
            Err(e) => {
                warn!(chat_id, error = %e, "markdown send failed, retrying as plain text");
                let plain = strip_markdown(&message.text);
                self.send(&SendMessage {
                    chat_id,
                    text: &plain,
                    parse_mode: None,
                })
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cannot_parse() -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        }))
    }

    fn accepted() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} }))
    }

    fn markdown(text: &str) -> Rendered {
        Rendered {
            text: text.into(),
            markdown: true,
        }
    }

    #[test]
    fn endpoint_embeds_token() {
        assert_eq!(
            send_message_url("https://api.telegram.org/", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn plain_body_omits_parse_mode() {
        let body = SendMessage {
            chat_id: -100,
            text: "hi",
            parse_mode: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"chat_id":-100,"text":"hi"}"#
        );
    }

    #[test]
    fn error_reply_carries_description() {
        let reply: ApiResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#,
        )
        .unwrap();
        assert!(!reply.ok);
        assert_eq!(
            reply.description.as_deref(),
            Some("Bad Request: can't parse entities")
        );
    }

    #[tokio::test]
    async fn console_target_is_rejected() {
        let sink = TelegramSink::new("http://127.0.0.1:9", "t", 1).unwrap();
        let err = sink
            .deliver(&Rendered::plain("x"), Target::Console)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rejected_markdown_is_resent_once_as_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .and(body_partial_json(json!({ "parse_mode": "Markdown" })))
            .respond_with(cannot_parse())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .and(body_json(json!({ "chat_id": 7, "text": "Ab" })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&server.uri(), "t", 5).unwrap();
        sink.deliver(&markdown("*A*b"), Target::Chat(7)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_plain_resend_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .respond_with(cannot_parse())
            .expect(2)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&server.uri(), "t", 5).unwrap();
        let err = sink
            .deliver(&markdown("*A*b"), Target::Chat(7))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DeliveryError::Rejected(ref d) if d.contains("can't parse")),
            "{err}"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn plain_message_is_sent_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .respond_with(cannot_parse())
            .expect(1)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(&server.uri(), "t", 5).unwrap();
        let result = sink.deliver(&Rendered::plain("A"), Target::Chat(7)).await;
        assert!(matches!(result, Err(DeliveryError::Rejected(_))));
    }
}
