use std::io::Write;

use sheetbot_core::error::DeliveryError;
use sheetbot_core::render::strip_markdown;
use sheetbot_core::{NotificationSink, Rendered, Target};
use tracing::debug;

/// Prints messages for local runs; markdown markers are dropped.
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    async fn deliver(&self, message: &Rendered, target: Target) -> Result<(), DeliveryError> {
        debug!(%target, "printing message");
        let text = if message.markdown {
            strip_markdown(&message.text)
        } else {
            message.text.clone()
        };
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}").map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
