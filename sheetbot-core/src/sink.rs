use std::fmt;

use crate::error::DeliveryError;
use crate::render::Rendered;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Chat(i64),
    Console,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Chat(id) => write!(f, "chat {id}"),
            Target::Console => f.write_str("console"),
        }
    }
}

/// Transmits rendered text. Errors are reported to the caller, which decides whether to log
/// them or keep a report pending.
pub trait NotificationSink {
    fn deliver(
        &self,
        message: &Rendered,
        target: Target,
    ) -> impl Future<Output = Result<(), DeliveryError>>;
}
