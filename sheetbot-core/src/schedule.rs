//! Once-a-day delivery of the secondary report.
//!
//! The timer loop lives outside the core; it calls [`tick`] with the state returned by the
//! previous call. The state only advances after the sink confirms delivery, so a failed
//! attempt is retried on the next tick that is still inside the trigger minute.

use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::config::ScheduleConfig;
use crate::dates::yesterday_of;
use crate::engine::ReportEngine;
use crate::error::{DeliveryError, ReportError};
use crate::sink::{NotificationSink, Target};
use crate::source::GridSource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleState {
    /// Local date of the last confirmed scheduled delivery.
    pub last_sent: Option<Date>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub hour: u8,
    pub minute: u8,
}

impl From<&ScheduleConfig> for Trigger {
    fn from(c: &ScheduleConfig) -> Self {
        Self {
            hour: c.hour,
            minute: c.minute,
        }
    }
}

impl Trigger {
    /// `now` must already be in the report time zone.
    pub fn is_due(&self, now: OffsetDateTime, state: &ScheduleState) -> bool {
        now.hour() == self.hour
            && now.minute() == self.minute
            && state.last_sent.is_none_or(|sent| sent < now.date())
    }
}

#[derive(Debug)]
pub enum TickOutcome {
    NotDue,
    Sent,
    ReportFailed(ReportError),
    DeliveryFailed(DeliveryError),
}

pub async fn tick<S, N>(
    engine: &ReportEngine<S>,
    sink: &N,
    target: Target,
    trigger: Trigger,
    state: ScheduleState,
    now: OffsetDateTime,
) -> (ScheduleState, TickOutcome)
where
    S: GridSource,
    N: NotificationSink,
{
    if !trigger.is_due(now, &state) {
        debug!(%now, "scheduled report not due");
        return (state, TickOutcome::NotDue);
    }
    info!(%now, %target, "sending scheduled secondary report");
    let result = engine.secondary(yesterday_of(now)).await;
    if let Some(e) = result.error() {
        warn!(error = %e, "scheduled report not generated");
        return (state, TickOutcome::ReportFailed(e.clone()));
    }
    let message = engine.renderer().render(&result);
    match sink.deliver(&message, target).await {
        Ok(()) => {
            info!(date = %now.date(), "scheduled report delivered");
            (
                ScheduleState {
                    last_sent: Some(now.date()),
                },
                TickOutcome::Sent,
            )
        }
        Err(e) => {
            error!(error = %e, "scheduled report delivery failed");
            (state, TickOutcome::DeliveryFailed(e))
        }
    }
}
