use std::path::Path;
use std::time::Duration;

use sheetbot_core::compose::compose_catalog;
use sheetbot_core::config::DeliveryConfig;
use sheetbot_core::dates::{PeriodPreset, parse_user_date, parse_user_range, yesterday_of};
use sheetbot_core::error::Result;
use sheetbot_core::render::Messages;
use sheetbot_core::{
    Config, NotificationSink, Rendered, Renderer, ReportEngine, ReportKind, ReportResult,
    ScheduleState, Target, TickOutcome, Trigger, tick,
};
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::adapters::{AnySource, open_sink, open_source};

fn open_engine(config_path: Option<&Path>) -> Result<ReportEngine<AnySource>> {
    let config = Config::resolve(config_path)?;
    let source = open_source(&config.source)?;
    Ok(ReportEngine::new(source, config))
}

/// Wall clock in the report time zone.
fn local_now(config: &Config) -> Result<OffsetDateTime> {
    Ok(OffsetDateTime::now_utc().to_offset(config.schedule.utc_offset()?))
}

fn target_of(chat: Option<i64>) -> Target {
    chat.map_or(Target::Console, Target::Chat)
}

async fn send(config: &Config, message: &Rendered, target: Target) -> Result<()> {
    let sink = open_sink(&config.delivery, target)?;
    sink.deliver(message, target).await.map_err(|e| {
        error!(%target, error = %e, "delivery failed");
        e.into()
    })
}

async fn publish(
    engine: &ReportEngine<AnySource>,
    result: ReportResult,
    chat: Option<i64>,
) -> Result<()> {
    if let Some(e) = result.error() {
        warn!(kind = ?result.kind(), error = %e, "report failed");
    }
    let message = engine.renderer().render(&result);
    send(engine.config(), &message, target_of(chat)).await
}

pub async fn handle_daily(
    config_path: Option<&Path>,
    chat: Option<i64>,
    date: Option<String>,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let now = local_now(engine.config())?;
    let result = match date {
        None => engine.daily(yesterday_of(now)).await,
        Some(text) => match parse_user_date(&text, now.year()) {
            Ok(day) => engine.daily(day).await,
            Err(e) => ReportResult::failure(ReportKind::Daily, e),
        },
    };
    publish(&engine, result, chat).await
}

pub async fn handle_period(
    config_path: Option<&Path>,
    chat: Option<i64>,
    range: Option<String>,
    preset: Option<PeriodPreset>,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let now = local_now(engine.config())?;
    let range = match range {
        Some(text) => parse_user_range(&text, now.year()),
        None => {
            let preset = preset.unwrap_or(PeriodPreset::Week);
            Ok(preset.range(yesterday_of(now), engine.config().available_from()?))
        }
    };
    let result = match range {
        Ok(range) => engine.period(range).await,
        Err(e) => ReportResult::failure(ReportKind::Period, e),
    };
    publish(&engine, result, chat).await
}

pub async fn handle_project(
    config_path: Option<&Path>,
    chat: Option<i64>,
    tag: String,
    range: String,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let now = local_now(engine.config())?;
    let result = match parse_user_range(&range, now.year()) {
        Ok(range) => engine.project(&tag, range).await,
        Err(e) => ReportResult::failure(ReportKind::Project, e),
    };
    publish(&engine, result, chat).await
}

pub async fn handle_secondary(
    config_path: Option<&Path>,
    chat: Option<i64>,
    date: Option<String>,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let now = local_now(engine.config())?;
    let result = match date {
        None => engine.secondary(yesterday_of(now)).await,
        Some(text) => match parse_user_date(&text, now.year()) {
            Ok(day) => engine.secondary(day).await,
            Err(e) => ReportResult::failure(ReportKind::Secondary, e),
        },
    };
    publish(&engine, result, chat).await
}

pub async fn handle_projects(config_path: Option<&Path>, chat: Option<i64>) -> Result<()> {
    let config = Config::resolve(config_path)?;
    // the catalog needs no sheet access
    let result = compose_catalog(&config.catalog);
    let message = Renderer::new(&config.templates, &config.messages).render(&result);
    send(&config, &message, target_of(chat)).await
}

/// Goes to the scheduled-report chat unless told otherwise, so it exercises that wiring.
fn test_delivery_target(chat: Option<i64>, delivery: &DeliveryConfig) -> Target {
    target_of(chat.or(delivery.group_chat_id).or(delivery.admin_chat_id))
}

fn test_delivery_message(messages: &Messages, target: Target) -> Rendered {
    match target {
        Target::Chat(id) => messages.for_test(&id.to_string()),
        Target::Console => messages.for_test(&target.to_string()),
    }
}

pub async fn handle_test_delivery(config_path: Option<&Path>, chat: Option<i64>) -> Result<()> {
    let config = Config::resolve(config_path)?;
    let target = test_delivery_target(chat, &config.delivery);
    let message = test_delivery_message(&config.messages, target);
    send(&config, &message, target).await?;
    info!(%target, "test message delivered");
    Ok(())
}

pub async fn handle_serve(config_path: Option<&Path>, chat: Option<i64>) -> Result<()> {
    let engine = open_engine(config_path)?;
    let schedule = &engine.config().schedule;
    let offset = schedule.utc_offset()?;
    let trigger = Trigger::from(schedule);
    let target = target_of(chat.or(engine.config().delivery.group_chat_id));
    let sink = open_sink(&engine.config().delivery, target)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(schedule.tick_seconds));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut state = ScheduleState::default();
    info!(
        hour = trigger.hour,
        minute = trigger.minute,
        timezone = %schedule.timezone,
        %target,
        "scheduler started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = OffsetDateTime::now_utc().to_offset(offset);
                let (next, outcome) = tick(&engine, &sink, target, trigger, state, now).await;
                state = next;
                if let TickOutcome::DeliveryFailed(e) = outcome {
                    warn!(error = %e, "will retry on the next tick");
                }
            }
            signal = &mut shutdown => {
                signal?;
                info!("interrupted, stopping scheduler");
                break;
            }
        }
    }
    Ok(())
}
