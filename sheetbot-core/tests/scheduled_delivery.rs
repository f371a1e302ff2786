use std::cell::{Cell, RefCell};

use sheetbot_core::error::DeliveryError;
use sheetbot_core::{
    Config, Grid, NotificationSink, Rendered, ReportEngine, ScheduleState, SheetKind,
    StaticGridSource, Target, TickOutcome, Trigger, tick,
};
use time::macros::{date, datetime};

#[derive(Default)]
struct RecordingSink {
    sent: RefCell<Vec<(Target, Rendered)>>,
    fail_next: Cell<bool>,
}

impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &Rendered, target: Target) -> Result<(), DeliveryError> {
        if self.fail_next.replace(false) {
            return Err(DeliveryError::Transport("connection reset".into()));
        }
        self.sent.borrow_mut().push((target, message.clone()));
        Ok(())
    }
}

fn secondary_sheet() -> Grid {
    Grid::from_rows([
        vec!["Проект", "Статус", "Объем", "Остаток", "Выдано", "", "Выдано 01.11.24"],
        vec!["Alpha", "TRUE", "10 000", "4 000", "6 000", "", "120"],
        vec!["Beta", "FALSE", "1", "1", "1", "", "1"],
    ])
}

fn engine() -> ReportEngine<StaticGridSource> {
    let source = StaticGridSource::new().with(SheetKind::Secondary, secondary_sheet());
    ReportEngine::new(source, Config::default())
}

const TRIGGER: Trigger = Trigger { hour: 9, minute: 0 };
const GROUP: Target = Target::Chat(-100123);

#[tokio::test]
async fn delivers_once_per_day() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut state = ScheduleState::default();

    for now in [
        datetime!(2024-11-02 08:59:10 +3),
        datetime!(2024-11-02 09:00:05 +3),
        datetime!(2024-11-02 09:00:59 +3),
    ] {
        let (next, _) = tick(&engine, &sink, GROUP, TRIGGER, state, now).await;
        state = next;
    }

    let sent = sink.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, GROUP);
    assert!(sent[0].1.markdown);
    assert!(sent[0].1.text.contains("*Alpha*"));
    assert!(!sent[0].1.text.contains("Beta"));
    assert_eq!(state.last_sent, Some(date!(2024 - 11 - 02)));
}

#[tokio::test]
async fn failed_delivery_keeps_guard_unset_and_retries() {
    let engine = engine();
    let sink = RecordingSink::default();
    sink.fail_next.set(true);

    let (state, outcome) = tick(
        &engine,
        &sink,
        GROUP,
        TRIGGER,
        ScheduleState::default(),
        datetime!(2024-11-02 09:00:01 +3),
    )
    .await;
    assert!(matches!(outcome, TickOutcome::DeliveryFailed(_)));
    assert_eq!(state, ScheduleState::default());

    let (state, outcome) = tick(
        &engine,
        &sink,
        GROUP,
        TRIGGER,
        state,
        datetime!(2024-11-02 09:00:56 +3),
    )
    .await;
    assert!(matches!(outcome, TickOutcome::Sent));
    assert_eq!(state.last_sent, Some(date!(2024 - 11 - 02)));
    assert_eq!(sink.sent.borrow().len(), 1);
}

#[tokio::test]
async fn missing_date_column_sends_nothing() {
    let engine = engine();
    let sink = RecordingSink::default();
    // yesterday is 02.11.24, which the sheet does not have
    let (state, outcome) = tick(
        &engine,
        &sink,
        GROUP,
        TRIGGER,
        ScheduleState::default(),
        datetime!(2024-11-03 09:00 +3),
    )
    .await;
    assert!(matches!(outcome, TickOutcome::ReportFailed(_)));
    assert_eq!(state.last_sent, None);
    assert!(sink.sent.borrow().is_empty());
}
