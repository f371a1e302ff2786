#![forbid(unsafe_code)]

pub mod error;

pub mod aggregate;
pub mod compose;
pub mod config;
pub mod dates;
pub mod domain;
pub mod engine;
pub mod grid;
pub mod parse;
pub mod profile;
pub mod render;
pub mod resolve;
pub mod schedule;
pub mod sink;
pub mod source;

// Re-exports: stable API surface
pub use config::Config;
pub use domain::{Report, ReportKind, ReportResult};
pub use engine::ReportEngine;
pub use grid::Grid;
pub use profile::{SheetKind, SheetProfile};
pub use render::{Rendered, Renderer};
pub use schedule::{ScheduleState, TickOutcome, Trigger, tick};
pub use sink::{NotificationSink, Target};
pub use source::{GridSource, StaticGridSource};
