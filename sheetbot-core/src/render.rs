//! Template filling for report records.
//!
//! Templates are plain strings with `{slot}` placeholders. Each template may only use the
//! slots its report kind supplies; [`Templates::validate`] enforces that at config load so
//! rendering itself never fails.

use serde::{Deserialize, Serialize};

use crate::dates::display_date;
use crate::domain::{Report, ReportResult, Warning};
use crate::error::{ConfigError, ReportError};

const DAILY_SLOTS: &[&str] = &["date", "records", "deposit", "verified"];
const PERIOD_SLOTS: &[&str] = &["start_date", "end_date", "total_records", "warning"];
const PROJECT_SLOTS: &[&str] = &["project", "start_date", "end_date", "records", "warning"];
const SECONDARY_SLOTS: &[&str] = &["date", "projects_data"];
const SECONDARY_PROJECT_SLOTS: &[&str] = &[
    "name",
    "total_volume",
    "yesterday_data",
    "total_issued",
    "tariff_remaining",
];
const CATALOG_SLOTS: &[&str] = &["projects_data"];

/// Text ready for a sink. `markdown` marks text meant for Markdown parse mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub markdown: bool,
}

impl Rendered {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub daily: String,
    pub period: String,
    pub project: String,
    pub secondary: String,
    pub secondary_project: String,
    pub catalog: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            daily: "📊 *Отчет за {date}*\n\n\
                    Всего записей: {records}\n\
                    Остаток депозита: {deposit}₽\n\n\
                    Статус проверки: {verified}"
                .to_string(),
            period: "📅 *Отчет за период {start_date} - {end_date}*\n\n\
                     Всего записей: {total_records}\n\
                     {warning}"
                .to_string(),
            project: "📂 *Отчет по проекту {project}*\n\
                      За период: {start_date} - {end_date}\n\
                      Всего записей: {records}\n\
                      {warning}"
                .to_string(),
            secondary: "🔍 \\[LR конкуренты] Ежедневный отчет поступления данных за {date}:\n\n\
                        {projects_data}"
                .to_string(),
            secondary_project: "\n*{name}*\n\
                                Объем общий тариф: {total_volume}\n\
                                Выдано за вчера: {yesterday_data}\n\
                                Выдано итого: {total_issued}\n\
                                Остаток тарифа: {tariff_remaining}\n"
                .to_string(),
            catalog: "📂 *Отчет по проекту*\n\n\
                      Укажите проект и период: `project [П1] 14.10-20.10`\n\n\
                      {projects_data}"
                .to_string(),
        }
    }
}

impl Templates {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_slots("daily", &self.daily, DAILY_SLOTS)?;
        check_slots("period", &self.period, PERIOD_SLOTS)?;
        check_slots("project", &self.project, PROJECT_SLOTS)?;
        check_slots("secondary", &self.secondary, SECONDARY_SLOTS)?;
        check_slots(
            "secondary_project",
            &self.secondary_project,
            SECONDARY_PROJECT_SLOTS,
        )?;
        check_slots("catalog", &self.catalog, CATALOG_SLOTS)
    }
}

/// Localized user-facing strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub verified: String,
    pub not_verified: String,
    pub no_data_period: String,
    pub source_unavailable: String,
    /// May use `{date}`.
    pub no_data_for_date: String,
    pub invalid_date_format: String,
    pub invalid_range_format: String,
    /// May use `{project}`.
    pub unknown_project: String,
    pub no_active_projects: String,
    /// May use `{chat_id}`.
    pub test_message: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            verified: "✅ Проверено".to_string(),
            not_verified: "❌ Не проверено".to_string(),
            no_data_period: "⚠️ За указанный период данных нет. Данные доступны с 14.10.2024"
                .to_string(),
            source_unavailable: "❌ Ошибка при получении данных из таблицы: данные не найдены."
                .to_string(),
            no_data_for_date: "⚠️ Данные за {date} не найдены.".to_string(),
            invalid_date_format: "❌ Неверный формат даты. Используйте формат ДД.ММ.ГГГГ"
                .to_string(),
            invalid_range_format: "❌ Укажите период в формате: 01.11-30.11".to_string(),
            unknown_project: "❌ Проект {project} не найден. \
                              Укажите проект и период в формате: [П1] 01.11-30.11"
                .to_string(),
            no_active_projects: "⚠️ Нет активных проектов".to_string(),
            test_message: "Тестовое сообщение в группу\nChat ID группы: {chat_id}".to_string(),
        }
    }
}

impl Messages {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_slots("no_data_for_date", &self.no_data_for_date, &["date"])?;
        check_slots("unknown_project", &self.unknown_project, &["project"])?;
        check_slots("test_message", &self.test_message, &["chat_id"])?;
        for (name, text) in [
            ("verified", &self.verified),
            ("not_verified", &self.not_verified),
            ("no_data_period", &self.no_data_period),
            ("source_unavailable", &self.source_unavailable),
            ("invalid_date_format", &self.invalid_date_format),
            ("invalid_range_format", &self.invalid_range_format),
            ("no_active_projects", &self.no_active_projects),
        ] {
            check_slots(name, text, &[])?;
        }
        Ok(())
    }

    pub fn for_error(&self, error: &ReportError) -> String {
        match error {
            ReportError::SourceUnavailable(_) => self.source_unavailable.clone(),
            ReportError::NoDataForDate(date) => {
                fill(&self.no_data_for_date, &[("date", display_date(*date))])
            }
            ReportError::InvalidDateFormat(_) => self.invalid_date_format.clone(),
            ReportError::InvalidRangeFormat(_) => self.invalid_range_format.clone(),
            ReportError::UnknownProject(tag) => {
                fill(&self.unknown_project, &[("project", tag.clone())])
            }
            ReportError::NoActiveProjects => self.no_active_projects.clone(),
        }
    }

    pub fn for_test(&self, chat_id: &str) -> Rendered {
        Rendered::plain(fill(&self.test_message, &[("chat_id", chat_id.to_string())]))
    }

    fn warning(&self, warning: Option<Warning>) -> String {
        match warning {
            Some(Warning::NoDataInRange) => self.no_data_period.clone(),
            None => String::new(),
        }
    }
}

pub struct Renderer<'a> {
    templates: &'a Templates,
    messages: &'a Messages,
}

impl<'a> Renderer<'a> {
    pub fn new(templates: &'a Templates, messages: &'a Messages) -> Self {
        Self {
            templates,
            messages,
        }
    }

    pub fn render(&self, result: &ReportResult) -> Rendered {
        match result {
            ReportResult::Success(report) => Rendered {
                text: self.render_report(report).trim_end().to_string(),
                markdown: true,
            },
            ReportResult::Failure { error, .. } => Rendered::plain(self.messages.for_error(error)),
        }
    }

    fn render_report(&self, report: &Report) -> String {
        let t = self.templates;
        match report {
            Report::Daily(r) => fill(
                &t.daily,
                &[
                    ("date", display_date(r.date)),
                    ("records", r.records.to_string()),
                    ("deposit", r.deposit.to_string()),
                    ("verified", self.verified_label(r.verified)),
                ],
            ),
            Report::Period(r) => fill(
                &t.period,
                &[
                    ("start_date", display_date(r.start_date)),
                    ("end_date", display_date(r.end_date)),
                    ("total_records", r.total_records.to_string()),
                    ("warning", self.messages.warning(r.warning)),
                ],
            ),
            Report::Project(r) => fill(
                &t.project,
                &[
                    ("project", r.project.clone()),
                    ("start_date", display_date(r.start_date)),
                    ("end_date", display_date(r.end_date)),
                    ("records", r.records.to_string()),
                    ("warning", self.messages.warning(r.warning)),
                ],
            ),
            Report::Secondary(r) => {
                let projects_data: String = r
                    .projects
                    .iter()
                    .map(|p| {
                        fill(
                            &t.secondary_project,
                            &[
                                ("name", p.name.clone()),
                                ("total_volume", p.total_volume.to_string()),
                                ("yesterday_data", p.yesterday_issued.to_string()),
                                ("total_issued", p.total_issued.to_string()),
                                ("tariff_remaining", p.tariff_remaining.to_string()),
                            ],
                        )
                    })
                    .collect();
                fill(
                    &t.secondary,
                    &[
                        ("date", display_date(r.date)),
                        ("projects_data", projects_data),
                    ],
                )
            }
            Report::Catalog(entries) => {
                let listing = entries
                    .iter()
                    .map(|e| format!("{} {}", e.tag, e.label))
                    .collect::<Vec<_>>()
                    .join("\n");
                fill(&t.catalog, &[("projects_data", listing)])
            }
        }
    }

    fn verified_label(&self, verified: bool) -> String {
        if verified {
            self.messages.verified.clone()
        } else {
            self.messages.not_verified.clone()
        }
    }
}

/// Replace every `{slot}` with its value. Braces that do not form a known slot stay as-is.
pub fn fill(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            slots
                .iter()
                .find(|(slot, _)| *slot == name)
                .map(|(_, v)| (v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Slot names referenced by a template, in order of appearance.
pub fn template_slots(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_slot_name(&after[..close]) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => rest = after,
        }
    }
    names
}

/// Plain-text fallback for text the chat platform refused to parse as Markdown.
pub fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect()
}

fn is_slot_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

fn check_slots(template: &'static str, text: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    match template_slots(text).into_iter().find(|s| !allowed.contains(s)) {
        Some(slot) => Err(ConfigError::UnknownSlot {
            template,
            slot: slot.to_string(),
        }),
        None => Ok(()),
    }
}
