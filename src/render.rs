//! Plain-text screens.

use crate::analyzer::{Advisory, TrendStats};
use crate::form::Field;
use crate::record::{AnkleRecord, Choice, Footwear, ManagementAction, Occurrence, Surface};
use crate::session::{HomeView, RecordView, Screen};
use std::fmt::Write;

const BAR: char = '#';

pub fn start_screen() -> String {
    "== Ankle journal ==\n".to_string()
}

/// Shell commands accepted on `screen`.
pub fn commands(screen: Screen) -> &'static str {
    match screen {
        Screen::Start => "Commands: register <id> | login <id> | quit",
        Screen::Home => "Commands: record | logout | delete | quit",
        Screen::Record => "Commands: save [field=value ...] | cancel | quit",
    }
}

fn advisory_line(advisory: Advisory) -> String {
    let tag = if advisory.is_warning() { "warning" } else { "info" };
    format!("[{tag}] {}", advisory.message())
}

fn stats_line(stats: &TrendStats) -> String {
    let avg = stats
        .avg_pain
        .map(|p| format!("{p:.1}"))
        .unwrap_or_else(|| "-".into());
    let trend = if stats.trend_increase { "rising" } else { "flat" };
    format!(
        "last {} entries: avg pain {avg}, sprains {}, pain trend {trend}",
        stats.entries, stats.incident_count
    )
}

pub fn records_table(records: &[AnkleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>6} {:>4} {:>8}  {:<8}  {:<8}  {:<11}  {:<8}  management",
        "date", "instab", "pain", "activity", "sprain", "balance", "footwear", "surface"
    );
    for r in records {
        let management = if r.management.is_empty() {
            "-".to_string()
        } else {
            r.management.to_text()
        };
        let _ = writeln!(
            out,
            "{:<10}  {:>6} {:>4} {:>8}  {:<8}  {:<8}  {:<11}  {:<8}  {management}",
            r.date.to_string(),
            r.instability.get(),
            r.pain.get(),
            r.activity.get(),
            r.sprain.as_str(),
            r.balance.as_str(),
            r.footwear.as_str(),
            r.surface.as_str(),
        );
    }
    out
}

/// Horizontal bars for instability, pain and activity per day.
pub fn records_chart(records: &[AnkleRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let series = [
            ("instability", r.instability.get()),
            ("pain", r.pain.get()),
            ("activity", r.activity.get()),
        ];
        for (i, (label, value)) in series.into_iter().enumerate() {
            let date = if i == 0 { r.date.to_string() } else { String::new() };
            let bar: String = std::iter::repeat_n(BAR, usize::from(value)).collect();
            let _ = writeln!(out, "{date:<10}  {label:<11} {bar:<10} {value}");
        }
    }
    out
}

pub fn home_screen(view: &HomeView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Welcome, {} ==", view.user);
    let _ = writeln!(out, "{}", advisory_line(view.analysis.advisory));
    if !view.recent.is_empty() {
        let _ = writeln!(out, "{}", stats_line(&view.analysis.stats));
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent entries:");
        out.push_str(&records_table(&view.recent));
        let _ = writeln!(out);
        out.push_str(&records_chart(&view.recent));
    }
    out
}

fn choices<C: Choice>() -> String {
    C::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join("|")
}

pub fn record_screen(view: &RecordView) -> String {
    let d = &view.defaults;
    let mut out = String::new();
    let verb = if view.existing { "Edit" } else { "Record" };
    let _ = writeln!(out, "== {verb} entry for {} ({}) ==", view.date, view.user);
    let rows: [(Field, String, String); 8] = [
        (Field::Instability, d.instability.to_string(), "0-10".into()),
        (Field::Pain, d.pain.to_string(), "0-10".into()),
        (Field::Activity, d.activity.to_string(), "0-10".into()),
        (Field::Sprain, d.sprain.as_str().into(), choices::<Occurrence>()),
        (Field::Balance, d.balance.as_str().into(), choices::<Occurrence>()),
        (
            Field::Management,
            if d.management.is_empty() { "-".into() } else { d.management.to_text() },
            format!("comma list of {}", choices::<ManagementAction>()),
        ),
        (Field::Footwear, d.footwear.as_str().into(), choices::<Footwear>()),
        (Field::Surface, d.surface.as_str().into(), choices::<Surface>()),
    ];
    for (field, value, domain) in rows {
        let _ = writeln!(out, "  {:<12} {value:<20} ({domain})", field.name());
    }
    out
}
