//! Trend advisories over the most recent window of journal entries.
//!
//! The advisory is resolved from an ordered rule list: the first rule whose
//! condition holds wins, otherwise the window is reported as stable. Rule
//! order and thresholds are data (see `AdvisoryRules`), so both the
//! two-rule and the trend-aware behaviours are plain configurations.

use crate::record::AnkleRecord;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    FrequentSprain,
    HighPain,
    RisingTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Sprain and pain checks only.
    Basic,
    #[default]
    Trend,
}

impl Preset {
    pub fn rules(self) -> &'static [RuleKind] {
        match self {
            Preset::Basic => &[RuleKind::FrequentSprain, RuleKind::HighPain],
            Preset::Trend => &[
                RuleKind::FrequentSprain,
                RuleKind::HighPain,
                RuleKind::RisingTrend,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryRules {
    pub priority: Vec<RuleKind>,
    pub window: usize,
    pub sprain_threshold: usize,
    pub pain_threshold: f64,
    pub trend_delta: i64,
}

impl AdvisoryRules {
    pub fn preset(preset: Preset) -> Self {
        Self {
            priority: preset.rules().to_vec(),
            ..Self::default()
        }
    }
}

impl Default for AdvisoryRules {
    fn default() -> Self {
        Self {
            priority: Preset::Trend.rules().to_vec(),
            window: 7,
            sprain_threshold: 2,
            pain_threshold: 6.0,
            trend_delta: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// No entries at all: prompt for the first one.
    NoData,
    FrequentSprain,
    HighPain,
    RisingTrend,
    Stable,
}

impl Advisory {
    pub fn is_warning(self) -> bool {
        matches!(
            self,
            Advisory::FrequentSprain | Advisory::HighPain | Advisory::RisingTrend
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            Advisory::NoData => "No entries yet. Record today's ankle to get started.",
            Advisory::FrequentSprain => {
                "Sprains have been frequent recently. Your ankle needs care."
            }
            Advisory::HighPain => {
                "Pain has been high recently. Consider consulting a specialist."
            }
            Advisory::RisingTrend => "Pain is trending upward. Keep an eye on it.",
            Advisory::Stable => "Your ankle has been stable recently.",
        }
    }
}

/// Aggregates over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendStats {
    pub entries: usize,
    pub avg_pain: Option<f64>,
    pub incident_count: usize,
    pub trend_increase: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub stats: TrendStats,
    pub advisory: Advisory,
}

/// Last `size` records by date, oldest first.
pub fn window(records: &[AnkleRecord], size: usize) -> Vec<AnkleRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);
    let skip = sorted.len().saturating_sub(size);
    sorted.split_off(skip)
}

/// Statistics over an already windowed, date-ordered slice.
pub fn compute_stats(window: &[AnkleRecord], trend_delta: i64) -> TrendStats {
    let entries = window.len();
    let avg_pain = if entries == 0 {
        None
    } else {
        let total: u32 = window.iter().map(|r| u32::from(r.pain.get())).sum();
        Some(f64::from(total) / entries as f64)
    };
    let incident_count = window.iter().filter(|r| r.sprain.occurred()).count();
    let trend_increase = match (window.first(), window.last()) {
        (Some(first), Some(last)) if entries >= 2 => {
            i64::from(last.pain.get()) - i64::from(first.pain.get()) >= trend_delta
        }
        _ => false,
    };
    TrendStats {
        entries,
        avg_pain,
        incident_count,
        trend_increase,
    }
}

fn rule_holds(rule: RuleKind, stats: &TrendStats, rules: &AdvisoryRules) -> bool {
    match rule {
        RuleKind::FrequentSprain => stats.incident_count >= rules.sprain_threshold,
        RuleKind::HighPain => stats.avg_pain.is_some_and(|p| p >= rules.pain_threshold),
        RuleKind::RisingTrend => stats.trend_increase,
    }
}

fn advisory_for(rule: RuleKind) -> Advisory {
    match rule {
        RuleKind::FrequentSprain => Advisory::FrequentSprain,
        RuleKind::HighPain => Advisory::HighPain,
        RuleKind::RisingTrend => Advisory::RisingTrend,
    }
}

pub fn resolve_advisory(stats: &TrendStats, rules: &AdvisoryRules) -> Advisory {
    if stats.entries == 0 {
        return Advisory::NoData;
    }
    rules
        .priority
        .iter()
        .copied()
        .find(|rule| rule_holds(*rule, stats, rules))
        .map(advisory_for)
        .unwrap_or(Advisory::Stable)
}

/// Window, aggregate and resolve in one pass. Records may be in any order.
pub fn analyze(records: &[AnkleRecord], rules: &AdvisoryRules) -> Analysis {
    let recent = window(records, rules.window);
    let stats = compute_stats(&recent, rules.trend_delta);
    let advisory = resolve_advisory(&stats, rules);
    Analysis { stats, advisory }
}
