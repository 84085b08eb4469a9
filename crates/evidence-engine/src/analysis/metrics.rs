use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::observations::{SelectedEntry, Selection};

pub const DAYS_PER_WEEK: f64 = 7.0;
pub const DAYS_PER_MONTH: f64 = 30.0;
pub const DAYS_PER_YEAR: i64 = 365;

pub const TOTAL_ENTRIES: &str = "total_entries";
pub const EXCLUDED_ENTRIES: &str = "excluded_entries";
pub const MEASUREMENTS: &str = "measurements";
pub const AVERAGE_SEVERITY: &str = "average_severity";
pub const MAX_SEVERITY: &str = "max_severity";
pub const SPAN_DAYS: &str = "span_days";
pub const FLARE_UPS: &str = "flare_ups";
pub const MOST_COMMON_TIME_OF_DAY: &str = "most_common_time_of_day";

/// Metrics every condition with data receives before its own aggregator runs.
pub const GENERIC_METRICS: &[&str] = &[
    TOTAL_ENTRIES,
    EXCLUDED_ENTRIES,
    MEASUREMENTS,
    AVERAGE_SEVERITY,
    MAX_SEVERITY,
    SPAN_DAYS,
    FLARE_UPS,
    MOST_COMMON_TIME_OF_DAY,
];

/// One computed summary value.
///
/// `Unreported` is distinct from zero or `false`: no matched entry answered the
/// underlying question at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Count(u32),
    Flag(bool),
    Category(String),
    Unreported,
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Count(count) => Some(f64::from(*count)),
            _ => None,
        }
    }

    pub const fn is_reported(&self) -> bool {
        !matches!(self, Self::Unreported)
    }

    pub fn display(&self) -> String {
        match self {
            Self::Number(value) => format_number(*value),
            Self::Count(count) => count.to_string(),
            Self::Flag(true) => "yes".to_string(),
            Self::Flag(false) => "no".to_string(),
            Self::Category(value) => value.clone(),
            Self::Unreported => "not reported".to_string(),
        }
    }
}

/// Render a number with at most two decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let rendered = format!("{value:.2}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Named metrics for a single analysis call, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricsBag(BTreeMap<&'static str, MetricValue>);

impl MetricsBag {
    pub fn insert(&mut self, key: &'static str, value: MetricValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetricValue::as_number)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetricValue)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }

    pub fn count(&mut self, key: &'static str, count: usize) {
        self.insert(key, MetricValue::Count(saturating_u32(count)));
    }

    pub fn count_or_unreported(&mut self, key: &'static str, count: Option<usize>) {
        let value = count
            .map(|count| MetricValue::Count(saturating_u32(count)))
            .unwrap_or(MetricValue::Unreported);
        self.insert(key, value);
    }

    pub fn number_or_unreported(&mut self, key: &'static str, value: Option<f64>) {
        let value = value
            .filter(|value| value.is_finite())
            .map(MetricValue::Number)
            .unwrap_or(MetricValue::Unreported);
        self.insert(key, value);
    }

    /// Count of "yes" answers, or `Unreported` when nobody answered.
    pub fn answered_count(&mut self, key: &'static str, tally: Tally) {
        let value = if tally.answered() == 0 {
            MetricValue::Unreported
        } else {
            MetricValue::Count(saturating_u32(tally.yes))
        };
        self.insert(key, value);
    }

    /// Share of "yes" among answered questions, or `Unreported`.
    pub fn answered_share(&mut self, key: &'static str, tally: Tally) {
        self.number_or_unreported(key, tally.share());
    }

    pub fn category(&mut self, key: &'static str, value: Option<&str>) {
        let value = value
            .map(|value| MetricValue::Category(value.to_string()))
            .unwrap_or(MetricValue::Unreported);
        self.insert(key, value);
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Yes/no/unanswered tally of an optional boolean question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub yes: usize,
    pub no: usize,
    pub unanswered: usize,
}

impl Tally {
    pub fn from_answers<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        answers
            .into_iter()
            .fold(Self::default(), |mut tally, answer| {
                match answer {
                    Some(true) => tally.yes += 1,
                    Some(false) => tally.no += 1,
                    None => tally.unanswered += 1,
                }
                tally
            })
    }

    pub const fn answered(&self) -> usize {
        self.yes + self.no
    }

    pub fn share(&self) -> Option<f64> {
        match self.answered() {
            0 => None,
            answered => Some(self.yes as f64 / answered as f64),
        }
    }
}

/// Occurrences per period over the span actually covered by the log.
///
/// A span shorter than one period counts as one period, so a freshly started
/// log is neither inflated nor divided by zero.
pub fn rate_per_period(count: usize, span_days: f64, period_days: f64) -> f64 {
    let periods = span_days.max(period_days) / period_days;
    count as f64 / periods
}

/// Most frequent value; ties resolve to the alphabetically smallest label.
pub fn most_frequent<I>(values: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'static str>,
{
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&'static str, usize)>, (value, count)| {
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((value, count)),
            }
        })
        .map(|(value, _)| value)
}

/// Lower median, deterministic for even-length inputs.
pub fn lower_median(mut values: Vec<f64>) -> Option<f64> {
    values.retain(|value| value.is_finite());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[(values.len() - 1) / 2])
}

pub(crate) fn record_generic(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let entries = &selection.entries;

    bag.count(TOTAL_ENTRIES, entries.len());
    bag.count(EXCLUDED_ENTRIES, selection.excluded_entries);
    bag.count(MEASUREMENTS, selection.measurements.len());
    bag.insert(SPAN_DAYS, MetricValue::Number(selection.span_days()));

    if entries.is_empty() {
        bag.insert(AVERAGE_SEVERITY, MetricValue::Unreported);
        bag.insert(MAX_SEVERITY, MetricValue::Unreported);
    } else {
        let total: u32 = entries.iter().map(|selected| u32::from(selected.severity)).sum();
        let max = entries
            .iter()
            .map(|selected| selected.severity)
            .max()
            .unwrap_or_default();
        bag.insert(
            AVERAGE_SEVERITY,
            MetricValue::Number(f64::from(total) / entries.len() as f64),
        );
        bag.insert(MAX_SEVERITY, MetricValue::Count(u32::from(max)));
    }

    bag.answered_count(
        FLARE_UPS,
        Tally::from_answers(entries.iter().map(|selected| selected.entry.tags.flare_up)),
    );
    bag.category(
        MOST_COMMON_TIME_OF_DAY,
        most_frequent(
            entries
                .iter()
                .filter_map(|selected| selected.entry.tags.time_of_day)
                .map(|time| time.label()),
        ),
    );
}

/// Tally an optional answer across a set of selected entries.
pub(crate) fn tally<'e, 'a: 'e, I, F>(entries: I, answer: F) -> Tally
where
    I: IntoIterator<Item = &'e SelectedEntry<'a>>,
    F: Fn(&SelectedEntry<'a>) -> Option<bool>,
{
    Tally::from_answers(entries.into_iter().map(answer))
}

/// Tally of the rolling window with the most "yes" answers.
///
/// Ties prefer the window with more answers, so the result is `Unreported`
/// only when no entry answered at all.
pub(crate) fn busiest_window<'a, F>(selection: &Selection<'a>, days: i64, answer: F) -> Tally
where
    F: Fn(&SelectedEntry<'a>) -> Option<bool>,
{
    selection
        .rolling_windows(days)
        .map(|window| tally(window, &answer))
        .max_by_key(|tally| (tally.yes, tally.answered()))
        .unwrap_or_default()
}

/// Distinct calendar days with a "yes" answer, or `None` when nobody answered.
pub(crate) fn days_answered_yes<'e, 'a: 'e, I, F>(entries: I, answer: F) -> Option<usize>
where
    I: IntoIterator<Item = &'e SelectedEntry<'a>>,
    F: Fn(&SelectedEntry<'a>) -> Option<bool>,
{
    let mut answered = false;
    let mut days = BTreeSet::new();
    for selected in entries {
        match answer(selected) {
            Some(true) => {
                answered = true;
                days.insert(selected.recorded_at.date());
            }
            Some(false) => answered = true,
            None => {}
        }
    }
    answered.then_some(days.len())
}
