use chrono::{Duration, NaiveDateTime};
use tracing::trace;

use super::domain::{
    ConditionPayload, Measurement, MeasurementKind, MeasurementReading, ObservationEntry,
};
use super::normalizer::normalize_tag;
use super::store::EvidenceSnapshot;
use super::timestamp::parse_timestamp;
use crate::conditions::ConditionKey;

/// Routes entries and measurements to one condition.
///
/// A populated payload decides on its own; only payload-free entries fall back
/// to the free-text tag, compared against the slug, the diagnostic code and the
/// aliases (aliases are stored already normalized).
#[derive(Debug, Clone, Copy)]
pub struct LogSelector {
    pub condition: ConditionKey,
    pub aliases: &'static [&'static str],
    pub measurements: &'static [MeasurementKind],
}

impl LogSelector {
    pub fn matches(&self, entry: &ObservationEntry) -> bool {
        match &entry.payload {
            Some(payload) => payload.condition() == self.condition,
            None => entry
                .condition_key
                .as_deref()
                .map(|tag| self.matches_tag(tag))
                .unwrap_or(false),
        }
    }

    pub fn matches_tag(&self, tag: &str) -> bool {
        let normalized = normalize_tag(tag);
        normalized == self.condition.slug()
            || normalized == self.condition.code()
            || self.aliases.contains(&normalized.as_str())
    }

    pub fn consumes(&self, kind: MeasurementKind) -> bool {
        self.measurements.contains(&kind)
    }

    pub fn select<'a>(&self, snapshot: &EvidenceSnapshot<'a>) -> Selection<'a> {
        let mut entries = Vec::new();
        let mut excluded_entries = 0;

        for entry in snapshot.entries.iter().filter(|entry| self.matches(entry)) {
            match well_formed(entry) {
                Some((recorded_at, severity)) => entries.push(SelectedEntry {
                    entry,
                    recorded_at,
                    severity,
                }),
                None => excluded_entries += 1,
            }
        }

        let mut measurements: Vec<SelectedMeasurement<'a>> = snapshot
            .measurements
            .iter()
            .filter(|measurement| self.consumes(measurement.reading.kind()))
            .filter(|measurement| measurement.reading.is_well_formed())
            .filter_map(|measurement| {
                let recorded_at = measurement.timestamp.as_deref().and_then(parse_timestamp)?;
                Some(SelectedMeasurement {
                    measurement,
                    recorded_at,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        measurements.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.measurement.id.cmp(&b.measurement.id))
        });

        trace!(
            condition = self.condition.slug(),
            entries = entries.len(),
            measurements = measurements.len(),
            excluded_entries,
            "selected condition evidence"
        );

        Selection {
            entries,
            measurements,
            excluded_entries,
        }
    }
}

/// Timestamp and in-range severity, or `None` when the entry is malformed.
pub(crate) fn well_formed(entry: &ObservationEntry) -> Option<(NaiveDateTime, u8)> {
    let recorded_at = entry.timestamp.as_deref().and_then(parse_timestamp)?;
    let severity = entry.valid_severity()?;
    Some((recorded_at, severity))
}

#[derive(Debug, Clone, Copy)]
pub struct SelectedEntry<'a> {
    pub entry: &'a ObservationEntry,
    pub recorded_at: NaiveDateTime,
    pub severity: u8,
}

impl<'a> SelectedEntry<'a> {
    pub fn payload(&self) -> Option<&'a ConditionPayload> {
        self.entry.payload.as_ref()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectedMeasurement<'a> {
    pub measurement: &'a Measurement,
    pub recorded_at: NaiveDateTime,
}

impl SelectedMeasurement<'_> {
    pub fn reading(&self) -> MeasurementReading {
        self.measurement.reading
    }
}

/// Chronologically ordered evidence for one condition.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub entries: Vec<SelectedEntry<'a>>,
    pub measurements: Vec<SelectedMeasurement<'a>>,
    /// Entries that matched the condition but lacked a timestamp or severity.
    pub excluded_entries: usize,
}

impl<'a> Selection<'a> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.measurements.is_empty()
    }

    pub fn evidence_count(&self) -> usize {
        self.entries.len() + self.measurements.len()
    }

    pub fn earliest(&self) -> Option<NaiveDateTime> {
        let entry = self.entries.first().map(|selected| selected.recorded_at);
        let measurement = self.measurements.first().map(|selected| selected.recorded_at);
        match (entry, measurement) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Anchor for every rolling window; never the wall clock.
    pub fn latest(&self) -> Option<NaiveDateTime> {
        let entry = self.entries.last().map(|selected| selected.recorded_at);
        let measurement = self.measurements.last().map(|selected| selected.recorded_at);
        match (entry, measurement) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Days between the first and last record, fractional.
    pub fn span_days(&self) -> f64 {
        match (self.earliest(), self.latest()) {
            (Some(first), Some(last)) => (last - first).num_seconds().max(0) as f64 / 86_400.0,
            _ => 0.0,
        }
    }

    /// Every run of entries spanning at most `days`, one ending at each entry.
    ///
    /// Window metrics take the best of these, so a later record never pushes
    /// earlier evidence out of consideration.
    pub fn rolling_windows(
        &self,
        days: i64,
    ) -> impl Iterator<Item = &[SelectedEntry<'a>]> + '_ {
        let span = Duration::days(days);
        let mut start = 0;
        (0..self.entries.len()).map(move |end| {
            let cutoff = self.entries[end].recorded_at - span;
            while self.entries[start].recorded_at < cutoff {
                start += 1;
            }
            &self.entries[start..=end]
        })
    }

    pub fn payloads(&self) -> impl Iterator<Item = (&SelectedEntry<'a>, &'a ConditionPayload)> + '_ {
        self.entries
            .iter()
            .filter_map(|selected| selected.payload().map(|payload| (selected, payload)))
    }
}
