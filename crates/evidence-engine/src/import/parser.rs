use std::collections::BTreeMap;
use std::io::Read;

use tracing::warn;

use crate::observations::{
    ConditionPayload, DurationBucket, EntryTags, GastrointestinalDetails, Measurement,
    MeasurementReading, MigraineDetails, MoodDetails, ObservationEntry, PainDetails, PainType,
    RefluxDetails, RespiratoryDetails, SleepDetails, StoolPattern, TimeOfDay,
};

type Row = BTreeMap<String, String>;

/// Payload cells of one row that share a `<kind>.` prefix, keyed by field name.
struct PayloadCells<'r> {
    cells: BTreeMap<&'r str, &'r str>,
}

impl<'r> PayloadCells<'r> {
    fn flag(&self, field: &str) -> Option<bool> {
        self.cells.get(field).and_then(|value| parse_bool(value))
    }

    fn number(&self, field: &str) -> Option<f32> {
        self.cells
            .get(field)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|value| value.is_finite())
    }

    fn text(&self, field: &str) -> Option<&'r str> {
        self.cells.get(field).copied()
    }
}

fn reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn parse_entries<R: Read>(source: R) -> Result<Vec<ObservationEntry>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut entries = Vec::new();

    for (index, record) in csv_reader.deserialize::<Row>().enumerate() {
        let row = record?;
        entries.push(entry_from_row(index + 1, &row));
    }

    Ok(entries)
}

fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn entry_from_row(line: usize, row: &Row) -> ObservationEntry {
    let id = cell(row, "id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("row-{line}"));

    ObservationEntry {
        id,
        timestamp: cell(row, "timestamp").map(str::to_string),
        condition_key: cell(row, "condition")
            .or_else(|| cell(row, "condition_key"))
            .map(str::to_string),
        severity: cell(row, "severity").and_then(|value| value.parse::<u8>().ok()),
        notes: cell(row, "notes").unwrap_or_default().to_string(),
        payload: payload_from_row(line, row),
        tags: EntryTags {
            flare_up: cell(row, "flare_up").and_then(parse_bool),
            duration: cell(row, "duration").and_then(DurationBucket::parse),
            time_of_day: cell(row, "time_of_day").and_then(TimeOfDay::parse),
        },
    }
}

/// The first payload kind (in column-name order) with a populated cell wins.
fn payload_from_row(line: usize, row: &Row) -> Option<ConditionPayload> {
    let mut kinds: BTreeMap<&str, PayloadCells<'_>> = BTreeMap::new();
    for (column, value) in row {
        let Some((kind, field)) = column.split_once('.') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        kinds
            .entry(kind)
            .or_insert_with(|| PayloadCells {
                cells: BTreeMap::new(),
            })
            .cells
            .insert(field, value);
    }

    if kinds.len() > 1 {
        warn!(
            line,
            kinds = ?kinds.keys().collect::<Vec<_>>(),
            "row carries more than one payload kind, keeping the first"
        );
    }

    kinds.into_iter().find_map(|(kind, cells)| {
        let payload = build_payload(kind, &cells);
        if payload.is_none() {
            warn!(line, kind, "unknown payload kind");
        }
        payload
    })
}

fn build_payload(kind: &str, cells: &PayloadCells<'_>) -> Option<ConditionPayload> {
    let payload = match kind {
        "migraine" => ConditionPayload::Migraine(MigraineDetails {
            prostrating: cells.flag("prostrating"),
            duration_hours: cells.number("duration_hours"),
            aura: cells.flag("aura"),
            nausea: cells.flag("nausea"),
            light_sensitivity: cells.flag("light_sensitivity"),
            missed_work: cells.flag("missed_work"),
        }),
        "pain" => ConditionPayload::Pain(PainDetails {
            pain_type: cells.text("pain_type").and_then(PainType::parse),
            radiating: cells.flag("radiating"),
            muscle_spasm: cells.flag("muscle_spasm"),
            abnormal_gait: cells.flag("abnormal_gait"),
            bed_rest_days: cells.number("bed_rest_days"),
        }),
        "gastrointestinal" => ConditionPayload::Gastrointestinal(GastrointestinalDetails {
            abdominal_pain: cells.flag("abdominal_pain"),
            related_to_defecation: cells.flag("related_to_defecation"),
            stool_frequency_change: cells.flag("stool_frequency_change"),
            stool_form_change: cells.flag("stool_form_change"),
            stool_pattern: cells.text("stool_pattern").and_then(StoolPattern::parse),
        }),
        "reflux" => ConditionPayload::Reflux(RefluxDetails {
            heartburn: cells.flag("heartburn"),
            regurgitation: cells.flag("regurgitation"),
            dysphagia: cells.flag("dysphagia"),
            substernal_pain: cells.flag("substernal_pain"),
            vomiting: cells.flag("vomiting"),
            hematemesis_or_melena: cells.flag("hematemesis_or_melena"),
            weight_loss: cells.flag("weight_loss"),
        }),
        "sleep" => ConditionPayload::Sleep(SleepDetails {
            hours_slept: cells.number("hours_slept"),
            daytime_hypersomnolence: cells.flag("daytime_hypersomnolence"),
            breathing_device_used: cells.flag("breathing_device_used"),
            respiratory_failure: cells.flag("respiratory_failure"),
        }),
        "mood" => ConditionPayload::Mood(MoodDetails {
            panic_attack: cells.flag("panic_attack"),
            depressed_mood: cells.flag("depressed_mood"),
            sleep_impairment: cells.flag("sleep_impairment"),
            memory_impairment: cells.flag("memory_impairment"),
            suicidal_ideation: cells.flag("suicidal_ideation"),
            impaired_impulse_control: cells.flag("impaired_impulse_control"),
            hallucinations: cells.flag("hallucinations"),
            self_care_neglect: cells.flag("self_care_neglect"),
            missed_work: cells.flag("missed_work"),
        }),
        "respiratory" => ConditionPayload::Respiratory(RespiratoryDetails {
            rescue_inhaler_used: cells.flag("rescue_inhaler_used"),
            daily_controller_used: cells.flag("daily_controller_used"),
            oral_steroid_course: cells.flag("oral_steroid_course"),
            physician_visit_for_exacerbation: cells.flag("physician_visit_for_exacerbation"),
        }),
        _ => return None,
    };
    Some(payload)
}

pub(crate) fn parse_measurements<R: Read>(source: R) -> Result<Vec<Measurement>, csv::Error> {
    let mut csv_reader = reader(source);
    let mut measurements = Vec::new();

    for (index, record) in csv_reader.deserialize::<Row>().enumerate() {
        let row = record?;
        let line = index + 1;
        match reading_from_row(&row) {
            Some(reading) => measurements.push(Measurement {
                id: cell(&row, "id")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("row-{line}")),
                timestamp: cell(&row, "timestamp").map(str::to_string),
                reading,
            }),
            None => warn!(line, "skipping measurement row without a usable reading"),
        }
    }

    Ok(measurements)
}

fn reading_from_row(row: &Row) -> Option<MeasurementReading> {
    let number = |column: &str| {
        cell(row, column)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|value| value.is_finite())
    };
    let pressure = |column: &str| cell(row, column).and_then(|value| value.parse::<u16>().ok());

    let kind = cell(row, "kind")?.to_ascii_lowercase().replace([' ', '-'], "_");
    match kind.as_str() {
        "blood_pressure" | "bp" => Some(MeasurementReading::BloodPressure {
            systolic: pressure("systolic")?,
            diastolic: pressure("diastolic")?,
        }),
        "forward_flexion" | "flexion" => Some(MeasurementReading::ForwardFlexion {
            degrees: number("degrees")?,
        }),
        "fev1" | "fev_1" => Some(MeasurementReading::Fev1 {
            percent_predicted: number("percent_predicted")?,
        }),
        _ => None,
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
