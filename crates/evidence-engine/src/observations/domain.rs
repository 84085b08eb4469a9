use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::conditions::ConditionKey;

/// A single logged observation as handed over by the observation store.
///
/// Entries are never mutated by the engine. Every field that the user may have
/// skipped is optional so "not reported" survives all the way into the metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationEntry {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<String>,
    #[serde(default, alias = "conditionKey", alias = "condition")]
    pub condition_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub payload: Option<ConditionPayload>,
    #[serde(default)]
    pub tags: EntryTags,
}

impl ObservationEntry {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, severity: u8) -> Self {
        Self {
            id: id.into(),
            timestamp: Some(timestamp.into()),
            condition_key: None,
            severity: Some(severity),
            notes: String::new(),
            payload: None,
            tags: EntryTags::default(),
        }
    }

    pub fn tagged(mut self, condition_key: impl Into<String>) -> Self {
        self.condition_key = Some(condition_key.into());
        self
    }

    pub fn with_payload(mut self, payload: ConditionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_tags(mut self, tags: EntryTags) -> Self {
        self.tags = tags;
        self
    }

    /// Severity inside the 0-10 ordinal scale, if one was recorded.
    pub fn valid_severity(&self) -> Option<u8> {
        self.severity.filter(|value| *value <= MAX_SEVERITY)
    }
}

pub const MAX_SEVERITY: u8 = 10;

// A value of the wrong shape reads as missing, so the selector excludes and
// counts the entry instead of the whole document failing to parse.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => Some(raw),
        _ => None,
    })
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|value| u8::try_from(value).ok()),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    })
}

/// Universal tags any entry may carry regardless of condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTags {
    #[serde(default)]
    pub flare_up: Option<bool>,
    #[serde(default)]
    pub duration: Option<DurationBucket>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    LessThanHour,
    OneToFourHours,
    FourToTwentyFourHours,
    MoreThanDay,
}

impl DurationBucket {
    /// Lower bound of the bucket in hours.
    pub const fn min_hours(self) -> f32 {
        match self {
            Self::LessThanHour => 0.0,
            Self::OneToFourHours => 1.0,
            Self::FourToTwentyFourHours => 4.0,
            Self::MoreThanDay => 24.0,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "less_than_hour" | "<1h" | "under_1h" => Some(Self::LessThanHour),
            "one_to_four_hours" | "1_4h" | "1_to_4h" => Some(Self::OneToFourHours),
            "four_to_twenty_four_hours" | "4_24h" | "4_to_24h" => {
                Some(Self::FourToTwentyFourHours)
            }
            "more_than_day" | ">24h" | "over_24h" => Some(Self::MoreThanDay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            "night" | "overnight" => Some(Self::Night),
            _ => None,
        }
    }
}

/// Condition-specific answers attached to an entry. Exactly one variant can be
/// populated, and each variant belongs to exactly one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionPayload {
    Migraine(MigraineDetails),
    Pain(PainDetails),
    Gastrointestinal(GastrointestinalDetails),
    Reflux(RefluxDetails),
    Sleep(SleepDetails),
    Mood(MoodDetails),
    Respiratory(RespiratoryDetails),
}

impl ConditionPayload {
    pub const fn condition(&self) -> ConditionKey {
        match self {
            Self::Migraine(_) => ConditionKey::Migraine,
            Self::Pain(_) => ConditionKey::LumbosacralStrain,
            Self::Gastrointestinal(_) => ConditionKey::IrritableBowel,
            Self::Reflux(_) => ConditionKey::Gerd,
            Self::Sleep(_) => ConditionKey::SleepApnea,
            Self::Mood(_) => ConditionKey::Ptsd,
            Self::Respiratory(_) => ConditionKey::Asthma,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Migraine(_) => "migraine",
            Self::Pain(_) => "pain",
            Self::Gastrointestinal(_) => "gastrointestinal",
            Self::Reflux(_) => "reflux",
            Self::Sleep(_) => "sleep",
            Self::Mood(_) => "mood",
            Self::Respiratory(_) => "respiratory",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigraineDetails {
    pub prostrating: Option<bool>,
    pub duration_hours: Option<f32>,
    pub aura: Option<bool>,
    pub nausea: Option<bool>,
    pub light_sensitivity: Option<bool>,
    pub missed_work: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainDetails {
    pub pain_type: Option<PainType>,
    pub radiating: Option<bool>,
    pub muscle_spasm: Option<bool>,
    pub abnormal_gait: Option<bool>,
    /// Days of bed rest prescribed by a physician for this episode.
    pub bed_rest_days: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainType {
    Aching,
    Burning,
    Dull,
    Sharp,
    Shooting,
    Stabbing,
    Throbbing,
}

impl PainType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aching => "aching",
            Self::Burning => "burning",
            Self::Dull => "dull",
            Self::Sharp => "sharp",
            Self::Shooting => "shooting",
            Self::Stabbing => "stabbing",
            Self::Throbbing => "throbbing",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "aching" => Some(Self::Aching),
            "burning" => Some(Self::Burning),
            "dull" => Some(Self::Dull),
            "sharp" => Some(Self::Sharp),
            "shooting" => Some(Self::Shooting),
            "stabbing" => Some(Self::Stabbing),
            "throbbing" => Some(Self::Throbbing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GastrointestinalDetails {
    pub abdominal_pain: Option<bool>,
    pub related_to_defecation: Option<bool>,
    pub stool_frequency_change: Option<bool>,
    pub stool_form_change: Option<bool>,
    pub stool_pattern: Option<StoolPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoolPattern {
    Alternating,
    Constipation,
    Diarrhea,
    Normal,
}

impl StoolPattern {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alternating => "alternating",
            Self::Constipation => "constipation",
            Self::Diarrhea => "diarrhea",
            Self::Normal => "normal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "alternating" | "mixed" => Some(Self::Alternating),
            "constipation" => Some(Self::Constipation),
            "diarrhea" | "diarrhoea" => Some(Self::Diarrhea),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefluxDetails {
    pub heartburn: Option<bool>,
    pub regurgitation: Option<bool>,
    pub dysphagia: Option<bool>,
    pub substernal_pain: Option<bool>,
    pub vomiting: Option<bool>,
    pub hematemesis_or_melena: Option<bool>,
    pub weight_loss: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepDetails {
    pub hours_slept: Option<f32>,
    pub daytime_hypersomnolence: Option<bool>,
    pub breathing_device_used: Option<bool>,
    pub respiratory_failure: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodDetails {
    pub panic_attack: Option<bool>,
    pub depressed_mood: Option<bool>,
    pub sleep_impairment: Option<bool>,
    pub memory_impairment: Option<bool>,
    pub suicidal_ideation: Option<bool>,
    pub impaired_impulse_control: Option<bool>,
    pub hallucinations: Option<bool>,
    pub self_care_neglect: Option<bool>,
    pub missed_work: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespiratoryDetails {
    pub rescue_inhaler_used: Option<bool>,
    pub daily_controller_used: Option<bool>,
    pub oral_steroid_course: Option<bool>,
    pub physician_visit_for_exacerbation: Option<bool>,
}

/// Auxiliary structured reading (cuff, goniometer, spirometer) kept beside the
/// free-form entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub reading: MeasurementReading,
}

impl Measurement {
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        reading: MeasurementReading,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: Some(timestamp.into()),
            reading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementReading {
    BloodPressure { systolic: u16, diastolic: u16 },
    ForwardFlexion { degrees: f32 },
    Fev1 { percent_predicted: f32 },
}

impl MeasurementReading {
    pub const fn kind(&self) -> MeasurementKind {
        match self {
            Self::BloodPressure { .. } => MeasurementKind::BloodPressure,
            Self::ForwardFlexion { .. } => MeasurementKind::ForwardFlexion,
            Self::Fev1 { .. } => MeasurementKind::Fev1,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match *self {
            Self::BloodPressure {
                systolic,
                diastolic,
            } => systolic > 0 && diastolic > 0 && diastolic < systolic,
            Self::ForwardFlexion { degrees } => degrees.is_finite() && degrees >= 0.0,
            Self::Fev1 { percent_predicted } => {
                percent_predicted.is_finite() && percent_predicted > 0.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    BloodPressure,
    ForwardFlexion,
    Fev1,
}

impl MeasurementKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BloodPressure => "blood pressure",
            Self::ForwardFlexion => "forward flexion",
            Self::Fev1 => "FEV-1",
        }
    }
}
