//! Registered condition modules. Each file bundles a selector, an aggregator and
//! a static criteria table for one diagnostic code.

mod asthma;
mod gerd;
mod hypertension;
mod irritable_bowel;
mod lumbosacral_strain;
mod migraine;
mod ptsd;
mod sleep_apnea;
mod tinnitus;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::ConditionModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKey {
    Migraine,
    LumbosacralStrain,
    IrritableBowel,
    Gerd,
    SleepApnea,
    Ptsd,
    Asthma,
    Tinnitus,
    Hypertension,
}

impl ConditionKey {
    pub const ALL: [ConditionKey; 9] = [
        Self::Migraine,
        Self::LumbosacralStrain,
        Self::IrritableBowel,
        Self::Gerd,
        Self::SleepApnea,
        Self::Ptsd,
        Self::Asthma,
        Self::Tinnitus,
        Self::Hypertension,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Migraine => "migraine",
            Self::LumbosacralStrain => "lumbosacral-strain",
            Self::IrritableBowel => "irritable-bowel",
            Self::Gerd => "gerd",
            Self::SleepApnea => "sleep-apnea",
            Self::Ptsd => "ptsd",
            Self::Asthma => "asthma",
            Self::Tinnitus => "tinnitus",
            Self::Hypertension => "hypertension",
        }
    }

    /// Diagnostic code of the rating schedule.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Migraine => "8100",
            Self::LumbosacralStrain => "5237",
            Self::IrritableBowel => "7319",
            Self::Gerd => "7346",
            Self::SleepApnea => "6847",
            Self::Ptsd => "9411",
            Self::Asthma => "6602",
            Self::Tinnitus => "6260",
            Self::Hypertension => "7101",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Migraine => "Migraine",
            Self::LumbosacralStrain => "Lumbosacral strain",
            Self::IrritableBowel => "Irritable bowel syndrome",
            Self::Gerd => "Gastroesophageal reflux disease",
            Self::SleepApnea => "Sleep apnea",
            Self::Ptsd => "Post-traumatic stress disorder",
            Self::Asthma => "Bronchial asthma",
            Self::Tinnitus => "Tinnitus",
            Self::Hypertension => "Hypertensive vascular disease",
        }
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown condition `{0}`")]
pub struct UnknownCondition(pub String);

impl FromStr for ConditionKey {
    type Err = UnknownCondition;

    /// Accepts the slug or the diagnostic code, ignoring case and separators.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = crate::observations::normalize_tag(raw);
        Self::ALL
            .into_iter()
            .find(|key| key.slug() == normalized || key.code() == normalized)
            .ok_or_else(|| UnknownCondition(raw.trim().to_string()))
    }
}

/// Every shipped module, in registry order.
pub(crate) fn all_modules() -> [&'static ConditionModule; 9] {
    [
        &migraine::MODULE,
        &lumbosacral_strain::MODULE,
        &irritable_bowel::MODULE,
        &gerd::MODULE,
        &sleep_apnea::MODULE,
        &ptsd::MODULE,
        &asthma::MODULE,
        &tinnitus::MODULE,
        &hypertension::MODULE,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_slug_or_code() {
        assert_eq!("migraine".parse(), Ok(ConditionKey::Migraine));
        assert_eq!(" 8100 ".parse(), Ok(ConditionKey::Migraine));
        assert_eq!("Sleep Apnea".parse(), Ok(ConditionKey::SleepApnea));
        assert_eq!("lumbosacral_strain".parse(), Ok(ConditionKey::LumbosacralStrain));
        assert_eq!(
            "knee".parse::<ConditionKey>(),
            Err(UnknownCondition("knee".to_string()))
        );
    }

    #[test]
    fn every_module_is_registered_under_its_own_key() {
        for (module, key) in all_modules().iter().zip(ConditionKey::ALL) {
            assert_eq!(module.key, key);
            assert_eq!(module.selector.condition, key);
        }
    }

    #[test]
    fn serde_uses_slugs() {
        let json = serde_json::to_string(&ConditionKey::SleepApnea).expect("serialize");
        assert_eq!(json, "\"sleep-apnea\"");
    }
}
