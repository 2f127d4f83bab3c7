//! Immune request records

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M", alias = "남")]
    Male,
    #[default]
    #[serde(rename = "F", alias = "여")]
    Female,
}

/// One resident's raw clinical and environmental inputs.
///
/// Flags accept `0`/`1` or booleans. Risk ratios default to 1.0 (neutral).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmuneInput {
    pub age: f64,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, deserialize_with = "flag")]
    pub dementia_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub parkinson_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub chf_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub ckd_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub copd_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub cancer_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub steroid_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub immunosup_yn: bool,
    #[serde(default, deserialize_with = "flag")]
    pub antipsychotic_yn: bool,
    #[serde(default = "neutral_ratio")]
    pub temp_rr: f64,
    #[serde(default = "neutral_ratio")]
    pub season_rr: f64,
    #[serde(default = "neutral_ratio")]
    pub hum_rr: f64,
    #[serde(default = "neutral_ratio")]
    pub outbreak_rr: f64,
    #[serde(default = "neutral_ratio")]
    pub room_rr: f64,
    #[serde(default = "neutral_ratio")]
    pub epi_rr: f64,
}

fn neutral_ratio() -> f64 {
    1.0
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Int(0) => Ok(false),
        RawFlag::Int(1) => Ok(true),
        RawFlag::Float(x) if x == 0.0 => Ok(false),
        RawFlag::Float(x) if x == 1.0 => Ok(true),
        _ => Err(de::Error::custom("flag must be 0, 1, true or false")),
    }
}

impl ImmuneInput {
    /// A resident of `age` with no flags set and neutral risk ratios
    pub fn new(age: f64) -> Self {
        Self {
            age,
            gender: Gender::default(),
            dementia_yn: false,
            parkinson_yn: false,
            chf_yn: false,
            ckd_yn: false,
            copd_yn: false,
            cancer_yn: false,
            steroid_yn: false,
            immunosup_yn: false,
            antipsychotic_yn: false,
            temp_rr: 1.0,
            season_rr: 1.0,
            hum_rr: 1.0,
            outbreak_rr: 1.0,
            room_rr: 1.0,
            epi_rr: 1.0,
        }
    }

    /// Temperature, season, humidity, outbreak, room and epidemiology ratios
    pub fn risk_ratios(&self) -> [f64; 6] {
        [
            self.temp_rr,
            self.season_rr,
            self.hum_rr,
            self.outbreak_rr,
            self.room_rr,
            self.epi_rr,
        ]
    }
}

/// A prediction request: optional resident passthrough plus inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmuneRequest {
    #[serde(default)]
    pub resident_id: Option<String>,
    pub features: ImmuneInput,
}

impl ImmuneRequest {
    pub fn new(resident_id: Option<String>, features: ImmuneInput) -> Self {
        Self {
            resident_id,
            features,
        }
    }
}
