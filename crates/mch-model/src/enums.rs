//! Categorical values stored on unified patient records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Cohort a unified record was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// Enrolled through the pre/post delivery surveys.
    #[serde(rename = "recruited")]
    Recruited,
    /// Reconstructed from device measurements and a historical delivery sheet.
    #[serde(rename = "hist")]
    Historical,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Recruited => "recruited",
            RecordType::Historical => "hist",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recruited" => Ok(RecordType::Recruited),
            "hist" | "historical" => Ok(RecordType::Historical),
            _ => Err(ModelError::UnknownRecordType(s.to_string())),
        }
    }
}

/// Normalized delivery method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "natural")]
    Natural,
    #[serde(rename = "c-section")]
    CSection,
    #[serde(rename = "emergency c-section")]
    EmergencyCSection,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Natural => "natural",
            DeliveryType::CSection => "c-section",
            DeliveryType::EmergencyCSection => "emergency c-section",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = ModelError;

    /// Parses the normalized English labels only; raw survey text goes
    /// through the delivery remap in the assembler instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "natural" => Ok(DeliveryType::Natural),
            "c-section" => Ok(DeliveryType::CSection),
            "emergency c-section" => Ok(DeliveryType::EmergencyCSection),
            _ => Err(ModelError::UnknownDeliveryType(s.to_string())),
        }
    }
}
