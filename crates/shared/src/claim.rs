//! Claim form fields and their normalization into the JSON claim the scoring endpoint expects.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::domain::FeatureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimField {
    ClaimAmount,
    PaidAmount,
    DrgCode,
    PrimaryDiagnosis,
    PrimaryProcedure,
    AdmissionType,
    AdmissionSource,
    DischargeDisposition,
    LengthOfStay,
    PatientAge,
    Gender,
    NumDiagnoses,
    NumProcedures,
    ProviderState,
    Payer,
}

impl ClaimField {
    pub const ALL: [ClaimField; 15] = [
        ClaimField::ClaimAmount,
        ClaimField::PaidAmount,
        ClaimField::DrgCode,
        ClaimField::PrimaryDiagnosis,
        ClaimField::PrimaryProcedure,
        ClaimField::AdmissionType,
        ClaimField::AdmissionSource,
        ClaimField::DischargeDisposition,
        ClaimField::LengthOfStay,
        ClaimField::PatientAge,
        ClaimField::Gender,
        ClaimField::NumDiagnoses,
        ClaimField::NumProcedures,
        ClaimField::ProviderState,
        ClaimField::Payer,
    ];

    /// Wire name, shared with the model's feature list.
    pub fn name(self) -> &'static str {
        match self {
            Self::ClaimAmount => "claim_amount",
            Self::PaidAmount => "paid_amount",
            Self::DrgCode => "drg_code",
            Self::PrimaryDiagnosis => "primary_diagnosis",
            Self::PrimaryProcedure => "primary_procedure",
            Self::AdmissionType => "admission_type",
            Self::AdmissionSource => "admission_source",
            Self::DischargeDisposition => "discharge_disposition",
            Self::LengthOfStay => "length_of_stay",
            Self::PatientAge => "patient_age",
            Self::Gender => "gender",
            Self::NumDiagnoses => "num_diagnoses",
            Self::NumProcedures => "num_procedures",
            Self::ProviderState => "provider_state",
            Self::Payer => "payer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ClaimAmount => "Claim amount",
            Self::PaidAmount => "Paid amount",
            Self::DrgCode => "DRG code",
            Self::PrimaryDiagnosis => "Primary diagnosis",
            Self::PrimaryProcedure => "Primary procedure",
            Self::AdmissionType => "Admission type",
            Self::AdmissionSource => "Admission source",
            Self::DischargeDisposition => "Discharge disposition",
            Self::LengthOfStay => "Length of stay (days)",
            Self::PatientAge => "Patient age",
            Self::Gender => "Gender",
            Self::NumDiagnoses => "Number of diagnoses",
            Self::NumProcedures => "Number of procedures",
            Self::ProviderState => "Provider state",
            Self::Payer => "Payer",
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            Self::ClaimAmount
            | Self::PaidAmount
            | Self::LengthOfStay
            | Self::PatientAge
            | Self::NumDiagnoses
            | Self::NumProcedures => FeatureKind::Number,
            _ => FeatureKind::Categorical,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// Raw text as typed into the fraud form, one entry per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimForm {
    values: BTreeMap<ClaimField, String>,
}

impl ClaimForm {
    pub fn value(&self, field: ClaimField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn value_mut(&mut self, field: ClaimField) -> &mut String {
        self.values.entry(field).or_default()
    }

    pub fn set(&mut self, field: ClaimField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|value| value.trim().is_empty())
    }

    pub fn normalize(&self) -> Claim {
        let fields = ClaimField::ALL
            .into_iter()
            .map(|field| {
                (
                    field.name().to_string(),
                    normalize_value(field.kind(), self.value(field)),
                )
            })
            .collect();
        Claim(fields)
    }
}

/// Normalized claim: every field present, blanks and unparsable numbers as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claim(Map<String, Value>);

impl Claim {
    pub fn get(&self, field: ClaimField) -> Option<&Value> {
        self.0.get(field.name())
    }
}

pub fn normalize_value(kind: FeatureKind, raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    match kind {
        FeatureKind::Categorical => Value::String(trimmed.to_string()),
        FeatureKind::Number => parse_number(trimmed).map_or(Value::Null, Value::Number),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Number::from(integer));
    }
    let float = text.parse::<f64>().ok().filter(|value| value.is_finite())?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        return Some(Number::from(float as i64));
    }
    Number::from_f64(float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_becomes_null() {
        let form = ClaimForm::default();
        let claim = form.normalize();
        assert_eq!(claim.get(ClaimField::ClaimAmount), Some(&Value::Null));
        assert_eq!(claim.get(ClaimField::Payer), Some(&Value::Null));
        let json = serde_json::to_value(&claim).expect("claim serializes");
        assert_eq!(
            json.as_object().map(Map::len),
            Some(ClaimField::ALL.len())
        );
    }

    #[test]
    fn non_numeric_text_in_numeric_field_becomes_null() {
        let mut form = ClaimForm::default();
        form.set(ClaimField::PatientAge, "forty");
        form.set(ClaimField::LengthOfStay, "NaN");
        form.set(ClaimField::PaidAmount, "inf");
        let claim = form.normalize();
        assert_eq!(claim.get(ClaimField::PatientAge), Some(&Value::Null));
        assert_eq!(claim.get(ClaimField::LengthOfStay), Some(&Value::Null));
        assert_eq!(claim.get(ClaimField::PaidAmount), Some(&Value::Null));
    }

    #[test]
    fn numeric_text_becomes_number() {
        let mut form = ClaimForm::default();
        form.set(ClaimField::ClaimAmount, "120");
        form.set(ClaimField::PaidAmount, " 87.5 ");
        let claim = form.normalize();
        assert_eq!(claim.get(ClaimField::ClaimAmount), Some(&Value::from(120)));
        assert_eq!(claim.get(ClaimField::PaidAmount), Some(&Value::from(87.5)));
        let encoded = serde_json::to_string(&claim).expect("encode");
        assert!(encoded.contains("\"claim_amount\":120,"));
    }

    #[test]
    fn categorical_text_is_trimmed_and_kept() {
        let mut form = ClaimForm::default();
        form.set(ClaimField::DrgCode, "  470 ");
        form.set(ClaimField::Gender, "   ");
        let claim = form.normalize();
        assert_eq!(claim.get(ClaimField::DrgCode), Some(&Value::from("470")));
        assert_eq!(claim.get(ClaimField::Gender), Some(&Value::Null));
    }

    #[test]
    fn field_names_round_trip() {
        for field in ClaimField::ALL {
            assert_eq!(ClaimField::from_name(field.name()), Some(field));
        }
        assert_eq!(ClaimField::from_name("drg_charge_ratio"), None);
    }
}
