mod legacy;
pub(crate) mod validator;

pub use legacy::extract_fragment_kpi;
pub use validator::{verify_cross_report, ConsistencyError, KpiGate};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::appraisal::AppraisalResult;
use super::capacity::CapacityResult;
use super::financial::FinancialResult;
use super::relaxation::RelaxationResult;

/// Analysis modules that contribute KPIs to the reports. The M-codes match
/// the submission template sections reviewers reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Appraisal,
    Relaxation,
    Capacity,
    Financial,
    Decision,
}

impl ModuleId {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Appraisal,
            Self::Relaxation,
            Self::Capacity,
            Self::Financial,
            Self::Decision,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Appraisal => "M2",
            Self::Relaxation => "M3",
            Self::Capacity => "M4",
            Self::Financial => "M5",
            Self::Decision => "M6",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Appraisal => "토지 감정평가",
            Self::Relaxation => "규제 완화",
            Self::Capacity => "건축 규모 검토",
            Self::Financial => "사업성 분석",
            Self::Decision => "추진 판정",
        }
    }
}

/// One extracted KPI value. Values are carried verbatim from the engines;
/// formatting happens at render time and parsing never happens again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum KpiValue {
    Number(f64),
    Count(u64),
    Text(String),
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value:.2}")
                }
            }
            KpiValue::Count(value) => write!(f, "{value}"),
            KpiValue::Text(value) => f.write_str(value),
        }
    }
}

/// Canonical per-module KPI record: the single source every report renders
/// from. `complete` and `missing` record the extraction outcome so report
/// gates never have to re-inspect engine output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleKpi {
    pub module: ModuleId,
    pub values: BTreeMap<String, KpiValue>,
    pub complete: bool,
    pub missing: Vec<String>,
}

impl ModuleKpi {
    fn finalize(module: ModuleId, values: BTreeMap<String, KpiValue>) -> Self {
        let missing: Vec<String> = required_keys(module)
            .iter()
            .filter(|key| !values.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        Self {
            module,
            complete: missing.is_empty(),
            missing,
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&KpiValue> {
        self.values.get(key)
    }
}

/// Required KPI keys per module. A module record missing any of these is
/// marked incomplete; whether that blocks a report depends on the report
/// type's critical map.
pub fn required_keys(module: ModuleId) -> &'static [&'static str] {
    match module {
        ModuleId::Appraisal => &[
            "land_value_total",
            "land_value_per_sqm",
            "confidence",
            "premium_percentage",
            "income_method",
        ],
        ModuleId::Relaxation => &[
            "original_far",
            "relaxed_far",
            "total_relaxation_pct",
            "compliance_issue_count",
        ],
        ModuleId::Capacity => &[
            "total_floor_area",
            "total_units",
            "recommended_type",
            "parking_spaces",
        ],
        ModuleId::Financial => &["total_capex", "purchase_price", "npv", "irr"],
        ModuleId::Decision => &["decision", "decision_reason"],
    }
}

/// Extracts canonical KPI records from finalized engine results.
///
/// Extraction only: this type never recomputes a figure. Recomputation in
/// the rendering layer is what made sibling reports disagree, and the whole
/// point of this record is to make that impossible.
#[derive(Debug, Clone, Default)]
pub struct KpiExtractor;

impl KpiExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_appraisal(&self, result: &AppraisalResult, land_area_sqm: f64) -> ModuleKpi {
        let mut values = BTreeMap::new();
        values.insert(
            "land_value_total".to_string(),
            KpiValue::Number(result.premium_adjusted_value),
        );
        values.insert(
            "land_value_per_sqm".to_string(),
            KpiValue::Number(result.value_per_sqm(land_area_sqm)),
        );
        values.insert(
            "confidence".to_string(),
            KpiValue::Text(result.confidence.label().to_string()),
        );
        values.insert(
            "premium_percentage".to_string(),
            KpiValue::Number(result.premium_percentage),
        );
        values.insert(
            "income_method".to_string(),
            KpiValue::Text(result.income_method.label().to_string()),
        );
        ModuleKpi::finalize(ModuleId::Appraisal, values)
    }

    pub fn extract_relaxation(&self, result: &RelaxationResult) -> ModuleKpi {
        let mut values = BTreeMap::new();
        values.insert(
            "original_far".to_string(),
            KpiValue::Number(result.original_far_pct),
        );
        values.insert(
            "relaxed_far".to_string(),
            KpiValue::Number(result.relaxed_far_pct),
        );
        values.insert(
            "total_relaxation_pct".to_string(),
            KpiValue::Number(result.total_relaxation_pct),
        );
        values.insert(
            "compliance_issue_count".to_string(),
            KpiValue::Count(result.compliance_issues.len() as u64),
        );
        ModuleKpi::finalize(ModuleId::Relaxation, values)
    }

    pub fn extract_capacity(&self, result: &CapacityResult) -> ModuleKpi {
        let mut values = BTreeMap::new();
        values.insert(
            "total_floor_area".to_string(),
            KpiValue::Number(result.relaxed_floor_area_sqm),
        );
        values.insert(
            "total_units".to_string(),
            KpiValue::Count(result.total_units as u64),
        );
        values.insert(
            "recommended_type".to_string(),
            KpiValue::Text(result.recommended_type.label().to_string()),
        );
        values.insert(
            "parking_spaces".to_string(),
            KpiValue::Count(result.parking_spaces as u64),
        );
        ModuleKpi::finalize(ModuleId::Capacity, values)
    }

    pub fn extract_financial(&self, result: &FinancialResult) -> ModuleKpi {
        let mut values = BTreeMap::new();
        values.insert(
            "total_capex".to_string(),
            KpiValue::Number(result.capex.total_capex),
        );
        values.insert(
            "purchase_price".to_string(),
            KpiValue::Number(result.purchase_price),
        );
        values.insert("npv".to_string(), KpiValue::Number(result.npv));
        values.insert("irr".to_string(), KpiValue::Number(result.irr));
        ModuleKpi::finalize(ModuleId::Financial, values)
    }

    pub fn extract_decision(&self, result: &FinancialResult) -> ModuleKpi {
        let mut values = BTreeMap::new();
        values.insert(
            "decision".to_string(),
            KpiValue::Text(result.decision.label().to_string()),
        );
        values.insert(
            "decision_reason".to_string(),
            KpiValue::Text(result.decision_reason.clone()),
        );
        ModuleKpi::finalize(ModuleId::Decision, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_records_list_their_missing_keys() {
        let mut values = BTreeMap::new();
        values.insert("npv".to_string(), KpiValue::Number(-123.0));
        let record = ModuleKpi::finalize(ModuleId::Financial, values);
        assert!(!record.complete);
        assert_eq!(
            record.missing,
            vec!["total_capex", "purchase_price", "irr"]
        );
    }

    #[test]
    fn display_keeps_whole_numbers_unpadded() {
        assert_eq!(KpiValue::Number(300.0).to_string(), "300");
        assert_eq!(KpiValue::Number(0.125).to_string(), "0.13");
        assert_eq!(KpiValue::Count(42).to_string(), "42");
    }
}
