use serde::{Deserialize, Serialize};

use crate::pipeline::HUNDRED_MILLION_KRW;

/// Feasibility decision for the policy-transaction (LH sale) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Go,
    ConditionalGo,
    NoGo,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::ConditionalGo => "CONDITIONAL_GO",
            Self::NoGo => "NO_GO",
        }
    }
}

/// NPV floor for a conditional recommendation: -10억원, boundary inclusive.
pub(crate) const CONDITIONAL_NPV_FLOOR: f64 = -10.0 * HUNDRED_MILLION_KRW;
/// Return floor for a conditional recommendation, boundary inclusive.
pub(crate) const CONDITIONAL_IRR_FLOOR: f64 = -0.10;

/// Threshold gates are exact: npv ≥ 0 ∧ irr ≥ 0 is GO even at precisely
/// zero, and the conditional floors include their boundary values.
pub(crate) fn decide(npv: f64, irr: f64) -> Decision {
    if npv >= 0.0 && irr >= 0.0 {
        Decision::Go
    } else if npv >= CONDITIONAL_NPV_FLOOR && irr >= CONDITIONAL_IRR_FLOOR {
        Decision::ConditionalGo
    } else {
        Decision::NoGo
    }
}

/// Builds the decision rationale citing the actual figures, never a generic
/// string: the submission reviewer checks these numbers against the tables.
pub(crate) fn decision_reason(decision: Decision, npv: f64, irr: f64, appraisal_rate: f64) -> String {
    let npv_100m = npv / HUNDRED_MILLION_KRW;
    match decision {
        Decision::Go => format!(
            "매입가 기준 NPV {npv_100m:.2}억원(≥0), 수익률 {:.2}%(≥0%), 감정평가 인정률 {:.0}% 적용: 사업 추진 가능",
            irr * 100.0,
            appraisal_rate * 100.0
        ),
        Decision::ConditionalGo => format!(
            "NPV {npv_100m:.2}억원(허용 하한 -10억원 이내), 수익률 {:.2}%(하한 -10% 이내), 감정평가 인정률 {:.0}% 적용: 조건부 추진",
            irr * 100.0,
            appraisal_rate * 100.0
        ),
        Decision::NoGo => format!(
            "NPV {npv_100m:.2}억원 또는 수익률 {:.2}%가 허용 하한(-10억원, -10%)을 하회, 감정평가 인정률 {:.0}% 적용: 추진 불가",
            irr * 100.0,
            appraisal_rate * 100.0
        ),
    }
}
