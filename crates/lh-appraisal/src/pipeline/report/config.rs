use serde::{Deserialize, Serialize};

use crate::pipeline::kpi::ModuleId;

/// The six audience-specific report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    LandownerSummary,
    LhTechnical,
    ExecutiveSummary,
    FinancialFeasibility,
    QuickCheck,
    AllInOne,
}

impl ReportKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::LandownerSummary,
            Self::LhTechnical,
            Self::ExecutiveSummary,
            Self::FinancialFeasibility,
            Self::QuickCheck,
            Self::AllInOne,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LandownerSummary => "토지주 요약 보고서",
            Self::LhTechnical => "LH 기술검토 보고서",
            Self::ExecutiveSummary => "경영진 요약 보고서",
            Self::FinancialFeasibility => "사업성 분석 보고서",
            Self::QuickCheck => "간편 검토 보고서",
            Self::AllInOne => "종합 보고서",
        }
    }
}

/// Report sections, rendered in the order the type config lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Appraisal,
    Relaxation,
    Capacity,
    Financial,
    Sensitivity,
    Decision,
}

/// Data-driven contract for one report type: which KPIs it must show,
/// which gaps block it, and the section order. One assembler consumes
/// these; there are no per-type assembler classes to patch in sixfold.
#[derive(Debug, Clone)]
pub struct ReportTypeConfig {
    pub kind: ReportKind,
    pub mandatory: &'static [(ModuleId, &'static str)],
    pub critical: &'static [(ModuleId, &'static str)],
    pub sections: &'static [Section],
}

pub fn config_for(kind: ReportKind) -> ReportTypeConfig {
    match kind {
        ReportKind::LandownerSummary => ReportTypeConfig {
            kind,
            mandatory: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Appraisal, "land_value_per_sqm"),
                (ModuleId::Financial, "purchase_price"),
                (ModuleId::Decision, "decision"),
            ],
            critical: &[(ModuleId::Appraisal, "land_value_total")],
            sections: &[Section::Overview, Section::Appraisal, Section::Decision],
        },
        ReportKind::LhTechnical => ReportTypeConfig {
            kind,
            mandatory: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Appraisal, "income_method"),
                (ModuleId::Relaxation, "relaxed_far"),
                (ModuleId::Relaxation, "compliance_issue_count"),
                (ModuleId::Capacity, "total_units"),
                (ModuleId::Capacity, "parking_spaces"),
            ],
            critical: &[
                (ModuleId::Relaxation, "relaxed_far"),
                (ModuleId::Capacity, "total_units"),
            ],
            sections: &[
                Section::Overview,
                Section::Appraisal,
                Section::Relaxation,
                Section::Capacity,
            ],
        },
        ReportKind::ExecutiveSummary => ReportTypeConfig {
            kind,
            mandatory: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Financial, "npv"),
                (ModuleId::Decision, "decision"),
            ],
            critical: &[(ModuleId::Decision, "decision")],
            sections: &[Section::Overview, Section::Financial, Section::Decision],
        },
        ReportKind::FinancialFeasibility => ReportTypeConfig {
            kind,
            mandatory: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Financial, "total_capex"),
                (ModuleId::Financial, "purchase_price"),
                (ModuleId::Financial, "npv"),
                (ModuleId::Financial, "irr"),
                (ModuleId::Decision, "decision"),
            ],
            critical: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Financial, "npv"),
            ],
            sections: &[
                Section::Overview,
                Section::Appraisal,
                Section::Financial,
                Section::Sensitivity,
                Section::Decision,
            ],
        },
        ReportKind::QuickCheck => ReportTypeConfig {
            kind,
            // Quick check reads M5/M6 only; appraisal data absent is fine.
            mandatory: &[
                (ModuleId::Financial, "npv"),
                (ModuleId::Decision, "decision"),
            ],
            critical: &[(ModuleId::Decision, "decision")],
            sections: &[Section::Overview, Section::Decision],
        },
        ReportKind::AllInOne => ReportTypeConfig {
            kind,
            mandatory: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Relaxation, "relaxed_far"),
                (ModuleId::Capacity, "total_units"),
                (ModuleId::Financial, "total_capex"),
                (ModuleId::Financial, "npv"),
                (ModuleId::Financial, "irr"),
                (ModuleId::Decision, "decision"),
                (ModuleId::Decision, "decision_reason"),
            ],
            critical: &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Decision, "decision"),
            ],
            sections: &[
                Section::Overview,
                Section::Appraisal,
                Section::Relaxation,
                Section::Capacity,
                Section::Financial,
                Section::Sensitivity,
                Section::Decision,
            ],
        },
    }
}
