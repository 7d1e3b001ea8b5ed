use std::collections::BTreeMap;

use lh_appraisal::pipeline::kpi::{KpiValue, ModuleKpi};
use lh_appraisal::pipeline::report::{ReportAssembler, ReportError, ReportKind};
use lh_appraisal::pipeline::ModuleId;

fn record(module: ModuleId, pairs: &[(&str, KpiValue)]) -> ModuleKpi {
    let mut values = BTreeMap::new();
    for (key, value) in pairs {
        values.insert(key.to_string(), value.clone());
    }
    ModuleKpi {
        module,
        complete: true,
        missing: Vec::new(),
        values,
    }
}

fn financial_record() -> ModuleKpi {
    record(
        ModuleId::Financial,
        &[
            ("total_capex", KpiValue::Number(9_500_000_000.0)),
            ("purchase_price", KpiValue::Number(8_900_000_000.0)),
            ("npv", KpiValue::Number(-600_000_000.0)),
            ("irr", KpiValue::Number(-0.063)),
        ],
    )
}

fn decision_record() -> ModuleKpi {
    record(
        ModuleId::Decision,
        &[
            ("decision", KpiValue::Text("CONDITIONAL_GO".to_string())),
            (
                "decision_reason",
                KpiValue::Text("조건부 추진 가능".to_string()),
            ),
        ],
    )
}

#[test]
fn quick_check_renders_without_appraisal_data() {
    let mut modules = BTreeMap::new();
    modules.insert(ModuleId::Financial, financial_record());
    modules.insert(ModuleId::Decision, decision_record());

    let report = ReportAssembler::new()
        .assemble(&modules, &[], ReportKind::QuickCheck)
        .expect("quick check needs only the financial verdict");

    assert!(report.missing_kpi_warnings.is_empty());
    // The overview slot for the appraisal figure discloses the gap instead
    // of estimating a value.
    assert!(report.html.contains("kpi-missing"));
    assert!(report.html.contains("자료 없음"));
    assert!(report.html.contains("data-kpi=\"decision\""));
}

#[test]
fn feasibility_report_is_blocked_without_the_land_value() {
    let mut modules = BTreeMap::new();
    modules.insert(ModuleId::Financial, financial_record());
    modules.insert(ModuleId::Decision, decision_record());

    let err = ReportAssembler::new()
        .assemble(&modules, &[], ReportKind::FinancialFeasibility)
        .expect_err("missing critical KPI must block generation");

    let ReportError::CriticalKpiMissing { kind, missing } = &err;
    assert_eq!(*kind, ReportKind::FinancialFeasibility);
    assert!(missing.contains(&"M2.land_value_total".to_string()));

    let document = err.error_document();
    assert!(document.contains("report-blocked"));
    assert!(document.contains("생성 불가"));
}

#[test]
fn soft_gaps_are_disclosed_in_the_completeness_notice() {
    let mut modules = BTreeMap::new();
    modules.insert(
        ModuleId::Appraisal,
        record(
            ModuleId::Appraisal,
            &[("land_value_total", KpiValue::Number(5_200_000_000.0))],
        ),
    );
    modules.insert(ModuleId::Decision, decision_record());

    let report = ReportAssembler::new()
        .assemble(&modules, &[], ReportKind::LandownerSummary)
        .expect("critical land value is present, soft gaps do not block");

    assert!(report
        .missing_kpi_warnings
        .contains(&"M2.land_value_per_sqm".to_string()));
    assert!(report
        .missing_kpi_warnings
        .contains(&"M5.purchase_price".to_string()));
    assert!(report.html.contains("자료 완전성 고지"));
    assert!(report.html.contains("누락 지표: M5.purchase_price"));
}

#[test]
fn fallback_notices_are_printed_alongside_missing_kpis() {
    let mut modules = BTreeMap::new();
    modules.insert(ModuleId::Financial, financial_record());
    modules.insert(ModuleId::Decision, decision_record());

    let notices = vec!["official_price_per_sqm: 지역 평균값 사용 (관악구)".to_string()];
    let report = ReportAssembler::new()
        .assemble(&modules, &notices, ReportKind::QuickCheck)
        .expect("quick check assembles");

    assert!(report.html.contains("지역 평균값 사용 (관악구)"));
}

#[test]
fn assemble_all_returns_blocked_kinds_instead_of_dropping_them() {
    let mut modules = BTreeMap::new();
    modules.insert(ModuleId::Financial, financial_record());
    modules.insert(ModuleId::Decision, decision_record());

    let set = ReportAssembler::new()
        .assemble_all(&modules, &[])
        .expect("generated reports stay consistent");

    // Only the executive summary and the quick check gate on M5/M6 alone.
    assert_eq!(set.reports.len(), 2);
    assert_eq!(set.blocked.len(), 4);

    let feasibility = set
        .blocked
        .iter()
        .find(|blocked| blocked.kind == ReportKind::FinancialFeasibility)
        .expect("feasibility report is blocked without the land value");
    assert!(feasibility
        .missing
        .contains(&"M2.land_value_total".to_string()));
    assert!(feasibility.error_document.contains("생성 불가"));
}

#[test]
fn rendered_values_carry_their_kpi_attribute() {
    let mut modules = BTreeMap::new();
    modules.insert(ModuleId::Financial, financial_record());
    modules.insert(ModuleId::Decision, decision_record());

    let report = ReportAssembler::new()
        .assemble(&modules, &[], ReportKind::QuickCheck)
        .expect("quick check assembles");

    assert!(report.html.contains("data-kpi=\"npv\""));
    assert_eq!(
        report.rendered_kpis.get("npv"),
        Some(&KpiValue::Number(-600_000_000.0))
    );
}
