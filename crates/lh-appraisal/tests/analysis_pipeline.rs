use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use lh_appraisal::pipeline::appraisal::ConfidenceLevel;
use lh_appraisal::pipeline::provider::{StaticLandDataProvider, UnavailableProvider, ZoningRecord};
use lh_appraisal::pipeline::relaxation::RelaxationFlags;
use lh_appraisal::pipeline::report::ReportKind;
use lh_appraisal::pipeline::zoning::{Overlay, ZoneType};
use lh_appraisal::pipeline::{AnalysisError, AnalysisPipeline, AnalyzeRequest, ModuleId};

fn outage_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(Arc::new(UnavailableProvider))
}

fn request(address: &str, land_area_sqm: f64) -> AnalyzeRequest {
    AnalyzeRequest {
        address: address.to_string(),
        land_area_sqm,
        zone_type: None,
        individual_land_price_per_sqm: None,
        building_area_sqm: 0.0,
        annual_rental_income: 0.0,
        premium_factors: BTreeMap::new(),
        relaxation: RelaxationFlags::default(),
        as_of: NaiveDate::from_ymd_opt(2025, 7, 1),
    }
}

#[test]
fn total_data_outage_still_yields_a_complete_context() {
    let pipeline = outage_pipeline();
    let context = pipeline
        .analyze(&request("서울시 관악구 신림동 1680-4", 660.0))
        .expect("outage is recoverable, never fatal");

    assert_eq!(context.zone_type, ZoneType::SecondGeneralResidential);
    assert_eq!(context.appraisal.confidence, ConfidenceLevel::Low);
    assert!(context.appraisal.blended_value > 0.0);
    assert!(context.appraisal.premium_adjusted_value > 0.0);

    // Every failed lookup is disclosed: zoning, official price, comparables.
    assert_eq!(context.fallback.entries.len(), 3);

    context
        .financial
        .capex
        .validate()
        .expect("capex components reconcile");
    assert_eq!(context.financial.sensitivity.len(), 3);
    assert!(!context.financial.decision_reason.is_empty());

    for module in ModuleId::ordered() {
        let record = context
            .kpi_by_module
            .get(&module)
            .expect("every module contributes a KPI record");
        assert!(record.complete, "{} record incomplete", module.code());
    }
}

#[test]
fn full_relaxation_stack_clamps_at_the_statutory_ceiling() {
    let pipeline = outage_pipeline();
    let mut req = request("서울시 동작구 상도동 50-1", 1200.0);
    req.zone_type = Some("제3종일반주거지역".to_string());
    req.relaxation = RelaxationFlags {
        district_unit_plan: true,
        contributed_area_sqm: 240.0,
        green_building_certified: true,
        barrier_free_certified: true,
        urban_regeneration_area: true,
    };

    let context = pipeline.analyze(&req).expect("analysis succeeds");

    // 10 daylight + 20 district plan + 10 contribution + 6 green + 3
    // barrier-free + 10 regeneration.
    assert!((context.relaxation.total_relaxation_pct - 59.0).abs() < 1e-9);
    assert_eq!(context.relaxation.relaxed_far_pct, 300.0);
    assert_eq!(context.relaxation.compliance_issues.len(), 1);
    assert!(context.relaxation.compliance_issues[0].contains("초과하여 조정됨"));

    // Capacity reads the clamped envelope, not the uncapped stack.
    assert_eq!(context.capacity.relaxed_floor_area_sqm, 1200.0 * 3.0);
    assert!(context.capacity.total_units > 0);
}

#[test]
fn unknown_zone_label_is_rejected_up_front() {
    let pipeline = outage_pipeline();
    let mut req = request("서울시 관악구 신림동 1680-4", 660.0);
    req.zone_type = Some("상상지역".to_string());

    let err = pipeline
        .analyze(&req)
        .expect_err("unknown designation must not default silently");
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
}

#[test]
fn non_positive_land_area_is_rejected() {
    let pipeline = outage_pipeline();
    let err = pipeline
        .analyze(&request("서울시 관악구 신림동 1680-4", 0.0))
        .expect_err("zero area cannot be analyzed");
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
}

#[test]
fn repeated_assembly_renders_identical_reports() {
    let pipeline = outage_pipeline();
    let context = pipeline
        .analyze(&request("서울시 관악구 신림동 1680-4", 660.0))
        .expect("analysis succeeds");

    let first = context
        .report(ReportKind::AllInOne)
        .expect("all KPIs present");
    let second = context
        .report(ReportKind::AllInOne)
        .expect("all KPIs present");

    assert_eq!(first.html, second.html);
    assert_eq!(first.rendered_kpis, second.rendered_kpis);
}

#[test]
fn sibling_reports_agree_on_every_shared_kpi() {
    let pipeline = outage_pipeline();
    let context = pipeline
        .analyze(&request("서울시 강남구 역삼동 123-4", 990.0))
        .expect("analysis succeeds");

    let set = context
        .all_reports()
        .expect("a single extraction pass cannot diverge");
    assert_eq!(set.reports.len(), 6);
    assert!(set.blocked.is_empty());

    let reference = set
        .reports
        .iter()
        .find(|report| report.kind == ReportKind::AllInOne)
        .and_then(|report| report.rendered_kpis.get("land_value_total").cloned())
        .expect("comprehensive report carries the land value");
    for report in &set.reports {
        if let Some(value) = report.rendered_kpis.get("land_value_total") {
            assert_eq!(*value, reference, "{} diverges", report.kind.label());
        }
    }
}

#[test]
fn resolved_overlays_are_carried_on_the_context() {
    let address = "서울시 마포구 성산동 200-1";
    let provider = StaticLandDataProvider::new()
        .with_zoning(
            address,
            ZoningRecord {
                zone_type: ZoneType::QuasiResidential,
                bcr_legal_pct: 70.0,
                far_legal_pct: 400.0,
                overlays: vec![Overlay::DistrictUnitPlan, Overlay::HeightDistrict],
            },
        )
        .with_official_price(address, 8_400_000.0);

    let pipeline = AnalysisPipeline::new(Arc::new(provider));
    let context = pipeline
        .analyze(&request(address, 900.0))
        .expect("analysis succeeds");

    assert_eq!(context.zone_type, ZoneType::QuasiResidential);
    assert_eq!(
        context.overlays,
        vec![Overlay::DistrictUnitPlan, Overlay::HeightDistrict]
    );
}
