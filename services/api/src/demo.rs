use crate::infra::{parse_date, sample_provider, SAMPLE_ADDRESS};
use chrono::NaiveDate;
use clap::Args;
use lh_appraisal::error::AppError;
use lh_appraisal::pipeline::report::ReportKind;
use lh_appraisal::pipeline::{AnalysisPipeline, AnalyzeRequest};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Subject address (지번 주소)
    #[arg(long)]
    pub(crate) address: String,
    /// Land area in square meters
    #[arg(long)]
    pub(crate) land_area: f64,
    /// Korean zone designation override, e.g. 제2종일반주거지역
    #[arg(long)]
    pub(crate) zone: Option<String>,
    /// Individual official land price override, KRW per square meter
    #[arg(long)]
    pub(crate) price_per_sqm: Option<f64>,
    /// Existing building floor area, square meters
    #[arg(long, default_value_t = 0.0)]
    pub(crate) building_area: f64,
    /// Annual rental income, KRW
    #[arg(long, default_value_t = 0.0)]
    pub(crate) annual_rent: f64,
    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also print the assembled HTML of each report type
    #[arg(long)]
    pub(crate) include_html: bool,
}

fn demo_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(Arc::new(sample_provider()))
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let request = AnalyzeRequest {
        address: args.address,
        land_area_sqm: args.land_area,
        zone_type: args.zone,
        individual_land_price_per_sqm: args.price_per_sqm,
        building_area_sqm: args.building_area,
        annual_rental_income: args.annual_rent,
        premium_factors: BTreeMap::new(),
        relaxation: Default::default(),
        as_of: args.as_of,
    };

    let context = demo_pipeline().analyze(&request)?;
    let rendered = serde_json::to_string_pretty(&context).map_err(|err| {
        AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    })?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let request = AnalyzeRequest {
        address: SAMPLE_ADDRESS.to_string(),
        land_area_sqm: 660.0,
        zone_type: None,
        individual_land_price_per_sqm: None,
        building_area_sqm: 0.0,
        annual_rental_income: 0.0,
        premium_factors: BTreeMap::new(),
        relaxation: Default::default(),
        as_of: None,
    };

    let context = demo_pipeline().analyze(&request)?;

    println!("분석 컨텍스트: {}", context.context_id);
    println!("대상지: {} ({}㎡)", context.address, context.land_area_sqm);
    println!("용도지역: {}", context.zone_type.label());
    println!(
        "감정평가액: {:.1}억원 (신뢰도 {})",
        context.appraisal.premium_adjusted_value / 100_000_000.0,
        context.appraisal.confidence.label()
    );
    println!(
        "용적률: {:.0}% → {:.0}%",
        context.relaxation.original_far_pct, context.relaxation.relaxed_far_pct
    );
    println!(
        "규모: {}세대 ({}), 주차 {}대",
        context.capacity.total_units,
        context.capacity.recommended_type.label(),
        context.capacity.parking_spaces
    );
    println!(
        "판정: {} — {}",
        context.financial.decision.label(),
        context.financial.decision_reason
    );
    if !context.fallback.is_empty() {
        println!("대체값 적용 내역:");
        for notice in context.fallback.notices() {
            println!("  - {notice}");
        }
    }

    for kind in ReportKind::ordered() {
        match context.report(kind) {
            Ok(report) => {
                println!(
                    "보고서 생성: {} (경고 {}건)",
                    kind.label(),
                    report.missing_kpi_warnings.len()
                );
                if args.include_html {
                    println!("{}", report.html);
                }
            }
            Err(err) => println!("보고서 차단: {err}"),
        }
    }

    Ok(())
}
