use chrono::{Duration, NaiveDate};
use lh_appraisal::pipeline::cache::CachedProvider;
use lh_appraisal::pipeline::provider::{StaticLandDataProvider, Transaction, ZoningRecord};
use lh_appraisal::pipeline::zoning::ZoneType;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a YYYY-MM-DD date"))
}

/// Demo address with full provider coverage: zoning, official price, and a
/// comparable set dense enough for the radius tier.
pub(crate) const SAMPLE_ADDRESS: &str = "서울시 관악구 신림동 1680-4";

/// Static provider used by the demo commands and local runs. Addresses not
/// listed here exercise the fallback path end to end.
pub(crate) fn sample_provider() -> StaticLandDataProvider {
    let today = chrono::Local::now().date_naive();
    let transactions: Vec<Transaction> = (0..6)
        .map(|i| Transaction {
            date: today - Duration::days(45 + i * 60),
            price_per_sqm: 7_400_000.0 + (i as f64) * 55_000.0,
            distance_m: 180.0 + (i as f64) * 40.0,
            area_sqm: 250.0 + (i as f64) * 30.0,
        })
        .collect();

    StaticLandDataProvider::new()
        .with_zoning(
            SAMPLE_ADDRESS,
            ZoningRecord {
                zone_type: ZoneType::SecondGeneralResidential,
                bcr_legal_pct: 60.0,
                far_legal_pct: 250.0,
                overlays: Vec::new(),
            },
        )
        .with_official_price(SAMPLE_ADDRESS, 5_800_000.0)
        .with_transactions(SAMPLE_ADDRESS, transactions)
}

pub(crate) fn cached_sample_provider(ttl_secs: u64) -> CachedProvider<StaticLandDataProvider> {
    CachedProvider::new(sample_provider(), std::time::Duration::from_secs(ttl_secs))
}
