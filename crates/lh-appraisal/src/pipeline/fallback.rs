use serde::Serialize;
use tracing::warn;

use super::provider::{LandDataProvider, Transaction};
use super::zoning::{Overlay, ZoneType};

/// Seoul-area district defaults for the official land price (공시지가),
/// KRW per square meter. Engaged only when the official-price lookup fails.
const DISTRICT_PRICE_DEFAULTS: &[(&str, f64)] = &[
    ("강남구", 12_000_000.0),
    ("서초구", 11_500_000.0),
    ("송파구", 9_800_000.0),
    ("용산구", 9_200_000.0),
    ("마포구", 8_100_000.0),
    ("성동구", 7_600_000.0),
    ("영등포구", 7_200_000.0),
    ("동작구", 6_400_000.0),
    ("관악구", 5_900_000.0),
    ("노원구", 4_800_000.0),
    ("수원시", 4_100_000.0),
    ("성남시", 5_300_000.0),
    ("인천", 3_400_000.0),
];

/// Nationwide floor used when no district matches the address.
const NATIONAL_DEFAULT_PRICE: f64 = 3_000_000.0;

/// Market transactions typically clear above the official price; this factor
/// turns a district official-price default into a district-average market
/// price for the sales-comparison LOW tier.
const MARKET_OVER_OFFICIAL: f64 = 1.35;

const DEFAULT_ZONE: ZoneType = ZoneType::SecondGeneralResidential;

/// One substitution applied while resolving inputs. `provenance` is the
/// exact notice the reports print next to the affected figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    pub field: &'static str,
    pub reason: String,
    pub provenance: String,
}

/// Explicit record of every fallback substitution, returned alongside the
/// resolved input instead of being accumulated on hidden engine state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FallbackReport {
    pub entries: Vec<FallbackEntry>,
}

impl FallbackReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report-facing notices, one per substituted field.
    pub fn notices(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.field, entry.provenance))
            .collect()
    }

    fn push(&mut self, field: &'static str, reason: String, provenance: String) {
        warn!(field, %reason, "fallback applied");
        self.entries.push(FallbackEntry {
            field,
            reason,
            provenance,
        });
    }
}

/// Fully-populated analysis input: every numeric field downstream engines
/// divide by or capitalize on is present and non-zero after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedSite {
    pub zone_type: ZoneType,
    pub overlays: Vec<Overlay>,
    pub official_price_per_sqm: f64,
    pub district_average_price_per_sqm: f64,
    pub transactions: Vec<Transaction>,
}

/// Fills missing or failed inputs with district/zone defaults so that no
/// downstream computation divides by zero or silently produces a null.
#[derive(Debug, Clone, Default)]
pub struct FallbackResolver;

impl FallbackResolver {
    pub fn new() -> Self {
        Self
    }

    fn district_default(address: &str) -> (f64, String) {
        for (district, price) in DISTRICT_PRICE_DEFAULTS {
            if address.contains(district) {
                return (*price, format!("지역 평균값 사용 ({district})"));
            }
        }
        (
            NATIONAL_DEFAULT_PRICE,
            "지역 평균값 사용 (전국 기본값)".to_string(),
        )
    }

    /// Resolves the subject site against the provider, substituting defaults
    /// where lookups fail. Returns the fixed input paired with the fallback
    /// report; callers must surface the report, never discard it.
    pub fn resolve(
        &self,
        address: &str,
        zone_override: Option<ZoneType>,
        price_override: Option<f64>,
        provider: &dyn LandDataProvider,
    ) -> (ResolvedSite, FallbackReport) {
        let mut report = FallbackReport::default();

        let (zone_type, overlays) = match zone_override {
            Some(zone) => (zone, Vec::new()),
            None => match provider.get_zoning(address) {
                Ok(record) => (record.zone_type, record.overlays),
                Err(err) => {
                    report.push(
                        "zone_type",
                        err.to_string(),
                        format!("용도지역 기본값 적용 ({})", DEFAULT_ZONE.label()),
                    );
                    (DEFAULT_ZONE, Vec::new())
                }
            },
        };

        let (district_price, district_provenance) = Self::district_default(address);

        let official_price_per_sqm = match price_override {
            Some(price) if price > 0.0 => price,
            Some(price) => {
                report.push(
                    "official_price_per_sqm",
                    format!("supplied override {price} is not positive"),
                    district_provenance.clone(),
                );
                district_price
            }
            None => match provider.get_official_price(address) {
                Ok(price) if price > 0.0 => price,
                Ok(price) => {
                    report.push(
                        "official_price_per_sqm",
                        format!("provider returned non-positive price {price}"),
                        district_provenance.clone(),
                    );
                    district_price
                }
                Err(err) => {
                    report.push(
                        "official_price_per_sqm",
                        err.to_string(),
                        district_provenance.clone(),
                    );
                    district_price
                }
            },
        };

        let transactions = match provider.get_comparable_transactions(address, 500.0, 24) {
            Ok(transactions) => transactions,
            Err(err) => {
                report.push(
                    "comparable_transactions",
                    err.to_string(),
                    "거래사례 없음, 지역 평균 단가로 대체".to_string(),
                );
                Vec::new()
            }
        };

        let site = ResolvedSite {
            zone_type,
            overlays,
            official_price_per_sqm,
            district_average_price_per_sqm: district_price * MARKET_OVER_OFFICIAL,
            transactions,
        };

        (site, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::provider::UnavailableProvider;

    #[test]
    fn total_outage_still_resolves_positive_inputs() {
        let resolver = FallbackResolver::new();
        let (site, report) =
            resolver.resolve("서울시 강남구 역삼동 123-4", None, None, &UnavailableProvider);

        assert_eq!(site.zone_type, ZoneType::SecondGeneralResidential);
        assert_eq!(site.official_price_per_sqm, 12_000_000.0);
        assert!(site.district_average_price_per_sqm > site.official_price_per_sqm);
        assert!(site.transactions.is_empty());
        assert_eq!(report.entries.len(), 3);
        assert!(report
            .notices()
            .iter()
            .any(|notice| notice.contains("지역 평균값 사용")));
    }

    #[test]
    fn overrides_bypass_the_provider_without_fallback_entries() {
        let resolver = FallbackResolver::new();
        let (site, report) = resolver.resolve(
            "경기도 수원시 팔달구 1-1",
            Some(ZoneType::ThirdGeneralResidential),
            Some(6_200_000.0),
            &UnavailableProvider,
        );

        assert_eq!(site.zone_type, ZoneType::ThirdGeneralResidential);
        assert_eq!(site.official_price_per_sqm, 6_200_000.0);
        // Only the transaction lookup had to fall back.
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].field, "comparable_transactions");
    }

    #[test]
    fn unknown_district_uses_national_floor() {
        let (price, provenance) = FallbackResolver::district_default("제주도 서귀포시 1-1");
        assert_eq!(price, NATIONAL_DEFAULT_PRICE);
        assert!(provenance.contains("전국 기본값"));
    }
}
