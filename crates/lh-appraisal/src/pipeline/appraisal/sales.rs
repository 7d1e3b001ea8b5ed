use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::pipeline::provider::Transaction;

/// Which rung of the comparable-search ladder produced the value. The tier
/// is recorded on the result; reports must disclose it, not just the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesTier {
    /// ≥5 transactions within 12 months at the immediate address block.
    ExactAddress,
    /// ≥5 transactions within 500m over a 24-month window.
    Radius500m,
    /// District average substituted; no usable comparables.
    DistrictAverage,
}

impl SalesTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExactAddress => "당해 지번 거래사례",
            Self::Radius500m => "반경 500m 거래사례",
            Self::DistrictAverage => "지역 평균 단가",
        }
    }
}

pub(crate) struct SalesComparison {
    pub value: f64,
    pub tier: SalesTier,
    pub adjusted_price_per_sqm: f64,
    pub steps: Vec<String>,
}

const EXACT_DISTANCE_M: f64 = 100.0;
const FALLBACK_DISTANCE_M: f64 = 500.0;
const MIN_COMPARABLES: usize = 5;

fn months_old(date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - date).num_days() / 30
}

fn recency_factor(months: i64) -> f64 {
    if months <= 6 {
        1.0
    } else if months <= 12 {
        0.95
    } else {
        0.88
    }
}

fn distance_factor(distance_m: f64) -> f64 {
    (1.0 - (distance_m / 1000.0) * 0.05).max(0.90)
}

fn adjusted_average(transactions: &[&Transaction], as_of: NaiveDate) -> f64 {
    let sum: f64 = transactions
        .iter()
        .map(|tx| {
            tx.price_per_sqm
                * recency_factor(months_old(tx.date, as_of))
                * distance_factor(tx.distance_m)
        })
        .sum();
    sum / transactions.len() as f64
}

/// Sales-comparison approach (거래사례비교법) with a strict three-tier
/// fallback ladder. Falling to a lower tier is always recorded; the engine
/// never silently mixes tiers.
pub(crate) fn compute_sales_comparison(
    transactions: &[Transaction],
    land_area_sqm: f64,
    district_average_price_per_sqm: f64,
    as_of: NaiveDate,
) -> SalesComparison {
    let twelve_months_ago = as_of - Duration::days(365);
    let twenty_four_months_ago = as_of - Duration::days(730);

    let exact: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.distance_m <= EXACT_DISTANCE_M && tx.date >= twelve_months_ago)
        .collect();

    if exact.len() >= MIN_COMPARABLES {
        let price = adjusted_average(&exact, as_of);
        let value = price * land_area_sqm;
        return SalesComparison {
            value,
            tier: SalesTier::ExactAddress,
            adjusted_price_per_sqm: price,
            steps: vec![format!(
                "거래사례비교법: 당해 지번 12개월 내 {}건, 보정단가 {:.0}원/㎡ × {:.1}㎡ = {:.0}원",
                exact.len(),
                price,
                land_area_sqm,
                value
            )],
        };
    }

    let nearby: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.distance_m <= FALLBACK_DISTANCE_M && tx.date >= twenty_four_months_ago)
        .collect();

    if nearby.len() >= MIN_COMPARABLES {
        let price = adjusted_average(&nearby, as_of);
        let value = price * land_area_sqm;
        return SalesComparison {
            value,
            tier: SalesTier::Radius500m,
            adjusted_price_per_sqm: price,
            steps: vec![format!(
                "거래사례비교법: 반경 500m/24개월 {}건, 보정단가 {:.0}원/㎡ × {:.1}㎡ = {:.0}원",
                nearby.len(),
                price,
                land_area_sqm,
                value
            )],
        };
    }

    let value = district_average_price_per_sqm * land_area_sqm;
    SalesComparison {
        value,
        tier: SalesTier::DistrictAverage,
        adjusted_price_per_sqm: district_average_price_per_sqm,
        steps: vec![format!(
            "거래사례비교법: 사례 부족({}건), 지역 평균 {:.0}원/㎡ × {:.1}㎡ = {:.0}원",
            transactions.len(),
            district_average_price_per_sqm,
            land_area_sqm,
            value
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date")
    }

    fn transaction(days_ago: i64, distance_m: f64, price: f64) -> Transaction {
        Transaction {
            date: as_of() - Duration::days(days_ago),
            price_per_sqm: price,
            distance_m,
            area_sqm: 300.0,
        }
    }

    #[test]
    fn five_recent_onsite_transactions_hit_the_exact_tier() {
        let transactions: Vec<_> = (0..5)
            .map(|i| transaction(30 + i * 10, 20.0, 8_000_000.0))
            .collect();
        let result = compute_sales_comparison(&transactions, 400.0, 5_000_000.0, as_of());
        assert_eq!(result.tier, SalesTier::ExactAddress);
        assert_eq!(result.adjusted_price_per_sqm, 8_000_000.0 * distance_factor(20.0));
    }

    #[test]
    fn four_onsite_plus_nearby_falls_to_radius_tier() {
        let mut transactions: Vec<_> = (0..4)
            .map(|i| transaction(30 + i * 10, 20.0, 8_000_000.0))
            .collect();
        transactions.push(transaction(500, 400.0, 7_500_000.0));
        let result = compute_sales_comparison(&transactions, 400.0, 5_000_000.0, as_of());
        assert_eq!(result.tier, SalesTier::Radius500m);
    }

    #[test]
    fn no_comparables_substitutes_the_district_average() {
        let result = compute_sales_comparison(&[], 660.0, 5_000_000.0, as_of());
        assert_eq!(result.tier, SalesTier::DistrictAverage);
        assert_eq!(result.value, 5_000_000.0 * 660.0);
    }

    #[test]
    fn stale_transactions_are_discounted() {
        assert!(recency_factor(3) > recency_factor(9));
        assert!(recency_factor(9) > recency_factor(20));
    }
}
