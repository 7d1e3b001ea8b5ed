use serde::{Deserialize, Serialize};

use super::config::AppraisalConfig;
use super::AppraisalInput;
use crate::pipeline::zoning::ZoneRule;

/// Income-approach sub-method. Selecting the wrong branch silently is the
/// highest-risk bug class in the whole valuation: a vacant parcel priced
/// with the existing-building formula is systematically overvalued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeMethod {
    /// Rental income and a standing building: direct NOI capitalization.
    ExistingBuilding,
    /// Vacant/development land: completion factor and risk discount applied
    /// to estimated NOI before capitalization at the development cap rate.
    DevelopmentLand,
    /// Standing building without rent data: rent estimated from value yield.
    YieldEstimate,
}

impl IncomeMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExistingBuilding => "수익환원법(기존건물)",
            Self::DevelopmentLand => "개발법(나대지)",
            Self::YieldEstimate => "수익환원법(임대료 추정)",
        }
    }
}

pub(crate) struct IncomeValuation {
    pub value: f64,
    pub method: IncomeMethod,
    pub steps: Vec<String>,
}

fn capitalize_existing(
    annual_rent: f64,
    config: &AppraisalConfig,
    rule: &ZoneRule,
    steps: &mut Vec<String>,
) -> f64 {
    let effective_gross = annual_rent * (1.0 - config.vacancy_rate_existing);
    let noi = effective_gross * (1.0 - config.opex_ratio_existing);
    let value = noi / rule.cap_rate;
    steps.push(format!(
        "수익환원: 연임대료 {annual_rent:.0}원, 공실률 {:.0}% 및 운영경비 {:.0}% 차감 NOI {noi:.0}원, 환원율 {:.2}% 적용 = {value:.0}원",
        config.vacancy_rate_existing * 100.0,
        config.opex_ratio_existing * 100.0,
        rule.cap_rate * 100.0
    ));
    value
}

/// Income approach with three sub-methods, branched on building area and
/// rent availability.
///
/// For development land the order of operations is load-bearing: the
/// completion factor and the risk discount reduce NOI first, then the
/// reduced NOI is capitalized at the development cap rate. Discounting the
/// capitalized value instead produces a systematically inflated figure.
pub(crate) fn compute_income_approach(
    input: &AppraisalInput,
    config: &AppraisalConfig,
    rule: &ZoneRule,
) -> IncomeValuation {
    let mut steps = Vec::new();

    if input.building_area_sqm == 0.0 {
        let potential_rent =
            input.official_price_per_sqm * input.land_area_sqm * rule.rental_yield;
        let effective_gross = potential_rent * (1.0 - config.vacancy_rate_development);
        let noi = effective_gross * (1.0 - config.opex_ratio_development);
        let discounted_noi = noi * config.completion_factor * (1.0 - config.risk_adjustment);
        let value = discounted_noi / rule.development_cap_rate;

        steps.push(format!(
            "개발법: 예상 연임대료 {potential_rent:.0}원 (지가 × 표준수익률 {:.1}%), 공실률 {:.0}%/경비율 {:.0}% 차감 NOI {noi:.0}원",
            rule.rental_yield * 100.0,
            config.vacancy_rate_development * 100.0,
            config.opex_ratio_development * 100.0
        ));
        steps.push(format!(
            "개발법: 완공계수 {:.2} × 위험조정 (1-{:.2}) 적용 NOI {discounted_noi:.0}원, 개발환원율 {:.1}% 적용 = {value:.0}원",
            config.completion_factor,
            config.risk_adjustment,
            rule.development_cap_rate * 100.0
        ));

        return IncomeValuation {
            value,
            method: IncomeMethod::DevelopmentLand,
            steps,
        };
    }

    if input.annual_rental_income > 0.0 {
        let value = capitalize_existing(input.annual_rental_income, config, rule, &mut steps);
        return IncomeValuation {
            value,
            method: IncomeMethod::ExistingBuilding,
            steps,
        };
    }

    let asset_base = input.official_price_per_sqm * input.land_area_sqm
        + input.building_area_sqm
            * config.construction_cost_per_sqm
            * config.building_residual_ratio;
    let estimated_rent = asset_base * config.yield_estimate_rate;
    steps.push(format!(
        "임대료 추정: 자산가액 {asset_base:.0}원 × 추정수익률 {:.1}% = 연 {estimated_rent:.0}원",
        config.yield_estimate_rate * 100.0
    ));
    let value = capitalize_existing(estimated_rent, config, rule, &mut steps);

    IncomeValuation {
        value,
        method: IncomeMethod::YieldEstimate,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::zoning::{ZoneRuleTable, ZoneType};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn input(building_area: f64, annual_rent: f64) -> AppraisalInput {
        AppraisalInput {
            address: "서울시 관악구 신림동 10-1".to_string(),
            land_area_sqm: 660.0,
            zone_type: ZoneType::SecondGeneralResidential,
            official_price_per_sqm: 6_000_000.0,
            district_average_price_per_sqm: 8_000_000.0,
            transactions: Vec::new(),
            building_area_sqm: building_area,
            annual_rental_income: annual_rent,
            premium_factors: BTreeMap::new(),
            as_of: NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date"),
        }
    }

    #[test]
    fn vacant_land_selects_the_development_sub_method() {
        let config = AppraisalConfig::default();
        let rule = ZoneRuleTable::standard().rule(ZoneType::SecondGeneralResidential);
        let valuation = compute_income_approach(&input(0.0, 0.0), &config, &rule);
        assert_eq!(valuation.method, IncomeMethod::DevelopmentLand);
    }

    #[test]
    fn development_discounts_apply_to_noi_before_capitalization() {
        let config = AppraisalConfig::default();
        let rule = ZoneRuleTable::standard().rule(ZoneType::SecondGeneralResidential);
        let subject = input(0.0, 0.0);
        let valuation = compute_income_approach(&subject, &config, &rule);

        let potential = 6_000_000.0 * 660.0 * rule.rental_yield;
        let noi = potential * (1.0 - 0.10) * (1.0 - 0.20);
        let expected = noi * 0.25 * 0.70 / rule.development_cap_rate;
        let naive = noi / rule.cap_rate;

        assert!((valuation.value - expected).abs() < 1.0);
        assert!((valuation.value - naive).abs() > 1.0);
    }

    #[test]
    fn rented_building_uses_direct_capitalization() {
        let config = AppraisalConfig::default();
        let rule = ZoneRuleTable::standard().rule(ZoneType::SecondGeneralResidential);
        let valuation = compute_income_approach(&input(800.0, 240_000_000.0), &config, &rule);
        assert_eq!(valuation.method, IncomeMethod::ExistingBuilding);
        let expected = 240_000_000.0 * 0.95 * 0.85 / rule.cap_rate;
        assert!((valuation.value - expected).abs() < 1.0);
    }

    #[test]
    fn building_without_rent_estimates_a_yield_based_rent() {
        let config = AppraisalConfig::default();
        let rule = ZoneRuleTable::standard().rule(ZoneType::SecondGeneralResidential);
        let valuation = compute_income_approach(&input(800.0, 0.0), &config, &rule);
        assert_eq!(valuation.method, IncomeMethod::YieldEstimate);
        assert!(valuation.value > 0.0);
    }
}
