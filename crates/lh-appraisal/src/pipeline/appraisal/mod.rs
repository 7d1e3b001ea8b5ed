mod config;
mod cost;
mod income;
mod premium;
mod sales;

pub use config::{AppraisalConfig, BlendWeights};
pub use income::IncomeMethod;
pub use sales::SalesTier;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use super::provider::Transaction;
use super::zoning::{ZoneRuleTable, ZoneType};

/// Valuation inputs for one subject site, fully resolved: no optional field
/// reaches the engine, the fallback resolver has already substituted
/// defaults and recorded provenance.
#[derive(Debug, Clone)]
pub struct AppraisalInput {
    pub address: String,
    pub land_area_sqm: f64,
    pub zone_type: ZoneType,
    pub official_price_per_sqm: f64,
    pub district_average_price_per_sqm: f64,
    pub transactions: Vec<Transaction>,
    /// 0 for vacant land; drives the income-approach branch.
    pub building_area_sqm: f64,
    /// 0 when no rent roll is available.
    pub annual_rental_income: f64,
    pub premium_factors: BTreeMap<String, f64>,
    pub as_of: NaiveDate,
}

/// Confidence grade for the valuation, driven by comparable count and
/// recency via the sales-comparison tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "높음",
            Self::Medium => "보통",
            Self::Low => "낮음",
        }
    }
}

/// Finalized valuation. Once the analysis context is assembled this value is
/// locked: every downstream module reads it, none may recompute it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppraisalResult {
    pub cost_value: f64,
    pub sales_comparison_value: f64,
    pub income_value: f64,
    pub weights: BlendWeights,
    pub blended_value: f64,
    pub premium_adjusted_value: f64,
    pub premium_percentage: f64,
    pub sales_tier: SalesTier,
    pub income_method: IncomeMethod,
    pub confidence: ConfidenceLevel,
    /// Ordered audit trail; required for submission review, not display-only.
    pub calculation_steps: Vec<String>,
}

impl AppraisalResult {
    pub fn value_per_sqm(&self, land_area_sqm: f64) -> f64 {
        self.premium_adjusted_value / land_area_sqm
    }
}

#[derive(Debug)]
pub enum AppraisalError {
    InvalidInput(String),
}

impl fmt::Display for AppraisalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppraisalError::InvalidInput(detail) => write!(f, "invalid input: {detail}"),
        }
    }
}

impl std::error::Error for AppraisalError {}

/// Three-approach appraisal engine: cost, sales comparison, and income,
/// blended under validated weights and adjusted by premium factors.
pub struct AppraisalEngine {
    config: AppraisalConfig,
    zone_rules: ZoneRuleTable,
}

impl AppraisalEngine {
    pub fn new(config: AppraisalConfig) -> Result<Self, AppraisalError> {
        config.weights.validate()?;
        Ok(Self {
            config,
            zone_rules: ZoneRuleTable::standard(),
        })
    }

    pub fn standard() -> Self {
        Self {
            config: AppraisalConfig::default(),
            zone_rules: ZoneRuleTable::standard(),
        }
    }

    pub fn config(&self) -> &AppraisalConfig {
        &self.config
    }

    /// Produces a single auditable valuation for the subject site.
    ///
    /// A valuation of exactly zero is never a terminal output: if all three
    /// approaches return zero the engine substitutes the district-average
    /// estimate and says so in the calculation steps.
    pub fn appraise(&self, input: &AppraisalInput) -> Result<AppraisalResult, AppraisalError> {
        if input.land_area_sqm <= 0.0 {
            return Err(AppraisalError::InvalidInput(format!(
                "land_area_sqm must be positive, got {}",
                input.land_area_sqm
            )));
        }

        let rule = self.zone_rules.rule(input.zone_type);
        let weights = self.config.weights;
        let mut steps = Vec::new();

        let cost = cost::compute_cost_approach(input, &self.config);
        steps.extend(cost.steps);

        let sales = sales::compute_sales_comparison(
            &input.transactions,
            input.land_area_sqm,
            input.district_average_price_per_sqm,
            input.as_of,
        );
        steps.extend(sales.steps);

        let income = income::compute_income_approach(input, &self.config, &rule);
        steps.extend(income.steps);

        let mut blended_value =
            cost.value * weights.cost + sales.value * weights.sales + income.value * weights.income;
        steps.push(format!(
            "가중평균: 원가 {:.0}×{:.2} + 비교 {:.0}×{:.2} + 수익 {:.0}×{:.2} = {:.0}원",
            cost.value,
            weights.cost,
            sales.value,
            weights.sales,
            income.value,
            weights.income,
            blended_value
        ));

        if cost.value == 0.0 && sales.value == 0.0 && income.value == 0.0 {
            blended_value = input.district_average_price_per_sqm * input.land_area_sqm;
            steps.push(format!(
                "세 접근법 모두 산정 불가, 지역 평균값 사용: {blended_value:.0}원"
            ));
        }

        let premium = premium::apply_premium(blended_value, &input.premium_factors);
        steps.extend(premium.steps);

        let confidence = match sales.tier {
            SalesTier::ExactAddress => ConfidenceLevel::High,
            SalesTier::Radius500m => ConfidenceLevel::Medium,
            SalesTier::DistrictAverage => ConfidenceLevel::Low,
        };

        info!(
            address = %input.address,
            blended = blended_value,
            adjusted = premium.adjusted_value,
            tier = sales.tier.label(),
            method = income.method.label(),
            "appraisal finalized"
        );

        Ok(AppraisalResult {
            cost_value: cost.value,
            sales_comparison_value: sales.value,
            income_value: income.value,
            weights,
            blended_value,
            premium_adjusted_value: premium.adjusted_value,
            premium_percentage: premium.total_percentage,
            sales_tier: sales.tier,
            income_method: income.method,
            confidence,
            calculation_steps: steps,
        })
    }
}
