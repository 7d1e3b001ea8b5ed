use serde::{Deserialize, Serialize};

use super::AppraisalError;

/// Blending weights across the three valuation approaches. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub cost: f64,
    pub sales: f64,
    pub income: f64,
}

impl BlendWeights {
    pub fn validate(&self) -> Result<(), AppraisalError> {
        let sum = self.cost + self.sales + self.income;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AppraisalError::InvalidInput(format!(
                "blend weights must sum to 1.0, got {sum:.6}"
            )));
        }
        if self.cost < 0.0 || self.sales < 0.0 || self.income < 0.0 {
            return Err(AppraisalError::InvalidInput(
                "blend weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            cost: 0.30,
            sales: 0.50,
            income: 0.20,
        }
    }
}

/// Calibration parameters for the appraisal engine.
///
/// The development-land completion factor and risk adjustment are program
/// calibration values, not statutory constants; they are configurable here
/// and default to the values used in LH submission practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppraisalConfig {
    pub weights: BlendWeights,
    /// Standard construction cost, KRW per square meter of floor area.
    pub construction_cost_per_sqm: f64,
    /// Regional cost multiplier applied to Seoul addresses.
    pub seoul_multiplier: f64,
    /// Remaining-value ratio applied to existing building cost.
    pub building_residual_ratio: f64,
    pub vacancy_rate_existing: f64,
    pub opex_ratio_existing: f64,
    pub vacancy_rate_development: f64,
    pub opex_ratio_development: f64,
    /// Fraction of stabilized NOI credited before completion.
    pub completion_factor: f64,
    /// Development risk discount applied to NOI before capitalization.
    pub risk_adjustment: f64,
    /// Yield used to estimate rent when a building exists without rent data.
    pub yield_estimate_rate: f64,
}

impl Default for AppraisalConfig {
    fn default() -> Self {
        Self {
            weights: BlendWeights::default(),
            construction_cost_per_sqm: 2_600_000.0,
            seoul_multiplier: 1.15,
            building_residual_ratio: 0.70,
            vacancy_rate_existing: 0.05,
            opex_ratio_existing: 0.15,
            vacancy_rate_development: 0.10,
            opex_ratio_development: 0.20,
            completion_factor: 0.25,
            risk_adjustment: 0.30,
            yield_estimate_rate: 0.04,
        }
    }
}
