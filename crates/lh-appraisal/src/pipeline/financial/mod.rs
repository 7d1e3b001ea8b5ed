mod policy;
mod private_rental;

pub use policy::Decision;
pub use private_rental::{PrivateRentalConfig, PrivateRentalEngine, PrivateRentalResult};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::HUNDRED_MILLION_KRW;

/// Indirect-cost rates for the CAPEX breakdown. Each rate names its base
/// explicitly; the grand total must reconcile against the named components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialConfig {
    /// Acquisition tax and registration, rate on the land purchase price.
    pub acquisition_tax_rate: f64,
    /// Design fee, rate on construction cost.
    pub design_fee_rate: f64,
    /// Supervision fee, rate on construction cost.
    pub supervision_fee_rate: f64,
    /// Contingency, rate on land + construction.
    pub contingency_rate: f64,
    /// Financing costs, rate on land + construction.
    pub financial_cost_rate: f64,
    /// Other project costs, rate on land + construction.
    pub other_cost_rate: f64,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            acquisition_tax_rate: 0.046,
            design_fee_rate: 0.030,
            supervision_fee_rate: 0.020,
            contingency_rate: 0.050,
            financial_cost_rate: 0.040,
            other_cost_rate: 0.020,
        }
    }
}

/// Full CAPEX breakdown. The eight named components must sum to
/// `total_capex` within 0.01 KRW; `validate` enforces this, it is never
/// assumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapexBreakdown {
    pub land_purchase: f64,
    pub acquisition_tax: f64,
    pub construction_cost: f64,
    pub design_fee: f64,
    pub supervision_fee: f64,
    pub contingency: f64,
    pub financial_costs: f64,
    pub other_costs: f64,
    pub total_capex: f64,
}

/// Reconciliation tolerance for the CAPEX sum, in KRW.
const CAPEX_TOLERANCE: f64 = 0.01;

impl CapexBreakdown {
    pub fn component_sum(&self) -> f64 {
        self.land_purchase
            + self.acquisition_tax
            + self.construction_cost
            + self.design_fee
            + self.supervision_fee
            + self.contingency
            + self.financial_costs
            + self.other_costs
    }

    pub fn validate(&self) -> Result<(), FinancialError> {
        let sum = self.component_sum();
        if (sum - self.total_capex).abs() > CAPEX_TOLERANCE {
            return Err(FinancialError::CapexMismatch {
                component_sum: sum,
                total_capex: self.total_capex,
            });
        }
        Ok(())
    }
}

/// LH's appraisal recognition of the cost base: land and construction are
/// recognized independently at the submission's appraisal rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LhAppraisal {
    pub land_appraisal: f64,
    pub construction_appraisal: f64,
    pub total_appraisal: f64,
    /// total recognized value over total CAPEX, reported for the reviewer.
    pub effective_rate: f64,
}

/// Appraisal-rate scenarios for the sensitivity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Pessimistic,
    Base,
    Optimistic,
}

impl Scenario {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pessimistic, Self::Base, Self::Optimistic]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pessimistic => "보수적",
            Self::Base => "기준",
            Self::Optimistic => "낙관적",
        }
    }

    pub const fn appraisal_rate(self) -> f64 {
        match self {
            Self::Pessimistic => 0.85,
            Self::Base => 0.90,
            Self::Optimistic => 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub appraisal_rate: f64,
    pub purchase_price: f64,
    pub npv: f64,
    pub irr: f64,
    pub decision: Decision,
}

/// Outcome of the policy-transaction model for one site.
///
/// `irr` is the single-period return npv / capex, matching the
/// build-then-sell transaction shape; it is not an annualized multi-year
/// rate. The private-rental comparison carries a true IRR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialResult {
    pub capex: CapexBreakdown,
    pub appraisal: LhAppraisal,
    pub purchase_price: f64,
    pub npv: f64,
    pub irr: f64,
    pub decision: Decision,
    pub decision_reason: String,
    pub sensitivity: Vec<ScenarioOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum FinancialError {
    #[error("appraisal rate {0:.3} outside the LH recognition band [0.85, 0.95]")]
    AppraisalRateOutOfBand(f64),
    #[error("internal adjustment {0:.3} outside the review band [0.95, 1.05]")]
    AdjustmentOutOfBand(f64),
    #[error(
        "capex components sum to {component_sum:.2} but total_capex is {total_capex:.2}"
    )]
    CapexMismatch {
        component_sum: f64,
        total_capex: f64,
    },
}

/// Policy-transaction financial model: build, then sell to LH at an
/// appraisal-derived price.
pub struct FinancialEngine {
    config: FinancialConfig,
}

impl Default for FinancialEngine {
    fn default() -> Self {
        Self::new(FinancialConfig::default())
    }
}

impl FinancialEngine {
    pub fn new(config: FinancialConfig) -> Self {
        Self { config }
    }

    /// Builds and reconciles the CAPEX breakdown from the land price and
    /// construction cost.
    pub fn build_capex(
        &self,
        land_purchase: f64,
        construction_cost: f64,
    ) -> Result<CapexBreakdown, FinancialError> {
        let hard_base = land_purchase + construction_cost;
        let acquisition_tax = land_purchase * self.config.acquisition_tax_rate;
        let design_fee = construction_cost * self.config.design_fee_rate;
        let supervision_fee = construction_cost * self.config.supervision_fee_rate;
        let contingency = hard_base * self.config.contingency_rate;
        let financial_costs = hard_base * self.config.financial_cost_rate;
        let other_costs = hard_base * self.config.other_cost_rate;

        let breakdown = CapexBreakdown {
            land_purchase,
            acquisition_tax,
            construction_cost,
            design_fee,
            supervision_fee,
            contingency,
            financial_costs,
            other_costs,
            total_capex: land_purchase
                + acquisition_tax
                + construction_cost
                + design_fee
                + supervision_fee
                + contingency
                + financial_costs
                + other_costs,
        };
        breakdown.validate()?;
        Ok(breakdown)
    }

    /// LH recognition of the cost base at `appraisal_rate` ∈ [0.85, 0.95],
    /// applied to land and construction independently.
    pub fn calculate_appraisal_value(
        &self,
        capex: &CapexBreakdown,
        appraisal_rate: f64,
    ) -> Result<LhAppraisal, FinancialError> {
        if !(0.85..=0.95).contains(&appraisal_rate) {
            return Err(FinancialError::AppraisalRateOutOfBand(appraisal_rate));
        }
        let land_appraisal = capex.land_purchase * appraisal_rate;
        let construction_appraisal = capex.construction_cost * appraisal_rate;
        let total_appraisal = land_appraisal + construction_appraisal;
        Ok(LhAppraisal {
            land_appraisal,
            construction_appraisal,
            total_appraisal,
            effective_rate: total_appraisal / capex.total_capex,
        })
    }

    /// LH's internal review adjustment on the recognized value,
    /// `internal_adjustment` ∈ [0.95, 1.05].
    pub fn calculate_final_purchase_price(
        &self,
        appraisal: &LhAppraisal,
        internal_adjustment: f64,
    ) -> Result<f64, FinancialError> {
        if !(0.95..=1.05).contains(&internal_adjustment) {
            return Err(FinancialError::AdjustmentOutOfBand(internal_adjustment));
        }
        Ok(appraisal.total_appraisal * internal_adjustment)
    }

    /// Linear escalation for construction-cost-linkage contracts.
    pub fn apply_construction_indexing(&self, base_cost: f64, market_index_change: f64) -> f64 {
        base_cost * (1.0 + market_index_change)
    }

    fn outcome_at(
        &self,
        capex: &CapexBreakdown,
        appraisal_rate: f64,
        internal_adjustment: f64,
    ) -> Result<(f64, f64, f64, Decision), FinancialError> {
        let appraisal = self.calculate_appraisal_value(capex, appraisal_rate)?;
        let purchase_price = self.calculate_final_purchase_price(&appraisal, internal_adjustment)?;
        let npv = purchase_price - capex.total_capex;
        // Single-period return for a build-then-sell transaction.
        let irr = npv / capex.total_capex;
        Ok((purchase_price, npv, irr, policy::decide(npv, irr)))
    }

    /// Full policy-model evaluation including the three-scenario
    /// sensitivity table the reports share.
    pub fn evaluate(
        &self,
        capex: CapexBreakdown,
        appraisal_rate: f64,
        internal_adjustment: f64,
    ) -> Result<FinancialResult, FinancialError> {
        capex.validate()?;
        let appraisal = self.calculate_appraisal_value(&capex, appraisal_rate)?;
        let (purchase_price, npv, irr, decision) =
            self.outcome_at(&capex, appraisal_rate, internal_adjustment)?;
        let decision_reason = policy::decision_reason(decision, npv, irr, appraisal_rate);

        let sensitivity = self.sensitivity_analysis(&capex, internal_adjustment)?;

        info!(
            npv_100m = npv / HUNDRED_MILLION_KRW,
            irr,
            decision = decision.label(),
            "policy-transaction evaluation complete"
        );

        Ok(FinancialResult {
            capex,
            appraisal,
            purchase_price,
            npv,
            irr,
            decision,
            decision_reason,
            sensitivity,
        })
    }

    /// Re-runs the evaluation at the pessimistic/base/optimistic appraisal
    /// rates; the one table every report narrates risk from.
    pub fn sensitivity_analysis(
        &self,
        capex: &CapexBreakdown,
        internal_adjustment: f64,
    ) -> Result<Vec<ScenarioOutcome>, FinancialError> {
        Scenario::ordered()
            .into_iter()
            .map(|scenario| {
                let rate = scenario.appraisal_rate();
                let (purchase_price, npv, irr, decision) =
                    self.outcome_at(capex, rate, internal_adjustment)?;
                Ok(ScenarioOutcome {
                    scenario,
                    appraisal_rate: rate,
                    purchase_price,
                    npv,
                    irr,
                    decision,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capex_components_reconcile_to_the_total() {
        let engine = FinancialEngine::default();
        let capex = engine
            .build_capex(5_000_000_000.0, 4_000_000_000.0)
            .expect("breakdown reconciles");
        assert!((capex.component_sum() - capex.total_capex).abs() <= 0.01);
    }

    #[test]
    fn tampered_totals_fail_validation() {
        let engine = FinancialEngine::default();
        let mut capex = engine
            .build_capex(5_000_000_000.0, 4_000_000_000.0)
            .expect("breakdown reconciles");
        capex.total_capex += 1.0;
        assert!(matches!(
            capex.validate(),
            Err(FinancialError::CapexMismatch { .. })
        ));
    }

    #[test]
    fn appraisal_rate_band_is_enforced() {
        let engine = FinancialEngine::default();
        let capex = engine
            .build_capex(5_000_000_000.0, 4_000_000_000.0)
            .expect("breakdown reconciles");
        assert!(engine.calculate_appraisal_value(&capex, 0.80).is_err());
        assert!(engine.calculate_appraisal_value(&capex, 0.96).is_err());
        let appraisal = engine
            .calculate_appraisal_value(&capex, 0.90)
            .expect("rate in band");
        assert!(appraisal.effective_rate < 0.90);
    }

    #[test]
    fn indexing_is_linear() {
        let engine = FinancialEngine::default();
        assert_eq!(
            engine.apply_construction_indexing(4_000_000_000.0, 0.03),
            4_120_000_000.0
        );
    }

    #[test]
    fn sensitivity_covers_all_three_scenarios_in_order() {
        let engine = FinancialEngine::default();
        let capex = engine
            .build_capex(5_000_000_000.0, 4_000_000_000.0)
            .expect("breakdown reconciles");
        let table = engine
            .sensitivity_analysis(&capex, 1.0)
            .expect("scenarios evaluate");
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].scenario, Scenario::Pessimistic);
        assert!(table[0].npv < table[2].npv);
    }
}
