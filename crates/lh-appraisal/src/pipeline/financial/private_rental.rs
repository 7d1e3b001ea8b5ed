use serde::{Deserialize, Serialize};

/// Assumptions for the 30-year private-rental hold model. This engine is a
/// clearly-labeled comparison track; it is never substituted for the
/// policy-transaction model, whose LH purchase dynamics differ materially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateRentalConfig {
    pub hold_years: u32,
    pub annual_rent_growth: f64,
    pub vacancy_rate: f64,
    pub opex_ratio: f64,
    pub discount_rate: f64,
    pub exit_cap_rate: f64,
}

impl Default for PrivateRentalConfig {
    fn default() -> Self {
        Self {
            hold_years: 30,
            annual_rent_growth: 0.015,
            vacancy_rate: 0.05,
            opex_ratio: 0.15,
            discount_rate: 0.045,
            exit_cap_rate: 0.050,
        }
    }
}

/// Multi-year hold outcome. `irr` here is a true internal rate of return
/// solved over the full cash-flow schedule, unlike the policy model's
/// single-period ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrivateRentalResult {
    pub npv: f64,
    pub irr: Option<f64>,
    pub first_year_noi: f64,
    pub terminal_value: f64,
}

pub struct PrivateRentalEngine {
    config: PrivateRentalConfig,
}

impl PrivateRentalEngine {
    pub fn new(config: PrivateRentalConfig) -> Self {
        Self { config }
    }

    pub fn standard() -> Self {
        Self::new(PrivateRentalConfig::default())
    }

    fn cash_flows(&self, total_capex: f64, annual_gross_rent: f64) -> (Vec<f64>, f64) {
        let mut flows = vec![-total_capex];
        let mut rent = annual_gross_rent;
        let mut terminal_value = 0.0;
        for year in 1..=self.config.hold_years {
            let noi = rent * (1.0 - self.config.vacancy_rate) * (1.0 - self.config.opex_ratio);
            if year == self.config.hold_years {
                terminal_value = noi / self.config.exit_cap_rate;
                flows.push(noi + terminal_value);
            } else {
                flows.push(noi);
            }
            rent *= 1.0 + self.config.annual_rent_growth;
        }
        (flows, terminal_value)
    }

    fn npv_at(flows: &[f64], rate: f64) -> f64 {
        flows
            .iter()
            .enumerate()
            .map(|(year, flow)| flow / (1.0 + rate).powi(year as i32))
            .sum()
    }

    /// Solves for the discount rate that zeroes the schedule, by bisection.
    /// Returns `None` when no sign change exists in the search band.
    fn solve_irr(flows: &[f64]) -> Option<f64> {
        let mut low = -0.50;
        let mut high = 1.00;
        let npv_low = Self::npv_at(flows, low);
        let npv_high = Self::npv_at(flows, high);
        if npv_low.signum() == npv_high.signum() {
            return None;
        }
        for _ in 0..200 {
            let mid = (low + high) / 2.0;
            let npv_mid = Self::npv_at(flows, mid);
            if npv_mid.abs() < 1e-6 {
                return Some(mid);
            }
            if npv_mid.signum() == npv_low.signum() {
                low = mid;
            } else {
                high = mid;
            }
        }
        Some((low + high) / 2.0)
    }

    pub fn evaluate(&self, total_capex: f64, annual_gross_rent: f64) -> PrivateRentalResult {
        let (flows, terminal_value) = self.cash_flows(total_capex, annual_gross_rent);
        let npv = Self::npv_at(&flows, self.config.discount_rate);
        let irr = Self::solve_irr(&flows);
        let first_year_noi =
            annual_gross_rent * (1.0 - self.config.vacancy_rate) * (1.0 - self.config.opex_ratio);

        PrivateRentalResult {
            npv,
            irr,
            first_year_noi,
            terminal_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_spans_the_configured_hold() {
        let engine = PrivateRentalEngine::standard();
        let (flows, terminal) = engine.cash_flows(10_000_000_000.0, 600_000_000.0);
        assert_eq!(flows.len(), 31);
        assert!(terminal > 0.0);
        assert!(flows[0] < 0.0);
        assert!(flows[30] > flows[29], "terminal year includes exit value");
    }

    #[test]
    fn irr_matches_the_rate_that_zeroes_npv() {
        let engine = PrivateRentalEngine::standard();
        let (flows, _) = engine.cash_flows(8_000_000_000.0, 700_000_000.0);
        let irr = PrivateRentalEngine::solve_irr(&flows).expect("sign change exists");
        assert!(PrivateRentalEngine::npv_at(&flows, irr).abs() < 1.0);
    }

    #[test]
    fn hopeless_projects_have_no_irr_in_band() {
        let engine = PrivateRentalEngine::standard();
        let (flows, _) = engine.cash_flows(100_000_000_000.0, 1_000.0);
        assert!(PrivateRentalEngine::solve_irr(&flows).is_none());
    }
}
