use std::collections::BTreeMap;

/// Premium-factor catalogue: name, category, and the adjustment band the
/// reviewer expects. Values supplied by the request override nothing here;
/// the catalogue only classifies names for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorCategory {
    Physical,
    Location,
    Regulatory,
    Other,
}

impl FactorCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Physical => "물리적 요인",
            Self::Location => "입지 요인",
            Self::Regulatory => "규제 요인",
            Self::Other => "기타 요인",
        }
    }
}

const KNOWN_FACTORS: &[(&str, FactorCategory)] = &[
    ("shape", FactorCategory::Physical),
    ("slope", FactorCategory::Physical),
    ("orientation", FactorCategory::Physical),
    ("road_frontage", FactorCategory::Physical),
    ("subway_distance", FactorCategory::Location),
    ("school_district", FactorCategory::Location),
    ("park", FactorCategory::Location),
    ("hospital", FactorCategory::Location),
    ("gtx_station", FactorCategory::Location),
    ("redevelopment_status", FactorCategory::Regulatory),
    ("greenbelt", FactorCategory::Regulatory),
    ("heritage_zone", FactorCategory::Regulatory),
];

pub(crate) fn categorize(name: &str) -> FactorCategory {
    KNOWN_FACTORS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, category)| *category)
        .unwrap_or(FactorCategory::Other)
}

pub(crate) struct PremiumAdjustment {
    pub adjusted_value: f64,
    pub total_percentage: f64,
    pub steps: Vec<String>,
}

/// Sums the named percentage adjustments and applies them to the blended
/// value. An empty factor map is a no-op by construction, which keeps
/// requests without premium data backward compatible.
pub(crate) fn apply_premium(
    blended_value: f64,
    factors: &BTreeMap<String, f64>,
) -> PremiumAdjustment {
    if factors.is_empty() {
        return PremiumAdjustment {
            adjusted_value: blended_value,
            total_percentage: 0.0,
            steps: Vec::new(),
        };
    }

    let mut steps = Vec::new();
    let mut total_percentage = 0.0;
    for (name, percentage) in factors {
        total_percentage += percentage;
        steps.push(format!(
            "프리미엄({}): {} {:+.1}%",
            categorize(name).label(),
            name,
            percentage
        ));
    }

    let adjusted_value = blended_value * (1.0 + total_percentage / 100.0);
    steps.push(format!(
        "프리미엄 합계 {total_percentage:+.1}% 적용: {blended_value:.0}원 → {adjusted_value:.0}원"
    ));

    PremiumAdjustment {
        adjusted_value,
        total_percentage,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_factors_are_a_no_op() {
        let adjustment = apply_premium(1_000_000_000.0, &BTreeMap::new());
        assert_eq!(adjustment.adjusted_value, 1_000_000_000.0);
        assert_eq!(adjustment.total_percentage, 0.0);
        assert!(adjustment.steps.is_empty());
    }

    #[test]
    fn percentages_sum_before_application() {
        let mut factors = BTreeMap::new();
        factors.insert("subway_distance".to_string(), 30.0);
        factors.insert("gtx_station".to_string(), 50.0);
        factors.insert("slope".to_string(), -5.0);
        let adjustment = apply_premium(1_000_000_000.0, &factors);
        assert_eq!(adjustment.total_percentage, 75.0);
        assert!((adjustment.adjusted_value - 1_750_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_names_fall_into_the_other_category() {
        assert_eq!(categorize("subway_distance"), FactorCategory::Location);
        assert_eq!(categorize("riverside_view"), FactorCategory::Other);
    }
}
