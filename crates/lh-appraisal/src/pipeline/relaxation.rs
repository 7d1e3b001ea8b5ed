use serde::{Deserialize, Serialize};
use tracing::warn;

use super::zoning::{ZoneRuleTable, ZoneType};

/// The six regulatory relaxation categories recognized by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationCategory {
    Daylight,
    DistrictUnitPlan,
    PublicContribution,
    GreenBuilding,
    BarrierFree,
    UrbanRegeneration,
}

impl RelaxationCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Daylight,
            Self::DistrictUnitPlan,
            Self::PublicContribution,
            Self::GreenBuilding,
            Self::BarrierFree,
            Self::UrbanRegeneration,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Daylight => "일조권 완화",
            Self::DistrictUnitPlan => "지구단위계획 완화",
            Self::PublicContribution => "공공기여 완화",
            Self::GreenBuilding => "녹색건축 인증 완화",
            Self::BarrierFree => "장애물 없는 생활환경 인증 완화",
            Self::UrbanRegeneration => "도시재생활성화 완화",
        }
    }

    /// Percentage FAR bump granted when the category qualifies. Public
    /// contribution is variable and handled separately.
    const fn far_bonus_pct(self) -> f64 {
        match self {
            Self::Daylight => 10.0,
            Self::DistrictUnitPlan => 20.0,
            Self::PublicContribution => 0.0,
            Self::GreenBuilding => 6.0,
            Self::BarrierFree => 3.0,
            Self::UrbanRegeneration => 10.0,
        }
    }

    /// Additive height bonus in meters. Kept separate from the percentage
    /// FAR bump; the two must never be conflated.
    const fn height_bonus_m(self) -> f64 {
        match self {
            Self::GreenBuilding => 3.0,
            Self::UrbanRegeneration => 5.0,
            _ => 0.0,
        }
    }

    /// Zone eligibility list for the category.
    fn eligible(self, zone: ZoneType) -> bool {
        match self {
            Self::Daylight => zone.is_residential(),
            Self::DistrictUnitPlan => !matches!(zone, ZoneType::NaturalGreen),
            Self::PublicContribution => !matches!(zone, ZoneType::NaturalGreen),
            Self::GreenBuilding => true,
            Self::BarrierFree => true,
            Self::UrbanRegeneration => zone.is_residential() || matches!(zone, ZoneType::QuasiIndustrial),
        }
    }
}

/// Site-specific qualification flags and figures for the relaxation gates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaxationFlags {
    pub district_unit_plan: bool,
    /// Land area dedicated to public use, in square meters.
    pub contributed_area_sqm: f64,
    pub green_building_certified: bool,
    pub barrier_free_certified: bool,
    pub urban_regeneration_area: bool,
}

/// Outcome for one category: granted or not, and by how much.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOutcome {
    pub category: RelaxationCategory,
    pub qualified: bool,
    pub far_bonus_pct: f64,
    pub height_bonus_m: f64,
}

/// Relaxed envelope for the subject site, with the clamp trail.
#[derive(Debug, Clone, Serialize)]
pub struct RelaxationResult {
    pub original_far_pct: f64,
    pub original_bcr_pct: f64,
    pub original_height_m: f64,
    pub relaxed_far_pct: f64,
    pub relaxed_bcr_pct: f64,
    pub relaxed_height_m: f64,
    pub categories: Vec<CategoryOutcome>,
    pub total_relaxation_pct: f64,
    /// Populated when the bonus stack hit the statutory ceiling and was
    /// clamped. Never empty in that case; the engine never exceeds silently.
    pub compliance_issues: Vec<String>,
}

/// Daylight relaxation requires a site large enough for the setback plane.
const DAYLIGHT_MIN_AREA_SQM: f64 = 1000.0;

/// Public contribution bonus: granted above this share of the land area...
const CONTRIBUTION_MIN_RATIO: f64 = 0.10;
/// ...at half the contribution ratio, capped at this percentage.
const CONTRIBUTION_CAP_PCT: f64 = 15.0;

/// Applies the six relaxation gates to the legal envelope, clamping FAR at
/// the statutory zone ceiling.
pub struct RelaxationEngine {
    zone_rules: ZoneRuleTable,
}

impl Default for RelaxationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaxationEngine {
    pub fn new() -> Self {
        Self {
            zone_rules: ZoneRuleTable::standard(),
        }
    }

    fn contribution_bonus_pct(land_area_sqm: f64, contributed_area_sqm: f64) -> f64 {
        if land_area_sqm <= 0.0 {
            return 0.0;
        }
        let ratio = contributed_area_sqm / land_area_sqm;
        if ratio <= CONTRIBUTION_MIN_RATIO {
            return 0.0;
        }
        (ratio * 100.0 * 0.5).min(CONTRIBUTION_CAP_PCT)
    }

    fn category_outcome(
        category: RelaxationCategory,
        zone: ZoneType,
        land_area_sqm: f64,
        flags: &RelaxationFlags,
    ) -> CategoryOutcome {
        let qualified = category.eligible(zone)
            && match category {
                RelaxationCategory::Daylight => land_area_sqm > DAYLIGHT_MIN_AREA_SQM,
                RelaxationCategory::DistrictUnitPlan => flags.district_unit_plan,
                RelaxationCategory::PublicContribution => {
                    Self::contribution_bonus_pct(land_area_sqm, flags.contributed_area_sqm) > 0.0
                }
                RelaxationCategory::GreenBuilding => flags.green_building_certified,
                RelaxationCategory::BarrierFree => flags.barrier_free_certified,
                RelaxationCategory::UrbanRegeneration => flags.urban_regeneration_area,
            };

        let far_bonus_pct = if !qualified {
            0.0
        } else if category == RelaxationCategory::PublicContribution {
            Self::contribution_bonus_pct(land_area_sqm, flags.contributed_area_sqm)
        } else {
            category.far_bonus_pct()
        };

        CategoryOutcome {
            category,
            qualified,
            far_bonus_pct,
            height_bonus_m: if qualified { category.height_bonus_m() } else { 0.0 },
        }
    }

    /// Sums qualifying bonuses into the relaxed envelope. FAR is clamped to
    /// the zone's statutory ceiling; a clamp is always recorded as a
    /// compliance issue.
    pub fn apply_relaxation(
        &self,
        zone_type: ZoneType,
        original_far_pct: f64,
        original_bcr_pct: f64,
        original_height_m: f64,
        land_area_sqm: f64,
        flags: &RelaxationFlags,
    ) -> RelaxationResult {
        let rule = self.zone_rules.rule(zone_type);

        let categories: Vec<CategoryOutcome> = RelaxationCategory::ordered()
            .into_iter()
            .map(|category| Self::category_outcome(category, zone_type, land_area_sqm, flags))
            .collect();

        let total_relaxation_pct: f64 = categories.iter().map(|c| c.far_bonus_pct).sum();
        let height_bonus_m: f64 = categories.iter().map(|c| c.height_bonus_m).sum();

        let uncapped_far = original_far_pct * (1.0 + total_relaxation_pct / 100.0);
        let mut compliance_issues = Vec::new();
        let relaxed_far_pct = if uncapped_far > rule.far_ceiling_pct {
            warn!(
                zone = zone_type.label(),
                uncapped = uncapped_far,
                ceiling = rule.far_ceiling_pct,
                "relaxed FAR clamped to statutory ceiling"
            );
            compliance_issues.push(format!(
                "완화 적용 용적률 {:.1}%가 {} 법정 상한 {:.0}%를 초과하여 조정됨",
                uncapped_far,
                zone_type.label(),
                rule.far_ceiling_pct
            ));
            rule.far_ceiling_pct
        } else {
            uncapped_far
        };

        RelaxationResult {
            original_far_pct,
            original_bcr_pct,
            original_height_m,
            relaxed_far_pct,
            relaxed_bcr_pct: original_bcr_pct.min(rule.bcr_legal_pct),
            relaxed_height_m: original_height_m + height_bonus_m,
            categories,
            total_relaxation_pct,
            compliance_issues,
        }
    }

    /// Theoretical ceiling if every eligible category qualified, for
    /// what-if display only. Never used as the committed envelope.
    pub fn estimate_max_relaxation(&self, zone_type: ZoneType, original_far_pct: f64) -> f64 {
        let max_total: f64 = RelaxationCategory::ordered()
            .into_iter()
            .filter(|category| category.eligible(zone_type))
            .map(|category| {
                if category == RelaxationCategory::PublicContribution {
                    CONTRIBUTION_CAP_PCT
                } else {
                    category.far_bonus_pct()
                }
            })
            .sum();
        original_far_pct * (1.0 + max_total / 100.0)
    }
}
