use serde::{Deserialize, Serialize};

use super::relaxation::RelaxationResult;

/// Unit mix recommended for the site, sized for the newly-built
/// purchase-rental program's demand bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Studio,
    TwoRoom,
    ThreeRoom,
}

impl UnitType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Studio => "원룸형",
            Self::TwoRoom => "투룸형",
            Self::ThreeRoom => "쓰리룸형",
        }
    }

    /// Gross floor area per unit including common-area share, ㎡.
    pub const fn gross_area_sqm(self) -> f64 {
        match self {
            Self::Studio => 32.0,
            Self::TwoRoom => 49.0,
            Self::ThreeRoom => 69.0,
        }
    }

    /// Market monthly rent assumption per unit, KRW, for the private-rental
    /// comparison model.
    pub const fn monthly_rent_krw(self) -> f64 {
        match self {
            Self::Studio => 650_000.0,
            Self::TwoRoom => 950_000.0,
            Self::ThreeRoom => 1_300_000.0,
        }
    }

    /// Parking ratio per unit under the purchase-rental parking standard.
    pub const fn parking_ratio(self) -> f64 {
        match self {
            Self::Studio => 0.5,
            Self::TwoRoom => 0.8,
            Self::ThreeRoom => 1.0,
        }
    }
}

/// Buildable envelope figures derived from the legal and relaxed FAR/BCR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityResult {
    pub legal_floor_area_sqm: f64,
    pub relaxed_floor_area_sqm: f64,
    pub footprint_sqm: f64,
    pub estimated_floors: u32,
    pub recommended_type: UnitType,
    pub total_units: u32,
    pub parking_spaces: u32,
}

/// Pure arithmetic over the relaxed envelope; no data fetches, no rounding
/// surprises beyond the final floor/ceiling to whole units.
#[derive(Debug, Clone, Default)]
pub struct CapacityCalculator;

impl CapacityCalculator {
    pub fn new() -> Self {
        Self
    }

    fn recommend_type(land_area_sqm: f64) -> UnitType {
        if land_area_sqm < 500.0 {
            UnitType::Studio
        } else if land_area_sqm < 1200.0 {
            UnitType::TwoRoom
        } else {
            UnitType::ThreeRoom
        }
    }

    pub fn compute(&self, land_area_sqm: f64, relaxation: &RelaxationResult) -> CapacityResult {
        let legal_floor_area_sqm = land_area_sqm * relaxation.original_far_pct / 100.0;
        let relaxed_floor_area_sqm = land_area_sqm * relaxation.relaxed_far_pct / 100.0;
        let footprint_sqm = land_area_sqm * relaxation.relaxed_bcr_pct / 100.0;

        let estimated_floors = if footprint_sqm > 0.0 {
            (relaxed_floor_area_sqm / footprint_sqm).ceil() as u32
        } else {
            0
        };

        let recommended_type = Self::recommend_type(land_area_sqm);
        // Residential efficiency: share of gross floor area sold as units.
        let sellable_area = relaxed_floor_area_sqm * 0.85;
        let total_units = (sellable_area / recommended_type.gross_area_sqm()).floor() as u32;
        let parking_spaces = (total_units as f64 * recommended_type.parking_ratio()).ceil() as u32;

        CapacityResult {
            legal_floor_area_sqm,
            relaxed_floor_area_sqm,
            footprint_sqm,
            estimated_floors,
            recommended_type,
            total_units,
            parking_spaces,
        }
    }
}
