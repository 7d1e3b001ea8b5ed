use serde::{Deserialize, Serialize};
use std::fmt;

/// Korean use-zone categories covered by the newly-built purchase-rental
/// program. Commercial and industrial zones are carried for mixed-use
/// submissions even though most sites fall in the general residential bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    FirstExclusiveResidential,
    SecondExclusiveResidential,
    FirstGeneralResidential,
    SecondGeneralResidential,
    ThirdGeneralResidential,
    QuasiResidential,
    GeneralCommercial,
    QuasiIndustrial,
    NaturalGreen,
}

impl ZoneType {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::FirstExclusiveResidential,
            Self::SecondExclusiveResidential,
            Self::FirstGeneralResidential,
            Self::SecondGeneralResidential,
            Self::ThirdGeneralResidential,
            Self::QuasiResidential,
            Self::GeneralCommercial,
            Self::QuasiIndustrial,
            Self::NaturalGreen,
        ]
    }

    /// Statutory Korean designation, as printed on zoning certificates.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstExclusiveResidential => "제1종전용주거지역",
            Self::SecondExclusiveResidential => "제2종전용주거지역",
            Self::FirstGeneralResidential => "제1종일반주거지역",
            Self::SecondGeneralResidential => "제2종일반주거지역",
            Self::ThirdGeneralResidential => "제3종일반주거지역",
            Self::QuasiResidential => "준주거지역",
            Self::GeneralCommercial => "일반상업지역",
            Self::QuasiIndustrial => "준공업지역",
            Self::NaturalGreen => "자연녹지지역",
        }
    }

    /// Parses the Korean designation as it appears in zoning records.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ordered()
            .into_iter()
            .find(|zone| zone.label() == trimmed)
    }

    pub const fn is_residential(self) -> bool {
        matches!(
            self,
            Self::FirstExclusiveResidential
                | Self::SecondExclusiveResidential
                | Self::FirstGeneralResidential
                | Self::SecondGeneralResidential
                | Self::ThirdGeneralResidential
                | Self::QuasiResidential
        )
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overlay designations that restrict or qualify a parcel beyond its use zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    DistrictUnitPlan,
    HeightDistrict,
    Greenbelt,
    CulturalHeritage,
}

impl Overlay {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DistrictUnitPlan => "지구단위계획구역",
            Self::HeightDistrict => "고도지구",
            Self::Greenbelt => "개발제한구역",
            Self::CulturalHeritage => "문화재보호구역",
        }
    }
}

/// Legal envelope and valuation parameters for one zone.
///
/// `far_ceiling_pct` is the statutory maximum after every relaxation; the
/// relaxation engine clamps to it and records a compliance issue when a
/// bonus stack would exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneRule {
    pub bcr_legal_pct: f64,
    pub far_legal_pct: f64,
    pub far_ceiling_pct: f64,
    pub height_limit_m: f64,
    /// Capitalization rate for income-producing existing buildings.
    pub cap_rate: f64,
    /// Capitalization rate for development-land appraisal (higher, reflects
    /// entitlement and construction risk).
    pub development_cap_rate: f64,
    /// Zone-typical gross rental yield on land value, used to estimate
    /// post-development income for vacant sites.
    pub rental_yield: f64,
}

/// Static lookup of legal BCR/FAR/height and valuation rates by zone.
#[derive(Debug, Clone)]
pub struct ZoneRuleTable;

impl ZoneRuleTable {
    pub fn standard() -> Self {
        Self
    }

    pub fn rule(&self, zone: ZoneType) -> ZoneRule {
        match zone {
            ZoneType::FirstExclusiveResidential => ZoneRule {
                bcr_legal_pct: 50.0,
                far_legal_pct: 100.0,
                far_ceiling_pct: 150.0,
                height_limit_m: 12.0,
                cap_rate: 0.050,
                development_cap_rate: 0.060,
                rental_yield: 0.040,
            },
            ZoneType::SecondExclusiveResidential => ZoneRule {
                bcr_legal_pct: 50.0,
                far_legal_pct: 150.0,
                far_ceiling_pct: 200.0,
                height_limit_m: 15.0,
                cap_rate: 0.050,
                development_cap_rate: 0.060,
                rental_yield: 0.040,
            },
            ZoneType::FirstGeneralResidential => ZoneRule {
                bcr_legal_pct: 60.0,
                far_legal_pct: 200.0,
                far_ceiling_pct: 250.0,
                height_limit_m: 20.0,
                cap_rate: 0.052,
                development_cap_rate: 0.060,
                rental_yield: 0.042,
            },
            ZoneType::SecondGeneralResidential => ZoneRule {
                bcr_legal_pct: 60.0,
                far_legal_pct: 250.0,
                far_ceiling_pct: 280.0,
                height_limit_m: 28.0,
                cap_rate: 0.053,
                development_cap_rate: 0.060,
                rental_yield: 0.045,
            },
            ZoneType::ThirdGeneralResidential => ZoneRule {
                bcr_legal_pct: 50.0,
                far_legal_pct: 250.0,
                far_ceiling_pct: 300.0,
                height_limit_m: 40.0,
                cap_rate: 0.055,
                development_cap_rate: 0.060,
                rental_yield: 0.048,
            },
            ZoneType::QuasiResidential => ZoneRule {
                bcr_legal_pct: 70.0,
                far_legal_pct: 400.0,
                far_ceiling_pct: 500.0,
                height_limit_m: 50.0,
                cap_rate: 0.056,
                development_cap_rate: 0.062,
                rental_yield: 0.050,
            },
            ZoneType::GeneralCommercial => ZoneRule {
                bcr_legal_pct: 80.0,
                far_legal_pct: 800.0,
                far_ceiling_pct: 1300.0,
                height_limit_m: 120.0,
                cap_rate: 0.058,
                development_cap_rate: 0.065,
                rental_yield: 0.055,
            },
            ZoneType::QuasiIndustrial => ZoneRule {
                bcr_legal_pct: 70.0,
                far_legal_pct: 350.0,
                far_ceiling_pct: 400.0,
                height_limit_m: 45.0,
                cap_rate: 0.058,
                development_cap_rate: 0.065,
                rental_yield: 0.050,
            },
            ZoneType::NaturalGreen => ZoneRule {
                bcr_legal_pct: 20.0,
                far_legal_pct: 100.0,
                far_ceiling_pct: 100.0,
                height_limit_m: 12.0,
                cap_rate: 0.048,
                development_cap_rate: 0.058,
                rental_yield: 0.035,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_parser() {
        for zone in ZoneType::ordered() {
            assert_eq!(ZoneType::from_label(zone.label()), Some(zone));
        }
        assert_eq!(ZoneType::from_label("상상지역"), None);
    }

    #[test]
    fn ceilings_never_fall_below_legal_far() {
        let table = ZoneRuleTable::standard();
        for zone in ZoneType::ordered() {
            let rule = table.rule(zone);
            assert!(
                rule.far_ceiling_pct >= rule.far_legal_pct,
                "{} ceiling below legal FAR",
                zone.label()
            );
        }
    }

    #[test]
    fn third_general_residential_ceiling_is_300() {
        let rule = ZoneRuleTable::standard().rule(ZoneType::ThirdGeneralResidential);
        assert_eq!(rule.far_ceiling_pct, 300.0);
    }
}
