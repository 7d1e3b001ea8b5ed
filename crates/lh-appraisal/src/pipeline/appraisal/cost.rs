use super::config::AppraisalConfig;
use super::AppraisalInput;

pub(crate) struct CostValuation {
    pub value: f64,
    pub steps: Vec<String>,
}

/// Cost approach (원가법): land at the official price plus the depreciated
/// replacement cost of any existing building, with a regional multiplier
/// for Seoul construction markets.
pub(crate) fn compute_cost_approach(
    input: &AppraisalInput,
    config: &AppraisalConfig,
) -> CostValuation {
    let regional_multiplier = if input.address.contains("서울") {
        config.seoul_multiplier
    } else {
        1.0
    };

    let land_component = input.official_price_per_sqm * input.land_area_sqm * regional_multiplier;

    let building_component = if input.building_area_sqm > 0.0 {
        input.building_area_sqm
            * config.construction_cost_per_sqm
            * config.building_residual_ratio
            * regional_multiplier
    } else {
        0.0
    };

    let value = land_component + building_component;

    let mut steps = vec![format!(
        "원가법: 토지 {:.0}원/㎡ × {:.1}㎡ × 지역계수 {:.2} = {:.0}원",
        input.official_price_per_sqm, input.land_area_sqm, regional_multiplier, land_component
    )];
    if building_component > 0.0 {
        steps.push(format!(
            "원가법: 건물 {:.1}㎡ × {:.0}원/㎡ × 잔가율 {:.2} = {:.0}원",
            input.building_area_sqm,
            config.construction_cost_per_sqm,
            config.building_residual_ratio,
            building_component
        ));
    }
    steps.push(format!("원가법 합계: {value:.0}원"));

    CostValuation { value, steps }
}
