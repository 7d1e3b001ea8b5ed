use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use super::appraisal::{AppraisalEngine, AppraisalError, AppraisalInput, AppraisalResult};
use super::capacity::{CapacityCalculator, CapacityResult};
use super::fallback::{FallbackReport, FallbackResolver};
use super::financial::{
    FinancialEngine, FinancialError, FinancialResult, PrivateRentalEngine, PrivateRentalResult,
};
use super::kpi::{ConsistencyError, KpiExtractor, ModuleId, ModuleKpi};
use super::provider::LandDataProvider;
use super::relaxation::{RelaxationEngine, RelaxationFlags, RelaxationResult};
use super::report::{AssembledReport, ReportAssembler, ReportError, ReportKind, ReportSet};
use super::zoning::{Overlay, ZoneRuleTable, ZoneType};

/// Analysis request as received from the API layer. Optional fields are
/// resolved by the fallback layer, never defaulted silently downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
    pub land_area_sqm: f64,
    /// Korean zone designation, e.g. "제2종일반주거지역". Overrides the
    /// provider's zoning lookup when present.
    #[serde(default)]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub individual_land_price_per_sqm: Option<f64>,
    #[serde(default)]
    pub building_area_sqm: f64,
    #[serde(default)]
    pub annual_rental_income: f64,
    #[serde(default)]
    pub premium_factors: BTreeMap<String, f64>,
    #[serde(default)]
    pub relaxation: RelaxationFlags,
    /// Valuation date; defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug)]
pub enum AnalysisError {
    InvalidInput(String),
    Financial(FinancialError),
    Consistency(ConsistencyError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(detail) => write!(f, "invalid input: {detail}"),
            AnalysisError::Financial(err) => write!(f, "financial model failure: {err}"),
            AnalysisError::Consistency(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::InvalidInput(_) => None,
            AnalysisError::Financial(err) => Some(err),
            AnalysisError::Consistency(err) => Some(err),
        }
    }
}

impl From<AppraisalError> for AnalysisError {
    fn from(value: AppraisalError) -> Self {
        match value {
            AppraisalError::InvalidInput(detail) => AnalysisError::InvalidInput(detail),
        }
    }
}

impl From<FinancialError> for AnalysisError {
    fn from(value: FinancialError) -> Self {
        AnalysisError::Financial(value)
    }
}

impl From<ConsistencyError> for AnalysisError {
    fn from(value: ConsistencyError) -> Self {
        AnalysisError::Consistency(value)
    }
}

/// Finalized analysis for one site. Write-once: every field is computed in
/// [`AnalysisPipeline::analyze`] and the type exposes no mutating API. A
/// recomputation must produce a fresh context with a fresh `context_id`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisContext {
    pub context_id: String,
    pub address: String,
    pub land_area_sqm: f64,
    pub zone_type: ZoneType,
    /// Overlay designations resolved for the parcel, carried for the
    /// technical reviewer even when no engine consumes them directly.
    pub overlays: Vec<Overlay>,
    pub appraisal: AppraisalResult,
    pub relaxation: RelaxationResult,
    pub capacity: CapacityResult,
    pub financial: FinancialResult,
    pub private_rental: PrivateRentalResult,
    pub kpi_by_module: BTreeMap<ModuleId, ModuleKpi>,
    pub fallback: FallbackReport,
}

impl AnalysisContext {
    /// Assembles one report from the locked KPI records.
    pub fn report(&self, kind: ReportKind) -> Result<AssembledReport, ReportError> {
        ReportAssembler::new().assemble(&self.kpi_by_module, &self.fallback.notices(), kind)
    }

    /// Assembles every report type, carrying blocked kinds explicitly, and
    /// runs the cross-report consistency audit over the generated set.
    pub fn all_reports(&self) -> Result<ReportSet, ConsistencyError> {
        ReportAssembler::new().assemble_all(&self.kpi_by_module, &self.fallback.notices())
    }
}

static CONTEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_context_id() -> String {
    let id = CONTEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("ctx-{id:06}")
}

/// End-to-end analysis pipeline. One instance per process (or per request
/// scope); every collaborator is injected explicitly, there are no
/// module-level singletons to leak state across analyses.
pub struct AnalysisPipeline {
    provider: Arc<dyn LandDataProvider>,
    resolver: FallbackResolver,
    zone_rules: ZoneRuleTable,
    appraisal: AppraisalEngine,
    relaxation: RelaxationEngine,
    capacity: CapacityCalculator,
    financial: FinancialEngine,
    private_rental: PrivateRentalEngine,
    extractor: KpiExtractor,
    /// LH appraisal recognition rate applied in the base evaluation.
    appraisal_rate: f64,
    /// LH internal review adjustment applied in the base evaluation.
    internal_adjustment: f64,
}

impl AnalysisPipeline {
    pub fn new(provider: Arc<dyn LandDataProvider>) -> Self {
        Self {
            provider,
            resolver: FallbackResolver::new(),
            zone_rules: ZoneRuleTable::standard(),
            appraisal: AppraisalEngine::standard(),
            relaxation: RelaxationEngine::new(),
            capacity: CapacityCalculator::new(),
            financial: FinancialEngine::default(),
            private_rental: PrivateRentalEngine::standard(),
            extractor: KpiExtractor::new(),
            appraisal_rate: 0.90,
            internal_adjustment: 1.00,
        }
    }

    pub fn with_appraisal_engine(mut self, engine: AppraisalEngine) -> Self {
        self.appraisal = engine;
        self
    }

    pub fn with_appraisal_rate(mut self, rate: f64) -> Self {
        self.appraisal_rate = rate;
        self
    }

    pub fn with_internal_adjustment(mut self, adjustment: f64) -> Self {
        self.internal_adjustment = adjustment;
        self
    }

    fn parse_zone(&self, request: &AnalyzeRequest) -> Result<Option<ZoneType>, AnalysisError> {
        match &request.zone_type {
            None => Ok(None),
            Some(label) => ZoneType::from_label(label).map(Some).ok_or_else(|| {
                AnalysisError::InvalidInput(format!("unknown zone designation '{label}'"))
            }),
        }
    }

    /// Runs the full analysis. Synchronous and I/O-free apart from the
    /// provider lookups, which are fallback-guarded; a total provider
    /// outage still yields a complete context.
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisContext, AnalysisError> {
        if request.land_area_sqm <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "land_area_sqm must be positive, got {}",
                request.land_area_sqm
            )));
        }
        let zone_override = self.parse_zone(request)?;

        let (site, fallback) = self.resolver.resolve(
            &request.address,
            zone_override,
            request.individual_land_price_per_sqm,
            self.provider.as_ref(),
        );

        let as_of = request
            .as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let appraisal_input = AppraisalInput {
            address: request.address.clone(),
            land_area_sqm: request.land_area_sqm,
            zone_type: site.zone_type,
            official_price_per_sqm: site.official_price_per_sqm,
            district_average_price_per_sqm: site.district_average_price_per_sqm,
            transactions: site.transactions.clone(),
            building_area_sqm: request.building_area_sqm,
            annual_rental_income: request.annual_rental_income,
            premium_factors: request.premium_factors.clone(),
            as_of,
        };
        let appraisal = self.appraisal.appraise(&appraisal_input)?;

        let rule = self.zone_rules.rule(site.zone_type);
        let relaxation = self.relaxation.apply_relaxation(
            site.zone_type,
            rule.far_legal_pct,
            rule.bcr_legal_pct,
            rule.height_limit_m,
            request.land_area_sqm,
            &request.relaxation,
        );

        let capacity = self.capacity.compute(request.land_area_sqm, &relaxation);

        let construction_cost = capacity.relaxed_floor_area_sqm
            * self.appraisal.config().construction_cost_per_sqm;
        let capex = self
            .financial
            .build_capex(appraisal.premium_adjusted_value, construction_cost)?;
        let financial =
            self.financial
                .evaluate(capex, self.appraisal_rate, self.internal_adjustment)?;

        let annual_gross_rent = capacity.total_units as f64
            * capacity.recommended_type.monthly_rent_krw()
            * 12.0;
        let private_rental = self
            .private_rental
            .evaluate(financial.capex.total_capex, annual_gross_rent);

        let mut kpi_by_module = BTreeMap::new();
        kpi_by_module.insert(
            ModuleId::Appraisal,
            self.extractor
                .extract_appraisal(&appraisal, request.land_area_sqm),
        );
        kpi_by_module.insert(
            ModuleId::Relaxation,
            self.extractor.extract_relaxation(&relaxation),
        );
        kpi_by_module.insert(
            ModuleId::Capacity,
            self.extractor.extract_capacity(&capacity),
        );
        kpi_by_module.insert(
            ModuleId::Financial,
            self.extractor.extract_financial(&financial),
        );
        kpi_by_module.insert(
            ModuleId::Decision,
            self.extractor.extract_decision(&financial),
        );

        let context_id = next_context_id();
        info!(
            %context_id,
            address = %request.address,
            zone = site.zone_type.label(),
            decision = financial.decision.label(),
            fallbacks = fallback.entries.len(),
            "analysis context finalized"
        );

        Ok(AnalysisContext {
            context_id,
            address: request.address.clone(),
            land_area_sqm: request.land_area_sqm,
            zone_type: site.zone_type,
            overlays: site.overlays,
            appraisal,
            relaxation,
            capacity,
            financial,
            private_rental,
            kpi_by_module,
            fallback,
        })
    }
}
