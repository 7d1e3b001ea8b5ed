pub mod appraisal;
pub mod cache;
pub mod capacity;
pub mod context;
pub mod fallback;
pub mod financial;
pub mod kpi;
pub mod provider;
pub mod relaxation;
pub mod report;
pub mod zoning;

pub use appraisal::{AppraisalEngine, AppraisalInput, AppraisalResult, ConfidenceLevel};
pub use capacity::{CapacityCalculator, CapacityResult};
pub use context::{AnalysisContext, AnalysisError, AnalysisPipeline, AnalyzeRequest};
pub use fallback::{FallbackReport, FallbackResolver};
pub use financial::{Decision, FinancialEngine, FinancialResult};
pub use kpi::{KpiExtractor, ModuleId, ModuleKpi};
pub use relaxation::{RelaxationEngine, RelaxationResult};
pub use report::{AssembledReport, BlockedReport, ReportAssembler, ReportKind, ReportSet};
pub use zoning::{ZoneRule, ZoneRuleTable, ZoneType};

/// One hundred million won (1억원), the unit LH feasibility thresholds are
/// quoted in.
pub const HUNDRED_MILLION_KRW: f64 = 100_000_000.0;
