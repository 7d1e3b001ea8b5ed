//! Land appraisal and LH (한국토지주택공사) purchase feasibility pipeline for
//! the newly-built purchase-rental (신축매입임대) program.
//!
//! The [`pipeline`] module tree carries the whole analysis core: zoning rule
//! tables, the three-approach appraisal engine, the regulatory relaxation
//! engine, buildable-capacity arithmetic, the policy-transaction financial
//! model, and the KPI extraction/consistency gate feeding the six report
//! assemblies.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
