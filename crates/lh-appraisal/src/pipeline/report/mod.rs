mod config;

pub use config::{config_for, ReportKind, ReportTypeConfig, Section};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use super::kpi::{validator, KpiValue, ModuleId, ModuleKpi};

/// A fully assembled report: HTML body plus the exact KPI values it
/// rendered, kept for the cross-report consistency audit.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledReport {
    pub kind: ReportKind,
    pub html: String,
    pub rendered_kpis: BTreeMap<String, KpiValue>,
    pub missing_kpi_warnings: Vec<String>,
}

/// Outcome of assembling every report type in one pass. Blocked kinds are
/// carried explicitly with their error documents; the caller can always
/// tell a full set from a partial one.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSet {
    pub reports: Vec<AssembledReport>,
    pub blocked: Vec<BlockedReport>,
}

/// A report type the safe gate refused to generate, with the structured
/// substitute document.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedReport {
    pub kind: ReportKind,
    pub missing: Vec<String>,
    pub error_document: String,
}

#[derive(Debug)]
pub enum ReportError {
    CriticalKpiMissing {
        kind: ReportKind,
        missing: Vec<String>,
    },
}

impl ReportError {
    /// Structured error document returned in place of the report. A blocked
    /// report never emits partial or garbled output.
    pub fn error_document(&self) -> String {
        match self {
            ReportError::CriticalKpiMissing { kind, missing } => format!(
                concat!(
                    "<html><body class=\"report-blocked\">",
                    "<h1>{} 생성 불가</h1>",
                    "<p>필수 핵심 지표가 누락되어 보고서를 생성할 수 없습니다.</p>",
                    "<ul>{}</ul>",
                    "</body></html>"
                ),
                kind.label(),
                missing
                    .iter()
                    .map(|name| format!("<li>{name}</li>"))
                    .collect::<String>()
            ),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::CriticalKpiMissing { kind, missing } => write!(
                f,
                "critical KPI missing for {}: {}",
                kind.label(),
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for ReportError {}

/// Single report assembler, parameterized by the per-type config.
///
/// The assembler is a pure projection of the extracted KPI records: it
/// never recomputes a value and never parses one back out of markup.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler;

struct SectionWriter<'a> {
    modules: &'a BTreeMap<ModuleId, ModuleKpi>,
    rendered: BTreeMap<String, KpiValue>,
    html: String,
}

impl<'a> SectionWriter<'a> {
    fn new(modules: &'a BTreeMap<ModuleId, ModuleKpi>) -> Self {
        Self {
            modules,
            rendered: BTreeMap::new(),
            html: String::new(),
        }
    }

    fn value(&mut self, module: ModuleId, key: &str) -> String {
        match self.modules.get(&module).and_then(|record| record.get(key)) {
            Some(value) => {
                self.rendered.insert(key.to_string(), value.clone());
                format!("<span data-kpi=\"{key}\">{value}</span>")
            }
            // Soft-missing path: the gap is disclosed, never estimated here.
            None => "<span class=\"kpi-missing\">자료 없음</span>".to_string(),
        }
    }

    fn row(&mut self, caption: &str, module: ModuleId, key: &str) {
        let cell = self.value(module, key);
        self.html
            .push_str(&format!("<tr><th>{caption}</th><td>{cell}</td></tr>"));
    }

    fn open_section(&mut self, title: &str) {
        self.html
            .push_str(&format!("<section><h2>{title}</h2><table>"));
    }

    fn close_section(&mut self) {
        self.html.push_str("</table></section>");
    }
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    fn render_section(writer: &mut SectionWriter<'_>, section: Section) {
        match section {
            Section::Overview => {
                writer.open_section("분석 개요");
                writer.row("감정평가액", ModuleId::Appraisal, "land_value_total");
                writer.row("추진 판정", ModuleId::Decision, "decision");
                writer.close_section();
            }
            Section::Appraisal => {
                writer.open_section("토지 감정평가");
                writer.row("감정평가액", ModuleId::Appraisal, "land_value_total");
                writer.row("㎡당 단가", ModuleId::Appraisal, "land_value_per_sqm");
                writer.row("프리미엄 반영률", ModuleId::Appraisal, "premium_percentage");
                writer.row("수익방식 적용법", ModuleId::Appraisal, "income_method");
                writer.row("신뢰도", ModuleId::Appraisal, "confidence");
                writer.close_section();
            }
            Section::Relaxation => {
                writer.open_section("규제 완화 검토");
                writer.row("법정 용적률", ModuleId::Relaxation, "original_far");
                writer.row("완화 용적률", ModuleId::Relaxation, "relaxed_far");
                writer.row("완화 합계(%)", ModuleId::Relaxation, "total_relaxation_pct");
                writer.row(
                    "적합성 이슈 건수",
                    ModuleId::Relaxation,
                    "compliance_issue_count",
                );
                writer.close_section();
            }
            Section::Capacity => {
                writer.open_section("건축 규모");
                writer.row("연면적(㎡)", ModuleId::Capacity, "total_floor_area");
                writer.row("세대수", ModuleId::Capacity, "total_units");
                writer.row("추천 유형", ModuleId::Capacity, "recommended_type");
                writer.row("주차대수", ModuleId::Capacity, "parking_spaces");
                writer.close_section();
            }
            Section::Financial => {
                writer.open_section("사업성 분석");
                writer.row("총사업비", ModuleId::Financial, "total_capex");
                writer.row("LH 매입가", ModuleId::Financial, "purchase_price");
                writer.row("NPV", ModuleId::Financial, "npv");
                writer.row("수익률", ModuleId::Financial, "irr");
                writer.close_section();
            }
            Section::Sensitivity => {
                writer.open_section("감정평가 인정률 민감도");
                writer.row("NPV(기준)", ModuleId::Financial, "npv");
                writer.row("수익률(기준)", ModuleId::Financial, "irr");
                writer.close_section();
            }
            Section::Decision => {
                writer.open_section("추진 판정");
                writer.row("판정", ModuleId::Decision, "decision");
                writer.row("판정 근거", ModuleId::Decision, "decision_reason");
                writer.close_section();
            }
        }
    }

    /// Assembles one report from the extracted KPI records. Critical gaps
    /// abort with [`ReportError::CriticalKpiMissing`]; soft gaps render a
    /// visible completeness notice naming each field.
    pub fn assemble(
        &self,
        modules: &BTreeMap<ModuleId, ModuleKpi>,
        fallback_notices: &[String],
        kind: ReportKind,
    ) -> Result<AssembledReport, ReportError> {
        let config = config_for(kind);
        let gate = validator::validate_with_safe_gate(modules, config.mandatory, config.critical);
        if gate.blocks_report() {
            return Err(ReportError::CriticalKpiMissing {
                kind,
                missing: gate.critical_missing,
            });
        }

        let mut writer = SectionWriter::new(modules);
        writer
            .html
            .push_str(&format!("<html><body><h1>{}</h1>", kind.label()));

        for section in config.sections {
            Self::render_section(&mut writer, *section);
        }

        if !gate.soft_missing.is_empty() || !fallback_notices.is_empty() {
            writer
                .html
                .push_str("<section class=\"completeness\"><h2>자료 완전성 고지</h2><ul>");
            for name in &gate.soft_missing {
                writer
                    .html
                    .push_str(&format!("<li>누락 지표: {name}</li>"));
            }
            for notice in fallback_notices {
                writer.html.push_str(&format!("<li>{notice}</li>"));
            }
            writer.html.push_str("</ul></section>");
        }

        writer.html.push_str("</body></html>");

        info!(
            report = kind.label(),
            soft_missing = gate.soft_missing.len(),
            "report assembled"
        );

        Ok(AssembledReport {
            kind,
            html: writer.html,
            rendered_kpis: writer.rendered,
            missing_kpi_warnings: gate.soft_missing,
        })
    }

    /// Assembles every report type and verifies the cross-report KPI
    /// consistency invariant over the generated set. Kinds refused by the
    /// safe gate are returned as [`BlockedReport`] entries, never dropped.
    pub fn assemble_all(
        &self,
        modules: &BTreeMap<ModuleId, ModuleKpi>,
        fallback_notices: &[String],
    ) -> Result<ReportSet, super::kpi::ConsistencyError> {
        let mut reports = Vec::new();
        let mut blocked = Vec::new();
        for kind in ReportKind::ordered() {
            match self.assemble(modules, fallback_notices, kind) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    let error_document = err.error_document();
                    let ReportError::CriticalKpiMissing { kind, missing } = err;
                    blocked.push(BlockedReport {
                        kind,
                        missing,
                        error_document,
                    });
                }
            }
        }

        let pairs: Vec<(&str, &BTreeMap<String, KpiValue>)> = reports
            .iter()
            .map(|report| (report.kind.label(), &report.rendered_kpis))
            .collect();
        validator::verify_cross_report(&pairs)?;

        Ok(ReportSet { reports, blocked })
    }
}
