use std::collections::BTreeMap;
use std::fmt;

use super::{KpiValue, ModuleId, ModuleKpi};

/// Outcome of the safe gate: critical gaps block the report, soft gaps are
/// disclosed in a completeness notice. There is no third, silent outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiGate {
    pub critical_missing: Vec<String>,
    pub soft_missing: Vec<String>,
}

impl KpiGate {
    pub fn blocks_report(&self) -> bool {
        !self.critical_missing.is_empty()
    }
}

fn qualified(module: ModuleId, key: &str) -> String {
    format!("{}.{}", module.code(), key)
}

/// Lists every mandatory module/key pair absent from the extracted records.
pub(crate) fn validate_mandatory(
    modules: &BTreeMap<ModuleId, ModuleKpi>,
    mandatory: &[(ModuleId, &str)],
) -> Vec<String> {
    mandatory
        .iter()
        .filter(|(module, key)| {
            modules
                .get(module)
                .map(|record| record.get(key).is_none())
                .unwrap_or(true)
        })
        .map(|(module, key)| qualified(*module, key))
        .collect()
}

/// Splits missing KPIs into critical (blocks generation) and soft
/// (disclosed, report still renders).
pub(crate) fn validate_with_safe_gate(
    modules: &BTreeMap<ModuleId, ModuleKpi>,
    mandatory: &[(ModuleId, &str)],
    critical: &[(ModuleId, &str)],
) -> KpiGate {
    let missing = validate_mandatory(modules, mandatory);
    let critical_names: Vec<String> = critical
        .iter()
        .map(|(module, key)| qualified(*module, key))
        .collect();

    let mut gate = KpiGate::default();
    for name in missing {
        if critical_names.contains(&name) {
            gate.critical_missing.push(name);
        } else {
            gate.soft_missing.push(name);
        }
    }
    // A critical pair can be missing without being in the mandatory list.
    for (module, key) in critical {
        let name = qualified(*module, key);
        let absent = modules
            .get(module)
            .map(|record| record.get(key).is_none())
            .unwrap_or(true);
        if absent && !gate.critical_missing.contains(&name) {
            gate.critical_missing.push(name);
        }
    }
    gate
}

/// Fatal cross-report divergence: two reports rendered different values for
/// the same KPI name. Generation aborts; the validator never picks one.
#[derive(Debug)]
pub struct ConsistencyError {
    pub conflicts: Vec<String>,
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cross-report KPI mismatch: {}",
            self.conflicts.join("; ")
        )
    }
}

impl std::error::Error for ConsistencyError {}

/// Verifies that every KPI name shared between reports carries the exact
/// same value in each.
pub fn verify_cross_report(
    reports: &[(&str, &BTreeMap<String, KpiValue>)],
) -> Result<(), ConsistencyError> {
    let mut first_seen: BTreeMap<&str, (&str, &KpiValue)> = BTreeMap::new();
    let mut conflicts = Vec::new();

    for (report_name, kpis) in reports {
        for (key, value) in kpis.iter() {
            match first_seen.get(key.as_str()) {
                None => {
                    first_seen.insert(key, (report_name, value));
                }
                Some((origin, original)) if *original != value => {
                    conflicts.push(format!(
                        "{key}: {origin}={original} vs {report_name}={value}"
                    ));
                }
                Some(_) => {}
            }
        }
    }

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(ConsistencyError { conflicts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(module: ModuleId, pairs: &[(&str, KpiValue)]) -> ModuleKpi {
        let mut values = BTreeMap::new();
        for (key, value) in pairs {
            values.insert(key.to_string(), value.clone());
        }
        ModuleKpi {
            module,
            complete: true,
            missing: Vec::new(),
            values,
        }
    }

    #[test]
    fn absent_module_counts_every_mandatory_key_as_missing() {
        let modules = BTreeMap::new();
        let missing = validate_mandatory(
            &modules,
            &[(ModuleId::Appraisal, "land_value_total"), (ModuleId::Decision, "decision")],
        );
        assert_eq!(missing, vec!["M2.land_value_total", "M6.decision"]);
    }

    #[test]
    fn gate_separates_critical_from_soft() {
        let mut modules = BTreeMap::new();
        modules.insert(
            ModuleId::Decision,
            record(ModuleId::Decision, &[("decision", KpiValue::Text("GO".into()))]),
        );
        let gate = validate_with_safe_gate(
            &modules,
            &[
                (ModuleId::Appraisal, "land_value_total"),
                (ModuleId::Decision, "decision"),
                (ModuleId::Decision, "decision_reason"),
            ],
            &[(ModuleId::Appraisal, "land_value_total")],
        );
        assert_eq!(gate.critical_missing, vec!["M2.land_value_total"]);
        assert_eq!(gate.soft_missing, vec!["M6.decision_reason"]);
        assert!(gate.blocks_report());
    }

    #[test]
    fn shared_names_with_equal_values_pass_the_cross_check() {
        let mut a = BTreeMap::new();
        a.insert("npv".to_string(), KpiValue::Number(-350.0));
        let mut b = BTreeMap::new();
        b.insert("npv".to_string(), KpiValue::Number(-350.0));
        b.insert("irr".to_string(), KpiValue::Number(-0.02));
        verify_cross_report(&[("executive", &a), ("financial", &b)])
            .expect("identical shared values are consistent");
    }

    #[test]
    fn diverging_values_name_the_conflicting_reports() {
        let mut a = BTreeMap::new();
        a.insert("npv".to_string(), KpiValue::Number(-350.0));
        let mut b = BTreeMap::new();
        b.insert("npv".to_string(), KpiValue::Number(-349.0));
        let err = verify_cross_report(&[("executive", &a), ("financial", &b)])
            .expect_err("divergence is fatal");
        assert_eq!(err.conflicts.len(), 1);
        assert!(err.conflicts[0].contains("executive"));
        assert!(err.conflicts[0].contains("financial"));
    }
}
