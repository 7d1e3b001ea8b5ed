//! Legacy adapter recovering KPI values from already-rendered HTML
//! fragments produced by the previous report generation stack.
//!
//! New code never goes through here: KPIs flow through the typed
//! [`super::ModuleKpi`] records and HTML is a pure downstream projection.
//! This adapter exists only to cross-check fragments that were rendered
//! before the typed path existed.

use std::collections::BTreeMap;

/// Scans a fragment for `data-kpi="name"` attributes and returns the text
/// content of each tagged element, verbatim and untyped.
pub fn extract_fragment_kpi(fragment: &str) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    let mut rest = fragment;

    while let Some(attr_start) = rest.find("data-kpi=\"") {
        let after_attr = &rest[attr_start + "data-kpi=\"".len()..];
        let Some(name_end) = after_attr.find('"') else {
            break;
        };
        let name = &after_attr[..name_end];

        let after_name = &after_attr[name_end..];
        let Some(tag_close) = after_name.find('>') else {
            break;
        };
        let content_start = &after_name[tag_close + 1..];
        let Some(content_end) = content_start.find('<') else {
            break;
        };
        let value = content_start[..content_end].trim();
        if !name.is_empty() && !value.is_empty() {
            found.insert(name.to_string(), value.to_string());
        }
        rest = &content_start[content_end..];
    }

    found
}
