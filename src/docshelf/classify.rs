//! # Filename Classification
//!
//! Documents are filed under a two-level taxonomy (area → type) inferred from
//! the manifest's file token. The inference is heuristic: it looks for
//! project-numbering patterns and discipline markers in the upper-cased token.
//!
//! Both levels are driven by ordered rule tables evaluated top to bottom,
//! first match wins. Markers overlap (`"DW_ET"` matches drawing and spec
//! markers), so the order of [`TYPE_RULES`] is part of the behavior: earlier
//! rules take precedence. New rules go into the tables, not into control flow.

use crate::model::{DEFAULT_AREA, DEFAULT_TYPE};
use once_cell::sync::Lazy;
use regex::Regex;

static AREA_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(\d{4})[-_]").expect("area code pattern is valid"));

/// How a rule decides whether it applies to an upper-cased token.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// A hyphen-led 4-digit group followed by `-` or `_`; the digits are captured.
    AreaCode,
    /// Any of the listed substrings.
    Contains(&'static [&'static str]),
}

/// A single classification rule. `label` is used verbatim unless the matcher
/// captures a value, in which case it is a prefix for the captured text.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub matcher: Matcher,
    pub label: &'static str,
}

pub const AREA_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::AreaCode,
        label: "Área ",
    },
    Rule {
        matcher: Matcher::Contains(&["1002"]),
        label: "Área 1002",
    },
];

pub const TYPE_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Contains(&["DW", "PLANO"]),
        label: "Plano",
    },
    Rule {
        matcher: Matcher::Contains(&["TS", "ET"]),
        label: "Espec. Téc.",
    },
    Rule {
        matcher: Matcher::Contains(&["MC", "MEMORIA"]),
        label: "Memoria",
    },
];

impl Rule {
    fn apply(&self, token: &str) -> Option<String> {
        match self.matcher {
            Matcher::AreaCode => AREA_CODE
                .captures(token)
                .map(|caps| format!("{}{}", self.label, &caps[1])),
            Matcher::Contains(markers) => markers
                .iter()
                .any(|m| token.contains(m))
                .then(|| self.label.to_string()),
        }
    }
}

/// Evaluates `rules` in order against an already upper-cased token.
pub fn first_match(rules: &[Rule], token: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(token))
}

/// Infers `(area, type)` for a manifest file token.
pub fn classify(file_name: &str) -> (String, String) {
    let token = file_name.to_uppercase();
    let area = first_match(AREA_RULES, &token).unwrap_or_else(|| DEFAULT_AREA.to_string());
    let kind = first_match(TYPE_RULES, &token).unwrap_or_else(|| DEFAULT_TYPE.to_string());
    (area, kind)
}
