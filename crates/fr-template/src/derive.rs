//! Derive a template from a concrete model file.
//!
//! The concrete model carries literal arrays such as
//! `BC2.massFlowrate = [110.0]`. Each known assignment is rewritten to point
//! at its placeholder, producing a template the renderer can fill again.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::input::Placeholder;

/// Model assignment whose array literal becomes a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationRule {
    /// Left-hand side in the model file, e.g. `BC1.pressure`.
    pub target: &'static str,
    pub placeholder: Placeholder,
}

pub const DERIVATION_RULES: [DerivationRule; 8] = [
    DerivationRule { target: "BC2.massFlowrate", placeholder: Placeholder::SourceMassFlow },
    DerivationRule { target: "BC2.temperature", placeholder: Placeholder::SourceTemperature },
    DerivationRule { target: "BC2.time", placeholder: Placeholder::SourceTime },
    DerivationRule { target: "VALVE1.opening", placeholder: Placeholder::ValveOpening },
    DerivationRule { target: "VALVE1.time", placeholder: Placeholder::ValveTime },
    DerivationRule { target: "BC1.pressure", placeholder: Placeholder::WellheadPressure },
    DerivationRule { target: "BC1.temperature", placeholder: Placeholder::WellheadTemperature },
    DerivationRule { target: "BC1.time", placeholder: Placeholder::WellheadTime },
];

/// `<target> <ws>=<ws> [ ... ]` per rule, in rule order.
static RULE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DERIVATION_RULES
        .iter()
        .map(|rule| {
            let pattern = format!(r"{}\s*=\s*\[[^\]]+\]", regex::escape(rule.target));
            Regex::new(&pattern).expect("derivation pattern is valid")
        })
        .collect()
});

/// Replace every `target = [..]` in `text` with `target = {PLACEHOLDER}`.
fn apply_rule(text: &str, rule: &DerivationRule, pattern: &Regex) -> (String, usize) {
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let replacement = format!("{} = {}", rule.target, rule.placeholder.token());
    (pattern.replace_all(text, NoExpand(&replacement)).into_owned(), count)
}

/// Rewrite all known assignments; returns the template text and the
/// placeholders that were introduced.
pub fn derive_template(model_text: &str) -> (String, Vec<Placeholder>) {
    let mut text = model_text.to_string();
    let mut introduced = Vec::new();
    for (rule, pattern) in DERIVATION_RULES.iter().zip(RULE_PATTERNS.iter()) {
        let (next, count) = apply_rule(&text, rule, pattern);
        if count > 0 {
            introduced.push(rule.placeholder);
        }
        text = next;
    }
    (text, introduced)
}
