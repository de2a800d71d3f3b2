//! Ordered detection rules
//!
//! A detector is a list of rules evaluated strictly in order: the first rule
//! whose predicate matches decides the technology. More specific rules come
//! before more general ones, so the list order is part of the behaviour.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// What produced a detection: the rule that fired and the file(s) it looked at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub rule: String,
    pub source: String,
}

/// A technology together with the evidence that selected it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection<T> {
    pub technology: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
}

impl<T> Detection<T> {
    pub fn new(technology: T, rule: &str, source: impl Into<String>) -> Self {
        Self {
            technology,
            evidence: Some(Evidence {
                rule: rule.to_string(),
                source: source.into(),
            }),
        }
    }

    /// Detection with no supporting evidence, used for the `Unknown` fallback
    pub fn bare(technology: T) -> Self {
        Self {
            technology,
            evidence: None,
        }
    }
}

/// One (predicate, result, evidence) entry of a detector.
///
/// The predicate returns the evidence source on a match.
pub struct Rule<F, T> {
    pub name: &'static str,
    pub technology: T,
    pub predicate: fn(&F) -> Option<String>,
}

/// Evaluate `rules` in order and return the first match
pub fn first_match<F, T: Copy>(rules: &[Rule<F, T>], facts: &F) -> Option<Detection<T>> {
    rules.iter().find_map(|rule| {
        let source = (rule.predicate)(facts)?;
        debug!(rule = rule.name, source = %source, "Detection rule matched");
        Some(Detection::new(rule.technology, rule.name, source))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Facts {
        a: bool,
        b: bool,
    }

    const RULES: &[Rule<Facts, u8>] = &[
        Rule {
            name: "a-and-b",
            technology: 1,
            predicate: |f| (f.a && f.b).then(|| "ab".to_string()),
        },
        Rule {
            name: "a",
            technology: 2,
            predicate: |f| f.a.then(|| "a".to_string()),
        },
    ];

    #[test]
    fn test_more_specific_rule_wins() {
        let detection = first_match(RULES, &Facts { a: true, b: true }).unwrap();
        assert_eq!(detection.technology, 1);
        assert_eq!(detection.evidence.unwrap().rule, "a-and-b");
    }

    #[test]
    fn test_falls_through_to_general_rule() {
        let detection = first_match(RULES, &Facts { a: true, b: false }).unwrap();
        assert_eq!(detection.technology, 2);
    }

    #[test]
    fn test_no_match() {
        assert!(first_match(RULES, &Facts { a: false, b: true }).is_none());
    }

    #[test]
    fn test_bare_detection_has_no_evidence() {
        let detection = Detection::bare(0u8);
        assert!(detection.evidence.is_none());
        assert_eq!(serde_json::to_string(&detection).unwrap(), r#"{"technology":0}"#);
    }
}
