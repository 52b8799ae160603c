//! SOAP fault extraction and classification.
//!
//! A fault string is matched against an ordered table of substring patterns.
//! The first matching rule decides the error; faults no rule matches are
//! left to the dispatcher as transient failures.

use crate::error::GroupwareError;
use crate::soap::XmlNode;

/// One classification rule: substring pattern and the error it maps to.
#[derive(Debug, Clone, Copy)]
pub struct FaultRule {
    pub pattern: &'static str,
    pub build: fn(String) -> GroupwareError,
}

/// Rules every client applies, in evaluation order.
pub const STANDARD_RULES: &[FaultRule] = &[
    FaultRule {
        pattern: "Member already exists in group",
        build: GroupwareError::MemberAlreadyInGroup,
    },
    FaultRule {
        pattern: "primarymail must have the same value as email1",
        build: GroupwareError::PrimaryMailMismatch,
    },
];

/// Ordered fault classification table. First match wins.
#[derive(Debug, Clone)]
pub struct FaultClassifier {
    rules: Vec<FaultRule>,
}

impl Default for FaultClassifier {
    fn default() -> Self {
        Self {
            rules: STANDARD_RULES.to_vec(),
        }
    }
}

impl FaultClassifier {
    /// Append a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, pattern: &'static str, build: fn(String) -> GroupwareError) -> Self {
        self.rules.push(FaultRule { pattern, build });
        self
    }

    /// The typed, non-retryable error for `fault`, if any rule matches.
    #[must_use]
    pub fn classify(&self, fault: &str) -> Option<GroupwareError> {
        self.rules
            .iter()
            .find(|rule| fault.contains(rule.pattern))
            .map(|rule| (rule.build)(fault.to_string()))
    }
}

/// Extract the `faultstring` of a SOAP fault response body.
///
/// Returns `Ok(None)` for an empty body or a well-formed document without a
/// fault string, and `Err` when the body is not well-formed XML.
pub fn extract_fault_string(body: &str) -> Result<Option<String>, String> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let root = XmlNode::parse(body)?;
    Ok(root
        .find("Fault")
        .and_then(|fault| fault.child_text("faultstring"))
        .map(str::to_string))
}
