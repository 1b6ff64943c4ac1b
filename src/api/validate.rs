use std::fmt;

/// Which rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: Rule,
}

impl FieldViolation {
    pub fn required(field: &'static str) -> Self {
        Self { field, rule: Rule::Required }
    }

    pub fn invalid(field: &'static str) -> Self {
        Self { field, rule: Rule::Invalid }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Required => write!(f, "field {} is required field", self.field),
            Rule::Invalid => write!(f, "field {} is invalid field", self.field),
        }
    }
}

/// One message per violation, comma-joined, in the order collected
pub fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects violations across fields so every failure is reported at once
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-empty after trimming
    pub fn text(&mut self, field: &'static str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) if !v.trim().is_empty() => {}
            _ => self.violations.push(FieldViolation::required(field)),
        }
        self
    }

    pub fn email(&mut self, field: &'static str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) if v.trim().is_empty() => self.violations.push(FieldViolation::required(field)),
            None => self.violations.push(FieldViolation::required(field)),
            Some(v) if !is_valid_email(v) => self.violations.push(FieldViolation::invalid(field)),
            Some(_) => {}
        }
        self
    }

    /// Zero counts as missing; negatives are invalid
    pub fn positive(&mut self, field: &'static str, value: Option<i64>) -> &mut Self {
        match value {
            None | Some(0) => self.violations.push(FieldViolation::required(field)),
            Some(v) if v < 0 => self.violations.push(FieldViolation::invalid(field)),
            Some(_) => {}
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.violations))
        }
    }
}

/// Basic email shape check: one `@`, a non-empty local part, and a dotted
/// domain with no empty labels. No whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}
