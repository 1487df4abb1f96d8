//! Version constraints for mod dependencies and platform compatibility
//!
//! Supported requirement forms:
//! - `^1.2.3` - caret: >=1.2.3 <2.0.0 (or the narrower 0.x rules)
//! - `~1.2.3` - tilde: >=1.2.3 <1.3.0
//!
//! Partial caret and tilde versions are bounded by the components written:
//! `^0` is <1.0.0, `^0.0` is <0.1.0 and `~1` is <2.0.0.
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `=1.2.3` - comparison operators
//! - `1.2.3` - exact version
//! - `1.2.*`, `1.*`, `*` (or `x` in place of `*`) - wildcards
//!
//! Requirements separated by commas or whitespace must all hold; alternatives
//! separated by `||` need only one to hold.

use std::fmt;
use std::str::FromStr;

use crate::version::error::ConstraintError;
use crate::version::semver::{SemanticVersion, compare};

/// Number of version components written in a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Major,
    Minor,
    Patch,
}

impl Precision {
    fn of(version: &str) -> Self {
        let version = version.trim();
        let version = version
            .strip_prefix('v')
            .or_else(|| version.strip_prefix('V'))
            .unwrap_or(version);
        let core = version.split(['-', '+']).next().unwrap_or(version);
        match core.split('.').count() {
            1 => Precision::Major,
            2 => Precision::Minor,
            _ => Precision::Patch,
        }
    }

    fn components(self) -> usize {
        match self {
            Precision::Major => 1,
            Precision::Minor => 2,
            Precision::Patch => 3,
        }
    }
}

/// Whether the first `count` numeric components of both versions are equal
fn same_components(a: &SemanticVersion, b: &SemanticVersion, count: usize) -> bool {
    [a.major, a.minor, a.patch][..count] == [b.major, b.minor, b.patch][..count]
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Caret(SemanticVersion, Precision),
    Tilde(SemanticVersion, Precision),
    Exact(SemanticVersion),
    Gte(SemanticVersion),
    Gt(SemanticVersion),
    Lte(SemanticVersion),
    Lt(SemanticVersion),
    Any,
    WildcardMajor(u64),
    WildcardMinor(u64, u64),
}

impl Requirement {
    fn parse(spec: &str) -> Result<Self, ConstraintError> {
        let spec = spec.trim();
        let invalid = || ConstraintError::InvalidRequirement(spec.to_string());
        let version = |rest: &str| SemanticVersion::try_parse(rest.trim()).ok_or_else(invalid);

        if let Some(rest) = spec.strip_prefix(">=") {
            version(rest).map(Requirement::Gte)
        } else if let Some(rest) = spec.strip_prefix('>') {
            version(rest).map(Requirement::Gt)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            version(rest).map(Requirement::Lte)
        } else if let Some(rest) = spec.strip_prefix('<') {
            version(rest).map(Requirement::Lt)
        } else if let Some(rest) = spec.strip_prefix("==") {
            version(rest).map(Requirement::Exact)
        } else if let Some(rest) = spec.strip_prefix('=') {
            version(rest).map(Requirement::Exact)
        } else if let Some(rest) = spec.strip_prefix('^') {
            version(rest).map(|v| Requirement::Caret(v, Precision::of(rest)))
        } else if let Some(rest) = spec.strip_prefix('~') {
            version(rest).map(|v| Requirement::Tilde(v, Precision::of(rest)))
        } else if spec == "*" || spec.eq_ignore_ascii_case("x") {
            Ok(Requirement::Any)
        } else if let Some(req) = Self::parse_wildcard(spec) {
            Ok(req)
        } else {
            version(spec).map(Requirement::Exact)
        }
    }

    /// Parse wildcard patterns like "1.*", "1.x" or "1.2.*"
    fn parse_wildcard(spec: &str) -> Option<Self> {
        let spec = spec.strip_prefix('v').unwrap_or(spec);
        let parts: Vec<&str> = spec.split('.').collect();
        let is_wild = |part: &str| part == "*" || part.eq_ignore_ascii_case("x");

        match parts.as_slice() {
            [major, wild] if is_wild(wild) => {
                major.parse::<u64>().ok().map(Requirement::WildcardMajor)
            }
            [major, wild_minor, wild_patch] if is_wild(wild_minor) && is_wild(wild_patch) => {
                major.parse::<u64>().ok().map(Requirement::WildcardMajor)
            }
            [major, minor, wild] if is_wild(wild) => {
                let major = major.parse::<u64>().ok()?;
                let minor = minor.parse::<u64>().ok()?;
                Some(Requirement::WildcardMinor(major, minor))
            }
            _ => None,
        }
    }

    fn satisfies(&self, version: &SemanticVersion) -> bool {
        match self {
            Requirement::Caret(v, precision) => {
                // ^1.2.3 -> >=1.2.3 <2.0.0
                // ^0.2.3 -> >=0.2.3 <0.3.0
                // ^0.0.3 -> >=0.0.3 <0.0.4
                // ^0.0   -> >=0.0.0 <0.1.0
                // ^0     -> >=0.0.0 <1.0.0
                let written = precision.components();
                let locked = [v.major, v.minor, v.patch][..written]
                    .iter()
                    .position(|c| *c != 0)
                    .map_or(written, |i| i + 1);
                version >= v && same_components(version, v, locked)
            }
            Requirement::Tilde(v, precision) => {
                // ~1.2.3 -> >=1.2.3 <1.3.0
                // ~1     -> >=1.0.0 <2.0.0
                let locked = match precision {
                    Precision::Major => 1,
                    Precision::Minor | Precision::Patch => 2,
                };
                version >= v && same_components(version, v, locked)
            }
            Requirement::Exact(v) => compare(version, v).is_eq(),
            Requirement::Gte(v) => version >= v,
            Requirement::Gt(v) => version > v,
            Requirement::Lte(v) => version <= v,
            Requirement::Lt(v) => version < v,
            Requirement::Any => true,
            Requirement::WildcardMajor(major) => version.major == *major,
            Requirement::WildcardMinor(major, minor) => {
                version.major == *major && version.minor == *minor
            }
        }
    }
}

/// A parsed version constraint such as `^1.2 || ~2.0.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: String,
    /// Any alternative may match (OR); within one, all requirements must (AND)
    alternatives: Vec<Vec<Requirement>>,
}

impl VersionConstraint {
    pub fn parse(constraint: &str) -> Result<Self, ConstraintError> {
        let raw = constraint.trim();
        if raw.is_empty() {
            return Err(ConstraintError::Empty);
        }

        let alternatives = raw
            .split("||")
            .map(Self::parse_alternative)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    fn parse_alternative(alternative: &str) -> Result<Vec<Requirement>, ConstraintError> {
        let tokens = Self::tokenize(alternative)?;
        if tokens.is_empty() {
            return Err(ConstraintError::InvalidRequirement(
                alternative.trim().to_string(),
            ));
        }
        tokens.iter().map(|t| Requirement::parse(t)).collect()
    }

    /// Split on commas and whitespace, re-attaching a lone operator to the
    /// version after it (">= 1.0" is one requirement).
    ///
    /// Two operators in a row (`"> = 1.0"`) are rejected.
    fn tokenize(alternative: &str) -> Result<Vec<String>, ConstraintError> {
        let mut tokens: Vec<String> = Vec::new();
        let mut pending_operator: Option<String> = None;

        for word in alternative
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|w| !w.is_empty())
        {
            if word.chars().all(|c| "<>=^~".contains(c)) {
                if pending_operator.is_some() {
                    return Err(ConstraintError::InvalidRequirement(
                        alternative.trim().to_string(),
                    ));
                }
                pending_operator = Some(word.to_string());
                continue;
            }
            match pending_operator.take() {
                Some(op) => tokens.push(format!("{op}{word}")),
                None => tokens.push(word.to_string()),
            }
        }

        if let Some(op) = pending_operator {
            tokens.push(op);
        }
        Ok(tokens)
    }

    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        self.alternatives
            .iter()
            .any(|requirements| requirements.iter().all(|req| req.satisfies(version)))
    }

    /// The matching subset of `versions`, in the input order.
    pub fn filter<'a, I>(&self, versions: I) -> Vec<&'a SemanticVersion>
    where
        I: IntoIterator<Item = &'a SemanticVersion>,
    {
        versions.into_iter().filter(|v| self.satisfies(v)).collect()
    }

    /// The latest version satisfying this constraint.
    pub fn best_match<'a, I>(&self, versions: I) -> Option<&'a SemanticVersion>
    where
        I: IntoIterator<Item = &'a SemanticVersion>,
    {
        versions
            .into_iter()
            .filter(|v| self.satisfies(v))
            .max_by(|a, b| compare(a, b))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
