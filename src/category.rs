use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// One row of a threshold table: scores at or above `bound` (or strictly
/// above it when `strict`) get `label`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    pub bound: f64,
    pub strict: bool,
    pub label: String,
}

impl ThresholdRule {
    pub fn at_least(bound: f64, label: &str) -> Self {
        Self {
            bound,
            strict: false,
            label: label.to_string(),
        }
    }

    pub fn above(bound: f64, label: &str) -> Self {
        Self {
            bound,
            strict: true,
            label: label.to_string(),
        }
    }

    fn matches(&self, score: f64) -> bool {
        if self.strict {
            score > self.bound
        } else {
            score >= self.bound
        }
    }
}

/// Maps a similarity score to a label, highest bound first.
///
/// The fallback label catches everything below the lowest rule, so the
/// mapping is total. Tier 0 is the highest label.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
    fallback: String,
}

/// Built-in threshold tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scale {
    /// >=90 Very High, >=70 High, >=50 Moderate, >=30 Low, else Very Low
    Fine,
    /// >=80 High, >=50 Medium, >0 Low, else None
    Coarse,
    /// >70 Very Similar, >30 Similar, else Not Similar
    Triad,
}

impl ThresholdTable {
    pub fn new(mut rules: Vec<ThresholdRule>, fallback: &str) -> Self {
        // Strict rules sort ahead of inclusive ones at the same bound
        rules.sort_by(|a, b| {
            b.bound
                .total_cmp(&a.bound)
                .then_with(|| b.strict.cmp(&a.strict))
        });
        Self {
            rules,
            fallback: fallback.to_string(),
        }
    }

    pub fn fine() -> Self {
        Self::new(
            vec![
                ThresholdRule::at_least(90.0, "Very High"),
                ThresholdRule::at_least(70.0, "High"),
                ThresholdRule::at_least(50.0, "Moderate"),
                ThresholdRule::at_least(30.0, "Low"),
            ],
            "Very Low",
        )
    }

    pub fn coarse() -> Self {
        Self::new(
            vec![
                ThresholdRule::at_least(80.0, "High"),
                ThresholdRule::at_least(50.0, "Medium"),
                ThresholdRule::above(0.0, "Low"),
            ],
            "None",
        )
    }

    pub fn triad() -> Self {
        Self::new(
            vec![
                ThresholdRule::above(70.0, "Very Similar"),
                ThresholdRule::above(30.0, "Similar"),
            ],
            "Not Similar",
        )
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Index of the matching rule; the fallback is `rules().len()`.
    pub fn tier(&self, score: f64) -> usize {
        self.rules
            .iter()
            .position(|rule| rule.matches(score))
            .unwrap_or(self.rules.len())
    }

    pub fn categorize(&self, score: f64) -> &str {
        match self.rules.get(self.tier(score)) {
            Some(rule) => &rule.label,
            None => &self.fallback,
        }
    }

    pub fn highest_label(&self) -> &str {
        self.rules
            .first()
            .map(|rule| rule.label.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn lowest_label(&self) -> &str {
        &self.fallback
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::fine()
    }
}

impl From<Scale> for ThresholdTable {
    fn from(scale: Scale) -> Self {
        match scale {
            Scale::Fine => Self::fine(),
            Scale::Coarse => Self::coarse(),
            Scale::Triad => Self::triad(),
        }
    }
}

/// Parse a custom table such as `90:Very High,70:High,>0:Low,Very Low`.
///
/// `N:label` is inclusive, `>N:label` is strict, and the final entry is the
/// bare fallback label.
impl FromStr for ThresholdTable {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let Some((fallback, rule_parts)) = parts.split_last() else {
            return Err("empty threshold table".to_string());
        };

        if fallback.is_empty() {
            return Err("missing fallback label".to_string());
        }
        if fallback.contains(':') {
            return Err(format!(
                "last entry must be a bare fallback label, got '{fallback}'"
            ));
        }

        let mut rules = Vec::with_capacity(rule_parts.len());
        for part in rule_parts {
            let (bound, label) = part
                .split_once(':')
                .ok_or_else(|| format!("expected BOUND:LABEL, got '{part}'"))?;
            let bound = bound.trim();
            let label = label.trim();
            let (digits, strict) = match bound.strip_prefix('>') {
                Some(rest) => (rest.trim(), true),
                None => (bound, false),
            };
            let value: f64 = digits
                .parse()
                .map_err(|_| format!("invalid bound: '{bound}'"))?;
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("bound out of range 0-100: '{bound}'"));
            }
            if label.is_empty() {
                return Err(format!("missing label for bound '{bound}'"));
            }
            rules.push(ThresholdRule {
                bound: value,
                strict,
                label: label.to_string(),
            });
        }

        Ok(Self::new(rules, fallback))
    }
}

impl fmt::Display for ThresholdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            let op = if rule.strict { ">" } else { "" };
            write!(f, "{op}{}:{},", rule.bound, rule.label)?;
        }
        write!(f, "{}", self.fallback)
    }
}
