//! Rule store: named settings changed at runtime through `key=value` pairs.
//!
//! Every rule has a validator. A value the validator rejects leaves the rule
//! unchanged.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Accepted values of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// One of a fixed list of options.
    Strict(&'static [&'static str]),
    /// A number in `0..=1`.
    Probability,
    /// `true`, `false`, `ops` or a permission level `0`-`4`.
    CommandLevel,
}

impl Validator {
    /// Checks and normalizes `value`.
    pub fn validate(self, value: &str) -> Option<String> {
        match self {
            Validator::Strict(options) => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(value))
                .map(|option| option.to_string()),
            Validator::Probability => {
                let p: f64 = value.trim().parse().ok()?;
                (0.0..=1.0).contains(&p).then(|| p.to_string())
            }
            Validator::CommandLevel => {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    "true" | "false" | "ops" | "0" | "1" | "2" | "3" | "4" => Some(normalized),
                    _ => None,
                }
            }
        }
    }

    /// What the validator accepts, for error messages.
    pub fn description(self) -> String {
        match self {
            Validator::Strict(options) => format!("one of {}", options.join(", ")),
            Validator::Probability => "a number between 0 and 1".to_string(),
            Validator::CommandLevel => "true, false, ops or a level from 0 to 4".to_string(),
        }
    }
}

const BOOLEAN: &[&str] = &["true", "false"];

/// Name, validator and description of every rule.
pub const RULES: &[(&str, Validator, &str)] = &[
    (
        "poi_updates",
        Validator::Strict(BOOLEAN),
        "Notify point-of-interest tracking when blocks change",
    ),
    (
        "command_plop",
        Validator::CommandLevel,
        "Permission level required to force content into the world",
    ),
    (
        "plop_integrity",
        Validator::Probability,
        "Probability that each structure block is kept during forced placement",
    ),
];

/// Current rule values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    /// Send point-of-interest notifications on block changes.
    pub poi_updates: bool,
    /// Permission required by the plop command.
    pub command_plop: String,
    /// Probability that a structure piece keeps each block.
    pub plop_integrity: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            poi_updates: true,
            command_plop: "ops".to_string(),
            plop_integrity: 1.0,
        }
    }
}

impl RuleConfig {
    /// Parses, validates and stores `value` for rule `name`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), RuleError> {
        let validator = validator(name).ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
        let normalized = validator
            .validate(value)
            .ok_or_else(|| RuleError::InvalidValue {
                rule: name.to_string(),
                value: value.to_string(),
                expected: validator.description(),
            })?;

        match name {
            "poi_updates" => self.poi_updates = normalized == "true",
            "command_plop" => self.command_plop = normalized,
            "plop_integrity" => {
                self.plop_integrity = normalized.parse().map_err(|_| RuleError::InvalidValue {
                    rule: name.to_string(),
                    value: value.to_string(),
                    expected: validator.description(),
                })?;
            }
            _ => return Err(RuleError::UnknownRule(name.to_string())),
        }
        log::info!("Rule {name} set to {value}");
        Ok(())
    }

    /// Current value of rule `name`, formatted as it would be set.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "poi_updates" => Some(self.poi_updates.to_string()),
            "command_plop" => Some(self.command_plop.clone()),
            "plop_integrity" => Some(self.plop_integrity.to_string()),
            _ => None,
        }
    }

    /// Whether a caller at permission `level` may run the plop command.
    ///
    /// `ops` requires level 2, `true` allows everyone, `false` nobody.
    pub fn allows_plop(&self, level: u8) -> bool {
        match self.command_plop.as_str() {
            "true" => true,
            "false" => false,
            "ops" => level >= 2,
            required => required.parse::<u8>().is_ok_and(|required| level >= required),
        }
    }
}

fn validator(name: &str) -> Option<Validator> {
    RULES
        .iter()
        .find(|(rule, _, _)| *rule == name)
        .map(|&(_, validator, _)| validator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_boolean_rule() {
        let mut rules = RuleConfig::default();
        rules.set("poi_updates", "FALSE").unwrap();
        assert!(!rules.poi_updates);
        assert_eq!(rules.get("poi_updates").as_deref(), Some("false"));
    }

    #[test]
    fn test_rejected_value_leaves_rule_unchanged() {
        let mut rules = RuleConfig::default();
        let err = rules.set("poi_updates", "maybe").unwrap_err();
        assert!(err.to_string().contains("one of true, false"));
        assert!(rules.poi_updates);

        assert!(rules.set("plop_integrity", "1.5").is_err());
        assert!(rules.set("plop_integrity", "half").is_err());
        assert_eq!(rules.plop_integrity, 1.0);
    }

    #[test]
    fn test_unknown_rule() {
        let mut rules = RuleConfig::default();
        assert!(matches!(
            rules.set("do_daylight_cycle", "true"),
            Err(RuleError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_command_level_is_normalized() {
        let mut rules = RuleConfig::default();
        rules.set("command_plop", "OPS").unwrap();
        assert_eq!(rules.command_plop, "ops");
        rules.set("command_plop", "3").unwrap();
        assert!(!rules.allows_plop(2));
        assert!(rules.allows_plop(4));
        assert!(rules.set("command_plop", "5").is_err());
        assert_eq!(rules.command_plop, "3");
    }

    #[test]
    fn test_plop_permission() {
        let mut rules = RuleConfig::default();
        assert!(!rules.allows_plop(0));
        assert!(rules.allows_plop(2));
        rules.set("command_plop", "true").unwrap();
        assert!(rules.allows_plop(0));
        rules.set("command_plop", "false").unwrap();
        assert!(!rules.allows_plop(4));
    }

    #[test]
    fn test_integrity_accepts_bounds() {
        let mut rules = RuleConfig::default();
        rules.set("plop_integrity", "0").unwrap();
        assert_eq!(rules.plop_integrity, 0.0);
        rules.set("plop_integrity", " 0.25 ").unwrap();
        assert_eq!(rules.plop_integrity, 0.25);
    }
}
