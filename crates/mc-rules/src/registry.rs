//! Rule registry.

use mc_core::{CheckerConfig, ConfigError, RuleMeta};

use crate::rules::{
    find_rule, BasicTypes, CompoundBody, CppComments, GotoStatement, IdentifierLength,
    IdentifierShadowing, LineRule, ScopeRule, StmtRule, SwitchCompound, SwitchDefault,
};

/// The enabled rules, grouped by what they inspect.
pub struct RuleSet {
    line_rules: Vec<Box<dyn LineRule>>,
    stmt_rules: Vec<Box<dyn StmtRule>>,
    scope_rules: Vec<Box<dyn ScopeRule>>,
}

impl RuleSet {
    /// Build the enabled rules for a configuration.
    ///
    /// Fails if the configuration disables a rule id that does not exist.
    pub fn from_config(config: &CheckerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if let Some(unknown) = config
            .disabled_rules
            .iter()
            .find(|id| find_rule(id).is_none())
        {
            return Err(ConfigError::UnknownRule(unknown.clone()));
        }

        Ok(Self::build(config))
    }

    /// Every rule with default settings.
    pub fn all() -> Self {
        Self::build(&CheckerConfig::default())
    }

    fn build(config: &CheckerConfig) -> Self {
        let line_rules: Vec<Box<dyn LineRule>> = vec![
            Box::new(BasicTypes),
            Box::new(IdentifierLength::new(config.identifier_length_max)),
            Box::new(CppComments),
        ];
        let stmt_rules: Vec<Box<dyn StmtRule>> = vec![
            Box::new(GotoStatement),
            Box::new(SwitchDefault),
            Box::new(SwitchCompound),
            Box::new(CompoundBody),
        ];
        let scope_rules: Vec<Box<dyn ScopeRule>> = vec![Box::new(IdentifierShadowing)];

        let enabled = |id: &str| !config.is_disabled(id);
        Self {
            line_rules: line_rules
                .into_iter()
                .filter(|r| enabled(r.meta().id))
                .collect(),
            stmt_rules: stmt_rules
                .into_iter()
                .filter(|r| enabled(r.meta().id))
                .collect(),
            scope_rules: scope_rules
                .into_iter()
                .filter(|r| enabled(r.meta().id))
                .collect(),
        }
    }

    /// Rules run on each line.
    pub fn line_rules(&self) -> &[Box<dyn LineRule>] {
        &self.line_rules
    }

    /// Rules run on each statement.
    pub fn stmt_rules(&self) -> &[Box<dyn StmtRule>] {
        &self.stmt_rules
    }

    /// Rules run on each definition.
    pub fn scope_rules(&self) -> &[Box<dyn ScopeRule>] {
        &self.scope_rules
    }

    /// Metadata of every enabled rule.
    pub fn enabled(&self) -> Vec<&'static RuleMeta> {
        self.line_rules
            .iter()
            .map(|r| r.meta())
            .chain(self.stmt_rules.iter().map(|r| r.meta()))
            .chain(self.scope_rules.iter().map(|r| r.meta()))
            .collect()
    }

    /// Whether any rule needs the parsed file.
    pub fn needs_ast(&self) -> bool {
        !self.stmt_rules.is_empty() || !self.scope_rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_enabled_by_default() {
        let rules = RuleSet::from_config(&CheckerConfig::default()).unwrap();
        assert_eq!(rules.enabled().len(), 8);
        assert_eq!(RuleSet::all().enabled().len(), 8);
        assert!(rules.needs_ast());
    }

    #[test]
    fn test_disabled_rules_are_dropped() {
        let config = CheckerConfig {
            disabled_rules: vec!["review".into(), "Rule 5.3".into()],
            ..Default::default()
        };
        let rules = RuleSet::from_config(&config).unwrap();
        let ids: Vec<_> = rules.enabled().iter().map(|m| m.id).collect();
        assert!(!ids.contains(&"Review"));
        assert!(!ids.contains(&"Rule 5.3"));
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_unknown_rule_is_an_error() {
        let config = CheckerConfig {
            disabled_rules: vec!["Rule 21.6".into()],
            ..Default::default()
        };
        let err = RuleSet::from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownRule(ref id) if id == "Rule 21.6"));
    }

    #[test]
    fn test_needs_ast() {
        let config = CheckerConfig {
            disabled_rules: vec![
                "Rule 15.1".into(),
                "Rule 16.4".into(),
                "Rule 16.1".into(),
                "Rule 15.6".into(),
                "Rule 5.3".into(),
            ],
            ..Default::default()
        };
        assert!(!RuleSet::from_config(&config).unwrap().needs_ast());
    }
}
