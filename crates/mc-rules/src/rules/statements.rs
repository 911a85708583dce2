//! Control-flow structure rules.

use mc_core::{Category, RuleMeta, Violation};
use mc_parse::Stmt;

use super::StmtRule;

pub static GOTO: RuleMeta = RuleMeta::new(
    "Rule 15.1",
    "The goto statement shall not be used.",
    Category::Advisory,
);

pub static SWITCH_DEFAULT: RuleMeta = RuleMeta::new(
    "Rule 16.4",
    "Switch statement must have a default label.",
    Category::Required,
);

pub static SWITCH_COMPOUND: RuleMeta = RuleMeta::new(
    "Rule 16.1",
    "Switch case/default labels shall be well-formed.",
    Category::Required,
);

pub static COMPOUND_BODY: RuleMeta = RuleMeta::new(
    "Rule 15.6",
    "Body of iteration/selection stmt must be a compound statement.",
    Category::Required,
);

const WRAP_IN_BRACES: &str = "Wrap body in {}.";

/// Rule 15.1: no `goto`.
pub struct GotoStatement;

impl StmtRule for GotoStatement {
    fn meta(&self) -> &'static RuleMeta {
        &GOTO
    }

    fn check_stmt(&self, stmt: &Stmt) -> Vec<Violation> {
        match stmt {
            Stmt::Goto { label, line } => vec![GOTO.violation(
                *line,
                format!("goto {}", label),
                "Replace goto with structured control flow.",
            )],
            _ => Vec::new(),
        }
    }
}

/// Rule 16.4: every `switch` has a `default` label.
pub struct SwitchDefault;

impl SwitchDefault {
    /// Search for `default` through blocks and label bodies.
    ///
    /// Nested `switch` statements are not entered: their labels belong to them.
    fn has_default(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Default { .. } => true,
            Stmt::Compound(block) => block.items.iter().any(Self::has_default),
            Stmt::Case { body, .. } | Stmt::Labeled { body, .. } => Self::has_default(body),
            _ => false,
        }
    }
}

impl StmtRule for SwitchDefault {
    fn meta(&self) -> &'static RuleMeta {
        &SWITCH_DEFAULT
    }

    fn check_stmt(&self, stmt: &Stmt) -> Vec<Violation> {
        match stmt {
            Stmt::Switch { body, line, .. } if !Self::has_default(body) => {
                vec![SWITCH_DEFAULT.violation(*line, "switch", "Add a 'default: break;' case.")]
            }
            _ => Vec::new(),
        }
    }
}

/// Rule 16.1: the body of a `switch` is a compound statement.
pub struct SwitchCompound;

impl StmtRule for SwitchCompound {
    fn meta(&self) -> &'static RuleMeta {
        &SWITCH_COMPOUND
    }

    fn check_stmt(&self, stmt: &Stmt) -> Vec<Violation> {
        match stmt {
            Stmt::Switch { body, line, .. } if !body.is_compound() => {
                vec![SWITCH_COMPOUND.violation(
                    *line,
                    "switch body",
                    "Switch body must be a compound statement {}.",
                )]
            }
            _ => Vec::new(),
        }
    }
}

/// Rule 15.6: selection and iteration bodies are compound statements.
///
/// An `else` followed directly by `if` is not reported as `else body`;
/// MISRA C:2012 makes an exception for `else if` chains.
pub struct CompoundBody;

impl StmtRule for CompoundBody {
    fn meta(&self) -> &'static RuleMeta {
        &COMPOUND_BODY
    }

    fn check_stmt(&self, stmt: &Stmt) -> Vec<Violation> {
        let mut violations = Vec::new();

        match stmt {
            Stmt::If {
                then_branch,
                else_branch,
                line,
                ..
            } => {
                if !then_branch.is_compound() {
                    violations.push(COMPOUND_BODY.violation(*line, "if body", WRAP_IN_BRACES));
                }
                if let Some(else_branch) = else_branch {
                    let chained = matches!(**else_branch, Stmt::If { .. });
                    if !else_branch.is_compound() && !chained {
                        violations.push(COMPOUND_BODY.violation(*line, "else body", WRAP_IN_BRACES));
                    }
                }
            }
            Stmt::While { body, line, .. }
            | Stmt::DoWhile { body, line, .. }
            | Stmt::For { body, line, .. } => {
                if !body.is_compound() {
                    violations.push(COMPOUND_BODY.violation(*line, "loop body", WRAP_IN_BRACES));
                }
            }
            _ => {}
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_parse::{Lexer, Parser};

    fn stmt(code: &str) -> Stmt {
        let tokens = Lexer::new(code).tokenize().unwrap();
        Parser::new(tokens).parse_statement().unwrap()
    }

    fn matches_of(rule: &dyn StmtRule, code: &str) -> Vec<String> {
        rule.check_stmt(&stmt(code))
            .into_iter()
            .map(|v| v.matched)
            .collect()
    }

    #[test]
    fn test_goto() {
        let violations = GotoStatement.check_stmt(&stmt("goto label;"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].matched, "goto label");
        assert_eq!(violations[0].rule_id, "Rule 15.1");
        assert!(GotoStatement.check_stmt(&stmt("break;")).is_empty());
    }

    #[test]
    fn test_switch_without_default() {
        let code = "switch (x) {\ncase 1:\n  x = 2;\n  break;\n}";
        let violations = SwitchDefault.check_stmt(&stmt(code));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 1);
    }

    #[test]
    fn test_switch_with_default() {
        assert!(matches_of(&SwitchDefault, "switch (x) { case 1: break; default: break; }").is_empty());
        // Stacked labels: `default` is the body of `case 2`.
        assert!(matches_of(&SwitchDefault, "switch (x) { case 1: break; case 2: default: break; }").is_empty());
        assert!(matches_of(&SwitchDefault, "switch (x) { { default: break; } }").is_empty());
    }

    #[test]
    fn test_nested_switch_default_does_not_count() {
        let code = "switch (x) { case 1: switch (y) { default: break; } break; }";
        assert_eq!(matches_of(&SwitchDefault, code), vec!["switch"]);
    }

    #[test]
    fn test_switch_body_not_compound() {
        assert_eq!(
            matches_of(&SwitchCompound, "switch (x) case 1: y = 2;"),
            vec!["switch body"]
        );
        assert!(matches_of(&SwitchCompound, "switch (x) { default: break; }").is_empty());
    }

    #[test]
    fn test_if_bodies() {
        assert_eq!(matches_of(&CompoundBody, "if (x > 5) x = 2;"), vec!["if body"]);
        assert_eq!(
            matches_of(&CompoundBody, "if (x) { y(); } else y();"),
            vec!["else body"]
        );
        assert!(matches_of(&CompoundBody, "if (x) { y(); } else if (z) { w(); }").is_empty());
    }

    #[test]
    fn test_loop_bodies() {
        assert_eq!(matches_of(&CompoundBody, "while (n) n--;"), vec!["loop body"]);
        assert_eq!(matches_of(&CompoundBody, "do n--; while (n);"), vec!["loop body"]);
        assert_eq!(
            matches_of(&CompoundBody, "for (i = 0; i < 3; i++) ;"),
            vec!["loop body"]
        );
        assert!(matches_of(&CompoundBody, "for (;;) { break; }").is_empty());
    }
}
