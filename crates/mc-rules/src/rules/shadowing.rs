//! Identifier hiding.

use mc_core::{Category, RuleMeta, Violation};

use super::ScopeRule;
use crate::scope::{Symbol, SymbolTable};

pub static SHADOWING: RuleMeta = RuleMeta::new(
    "Rule 5.3",
    "An identifier declared in an inner scope shall not hide an identifier in an outer scope.",
    Category::Required,
);

/// Rule 5.3: inner declarations do not hide outer ones.
pub struct IdentifierShadowing;

impl ScopeRule for IdentifierShadowing {
    fn meta(&self) -> &'static RuleMeta {
        &SHADOWING
    }

    fn check_define(&self, symbol: &Symbol, scopes: &SymbolTable) -> Option<Violation> {
        let shadowed = scopes.check_shadowing(&symbol.name)?;
        Some(SHADOWING.violation(
            symbol.line,
            format!("Variable '{}'", symbol.name),
            format!(
                "Rename variable. Shadows declaration at line {}.",
                shadowed.line
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SymbolKind;

    fn symbol(name: &str, line: usize) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            line,
        }
    }

    #[test]
    fn test_reports_outer_declaration_line() {
        let mut scopes = SymbolTable::new();
        scopes.define("x", SymbolKind::Variable, 10);
        scopes.enter_scope();

        let v = IdentifierShadowing
            .check_define(&symbol("x", 14), &scopes)
            .unwrap();
        assert_eq!(v.line, 14);
        assert_eq!(v.matched, "Variable 'x'");
        assert_eq!(v.suggestion, "Rename variable. Shadows declaration at line 10.");
    }

    #[test]
    fn test_same_scope_is_not_shadowing() {
        let mut scopes = SymbolTable::new();
        scopes.define("x", SymbolKind::Variable, 1);
        assert!(IdentifierShadowing
            .check_define(&symbol("x", 2), &scopes)
            .is_none());
    }
}
