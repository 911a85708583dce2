//! AST walk with scope tracking.
//!
//! Scopes follow C: the file scope, one scope per function holding its
//! parameters, one per compound statement, and one around a `for` whose
//! first clause declares variables. Only ordinary identifiers are defined;
//! struct and union members live in their own namespace, and prototype
//! parameter names end with the prototype.

use mc_core::Violation;
use mc_parse::ast::{DeclSpecifiers, EnumSpec};
use mc_parse::{Block, Declaration, ExternalDecl, ForInit, FunctionDef, Stmt, TranslationUnit};

use crate::registry::RuleSet;
use crate::scope::{Symbol, SymbolKind, SymbolTable};

/// Runs statement and scope rules over a translation unit.
pub struct AstChecker<'r> {
    rules: &'r RuleSet,
    symbols: SymbolTable,
    violations: Vec<Violation>,
}

impl<'r> AstChecker<'r> {
    /// Create a checker for the given rules.
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            symbols: SymbolTable::new(),
            violations: Vec::new(),
        }
    }

    /// Walk the unit and return violations in discovery order.
    pub fn check(mut self, unit: &TranslationUnit) -> Vec<Violation> {
        for item in &unit.items {
            match item {
                ExternalDecl::Function(function) => self.visit_function(function),
                ExternalDecl::Declaration(decl) => self.visit_declaration(decl),
            }
        }
        debug_assert_eq!(self.symbols.depth(), 1, "Every scope opened is closed");
        self.violations
    }

    /// Run scope rules, then define.
    fn define(&mut self, name: &str, kind: SymbolKind, line: usize) {
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            line,
        };
        for rule in self.rules.scope_rules() {
            if let Some(v) = rule.check_define(&symbol, &self.symbols) {
                self.violations.push(v);
            }
        }
        self.symbols.define(name, kind, line);
    }

    fn visit_function(&mut self, function: &FunctionDef) {
        if let Some(ref name) = function.declarator.name {
            self.define(name, SymbolKind::Function, function.declarator.line);
        }

        self.symbols.enter_scope();
        for param in function.params() {
            if let Some(ref name) = param.declarator.name {
                self.define(name, SymbolKind::Parameter, param.declarator.line);
            }
        }
        self.visit_block(&function.body);
        self.symbols.exit_scope();
    }

    fn visit_block(&mut self, block: &Block) {
        self.symbols.enter_scope();
        for stmt in &block.items {
            self.visit_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn visit_declaration(&mut self, decl: &Declaration) {
        self.visit_specifiers(&decl.specifiers);

        for init in &decl.declarators {
            let declarator = &init.declarator;
            let Some(ref name) = declarator.name else {
                continue;
            };
            let kind = if decl.specifiers.is_typedef() {
                SymbolKind::Typedef
            } else if declarator.is_function() {
                SymbolKind::Function
            } else {
                SymbolKind::Variable
            };
            self.define(name, kind, declarator.line);
        }
    }

    /// Enumeration constants are ordinary identifiers, even inside a struct.
    fn visit_specifiers(&mut self, specifiers: &DeclSpecifiers) {
        if let Some(ref enumeration) = specifiers.enumeration {
            self.visit_enum(enumeration);
        }
        if let Some(members) = specifiers.record.as_ref().and_then(|r| r.members.as_ref()) {
            for member in members {
                self.visit_specifiers(&member.specifiers);
            }
        }
    }

    fn visit_enum(&mut self, enumeration: &EnumSpec) {
        for enumerator in enumeration.enumerators.iter().flatten() {
            self.define(&enumerator.name, SymbolKind::EnumConstant, enumerator.line);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        for rule in self.rules.stmt_rules() {
            self.violations.extend(rule.check_stmt(stmt));
        }

        match stmt {
            Stmt::Compound(block) => self.visit_block(block),
            Stmt::Declaration(decl) => self.visit_declaration(decl),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::Switch { body, .. }
            | Stmt::While { body, .. }
            | Stmt::DoWhile { body, .. }
            | Stmt::Case { body, .. }
            | Stmt::Default { body, .. }
            | Stmt::Labeled { body, .. } => self.visit_stmt(body),
            Stmt::For { init, body, .. } => match init {
                Some(ForInit::Declaration(decl)) => {
                    self.symbols.enter_scope();
                    self.visit_declaration(decl);
                    self.visit_stmt(body);
                    self.symbols.exit_scope();
                }
                _ => self.visit_stmt(body),
            },
            Stmt::Expr { .. }
            | Stmt::Goto { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. }
            | Stmt::Return { .. } => {}
        }
    }
}
