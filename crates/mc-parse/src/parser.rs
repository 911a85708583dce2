//! Recursive-descent C parser.
//!
//! Covers C99 declarations, statements and expressions. Since headers are
//! not expanded, typedef names from the common standard headers are known
//! up front; every `typedef` in the file adds to that set. An identifier
//! followed directly by another identifier is also read as a type name,
//! which covers most typedefs from unexpanded project headers.
//!
//! Typedef names are scoped like any other ordinary identifier: a block-scope
//! variable named `T` hides an outer `typedef ... T` until the block ends.
//!
//! Nesting of statements, expressions, declarators and initializers is
//! capped at [`NESTING_DEPTH_MAX`] so hostile input fails with
//! [`ParseError::TooDeep`] instead of exhausting the stack.

use std::collections::HashMap;

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// Typedef names assumed to come from standard headers.
const BUILTIN_TYPEDEFS: &[&str] = &[
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "int_least8_t",
    "int_least16_t",
    "int_least32_t",
    "int_least64_t",
    "uint_least8_t",
    "uint_least16_t",
    "uint_least32_t",
    "uint_least64_t",
    "int_fast8_t",
    "int_fast16_t",
    "int_fast32_t",
    "int_fast64_t",
    "uint_fast8_t",
    "uint_fast16_t",
    "uint_fast32_t",
    "uint_fast64_t",
    "intptr_t",
    "uintptr_t",
    "intmax_t",
    "uintmax_t",
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "wchar_t",
    "bool",
    "FILE",
    "fpos_t",
    "va_list",
    "__builtin_va_list",
    "time_t",
    "clock_t",
    "off_t",
];

const STORAGE_CLASSES: &[(&str, StorageClass)] = &[
    ("typedef", StorageClass::Typedef),
    ("extern", StorageClass::Extern),
    ("static", StorageClass::Static),
    ("auto", StorageClass::Auto),
    ("register", StorageClass::Register),
    ("_Thread_local", StorageClass::ThreadLocal),
];

const QUALIFIERS: &[&str] = &[
    "const",
    "volatile",
    "restrict",
    "inline",
    "_Noreturn",
    "_Atomic",
    "__inline",
    "__inline__",
    "__restrict",
    "__restrict__",
    "__const",
    "__volatile__",
];

const TYPE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "_Complex", "_Imaginary",
];

const ASSIGN_OPS: &[&str] = &[
    "=", "*=", "/=", "%=", "+=", "-=", "<<=", ">>=", "&=", "^=", "|=",
];

/// GNU forms that take a parenthesized argument and carry no meaning here.
const SKIPPED_WITH_ARGS: &[&str] = &[
    "__attribute__",
    "__attribute",
    "__declspec",
    "__asm__",
    "__asm",
    "asm",
    "_Alignas",
];

/// Deepest recursion the parser enters before giving up.
pub const NESTING_DEPTH_MAX: usize = 256;

/// Binary operator precedence, higher binds tighter.
fn binary_precedence(op: &str) -> Option<u8> {
    let prec = match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" => 7,
        "<<" | ">>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    };
    Some(prec)
}

/// C parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Names per scope, innermost last: `true` for typedef names, `false`
    /// for ordinary identifiers, which hide outer typedef names.
    scopes: Vec<HashMap<String, bool>>,
    depth: usize,
}

impl Parser {
    /// Create a parser. The stream should end with `Eof`; one is appended
    /// if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().map_or(false, Token::is_eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column: 1,
            });
        }
        Self {
            tokens,
            pos: 0,
            scopes: vec![BUILTIN_TYPEDEFS
                .iter()
                .map(|s| (s.to_string(), true))
                .collect()],
            depth: 0,
        }
    }

    // ----- scopes and nesting -----

    /// Whether a name currently denotes a type.
    fn is_typedef_name(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .unwrap_or(false)
    }

    fn declare_name(&mut self, name: &str, is_typedef: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), is_typedef);
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= NESTING_DEPTH_MAX {
            return Err(ParseError::TooDeep {
                line: self.peek().line,
                max: NESTING_DEPTH_MAX,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ----- token helpers -----

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn at_punct(&self, p: &str) -> bool {
        self.peek().is_punct(p)
    }

    fn at_keyword(&self, k: &str) -> bool {
        self.peek().is_keyword(k)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let found = if token.is_eof() {
            "end of file".to_string()
        } else {
            token.text.clone()
        };
        ParseError::Unexpected {
            expected: expected.to_string(),
            found,
            line: token.line,
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<Token, ParseError> {
        if self.at_punct(p) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("'{}'", p)))
        }
    }

    fn expect_keyword(&mut self, k: &str) -> Result<Token, ParseError> {
        if self.at_keyword(k) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("'{}'", k)))
        }
    }

    fn expect_ident(&mut self) -> Result<Token, ParseError> {
        if self.peek().is_ident() {
            Ok(self.advance())
        } else {
            Err(self.error("identifier"))
        }
    }

    /// Skip a balanced `( ... )` group starting at the current token.
    fn skip_parenthesized(&mut self) -> Result<(), ParseError> {
        self.expect_punct("(")?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.advance();
            if token.is_eof() {
                return Err(self.error("')'"));
            }
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skip `__attribute__((...))`, `asm(...)`, `__extension__` and friends.
    fn skip_extensions(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            let text = token.text.as_str();
            let skips_args = (token.is_ident() || token.kind == TokenKind::Keyword)
                && SKIPPED_WITH_ARGS.contains(&text);
            if skips_args {
                self.advance();
                while self.at_keyword("volatile") || self.peek().text == "__volatile__" {
                    self.advance();
                }
                if self.at_punct("(") {
                    self.skip_parenthesized()?;
                }
            } else if token.is_ident() && text == "__extension__" {
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    // ----- classification -----

    fn is_type_keyword(token: &Token) -> bool {
        token.kind == TokenKind::Keyword && TYPE_KEYWORDS.contains(&token.text.as_str())
    }

    fn is_qualifier(token: &Token) -> bool {
        (token.kind == TokenKind::Keyword || token.is_ident())
            && QUALIFIERS.contains(&token.text.as_str())
    }

    fn storage_class(token: &Token) -> Option<StorageClass> {
        if token.kind != TokenKind::Keyword {
            return None;
        }
        STORAGE_CLASSES
            .iter()
            .find(|(name, _)| *name == token.text)
            .map(|(_, class)| *class)
    }

    /// Whether a token can begin a type name (casts, `sizeof`).
    fn starts_type_name(&self, token: &Token) -> bool {
        Self::is_type_keyword(token)
            || Self::is_qualifier(token)
            || token.is_keyword("struct")
            || token.is_keyword("union")
            || token.is_keyword("enum")
            || (token.is_ident() && self.is_typedef_name(&token.text))
    }

    /// Whether the current token begins a declaration.
    fn at_declaration_start(&self) -> bool {
        let token = self.peek();
        if Self::storage_class(token).is_some()
            || self.starts_type_name(token)
            || token.is_keyword("_Static_assert")
            || token.is_keyword("_Alignas")
        {
            // `size_t:` would be a label, not a declaration.
            return !self.peek_at(1).is_punct(":") || !token.is_ident();
        }
        if token.is_ident() && token.text == "__extension__" {
            return true;
        }
        token.is_ident() && self.peek_at(1).is_ident()
    }

    // ----- translation unit -----

    /// Parse every external declaration up to end of file.
    pub fn parse_translation_unit(mut self) -> Result<TranslationUnit, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_extensions()?;
            if self.peek().is_eof() {
                break;
            }
            if self.eat_punct(";") {
                continue;
            }
            items.push(self.parse_external_decl()?);
        }
        tracing::debug!(items = items.len(), "parsed translation unit");
        Ok(TranslationUnit { items })
    }

    fn parse_external_decl(&mut self) -> Result<ExternalDecl, ParseError> {
        let line = self.peek().line;
        if self.at_keyword("_Static_assert") {
            self.parse_static_assert()?;
            return Ok(ExternalDecl::Declaration(Declaration {
                specifiers: DeclSpecifiers::default(),
                declarators: Vec::new(),
                line,
            }));
        }

        // Old-style implicit int (`main() { ... }`) has no specifiers.
        let specifiers = self.parse_decl_specifiers()?;
        if self.eat_punct(";") {
            return Ok(ExternalDecl::Declaration(Declaration {
                specifiers,
                declarators: Vec::new(),
                line,
            }));
        }

        let declarator = self.parse_declarator(false)?;
        self.skip_extensions()?;

        if self.at_punct("{") && declarator.is_function() {
            if let Some(ref name) = declarator.name {
                self.declare_name(name, false);
            }
            // Parameters belong to the outermost block of the body.
            self.push_scope();
            for param in declarator.function_params().unwrap_or(&[]) {
                if let Some(ref name) = param.declarator.name {
                    self.declare_name(name, false);
                }
            }
            let body = self.parse_block();
            self.pop_scope();
            let body = body?;
            return Ok(ExternalDecl::Function(FunctionDef {
                specifiers,
                declarator,
                body,
                line,
            }));
        }

        let declaration = self.finish_declaration(specifiers, declarator, line)?;
        Ok(ExternalDecl::Declaration(declaration))
    }

    fn parse_static_assert(&mut self) -> Result<(), ParseError> {
        self.expect_keyword("_Static_assert")?;
        self.skip_parenthesized()?;
        self.expect_punct(";")?;
        Ok(())
    }

    // ----- declarations -----

    fn parse_decl_specifiers(&mut self) -> Result<DeclSpecifiers, ParseError> {
        let mut specs = DeclSpecifiers::default();
        let mut saw_type = false;

        loop {
            self.skip_extensions()?;
            let token = self.peek().clone();

            if let Some(class) = Self::storage_class(&token) {
                self.advance();
                specs.storage.push(class);
            } else if Self::is_qualifier(&token) {
                self.advance();
                // `_Atomic(T)` names a type.
                if token.text == "_Atomic" && self.at_punct("(") {
                    self.advance();
                    let ty = self.parse_type_name()?;
                    self.expect_punct(")")?;
                    specs.type_names.extend(ty.specifiers.type_names);
                    saw_type = true;
                } else {
                    specs.qualifiers.push(token.text);
                }
            } else if Self::is_type_keyword(&token) {
                self.advance();
                specs.type_names.push(token.text);
                saw_type = true;
            } else if token.is_keyword("struct") || token.is_keyword("union") {
                specs.record = Some(self.parse_record_spec()?);
                saw_type = true;
            } else if token.is_keyword("enum") {
                specs.enumeration = Some(self.parse_enum_spec()?);
                saw_type = true;
            } else if !saw_type && token.is_ident() && self.is_typedef_name(&token.text) {
                self.advance();
                specs.type_names.push(token.text);
                saw_type = true;
            } else if !saw_type
                && token.is_ident()
                && self.peek_at(1).is_ident()
                && !SKIPPED_WITH_ARGS.contains(&self.peek_at(1).text.as_str())
            {
                // Unknown typedef from an unexpanded header.
                self.advance();
                specs.type_names.push(token.text);
                saw_type = true;
            } else {
                break;
            }
        }

        Ok(specs)
    }

    fn parse_record_spec(&mut self) -> Result<RecordSpec, ParseError> {
        let keyword = self.advance();
        let kind = if keyword.text == "union" {
            RecordKind::Union
        } else {
            RecordKind::Struct
        };
        self.skip_extensions()?;

        let tag = if self.peek().is_ident() {
            Some(self.advance().text)
        } else {
            None
        };

        let members = if self.eat_punct("{") {
            let mut members = Vec::new();
            while !self.at_punct("}") {
                if self.peek().is_eof() {
                    return Err(self.error("'}'"));
                }
                if self.eat_punct(";") {
                    continue;
                }
                members.push(self.parse_member_declaration()?);
            }
            self.expect_punct("}")?;
            self.skip_extensions()?;
            Some(members)
        } else {
            None
        };

        if tag.is_none() && members.is_none() {
            return Err(self.error("struct tag or member list"));
        }

        Ok(RecordSpec {
            kind,
            tag,
            members,
            line: keyword.line,
        })
    }

    fn parse_member_declaration(&mut self) -> Result<Declaration, ParseError> {
        let line = self.peek().line;
        if self.at_keyword("_Static_assert") {
            self.parse_static_assert()?;
            return Ok(Declaration {
                specifiers: DeclSpecifiers::default(),
                declarators: Vec::new(),
                line,
            });
        }

        let specifiers = self.parse_decl_specifiers()?;
        let mut declarators = Vec::new();

        if !self.at_punct(";") {
            loop {
                let declarator = if self.at_punct(":") {
                    Declarator {
                        line: self.peek().line,
                        ..Declarator::default()
                    }
                } else {
                    self.parse_declarator(false)?
                };
                let bit_width = if self.eat_punct(":") {
                    Some(self.parse_conditional()?)
                } else {
                    None
                };
                self.skip_extensions()?;
                declarators.push(InitDeclarator {
                    declarator,
                    init: None,
                    bit_width,
                });
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_punct(";")?;

        Ok(Declaration {
            specifiers,
            declarators,
            line,
        })
    }

    fn parse_enum_spec(&mut self) -> Result<EnumSpec, ParseError> {
        let keyword = self.expect_keyword("enum")?;
        self.skip_extensions()?;

        let tag = if self.peek().is_ident() {
            Some(self.advance().text)
        } else {
            None
        };

        let enumerators = if self.eat_punct("{") {
            let mut enumerators = Vec::new();
            while !self.at_punct("}") {
                let name = self.expect_ident()?;
                let value = if self.eat_punct("=") {
                    Some(self.parse_conditional()?)
                } else {
                    None
                };
                self.declare_name(&name.text, false);
                enumerators.push(Enumerator {
                    name: name.text,
                    value,
                    line: name.line,
                });
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("}")?;
            Some(enumerators)
        } else {
            None
        };

        if tag.is_none() && enumerators.is_none() {
            return Err(self.error("enum tag or enumerator list"));
        }

        Ok(EnumSpec {
            tag,
            enumerators,
            line: keyword.line,
        })
    }

    /// Parse the remainder of a declaration whose first declarator is parsed.
    fn finish_declaration(
        &mut self,
        specifiers: DeclSpecifiers,
        first: Declarator,
        line: usize,
    ) -> Result<Declaration, ParseError> {
        let mut declarators = Vec::new();
        let mut declarator = first;

        loop {
            self.skip_extensions()?;
            let init = if self.eat_punct("=") {
                Some(self.parse_initializer()?)
            } else {
                None
            };
            if let Some(ref name) = declarator.name {
                self.declare_name(name, specifiers.is_typedef());
            }
            declarators.push(InitDeclarator {
                declarator,
                init,
                bit_width: None,
            });

            if !self.eat_punct(",") {
                break;
            }
            declarator = self.parse_declarator(false)?;
        }
        self.expect_punct(";")?;

        Ok(Declaration {
            specifiers,
            declarators,
            line,
        })
    }

    /// Parse a block-scope declaration including its `;`.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let line = self.peek().line;
        if self.at_keyword("_Static_assert") {
            self.parse_static_assert()?;
            return Ok(Declaration {
                specifiers: DeclSpecifiers::default(),
                declarators: Vec::new(),
                line,
            });
        }

        let specifiers = self.parse_decl_specifiers()?;
        if self.eat_punct(";") {
            return Ok(Declaration {
                specifiers,
                declarators: Vec::new(),
                line,
            });
        }
        let first = self.parse_declarator(false)?;
        self.finish_declaration(specifiers, first, line)
    }

    /// Parse a declarator. With `abstract_ok` the name may be omitted.
    fn parse_declarator(&mut self, abstract_ok: bool) -> Result<Declarator, ParseError> {
        self.nested(|p| p.parse_declarator_inner(abstract_ok))
    }

    fn parse_declarator_inner(&mut self, abstract_ok: bool) -> Result<Declarator, ParseError> {
        let mut pointers = 0usize;
        loop {
            self.skip_extensions()?;
            if self.eat_punct("*") {
                pointers += 1;
            } else if Self::is_qualifier(self.peek()) && pointers > 0 {
                self.advance();
            } else {
                break;
            }
        }

        let mut declarator = if self.at_punct("(") && self.paren_is_grouping(abstract_ok) {
            self.advance();
            let inner = self.parse_declarator(abstract_ok)?;
            self.expect_punct(")")?;
            inner
        } else if self.peek().is_ident() {
            let name = self.advance();
            Declarator {
                name: Some(name.text),
                line: name.line,
                derived: Vec::new(),
            }
        } else if abstract_ok {
            Declarator {
                name: None,
                line: self.peek().line,
                derived: Vec::new(),
            }
        } else {
            return Err(self.error("declarator"));
        };

        loop {
            self.skip_extensions()?;
            if self.eat_punct("[") {
                while self.at_keyword("static") || Self::is_qualifier(self.peek()) {
                    self.advance();
                }
                let size = if self.at_punct("]") {
                    None
                } else if self.at_punct("*") && self.peek_at(1).is_punct("]") {
                    self.advance();
                    None
                } else {
                    Some(self.parse_assignment()?)
                };
                self.expect_punct("]")?;
                declarator.derived.push(Derived::Array(size));
            } else if self.eat_punct("(") {
                let (params, variadic) = self.parse_param_list()?;
                declarator
                    .derived
                    .push(Derived::Function { params, variadic });
            } else {
                break;
            }
        }

        declarator
            .derived
            .extend(std::iter::repeat(Derived::Pointer).take(pointers));
        Ok(declarator)
    }

    /// Whether `(` opens a nested declarator rather than a parameter list.
    fn paren_is_grouping(&self, abstract_ok: bool) -> bool {
        if !abstract_ok {
            return true;
        }
        let next = self.peek_at(1);
        next.is_punct("*")
            || next.is_punct("(")
            || next.is_punct("[")
            || (next.is_ident() && !self.is_typedef_name(&next.text) && !self.peek_at(2).is_ident())
    }

    /// Parse parameters after the opening `(`, through the closing `)`.
    ///
    /// Parameter names are scoped to the list itself.
    fn parse_param_list(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        self.push_scope();
        let result = self.parse_param_list_inner();
        self.pop_scope();
        result
    }

    fn parse_param_list_inner(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        let mut params = Vec::new();
        let mut variadic = false;

        if self.eat_punct(")") {
            return Ok((params, variadic));
        }
        if self.at_keyword("void") && self.peek_at(1).is_punct(")") {
            self.advance();
            self.advance();
            return Ok((params, variadic));
        }

        loop {
            if self.eat_punct("...") {
                variadic = true;
                break;
            }
            let specifiers = self.parse_decl_specifiers()?;
            let declarator = if specifiers.is_empty() {
                // K&R identifier list.
                let name = self.expect_ident()?;
                Declarator {
                    name: Some(name.text),
                    line: name.line,
                    derived: Vec::new(),
                }
            } else {
                self.parse_declarator(true)?
            };
            if let Some(ref name) = declarator.name {
                self.declare_name(name, false);
            }
            params.push(Param {
                specifiers,
                declarator,
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;

        Ok((params, variadic))
    }

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let specifiers = self.parse_decl_specifiers()?;
        if specifiers.is_empty() {
            return Err(self.error("type name"));
        }
        let declarator = self.parse_declarator(true)?;
        Ok(TypeName {
            specifiers,
            declarator,
        })
    }

    fn parse_initializer(&mut self) -> Result<Initializer, ParseError> {
        self.nested(Self::parse_initializer_inner)
    }

    fn parse_initializer_inner(&mut self) -> Result<Initializer, ParseError> {
        if self.at_punct("{") {
            Ok(Initializer::List(self.parse_initializer_list()?))
        } else {
            Ok(Initializer::Expr(self.parse_assignment()?))
        }
    }

    /// Parse `{ ... }` with optional designators.
    fn parse_initializer_list(&mut self) -> Result<Vec<Initializer>, ParseError> {
        self.expect_punct("{")?;
        let mut items = Vec::new();

        while !self.at_punct("}") {
            let mut designated = false;
            loop {
                if self.eat_punct(".") {
                    self.expect_ident()?;
                    designated = true;
                } else if self.eat_punct("[") {
                    self.parse_conditional()?;
                    if self.eat_punct("...") {
                        self.parse_conditional()?;
                    }
                    self.expect_punct("]")?;
                    designated = true;
                } else {
                    break;
                }
            }
            if designated {
                self.expect_punct("=")?;
            }
            items.push(self.parse_initializer()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;

        Ok(items)
    }

    // ----- statements -----

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect_punct("{")?;
        self.push_scope();
        let items = self.parse_block_items();
        self.pop_scope();
        let items = items?;
        self.expect_punct("}")?;
        Ok(Block {
            items,
            line: open.line,
        })
    }

    fn parse_block_items(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut items = Vec::new();
        while !self.at_punct("}") {
            if self.peek().is_eof() {
                return Err(self.error("'}'"));
            }
            items.push(self.parse_statement()?);
        }
        Ok(items)
    }

    /// Parse a statement or block-scope declaration.
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        let token = self.peek().clone();
        let line = token.line;

        if token.is_punct("{") {
            return Ok(Stmt::Compound(self.parse_block()?));
        }
        if token.is_punct(";") {
            self.advance();
            return Ok(Stmt::Expr { expr: None, line });
        }

        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "if" => return self.parse_if(),
                "switch" => {
                    self.advance();
                    let cond = self.parse_paren_expr()?;
                    let body = Box::new(self.parse_statement()?);
                    return Ok(Stmt::Switch { cond, body, line });
                }
                "while" => {
                    self.advance();
                    let cond = self.parse_paren_expr()?;
                    let body = Box::new(self.parse_statement()?);
                    return Ok(Stmt::While { cond, body, line });
                }
                "do" => {
                    self.advance();
                    let body = Box::new(self.parse_statement()?);
                    self.expect_keyword("while")?;
                    let cond = self.parse_paren_expr()?;
                    self.expect_punct(";")?;
                    return Ok(Stmt::DoWhile { body, cond, line });
                }
                "for" => return self.parse_for(),
                "goto" => {
                    self.advance();
                    let label = self.expect_ident()?.text;
                    self.expect_punct(";")?;
                    return Ok(Stmt::Goto { label, line });
                }
                "continue" => {
                    self.advance();
                    self.expect_punct(";")?;
                    return Ok(Stmt::Continue { line });
                }
                "break" => {
                    self.advance();
                    self.expect_punct(";")?;
                    return Ok(Stmt::Break { line });
                }
                "return" => {
                    self.advance();
                    let value = if self.at_punct(";") {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    self.expect_punct(";")?;
                    return Ok(Stmt::Return { value, line });
                }
                "case" => {
                    self.advance();
                    let value = self.parse_conditional()?;
                    // GNU case ranges: `case 1 ... 5:`
                    if self.eat_punct("...") {
                        self.parse_conditional()?;
                    }
                    self.expect_punct(":")?;
                    let body = Box::new(self.parse_label_body(line)?);
                    return Ok(Stmt::Case { value, body, line });
                }
                "default" => {
                    self.advance();
                    self.expect_punct(":")?;
                    let body = Box::new(self.parse_label_body(line)?);
                    return Ok(Stmt::Default { body, line });
                }
                _ => {}
            }
        }

        if token.is_ident() && self.peek_at(1).is_punct(":") {
            self.advance();
            self.advance();
            let body = Box::new(self.parse_label_body(line)?);
            return Ok(Stmt::Labeled {
                label: token.text,
                body,
                line,
            });
        }

        if self.at_declaration_start() {
            return Ok(Stmt::Declaration(self.parse_declaration()?));
        }

        let expr = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Expr {
            expr: Some(expr),
            line,
        })
    }

    /// Statement after a label. A label directly before `}` gets a null statement.
    fn parse_label_body(&mut self, line: usize) -> Result<Stmt, ParseError> {
        if self.at_punct("}") {
            return Ok(Stmt::Expr { expr: None, line });
        }
        self.parse_statement()
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.expect_keyword("if")?.line;
        let cond = self.parse_paren_expr()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.at_keyword("else") {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
            line,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.expect_keyword("for")?.line;
        self.expect_punct("(")?;
        self.push_scope();
        let result = self.parse_for_rest(line);
        self.pop_scope();
        result
    }

    /// Everything after `for (`, inside the scope of the first clause.
    fn parse_for_rest(&mut self, line: usize) -> Result<Stmt, ParseError> {
        let init = if self.eat_punct(";") {
            None
        } else if self.at_declaration_start() {
            Some(ForInit::Declaration(self.parse_declaration()?))
        } else {
            let expr = self.parse_expr()?;
            self.expect_punct(";")?;
            Some(ForInit::Expr(expr))
        };

        let cond = if self.at_punct(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(";")?;

        let step = if self.at_punct(")") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(")")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
            line,
        })
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_punct(")")?;
        Ok(expr)
    }

    // ----- expressions -----

    /// Parse a full (comma) expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assignment()?;
        if !self.at_punct(",") {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat_punct(",") {
            exprs.push(self.parse_assignment()?);
        }
        Ok(Expr::Comma(exprs))
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_conditional()?;
        let token = self.peek();
        if token.kind == TokenKind::Punct && ASSIGN_OPS.contains(&token.text.as_str()) {
            let op = self.advance().text;
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.eat_punct("?") {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect_punct(":")?;
        let else_expr = self.parse_conditional()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_cast()?;
        loop {
            let token = self.peek();
            if token.kind != TokenKind::Punct {
                break;
            }
            let prec = match binary_precedence(&token.text) {
                Some(p) if p >= min_prec => p,
                _ => break,
            };
            let op = self.advance().text;
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_cast_inner)
    }

    fn parse_cast_inner(&mut self) -> Result<Expr, ParseError> {
        if self.at_punct("(") && self.starts_type_name(self.peek_at(1)) {
            self.advance();
            let ty = Box::new(self.parse_type_name()?);
            self.expect_punct(")")?;
            if self.at_punct("{") {
                let init = self.parse_initializer_list()?;
                let literal = Expr::CompoundLiteral { ty, init };
                return self.parse_postfix(literal);
            }
            let operand = Box::new(self.parse_cast()?);
            return Ok(Expr::Cast { ty, operand });
        }
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();

        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "++" | "--" => {
                    self.advance();
                    let operand = Box::new(self.parse_unary()?);
                    return Ok(Expr::Unary {
                        op: token.text.clone(),
                        operand,
                    });
                }
                "&" | "*" | "+" | "-" | "~" | "!" => {
                    self.advance();
                    let operand = Box::new(self.parse_cast()?);
                    return Ok(Expr::Unary {
                        op: token.text.clone(),
                        operand,
                    });
                }
                _ => {}
            }
        }

        let is_alignof = token.is_keyword("_Alignof")
            || (token.is_ident() && (token.text == "__alignof__" || token.text == "__alignof"));
        if token.is_keyword("sizeof") || is_alignof {
            self.advance();
            if self.at_punct("(") && self.starts_type_name(self.peek_at(1)) {
                self.advance();
                let ty = Box::new(self.parse_type_name()?);
                self.expect_punct(")")?;
                if is_alignof {
                    return Ok(Expr::AlignofType(ty));
                }
                return Ok(Expr::SizeofType(ty));
            }
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::SizeofExpr(operand));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            if self.eat_punct("[") {
                let index = self.parse_expr()?;
                self.expect_punct("]")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat_punct("(") {
                let mut args = Vec::new();
                if !self.at_punct(")") {
                    loop {
                        args.push(self.parse_assignment()?);
                        if !self.eat_punct(",") {
                            break;
                        }
                    }
                }
                self.expect_punct(")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.at_punct(".") || self.at_punct("->") {
                let arrow = self.advance().text == "->";
                let field = self.expect_ident()?.text;
                expr = Expr::Member {
                    base: Box::new(expr),
                    field,
                    arrow,
                };
            } else if self.at_punct("++") || self.at_punct("--") {
                let op = self.advance().text;
                expr = Expr::Postfix {
                    op,
                    operand: Box::new(expr),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Ident(token.text))
            }
            TokenKind::Number | TokenKind::Char => {
                self.advance();
                Ok(Expr::Constant(token.text))
            }
            TokenKind::Str => {
                let mut text = String::new();
                while self.peek().kind == TokenKind::Str {
                    text.push_str(&self.advance().text);
                }
                Ok(Expr::StringLit(text))
            }
            TokenKind::Punct if token.text == "(" => self.parse_paren_expr(),
            _ => Err(self.error("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> TranslationUnit {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_translation_unit().unwrap()
    }

    fn parse_err(src: &str) -> ParseError {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_translation_unit().unwrap_err()
    }

    fn first_function(unit: &TranslationUnit) -> &FunctionDef {
        unit.functions().next().expect("function")
    }

    fn parse_stmt(src: &str) -> Stmt {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_statement().unwrap()
    }

    fn parse_expr(src: &str) -> Expr {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_expr().unwrap()
    }

    #[test]
    fn test_global_declarations() {
        let unit = parse("int a = 1, *b;\nstatic const uint32_t c[4];\n");
        assert_eq!(unit.items.len(), 2);
        let ExternalDecl::Declaration(ref decl) = unit.items[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.declarators.len(), 2);
        assert_eq!(decl.declarators[0].declarator.name.as_deref(), Some("a"));
        assert!(decl.declarators[0].init.is_some());
        assert_eq!(decl.declarators[1].declarator.derived, vec![Derived::Pointer]);

        let ExternalDecl::Declaration(ref decl) = unit.items[1] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.line, 2);
        assert_eq!(decl.specifiers.storage, vec![StorageClass::Static]);
        assert_eq!(decl.specifiers.type_names, vec!["uint32_t".to_string()]);
    }

    #[test]
    fn test_function_definition_with_params() {
        let unit = parse("static int add(int a, char *b) { return a; }");
        let f = first_function(&unit);
        assert_eq!(f.name(), "add");
        let names: Vec<_> = f
            .params()
            .iter()
            .map(|p| p.declarator.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(f.body.items.len(), 1);
    }

    #[test]
    fn test_void_and_empty_params() {
        let unit = parse("void f(void) {}\nint main() { return 0; }");
        let functions: Vec<_> = unit.functions().collect();
        assert_eq!(functions.len(), 2);
        assert!(functions[0].params().is_empty());
        assert!(functions[1].params().is_empty());
    }

    #[test]
    fn test_prototype_is_declaration() {
        let unit = parse("int f(int x);\nint (*handler)(int, char);\n");
        let ExternalDecl::Declaration(ref proto) = unit.items[0] else {
            panic!("expected declaration");
        };
        assert!(proto.declarators[0].declarator.is_function());

        let ExternalDecl::Declaration(ref fp) = unit.items[1] else {
            panic!("expected declaration");
        };
        let declarator = &fp.declarators[0].declarator;
        assert_eq!(declarator.name.as_deref(), Some("handler"));
        assert!(!declarator.is_function());
        assert!(matches!(declarator.derived[1], Derived::Function { .. }));
    }

    #[test]
    fn test_typedef_registers_name() {
        let unit = parse("typedef unsigned char byte_t;\nbyte_t *p;\nvoid g(void) { byte_t * q; }");
        assert_eq!(unit.items.len(), 3);
        let g = unit.functions().next().unwrap();
        assert!(matches!(g.body.items[0], Stmt::Declaration(_)));
    }

    #[test]
    fn test_block_variable_hides_typedef() {
        let unit = parse(
            "typedef unsigned char T;\nvoid f(void) {\n  unsigned char T = 0u;\n  T = 1u;\n}\nT after;\n",
        );
        assert_eq!(unit.items.len(), 3);
        let f = first_function(&unit);
        assert!(matches!(f.body.items[0], Stmt::Declaration(_)));
        assert!(matches!(f.body.items[1], Stmt::Expr { expr: Some(_), line: 4 }));
        // The typedef is visible again after the block.
        assert!(matches!(unit.items[2], ExternalDecl::Declaration(_)));
    }

    #[test]
    fn test_parameter_hides_typedef() {
        let unit = parse("typedef int T;\nvoid f(int T) {\n  T = 1;\n}\nvoid g(int T);\nT x;\n");
        let f = first_function(&unit);
        assert!(matches!(f.body.items[0], Stmt::Expr { expr: Some(_), .. }));
        assert_eq!(unit.items.len(), 4);
    }

    #[test]
    fn test_nesting_limit() {
        let shallow = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert!(matches!(parse_expr(&shallow), Expr::Constant(_)));

        let deep_expr = format!(
            "void f(void) {{\n  x = {}1{};\n}}",
            "(".repeat(5000),
            ")".repeat(5000)
        );
        let err = parse_err(&deep_expr);
        assert!(matches!(err, ParseError::TooDeep { line: 2, .. }));

        let deep_blocks = format!("void f(void) {}{}", "{".repeat(5000), "}".repeat(5000));
        assert!(matches!(parse_err(&deep_blocks), ParseError::TooDeep { .. }));
    }

    #[test]
    fn test_struct_and_enum() {
        let unit = parse(
            "struct point { int x, y; unsigned flag : 1; };\n\
             enum color { RED, GREEN = 2, BLUE, };\n\
             struct point origin = { .x = 0, .y = 0 };\n",
        );
        let ExternalDecl::Declaration(ref record) = unit.items[0] else {
            panic!("expected declaration");
        };
        let spec = record.specifiers.record.as_ref().unwrap();
        assert_eq!(spec.tag.as_deref(), Some("point"));
        assert_eq!(spec.members.as_ref().unwrap().len(), 2);

        let ExternalDecl::Declaration(ref enumeration) = unit.items[1] else {
            panic!("expected declaration");
        };
        let names: Vec<_> = enumeration
            .specifiers
            .enumeration
            .as_ref()
            .unwrap()
            .enumerators
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
    }

    #[test]
    fn test_if_else_bodies() {
        let stmt = parse_stmt("if (x > 5) x = 2; else { x = 3; }");
        let Stmt::If {
            then_branch,
            else_branch,
            ..
        } = stmt
        else {
            panic!("expected if");
        };
        assert!(!then_branch.is_compound());
        assert!(else_branch.unwrap().is_compound());
    }

    #[test]
    fn test_switch_with_cases() {
        let stmt = parse_stmt("switch (x) {\ncase 1:\n  x = 2;\n  break;\ndefault:\n  break;\n}");
        let Stmt::Switch { body, line, .. } = stmt else {
            panic!("expected switch");
        };
        assert_eq!(line, 1);
        let Stmt::Compound(block) = *body else {
            panic!("expected block");
        };
        assert_eq!(block.items.len(), 3);
        assert!(matches!(block.items[0], Stmt::Case { line: 2, .. }));
        assert!(matches!(block.items[2], Stmt::Default { line: 5, .. }));
    }

    #[test]
    fn test_goto_and_label() {
        let f = parse("void f(void) {\n  goto out;\nout:\n  return;\n}");
        let body = &first_function(&f).body;
        assert!(matches!(body.items[0], Stmt::Goto { ref label, line: 2 } if label == "out"));
        assert!(matches!(body.items[1], Stmt::Labeled { ref label, line: 3, .. } if label == "out"));
    }

    #[test]
    fn test_loops() {
        let stmt = parse_stmt("for (int i = 0; i < 10; i++) sum += i;");
        let Stmt::For { init, body, .. } = stmt else {
            panic!("expected for");
        };
        assert!(matches!(init, Some(ForInit::Declaration(_))));
        assert!(!body.is_compound());

        assert!(matches!(
            parse_stmt("do { n--; } while (n);"),
            Stmt::DoWhile { .. }
        ));
        assert!(matches!(parse_stmt("while (1) ;"), Stmt::While { .. }));
    }

    #[test]
    fn test_expression_precedence() {
        let expr = parse_expr("a + b * c == d");
        let Expr::Binary { op, lhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, "==");
        let Expr::Binary { op, rhs, .. } = *lhs else {
            panic!("expected binary");
        };
        assert_eq!(op, "+");
        assert!(matches!(*rhs, Expr::Binary { ref op, .. } if op == "*"));
    }

    #[test]
    fn test_casts_sizeof_and_postfix() {
        assert!(matches!(parse_expr("(uint8_t)x"), Expr::Cast { .. }));
        assert!(matches!(parse_expr("(x)"), Expr::Ident(_)));
        assert!(matches!(parse_expr("sizeof(int)"), Expr::SizeofType(_)));
        assert!(matches!(parse_expr("sizeof x"), Expr::SizeofExpr(_)));
        assert!(matches!(parse_expr("p->next[2].val++"), Expr::Postfix { .. }));
        assert!(matches!(parse_expr("f(a, b ? c : d)"), Expr::Call { ref args, .. } if args.len() == 2));
        assert!(matches!(parse_expr("x = y += 1"), Expr::Assign { .. }));
        assert!(matches!(
            parse_expr("(struct point){ 1, 2 }"),
            Expr::CompoundLiteral { .. }
        ));
    }

    #[test]
    fn test_unknown_typedef_heuristic() {
        let unit = parse("my_type value;\nvoid f(void) { my_type local = 0; }");
        assert_eq!(unit.items.len(), 2);
    }

    #[test]
    fn test_attributes_are_skipped() {
        let unit = parse("__attribute__((unused)) static int x;\nvoid f(void) __attribute__((noreturn));");
        assert_eq!(unit.items.len(), 2);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_err("int x = 1;\nvoid f(void) {\n  x = ;\n}");
        assert_eq!(err.line(), 3);
        assert!(err.to_string().contains("expected expression"));
    }

    #[test]
    fn test_missing_brace() {
        let err = parse_err("void f(void) { return;");
        assert!(matches!(err, ParseError::Unexpected { ref found, .. } if found == "end of file"));
    }
}
