//! Recursive descent parser for Jack source code
//!
//! Consumes tokens from the [`Lexer`] through one token of active lookahead
//! and builds a fully concrete syntax tree: one `parse_*` method per grammar
//! production, each appending every matched terminal as a leaf in
//! left-to-right order. The only place more than one token of lookahead is
//! needed is inside a term, where the token after an identifier decides
//! between a subroutine call, an indexed access, and a bare variable
//! reference; everywhere else the active lookahead alone selects the
//! production. The first mismatch aborts the parse of the input unit; there
//! is no backtracking and no recovery.

use crate::parser::cst::{NodeKind, SourceLocation, Token, TokenKind, TreeNode};
use crate::parser::lexer::{LexError, Lexer};
use std::fmt;

/// The nine binary operators chained left-to-right, without precedence.
const OPS: [&str; 9] = ["+", "-", "*", "/", "&", "|", "<", ">", "="];

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub file: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error in {} at line {}, column {}: {}",
            self.file, self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            file: err.file,
            location: err.location,
        }
    }
}

/// Recursive descent parser over a [`Lexer`].
///
/// Owns the lexer and a single token of lookahead; one parser instance
/// handles one input unit. Parsing separate units concurrently needs one
/// (lexer, parser) pair per unit and nothing else.
pub struct Parser {
    lexer: Lexer,
    lookahead: Option<Token>,
}

impl Parser {
    /// Create a parser over `source`, priming the lookahead. `file` is used
    /// only in diagnostics and node metadata.
    pub fn new(source: &str, file: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source, file);
        let lookahead = lexer.next_token()?;
        Ok(Self { lexer, lookahead })
    }

    /// Parse one class declaration, the single top-level form of an input
    /// unit, and return the root of the resulting tree.
    pub fn parse_class(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Class);
        node.add_child(self.expect_keyword("class")?);
        node.add_child(self.expect_identifier()?);
        node.add_child(self.expect_symbol("{")?);

        while self.at_class_var_dec() {
            node.add_child(self.parse_class_var_dec()?);
        }
        while self.at_subroutine_dec() {
            node.add_child(self.parse_subroutine_dec()?);
        }

        node.add_child(self.expect_symbol("}")?);
        Ok(node)
    }

    /// ClassVarDec := ('static'|'field') Type Identifier (',' Identifier)* ';'
    fn parse_class_var_dec(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::ClassVarDec);
        node.add_child(self.expect_keyword_any(&["static", "field"])?);
        node.add_child(self.parse_type()?);
        node.add_child(self.expect_identifier()?);

        while self.check_symbol(",") {
            node.add_child(self.expect_symbol(",")?);
            node.add_child(self.expect_identifier()?);
        }

        node.add_child(self.expect_symbol(";")?);
        Ok(node)
    }

    /// Type := Identifier | ('int'|'char'|'boolean')
    fn parse_type(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Type);
        if self.check_kind(TokenKind::Identifier) {
            node.add_child(self.expect_identifier()?);
        } else {
            node.add_child(self.expect_keyword_any(&["int", "char", "boolean"])?);
        }
        Ok(node)
    }

    /// SubroutineDec := ('constructor'|'function'|'method') ('void'|Type)
    ///                  Identifier '(' ParameterList ')' SubroutineBody
    fn parse_subroutine_dec(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::SubroutineDec);
        node.add_child(self.expect_keyword_any(&["constructor", "function", "method"])?);

        if self.check_keyword("void") {
            node.add_child(self.expect_keyword("void")?);
        } else {
            node.add_child(self.parse_type()?);
        }

        node.add_child(self.expect_identifier()?);
        node.add_child(self.expect_symbol("(")?);
        node.add_child(self.parse_parameter_list()?);
        node.add_child(self.expect_symbol(")")?);
        node.add_child(self.parse_subroutine_body()?);
        Ok(node)
    }

    /// ParameterList := (Type Identifier (',' Type Identifier)*)?
    ///
    /// An empty list is a node with zero children; the surrounding
    /// parentheses belong to the subroutine declaration.
    fn parse_parameter_list(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::ParameterList);
        if self.check_symbol(")") {
            return Ok(node);
        }

        node.add_child(self.parse_type()?);
        node.add_child(self.expect_identifier()?);

        while self.check_symbol(",") {
            node.add_child(self.expect_symbol(",")?);
            node.add_child(self.parse_type()?);
            node.add_child(self.expect_identifier()?);
        }

        Ok(node)
    }

    /// SubroutineBody := '{' VarDec* Statements '}'
    fn parse_subroutine_body(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::SubroutineBody);
        node.add_child(self.expect_symbol("{")?);

        while self.check_keyword("var") {
            node.add_child(self.parse_var_dec()?);
        }

        node.add_child(self.parse_statements()?);
        node.add_child(self.expect_symbol("}")?);
        Ok(node)
    }

    /// VarDec := 'var' Type Identifier (',' Identifier)* ';'
    fn parse_var_dec(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::VarDec);
        node.add_child(self.expect_keyword("var")?);
        node.add_child(self.parse_type()?);
        node.add_child(self.expect_identifier()?);

        while self.check_symbol(",") {
            node.add_child(self.expect_symbol(",")?);
            node.add_child(self.expect_identifier()?);
        }

        node.add_child(self.expect_symbol(";")?);
        Ok(node)
    }

    /// Statements := (LetStatement | IfStatement | WhileStatement |
    ///                DoStatement | ReturnStatement)*
    fn parse_statements(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Statements);

        while self.at_statement() {
            let keyword = match &self.lookahead {
                Some(token) => token.raw.clone(),
                None => break,
            };
            let statement = match keyword.as_str() {
                "let" => self.parse_let_statement()?,
                "if" => self.parse_if_statement()?,
                "while" => self.parse_while_statement()?,
                "do" => self.parse_do_statement()?,
                _ => self.parse_return_statement()?,
            };
            node.add_child(statement);
        }

        Ok(node)
    }

    /// LetStatement := 'let' Identifier ('[' Expression ']')? '=' Expression ';'
    fn parse_let_statement(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::LetStatement);
        node.add_child(self.expect_keyword("let")?);
        node.add_child(self.expect_identifier()?);

        // '[' after the target distinguishes indexed from plain assignment
        if self.check_symbol("[") {
            node.add_child(self.expect_symbol("[")?);
            node.add_child(self.parse_expression()?);
            node.add_child(self.expect_symbol("]")?);
        }

        node.add_child(self.expect_symbol("=")?);
        node.add_child(self.parse_expression()?);
        node.add_child(self.expect_symbol(";")?);
        Ok(node)
    }

    /// IfStatement := 'if' '(' Expression ')' '{' Statements '}'
    ///                ('else' '{' Statements '}')?
    fn parse_if_statement(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::IfStatement);
        node.add_child(self.expect_keyword("if")?);
        node.add_child(self.expect_symbol("(")?);
        node.add_child(self.parse_expression()?);
        node.add_child(self.expect_symbol(")")?);
        node.add_child(self.expect_symbol("{")?);
        node.add_child(self.parse_statements()?);
        node.add_child(self.expect_symbol("}")?);

        if self.check_keyword("else") {
            node.add_child(self.expect_keyword("else")?);
            node.add_child(self.expect_symbol("{")?);
            node.add_child(self.parse_statements()?);
            node.add_child(self.expect_symbol("}")?);
        }

        Ok(node)
    }

    /// WhileStatement := 'while' '(' Expression ')' '{' Statements '}'
    fn parse_while_statement(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::WhileStatement);
        node.add_child(self.expect_keyword("while")?);
        node.add_child(self.expect_symbol("(")?);
        node.add_child(self.parse_expression()?);
        node.add_child(self.expect_symbol(")")?);
        node.add_child(self.expect_symbol("{")?);
        node.add_child(self.parse_statements()?);
        node.add_child(self.expect_symbol("}")?);
        Ok(node)
    }

    /// DoStatement := 'do' SubroutineCall ';'
    fn parse_do_statement(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::DoStatement);
        node.add_child(self.expect_keyword("do")?);
        node.add_child(self.parse_subroutine_call()?);
        node.add_child(self.expect_symbol(";")?);
        Ok(node)
    }

    /// ReturnStatement := 'return' Expression? ';'
    fn parse_return_statement(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::ReturnStatement);
        node.add_child(self.expect_keyword("return")?);

        if self.at_term() {
            node.add_child(self.parse_expression()?);
        }

        node.add_child(self.expect_symbol(";")?);
        Ok(node)
    }

    /// Expression := Term (Op Term)*
    fn parse_expression(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Expression);
        node.add_child(self.parse_term()?);

        while self.at_op() {
            node.add_child(self.parse_op()?);
            node.add_child(self.parse_term()?);
        }

        Ok(node)
    }

    /// Term := IntegerConstant | StringConstant | KeywordConstant
    ///       | '(' Expression ')' | UnaryOp Term | SubroutineCall
    ///       | Identifier ('[' Expression ']')?
    fn parse_term(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Term);

        if self.check_kind(TokenKind::IntegerConstant) {
            node.add_child(self.consume_terminal(NodeKind::IntegerConstant)?);
        } else if self.check_kind(TokenKind::StringConstant) {
            node.add_child(self.consume_terminal(NodeKind::StringConstant)?);
        } else if self.at_keyword_constant() {
            node.add_child(self.consume_terminal(NodeKind::Keyword)?);
        } else if self.check_symbol("(") {
            node.add_child(self.expect_symbol("(")?);
            node.add_child(self.parse_expression()?);
            node.add_child(self.expect_symbol(")")?);
        } else if self.at_unary_op() {
            node.add_child(self.parse_unary_op()?);
            node.add_child(self.parse_term()?);
        } else if self.check_kind(TokenKind::Identifier) {
            // One token past the lookahead decides: call, index, or bare
            // variable reference.
            let peeked = self.lexer.peek_tokens(1)?;
            match peeked.first().and_then(|t| t.as_ref()) {
                Some(t) if t.kind == TokenKind::Symbol && (t.raw == "(" || t.raw == ".") => {
                    node.add_child(self.parse_subroutine_call()?);
                }
                Some(t) if t.kind == TokenKind::Symbol && t.raw == "[" => {
                    node.add_child(self.expect_identifier()?);
                    node.add_child(self.expect_symbol("[")?);
                    node.add_child(self.parse_expression()?);
                    node.add_child(self.expect_symbol("]")?);
                }
                _ => node.add_child(self.expect_identifier()?),
            }
        } else {
            return Err(self.error_expected("a term"));
        }

        Ok(node)
    }

    /// SubroutineCall := Identifier ( '(' ExpressionList ')'
    ///                              | '.' Identifier '(' ExpressionList ')' )
    fn parse_subroutine_call(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::SubroutineCall);
        node.add_child(self.expect_identifier()?);

        if self.check_symbol(".") {
            node.add_child(self.expect_symbol(".")?);
            node.add_child(self.expect_identifier()?);
        }

        node.add_child(self.expect_symbol("(")?);
        node.add_child(self.parse_expression_list()?);
        node.add_child(self.expect_symbol(")")?);
        Ok(node)
    }

    /// UnaryOp := '-' | '~'
    fn parse_unary_op(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::UnaryOp);
        node.add_child(self.expect_symbol_any(&["-", "~"])?);
        Ok(node)
    }

    /// Op := '+'|'-'|'*'|'/'|'&'|'|'|'<'|'>'|'='
    fn parse_op(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::Op);
        node.add_child(self.expect_symbol_any(&OPS)?);
        Ok(node)
    }

    /// ExpressionList := (Expression (',' Expression)*)?
    fn parse_expression_list(&mut self) -> Result<TreeNode, ParseError> {
        let mut node = self.open(NodeKind::ExpressionList);
        if self.check_symbol(")") {
            return Ok(node);
        }

        node.add_child(self.parse_expression()?);
        while self.check_symbol(",") {
            node.add_child(self.expect_symbol(",")?);
            node.add_child(self.parse_expression()?);
        }

        Ok(node)
    }

    // ----- lookahead predicates -----

    fn at_class_var_dec(&self) -> bool {
        self.check_keyword_any(&["static", "field"])
    }

    fn at_subroutine_dec(&self) -> bool {
        self.check_keyword_any(&["constructor", "function", "method"])
    }

    fn at_statement(&self) -> bool {
        self.check_keyword_any(&["let", "if", "while", "do", "return"])
    }

    fn at_keyword_constant(&self) -> bool {
        self.check_keyword_any(&["true", "false", "null", "this"])
    }

    fn at_unary_op(&self) -> bool {
        self.check_symbol_any(&["-", "~"])
    }

    fn at_op(&self) -> bool {
        self.check_symbol_any(&OPS)
    }

    fn at_term(&self) -> bool {
        self.check_kind(TokenKind::IntegerConstant)
            || self.check_kind(TokenKind::StringConstant)
            || self.check_kind(TokenKind::Identifier)
            || self.at_keyword_constant()
            || self.check_symbol("(")
            || self.at_unary_op()
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        matches!(&self.lookahead, Some(t) if t.kind == kind)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(&self.lookahead, Some(t) if t.kind == TokenKind::Keyword && t.raw == keyword)
    }

    fn check_keyword_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.check_keyword(k))
    }

    fn check_symbol(&self, symbol: &str) -> bool {
        matches!(&self.lookahead, Some(t) if t.kind == TokenKind::Symbol && t.raw == symbol)
    }

    fn check_symbol_any(&self, symbols: &[&str]) -> bool {
        symbols.iter().any(|s| self.check_symbol(s))
    }

    // ----- terminal matchers -----

    fn expect_keyword(&mut self, keyword: &str) -> Result<TreeNode, ParseError> {
        if self.check_keyword(keyword) {
            self.consume_terminal(NodeKind::Keyword)
        } else {
            Err(self.error_expected(&format!("'{}'", keyword)))
        }
    }

    fn expect_keyword_any(&mut self, keywords: &[&str]) -> Result<TreeNode, ParseError> {
        if self.check_keyword_any(keywords) {
            self.consume_terminal(NodeKind::Keyword)
        } else {
            Err(self.error_expected(&one_of(keywords)))
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<TreeNode, ParseError> {
        if self.check_symbol(symbol) {
            self.consume_terminal(NodeKind::Symbol)
        } else {
            Err(self.error_expected(&format!("'{}'", symbol)))
        }
    }

    fn expect_symbol_any(&mut self, symbols: &[&str]) -> Result<TreeNode, ParseError> {
        if self.check_symbol_any(symbols) {
            self.consume_terminal(NodeKind::Symbol)
        } else {
            Err(self.error_expected(&one_of(symbols)))
        }
    }

    fn expect_identifier(&mut self) -> Result<TreeNode, ParseError> {
        if self.check_kind(TokenKind::Identifier) {
            self.consume_terminal(NodeKind::Identifier)
        } else {
            Err(self.error_expected("an identifier"))
        }
    }

    /// Consume the lookahead, wrap it as a terminal leaf, and pull the next
    /// token into its place.
    fn consume_terminal(&mut self, kind: NodeKind) -> Result<TreeNode, ParseError> {
        let next = self.lexer.next_token()?;
        match std::mem::replace(&mut self.lookahead, next) {
            Some(token) => Ok(TreeNode::terminal(kind, self.lexer.file(), token)),
            None => Err(self.error_expected("a token")),
        }
    }

    /// Open a nonterminal node at the position of the active lookahead.
    fn open(&self, kind: NodeKind) -> TreeNode {
        let location = self
            .lookahead
            .as_ref()
            .map(|t| t.location)
            .unwrap_or_else(|| self.lexer.location());
        TreeNode::nonterminal(kind, self.lexer.file(), location)
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        match &self.lookahead {
            Some(token) => ParseError {
                message: format!("expected {}, found {}", expected, token),
                file: self.lexer.file().to_string(),
                location: token.location,
            },
            None => ParseError {
                message: format!("expected {}, found end of input", expected),
                file: self.lexer.file().to_string(),
                location: self.lexer.location(),
            },
        }
    }
}

fn one_of(lexemes: &[&str]) -> String {
    let quoted: Vec<String> = lexemes.iter().map(|l| format!("'{}'", l)).collect();
    format!("one of {}", quoted.join(", "))
}
