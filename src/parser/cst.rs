// CST (Concrete Syntax Tree) definitions for the Jack front end

use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Keyword,
    Symbol,
    Identifier,
    IntegerConstant,
    StringConstant,
}

/// A single token: category, exact lexeme, and position.
///
/// `raw` holds the lexeme exactly as scanned; string constants keep their
/// surrounding quote characters. Tokens are immutable once produced and
/// carry no reference back to the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            raw: raw.into(),
            location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword => write!(f, "keyword '{}'", self.raw),
            TokenKind::Symbol => write!(f, "symbol '{}'", self.raw),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.raw),
            TokenKind::IntegerConstant => write!(f, "integer constant {}", self.raw),
            TokenKind::StringConstant => write!(f, "string constant {}", self.raw),
        }
    }
}

/// Node tags for the concrete syntax tree.
///
/// One variant per grammar nonterminal, plus terminal variants mirroring
/// [`TokenKind`]. The enumeration is closed so that every match over node
/// kinds is checked exhaustively at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    // Nonterminals, one per grammar production
    Class,
    ClassVarDec,
    Type,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    SubroutineCall,
    UnaryOp,
    Op,
    ExpressionList,
    // Terminals, mirroring TokenKind
    Keyword,
    Symbol,
    Identifier,
    IntegerConstant,
    StringConstant,
}

/// Position metadata attached to every node when its production opens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetadata {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl NodeMetadata {
    pub fn new(file: &str, location: SourceLocation) -> Self {
        Self {
            file: file.to_string(),
            line: location.line,
            column: location.column,
        }
    }
}

/// A node in the concrete syntax tree.
///
/// Terminal nodes carry the raw lexeme in `value` and have no children;
/// nonterminal nodes have `value: None` and hold their matched grammar
/// symbols as ordered children. Every keyword, punctuation symbol, and
/// separator the grammar consumes appears as a terminal child in match
/// order, so concatenating the terminal leaves depth-first reconstructs the
/// token stream of the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub children: Vec<TreeNode>,
    pub metadata: NodeMetadata,
}

impl TreeNode {
    /// Open a nonterminal node at the position of the active lookahead.
    pub fn nonterminal(kind: NodeKind, file: &str, location: SourceLocation) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
            metadata: NodeMetadata::new(file, location),
        }
    }

    /// Wrap a consumed token as a terminal leaf.
    pub fn terminal(kind: NodeKind, file: &str, token: Token) -> Self {
        Self {
            kind,
            value: Some(token.raw),
            children: Vec::new(),
            metadata: NodeMetadata::new(file, token.location),
        }
    }

    pub fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Raw lexemes of all terminal leaves, in depth-first order.
    ///
    /// Joining these with single spaces reproduces the source with
    /// whitespace and comments normalized away.
    pub fn terminal_values(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_terminal_values(&mut out);
        out
    }

    fn collect_terminal_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(value) = &self.value {
            out.push(value.as_str());
        }
        for child in &self.children {
            child.collect_terminal_values(out);
        }
    }
}
