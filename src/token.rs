use std::fmt;

use serde::Serialize;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token. For [`TokenKind::Indent`] this is the
    /// run of tab characters; for [`TokenKind::Eof`] it is empty.
    pub text: Box<str>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<Box<str>>, span: Span) -> Token {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Indentation depth of an [`TokenKind::Indent`] token, in tabs.
    pub fn indent_depth(&self) -> usize {
        debug_assert_eq!(self.kind, TokenKind::Indent);
        self.text.chars().filter(|&c| c == '\t').count()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?}, {:?})", self.kind, self.text, self.span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Span {
            lo, line, column, ..
        } = self.span;
        write!(
            f,
            "Token({lo}, {:?}, {:?}, line={line}, column={column})",
            self.kind, self.text
        )
    }
}

/// Source location of a token or node.
///
/// `lo` and `len` are byte based; `line` and `column` are 1-based and count
/// characters, a tab being a single column.
#[derive(Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub lo: usize,
    pub len: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(lo: usize, len: u32, line: u32, column: u32) -> Span {
        Span {
            lo,
            len,
            line,
            column,
        }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span starting at `self` and ending at the end of `other`.
    pub fn to(self, other: Span) -> Span {
        let hi = self.hi().max(other.hi());
        Span {
            len: u32::try_from(hi - self.lo).unwrap_or(u32::MAX),
            ..self
        }
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, {}..{})", self.lo, self.hi())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,
    /// A run of tabs at the start of a line. Depth is resolved by the parser.
    Indent,

    Identifier,
    /// An identifier immediately followed by `(`.
    FuncCall,
    /// An identifier immediately followed by `[`.
    ArrayMember,
    Number,
    String,

    If,
    Elif,
    Else,
    While,
    For,
    In,
    Def,
    Return,
    And,
    Or,
    Not,
    True,
    False,

    /// `=`
    Assign,
    Colon,
    Comma,
    Plus,
    Minus,
    Star,
    /// `//`
    SlashSlash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,

    Eof,
    Unknown,
}

impl TokenKind {
    pub fn is_comparison(self) -> bool {
        use TokenKind::*;
        matches!(self, Less | Greater | LessEq | GreaterEq | EqEq | NotEq)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "if" => TokenKind::If,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "def" => TokenKind::Def,
    "return" => TokenKind::Return,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "not" => TokenKind::Not,
    "True" => TokenKind::True,
    "False" => TokenKind::False,
};

pub static OPERATORS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "=" => TokenKind::Assign,
    ":" => TokenKind::Colon,
    "," => TokenKind::Comma,
    "+" => TokenKind::Plus,
    "-" => TokenKind::Minus,
    "*" => TokenKind::Star,
    "//" => TokenKind::SlashSlash,
    "%" => TokenKind::Percent,
    "(" => TokenKind::LParen,
    ")" => TokenKind::RParen,
    "[" => TokenKind::LBracket,
    "]" => TokenKind::RBracket,
    "<" => TokenKind::Less,
    ">" => TokenKind::Greater,
    "<=" => TokenKind::LessEq,
    ">=" => TokenKind::GreaterEq,
    "==" => TokenKind::EqEq,
    "!=" => TokenKind::NotEq,
};
