use tracing::debug;

use crate::token::{Span, Spanned, Token, TokenKind, KEYWORDS, OPERATORS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string into a new token buffer.
///
/// The buffer always ends with a single [`TokenKind::Eof`] token. Lexing stops
/// at the first character that starts no token.
pub fn lex(src: &str) -> Result<Vec<Token>, Spanned<Error>> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() + 1));
    lex_into(src, &mut tokens)?;
    Ok(tokens)
}

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// On failure the buffer ends with the offending [`TokenKind::Unknown`] token.
pub fn lex_into(src: &str, tokens: &mut Vec<Token>) -> Result<(), Spanned<Error>> {
    Lexer::new(src, tokens).lex()?;
    debug!(tokens = tokens.len(), "lexed source");
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
}

struct Lexer<'src, 'tok> {
    src: &'src str,
    cursor: usize,
    line: u32,
    column: u32,
    mark: (usize, u32, u32),
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) -> Result<(), Spanned<Error>> {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            self.mark();
            let Some(current) = self.peek() else {
                self.produce(TokenKind::Eof);
                return Ok(());
            };
            match current {
                '\n' => {
                    self.advance();
                    self.produce(TokenKind::Newline);
                    self.indentation();
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
                c if c.is_ascii_digit() => self.number(),
                '-' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                quote @ ('"' | '\'') => self.string(quote),
                _ => self.operator()?,
            }
        }
    }

    /// Scans the run of tabs that follows a line break. Only a non-empty run
    /// produces a token.
    fn indentation(&mut self) {
        self.mark();
        while self.peek() == Some('\t') {
            self.advance();
        }
        if self.cursor > self.mark.0 {
            self.produce(TokenKind::Indent);
        }
    }

    /// Identifiers are ASCII only, so they can be used verbatim as IR names.
    fn identifier(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let kind = match KEYWORDS.get(self.substr()).copied() {
            Some(keyword) => keyword,
            // The name of a function definition stays a plain identifier.
            None if self.previous_kind() == Some(TokenKind::Def) => TokenKind::Identifier,
            None => match self.peek() {
                Some('(') => TokenKind::FuncCall,
                Some('[') => TokenKind::ArrayMember,
                _ => TokenKind::Identifier,
            },
        };
        self.produce(kind);
    }

    /// Malformed literals such as `1.2.3` are accepted here; the parser
    /// rejects them when converting to an integer.
    fn number(&mut self) {
        if self.peek() == Some('-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        self.produce(TokenKind::Number);
    }

    /// Escapes are skipped over, not decoded. An unclosed string runs to the
    /// end of the input.
    fn string(&mut self, quote: char) {
        self.advance();
        while let Some(current) = self.advance() {
            if current == quote {
                break;
            }
            if current == '\\' {
                self.advance();
            }
        }
        self.produce(TokenKind::String);
    }

    fn operator(&mut self) -> Result<(), Spanned<Error>> {
        let rest = &self.src[self.cursor..];
        let two_len: usize = rest.chars().take(2).map(char::len_utf8).sum();
        if let Some(&kind) = OPERATORS.get(&rest[..two_len]).filter(|_| two_len > 1) {
            self.advance();
            self.advance();
            self.produce(kind);
            return Ok(());
        }

        // Only dispatched on a present char.
        let current = self.advance().unwrap_or('\0');
        match OPERATORS.get(self.substr()).copied() {
            Some(kind) => {
                self.produce(kind);
                Ok(())
            }
            None => {
                self.produce(TokenKind::Unknown);
                Err(self.span().wrap(Error::UnexpectedChar(current)))
            }
        }
    }
}

impl Lexer<'_, '_> {
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            cursor: 0,
            line: 1,
            column: 1,
            mark: (0, 1, 1),
            tokens,
        }
    }

    /// Starts a new token "mark" at the current position.
    fn mark(&mut self) {
        self.mark = (self.cursor, self.line, self.column);
    }

    /// Returns the next char and advances, keeping line and column in sync.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Returns the next char without advancing.
    fn peek(&self) -> Option<char> {
        self.src[self.cursor..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.cursor..].chars().nth(n)
    }

    fn previous_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }

    /// Returns the span from the mark up to the cursor.
    fn span(&self) -> Span {
        let (lo, line, column) = self.mark;
        let len = u32::try_from(self.cursor - lo).expect("token longer than u32::MAX bytes");
        Span::new(lo, len, line, column)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        let span = self.span();
        let text = span.substr(self.src);
        self.tokens.push(Token::new(kind, text, span));
    }
}
