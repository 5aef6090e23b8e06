#![allow(clippy::items_after_statements)]

use std::fmt;

use crate::{codegen, lexer, parser, token::Spanned, Error};

impl fmt::Display for Spanned<lexer::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        match error {
            lexer::Error::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
        }
    }
}

impl fmt::Display for Spanned<parser::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use parser::Error::*;
        match error {
            Unexpected { actual, expected } => write!(f, "expected {expected:?}, found {actual:?}"),
            UnexpectedStatement { token } => write!(f, "unexpected {token:?} at start of statement"),
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            ExpectedEndOfStatement { actual } => {
                write!(f, "expected end of statement, found {actual:?}")
            }
            ExpectedIndent { actual } => {
                write!(f, "expected an indented block, found {actual:?}")
            }
            WrongIndentLevel { expected, actual } => {
                write!(f, "wrong indent level: expected {expected}, found {actual}")
            }
            ChainedComparison => write!(f, "chained comparisons are not supported"),
            InvalidInteger(text) => write!(f, "invalid integer literal `{text}`"),
            UnknownTypeName(name) => write!(f, "unknown type name `{name}`"),
            UndefinedVariable(name) => write!(f, "undefined variable `{name}`"),
            UndefinedFunction(name) => write!(f, "undefined function `{name}`"),
            UndefinedArray(name) => write!(f, "undefined array `{name}`"),
            NotAVariable(name) => write!(f, "`{name}` is not a variable"),
            NotAFunction(name) => write!(f, "`{name}` is not a function"),
            NotIndexable {
                name,
                data_type: Some(data_type),
            } => write!(f, "`{name}` of type {data_type} can't be indexed"),
            NotIndexable {
                name,
                data_type: None,
            } => write!(f, "`{name}` can't be indexed"),
            DuplicateSymbol(name) => write!(f, "`{name}` is already defined in this scope"),
            TypeConflict {
                name,
                previous,
                inferred,
            } => write!(
                f,
                "type conflict for `{name}`: previously {previous}, now {inferred}"
            ),
            NonIntegerElement { found } => {
                write!(f, "array elements must be int, found {found}")
            }
        }
    }
}

impl fmt::Display for Spanned<codegen::Error> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use codegen::Error::*;
        match error {
            Unsupported(what) => write!(f, "unsupported: {what}"),
            UndefinedVariable(name) => write!(f, "undefined variable `{name}`"),
            UndefinedFunction(name) => write!(f, "undefined function `{name}`"),
            UnknownLength(name) => {
                write!(f, "length of `{name}` is not known at compile time")
            }
            UnsupportedComparison(ty) => write!(f, "can't compare values of type {ty}"),
            NotIndexable(ty) => write!(f, "values of type {ty} can't be indexed"),
            NotPrintable(ty) => write!(f, "can't print a value of type {ty}"),
            Redefinition {
                name,
                same_signature: true,
            } => write!(f, "function `{name}` is already defined"),
            Redefinition {
                name,
                same_signature: false,
            } => write!(
                f,
                "function `{name}` is already defined with a different signature"
            ),
            ArgumentCount {
                name,
                expected,
                actual,
            } => write!(
                f,
                "wrong number of arguments to `{name}`: expected {expected}, got {actual}"
            ),
            RangeArity(actual) => {
                write!(f, "`range` expects 1 to 3 arguments, got {actual}")
            }
            TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, found {actual}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (stage, alternate) = (self.stage(), f.alternate());
        match self {
            Error::Lex(e) if alternate => write!(f, "{stage} error at {e:#}"),
            Error::Parse(e) if alternate => write!(f, "{stage} error at {e:#}"),
            Error::Codegen(e) if alternate => write!(f, "{stage} error at {e:#}"),
            Error::Lex(e) => write!(f, "{stage} error: {e}"),
            Error::Parse(e) => write!(f, "{stage} error: {e}"),
            Error::Codegen(e) => write!(f, "{stage} error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{compile, Error};

    #[test]
    fn test_crate_error_display() {
        let error = compile("x = 1\ny = z\n", "t.py").unwrap_err();
        assert!(matches!(error, Error::Parse(_)));
        assert_eq!(error.to_string(), "syntax error: undefined variable `z`");
        assert_eq!(
            format!("{error:#}"),
            "syntax error at 2:5: undefined variable `z`"
        );

        let error = compile("x = 1 $ 2", "t.py").unwrap_err();
        assert_eq!(
            format!("{error:#}"),
            "lexical error at 1:7: unexpected character '$'"
        );

        let error = compile("for x in [1]:\n\tprint(x)\n", "t.py").unwrap_err();
        assert_eq!(
            format!("{error:#}"),
            "codegen error at 1:10: unsupported: iteration over anything but `range`"
        );
    }
}
