// program    ::= statement*
// statement  ::= assignment | funcdef | if | for | while | return
//              | call NEWLINE | NEWLINE | INDENT
// assignment ::= (ID | ID '[' expression ']') '=' condition
// funcdef    ::= 'def' ID '(' [param (',' param)*] ')' ':' suite
// param      ::= ID [':' ID]
// if         ::= 'if' condition ':' suite ('elif' condition ':' suite)* ['else' ':' suite]
// while      ::= 'while' condition ':' suite ['else' ':' suite]
// for        ::= 'for' ID 'in' expression ':' suite ['else' ':' suite]
// return     ::= 'return' expression
// suite      ::= simple_statement NEWLINE | NEWLINE block
// condition  ::= not_test (('and' | 'or') not_test)*
// not_test   ::= 'not' not_test | comparison
// comparison ::= expression [('<' | '>' | '<=' | '>=' | '==' | '!=') expression]
// expression ::= STRING | 'True' | 'False' | list | term (('+' | '-') term)*
// term       ::= factor (('*' | '//' | '%') factor)*
// factor     ::= NUMBER | ID | call | ID '[' expression ']' | '(' condition ')'
//              | ('-' | '+') factor
// list       ::= '[' [expression (',' expression)*] ']'

use serde::Serialize;

use crate::{token::Span, types::DataType};

#[derive(Debug, PartialEq, Default, Serialize)]
#[serde(tag = "type")]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Stmt {
    #[serde(flatten)]
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StmtKind {
    Assign {
        /// Front ends may produce several targets; only one is compiled.
        targets: Vec<Expr>,
        value: Expr,
    },
    FunctionDef {
        name: Ident,
        args: Vec<Arg>,
        body: Vec<Stmt>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        /// Empty when there is no `else`; a chain of `elif`s nests here.
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Return {
        value: Expr,
    },
    Expr {
        value: Expr,
    },
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Arg {
    pub name: Ident,
    pub annotation: Option<DataType>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Expr {
        Expr { kind, span }
    }

    /// Returns the identifier if this is a plain name reference.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name { id } => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    BinOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOperator,
        /// At least two operands, evaluated left to right.
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOperator>,
        comparators: Vec<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Constant {
        value: Constant,
    },
    Name {
        id: Box<str>,
    },
    List {
        elts: Vec<Expr>,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Call {
        func: Ident,
        args: Vec<Expr>,
    },
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constant {
    Int(i32),
    Bool(bool),
    Str(Box<str>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mult,
    /// True division. Never produced by the parser.
    Div,
    FloorDiv,
    Mod,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    USub,
    UAdd,
    Not,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}
