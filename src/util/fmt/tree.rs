use std::io::Write;

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

pub fn print_module_string(module: &Module) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_module(&mut buf, module).expect("writing to a vec can't fail");
    String::from_utf8(buf).expect("tree is valid utf-8")
}

pub fn print_module(w: &mut impl Write, module: &Module) -> std::io::Result<()> {
    print_body(w, 0, &module.body)
}

fn print_body(w: &mut impl Write, i: usize, body: &[Stmt]) -> std::io::Result<()> {
    for stmt in body {
        print_stmt(w, i, stmt)?;
    }
    Ok(())
}

/// Prints a labelled nested block, as in `then` or `else`.
fn print_section(w: &mut impl Write, i: usize, label: &str, body: &[Stmt]) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(w, "{label}")?;
    print_body(w, i + 1, body)
}

fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::Assign { targets, value } => {
            writeln!(w, "assign ({span})")?;
            for target in targets {
                print_expr(w, i + 1, target)?;
            }
            print_expr(w, i + 1, value)?;
        }
        StmtKind::FunctionDef { name, args, body } => {
            write!(w, "function_def {}(", name.name)?;
            for (idx, arg) in args.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}", arg.name.name)?;
                if let Some(annotation) = arg.annotation {
                    write!(w, ": {annotation}")?;
                }
            }
            writeln!(w, ") ({span})")?;
            print_body(w, i + 1, body)?;
        }
        StmtKind::If { test, body, orelse } => {
            writeln!(w, "if ({span})")?;
            print_expr(w, i + 1, test)?;
            print_section(w, i + 1, "then", body)?;
            if !orelse.is_empty() {
                print_section(w, i + 1, "else", orelse)?;
            }
        }
        StmtKind::While { test, body, orelse } => {
            writeln!(w, "while ({span})")?;
            print_expr(w, i + 1, test)?;
            print_section(w, i + 1, "do", body)?;
            if !orelse.is_empty() {
                print_section(w, i + 1, "else", orelse)?;
            }
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => {
            writeln!(w, "for ({span})")?;
            print_expr(w, i + 1, target)?;
            print_expr(w, i + 1, iter)?;
            print_section(w, i + 1, "do", body)?;
            if !orelse.is_empty() {
                print_section(w, i + 1, "else", orelse)?;
            }
        }
        StmtKind::Return { value } => {
            writeln!(w, "return ({span})")?;
            print_expr(w, i + 1, value)?;
        }
        StmtKind::Expr { value } => {
            writeln!(w, "expr ({span})")?;
            print_expr(w, i + 1, value)?;
        }
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::BinOp { left, op, right } => {
            writeln!(w, "binop {op:?} ({span})")?;
            print_expr(w, i + 1, left)?;
            print_expr(w, i + 1, right)?;
        }
        ExprKind::BoolOp { op, values } => {
            writeln!(w, "boolop {op:?} ({span})")?;
            for value in values {
                print_expr(w, i + 1, value)?;
            }
        }
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => {
            write!(w, "compare")?;
            for op in ops {
                write!(w, " {op:?}")?;
            }
            writeln!(w, " ({span})")?;
            print_expr(w, i + 1, left)?;
            for comparator in comparators {
                print_expr(w, i + 1, comparator)?;
            }
        }
        ExprKind::UnaryOp { op, operand } => {
            writeln!(w, "unary {op:?} ({span})")?;
            print_expr(w, i + 1, operand)?;
        }
        ExprKind::Constant { value } => match value {
            Constant::Int(val) => writeln!(w, "int {val} ({span})")?,
            Constant::Bool(val) => writeln!(w, "bool {val} ({span})")?,
            Constant::Str(val) => writeln!(w, "string {val:?} ({span})")?,
        },
        ExprKind::Name { id } => {
            writeln!(w, "name {id} ({span})")?;
        }
        ExprKind::List { elts } => {
            writeln!(w, "list ({span})")?;
            for elt in elts {
                print_expr(w, i + 1, elt)?;
            }
        }
        ExprKind::Subscript { value, slice } => {
            writeln!(w, "subscript ({span})")?;
            print_expr(w, i + 1, value)?;
            print_expr(w, i + 1, slice)?;
        }
        ExprKind::Call { func, args } => {
            writeln!(w, "call {} ({span})", func.name)?;
            for arg in args {
                print_expr(w, i + 1, arg)?;
            }
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
