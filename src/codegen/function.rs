use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ast::{
        Arg, BinaryOperator, BoolOperator, CmpOperator, Constant, Expr, ExprKind, Ident, Stmt,
        StmtKind, UnaryOperator,
    },
    codegen::{CompilationContext, Error, Result, Signature},
    ir::{self, BinaryOp, CastOp, FunctionBuilder, IntPredicate, Type, Value},
    token::Span,
    types::{builtins, DataType},
};

/// Compiles one function body. Control falling off the end returns `0`.
pub(super) fn compile(
    cx: &mut CompilationContext,
    name: &str,
    params: &[(&Ident, Type)],
    body: &[Stmt],
) -> Result<ir::Function> {
    let values: Vec<_> = params
        .iter()
        .map(|(ident, ty)| Value::local(ty.clone(), ident.name.clone()))
        .collect();
    let mut gen = FunctionGen {
        cx,
        b: FunctionBuilder::new(name, Type::I32, values.clone()),
        scopes: vec![HashMap::new()],
    };

    let assigned = assigned_names(body);
    for ((ident, _), value) in params.iter().zip(values) {
        let storage = if assigned.contains(&*ident.name) {
            let slot = gen.b.alloca_entry(value.ty.clone(), &format!("{}.addr", ident.name));
            gen.b.store(value, slot.clone());
            Storage::Slot(slot)
        } else {
            Storage::Param(value)
        };
        gen.define(&ident.name, storage, None);
    }

    gen.block(body)?;
    if !gen.b.is_terminated() {
        gen.b.ret(Value::i32(0));
    }

    let function = gen.b.finish();
    debug!(name, blocks = function.blocks.len(), "generated function");
    Ok(function)
}

/// Where a name's value lives.
#[derive(Clone, Debug)]
enum Storage {
    /// An incoming parameter that is never reassigned, used directly.
    Param(Value),
    /// A stack slot holding a value of the pointee type. Lists are slots of
    /// `[N x i32]*`, so assigning one name to another shares the array.
    Slot(Value),
}

#[derive(Clone, Debug)]
struct Variable {
    storage: Storage,
    /// Statically known element or character count.
    length: Option<usize>,
}

struct FunctionGen<'cx> {
    cx: &'cx mut CompilationContext,
    b: FunctionBuilder,
    scopes: Vec<HashMap<Box<str>, Variable>>,
}

impl FunctionGen<'_> {
    /// Emits statements in order. Anything after a terminator is unreachable
    /// and skipped.
    fn block(&mut self, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            if self.b.is_terminated() {
                break;
            }
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn scoped_block(&mut self, body: &[Stmt]) -> Result<()> {
        self.scopes.push(HashMap::new());
        let result = self.block(body);
        self.scopes.pop();
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                let [target] = targets.as_slice() else {
                    return Err(stmt.span.wrap(Error::Unsupported("multiple assignment targets")));
                };
                self.assign(target, value)
            }
            StmtKind::FunctionDef { name, args, body } => self.function_def(name, args, body),
            StmtKind::If { test, body, orelse } => self.if_stmt(test, body, orelse),
            StmtKind::While { test, body, orelse } => {
                if !orelse.is_empty() {
                    return Err(stmt.span.wrap(Error::Unsupported("`else` on a `while` loop")));
                }
                self.while_stmt(test, body)
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => self.for_stmt(target, iter, body, orelse),
            StmtKind::Return { value } => {
                let result = self.expr(value)?;
                let result = self.coerce(result, &Type::I32, value.span)?;
                self.b.ret(result);
                Ok(())
            }
            StmtKind::Expr { value } => {
                if let ExprKind::Call { func, args } = &value.kind {
                    self.call(func, args, value.span)?;
                } else {
                    self.expr(value)?;
                }
                Ok(())
            }
        }
    }

    fn function_def(&mut self, name: &Ident, args: &[Arg], body: &[Stmt]) -> Result<()> {
        let params: Vec<_> = args
            .iter()
            .map(|arg| (&arg.name, param_type(arg.annotation)))
            .collect();
        let signature = Signature {
            params: params.iter().map(|(_, ty)| ty.clone()).collect(),
            ret: Type::I32,
        };
        self.cx.declare(name, signature)?;
        let function = compile(self.cx, &name.name, &params, body)?;
        self.cx.module.functions.push(function);
        Ok(())
    }

    fn assign(&mut self, target: &Expr, value: &Expr) -> Result<()> {
        match &target.kind {
            ExprKind::Name { id } => match self.lookup(id).cloned() {
                Some(variable) => self.reassign(id, variable, value),
                None => self.define_from(id, value),
            },
            ExprKind::Subscript { value: base, slice } => {
                let new = self.expr(value)?;
                let (ptr, element) = self.element_ptr(base, slice)?;
                let new = if element == Type::I8 && new.ty == Type::I32 {
                    self.b.cast(CastOp::Trunc, new, Type::I8, "trunc")
                } else {
                    self.coerce(new, &element, value.span)?
                };
                self.b.store(new, ptr);
                Ok(())
            }
            _ => Err(target.span.wrap(Error::Unsupported("assignment to this target"))),
        }
    }

    /// First assignment to `name`. The storage is allocated in the entry
    /// block; the value is stored here.
    fn define_from(&mut self, name: &str, value: &Expr) -> Result<()> {
        let length = self.static_length(value);
        // Strings are kept decayed, so every string slot is `i8*`.
        let computed = match &value.kind {
            ExprKind::Constant {
                value: Constant::Str(s),
            } => self.string_ptr(s),
            _ => self.expr(value)?,
        };
        let ptr = self.b.alloca_entry(computed.ty.clone(), name);
        self.b.store(computed, ptr.clone());
        self.define(name, Storage::Slot(ptr), length);
        Ok(())
    }

    /// Stores into the existing slot of `name`. The new value must have the
    /// machine type of the old one. For lists this rebinds the name; the array
    /// it pointed to is left untouched.
    fn reassign(&mut self, name: &str, variable: Variable, value: &Expr) -> Result<()> {
        match variable.storage {
            Storage::Slot(ptr) => {
                let length = self.static_length(value);
                let new = match &value.kind {
                    ExprKind::Constant {
                        value: Constant::Str(s),
                    } => self.string_ptr(s),
                    _ => self.expr(value)?,
                };
                let stored = ptr.ty.pointee().cloned().unwrap_or(Type::Void);
                if new.ty != stored {
                    let error = Error::TypeMismatch {
                        expected: stored,
                        actual: new.ty,
                    };
                    return Err(value.span.wrap(error));
                }
                self.b.store(new, ptr);
                self.set_length(name, length);
                Ok(())
            }
            Storage::Param(_) => Err(value
                .span
                .wrap(Error::Unsupported("assignment to an unspilled parameter"))),
        }
    }

    /// Evaluates every element before storing any.
    fn store_elements(&mut self, array: &Value, elts: &[Expr]) -> Result<()> {
        let mut values = Vec::with_capacity(elts.len());
        for elt in elts {
            let value = self.expr(elt)?;
            values.push(self.coerce(value, &Type::I32, elt.span)?);
        }
        for (i, value) in values.into_iter().enumerate() {
            let slot = self.b.gep(array.clone(), vec![Value::i32(0), index(i)], "elem");
            self.b.store(value, slot);
        }
        Ok(())
    }

    fn if_stmt(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> Result<()> {
        let cond = self.expr(test)?;
        let cond = self.truthy(cond, test.span)?;

        let then_block = self.b.append_block("then");
        let else_block = self.b.append_block("else");
        let merge = self.b.append_block("merge");
        self.b.cond_br(cond, then_block, else_block);

        self.b.position_at_end(then_block);
        self.scoped_block(body)?;
        if !self.b.is_terminated() {
            self.b.br(merge);
        }

        self.b.position_at_end(else_block);
        self.scoped_block(orelse)?;
        if !self.b.is_terminated() {
            self.b.br(merge);
        }

        self.b.position_at_end(merge);
        Ok(())
    }

    fn while_stmt(&mut self, test: &Expr, body: &[Stmt]) -> Result<()> {
        let test_block = self.b.append_block("while.test");
        let body_block = self.b.append_block("while.body");
        let end = self.b.append_block("while.end");
        self.b.br(test_block);

        self.b.position_at_end(test_block);
        let cond = self.expr(test)?;
        let cond = self.truthy(cond, test.span)?;
        self.b.cond_br(cond, body_block, end);

        self.b.position_at_end(body_block);
        self.scoped_block(body)?;
        if !self.b.is_terminated() {
            self.b.br(test_block);
        }

        self.b.position_at_end(end);
        Ok(())
    }

    fn for_stmt(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> Result<()> {
        let args = match &iter.kind {
            ExprKind::Call { func, args } if &*func.name == builtins::RANGE => args,
            _ => {
                let error = Error::Unsupported("iteration over anything but `range`");
                return Err(iter.span.wrap(error));
            }
        };
        if !(1..=3).contains(&args.len()) {
            return Err(iter.span.wrap(Error::RangeArity(args.len())));
        }
        let mut bounds = Vec::with_capacity(3);
        for arg in args {
            let bound = self.expr(arg)?;
            bounds.push(self.coerce(bound, &Type::I32, arg.span)?);
        }
        let (start, stop, step) = match <[Value; 3]>::try_from(bounds) {
            Ok([start, stop, step]) => (start, stop, step),
            Err(bounds) => match <[Value; 2]>::try_from(bounds) {
                Ok([start, stop]) => (start, stop, Value::i32(1)),
                Err(mut bounds) => (Value::i32(0), bounds.remove(0), Value::i32(1)),
            },
        };

        let Some(name) = target.as_name() else {
            return Err(target.span.wrap(Error::Unsupported("loop targets other than a name")));
        };
        let counter = match self.storage_of(name) {
            Some(Storage::Slot(ptr)) if ptr.ty.pointee() == Some(&Type::I32) => ptr.clone(),
            Some(Storage::Slot(ptr) | Storage::Param(ptr)) => {
                let error = Error::TypeMismatch {
                    expected: Type::I32.pointer(),
                    actual: ptr.ty.clone(),
                };
                return Err(target.span.wrap(error));
            }
            None => {
                let ptr = self.b.alloca_entry(Type::I32, name);
                self.define(name, Storage::Slot(ptr.clone()), None);
                ptr
            }
        };
        self.b.store(start, counter.clone());

        let test_block = self.b.append_block("for.test");
        let body_block = self.b.append_block("for.body");
        let end = self.b.append_block("for.end");
        self.b.br(test_block);

        self.b.position_at_end(test_block);
        let current = self.b.load(counter.clone(), name);
        let cond = self.b.icmp(IntPredicate::Slt, current, stop, "cmp");
        self.b.cond_br(cond, body_block, end);

        self.b.position_at_end(body_block);
        self.scoped_block(body)?;
        if !self.b.is_terminated() {
            let current = self.b.load(counter.clone(), name);
            let next = self.b.binary(BinaryOp::Add, current, step, "next");
            self.b.store(next, counter);
            self.b.br(test_block);
        }

        self.b.position_at_end(end);
        self.scoped_block(orelse)
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Constant { value } => Ok(match value {
                Constant::Int(n) => Value::i32(*n),
                Constant::Bool(b) => Value::bool(*b),
                Constant::Str(s) => self.cx.string(s),
            }),
            ExprKind::Name { id } => match self.storage_of(id).cloned() {
                Some(Storage::Param(value)) => Ok(value),
                Some(Storage::Slot(ptr)) => Ok(self.b.load(ptr, id)),
                None => Err(expr.span.wrap(Error::UndefinedVariable(id.clone()))),
            },
            ExprKind::BinOp { left, op, right } => self.binop(left, *op, right),
            ExprKind::BoolOp { op, values } => self.boolop(*op, values, expr.span),
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let ([op], [right]) = (ops.as_slice(), comparators.as_slice()) else {
                    return Err(expr.span.wrap(Error::Unsupported("chained comparisons")));
                };
                self.compare(left, *op, right)
            }
            ExprKind::UnaryOp { op, operand } => match op {
                UnaryOperator::USub => {
                    let value = self.expr(operand)?;
                    let value = self.coerce(value, &Type::I32, operand.span)?;
                    Ok(self.b.binary(BinaryOp::Sub, Value::i32(0), value, "neg"))
                }
                UnaryOperator::UAdd => Err(expr.span.wrap(Error::Unsupported("unary `+`"))),
                UnaryOperator::Not => Err(expr.span.wrap(Error::Unsupported("`not`"))),
            },
            // Fresh storage on every evaluation.
            ExprKind::List { elts } => {
                let array = self.b.alloca(Type::array(elts.len(), Type::I32), "list");
                self.store_elements(&array, elts)?;
                Ok(array)
            }
            ExprKind::Subscript { value, slice } => {
                let (ptr, _) = self.element_ptr(value, slice)?;
                Ok(self.b.load(ptr, "item"))
            }
            ExprKind::Call { func, args } => match self.call(func, args, expr.span)? {
                Some(value) => Ok(value),
                None => Err(expr.span.wrap(Error::Unsupported("using the result of `print`"))),
            },
        }
    }

    fn binop(&mut self, left: &Expr, op: BinaryOperator, right: &Expr) -> Result<Value> {
        let (op, hint) = match op {
            BinaryOperator::Add => (BinaryOp::Add, "add"),
            BinaryOperator::Sub => (BinaryOp::Sub, "sub"),
            BinaryOperator::Mult => (BinaryOp::Mul, "mul"),
            BinaryOperator::FloorDiv => (BinaryOp::SDiv, "div"),
            BinaryOperator::Mod => (BinaryOp::URem, "rem"),
            BinaryOperator::Div => {
                let span = left.span.to(right.span);
                return Err(span.wrap(Error::Unsupported("true division")));
            }
        };
        let lhs = self.expr(left)?;
        let rhs = self.expr(right)?;
        let (lhs, rhs) = self.unify(lhs, left.span, rhs, right.span)?;
        Ok(self.b.binary(op, lhs, rhs, hint))
    }

    /// Every operand is evaluated; the results are folded left to right.
    fn boolop(&mut self, op: BoolOperator, values: &[Expr], span: Span) -> Result<Value> {
        let (op, hint) = match op {
            BoolOperator::And => (BinaryOp::And, "and"),
            BoolOperator::Or => (BinaryOp::Or, "or"),
        };
        let mut folded = None;
        for operand in values {
            let value = self.expr(operand)?;
            let value = self.truthy(value, operand.span)?;
            folded = Some(match folded {
                None => value,
                Some(acc) => self.b.binary(op, acc, value, hint),
            });
        }
        folded.ok_or_else(|| span.wrap(Error::Unsupported("empty boolean operations")))
    }

    /// Signedness follows the left operand: characters compare unsigned,
    /// integers signed.
    fn compare(&mut self, left: &Expr, op: CmpOperator, right: &Expr) -> Result<Value> {
        let lhs = self.expr(left)?;
        let signed = match lhs.ty {
            Type::Int(32) => true,
            Type::Int(8) => false,
            _ => return Err(left.span.wrap(Error::UnsupportedComparison(lhs.ty))),
        };
        let rhs = self.expr(right)?;
        let (lhs, rhs) = self.unify(lhs, left.span, rhs, right.span)?;
        let predicate = match (op, signed) {
            (CmpOperator::Eq, _) => IntPredicate::Eq,
            (CmpOperator::NotEq, _) => IntPredicate::Ne,
            (CmpOperator::Lt, true) => IntPredicate::Slt,
            (CmpOperator::LtE, true) => IntPredicate::Sle,
            (CmpOperator::Gt, true) => IntPredicate::Sgt,
            (CmpOperator::GtE, true) => IntPredicate::Sge,
            (CmpOperator::Lt, false) => IntPredicate::Ult,
            (CmpOperator::LtE, false) => IntPredicate::Ule,
            (CmpOperator::Gt, false) => IntPredicate::Ugt,
            (CmpOperator::GtE, false) => IntPredicate::Uge,
        };
        Ok(self.b.icmp(predicate, lhs, rhs, "cmp"))
    }

    /// Returns `None` for calls without a value.
    fn call(&mut self, func: &Ident, args: &[Expr], span: Span) -> Result<Option<Value>> {
        match &*func.name {
            builtins::PRINT => self.print(args, span).map(|()| None),
            builtins::LEN => self.len(args, span).map(Some),
            builtins::RANGE => Err(span.wrap(Error::Unsupported("`range` outside of a `for` loop"))),
            name => {
                let Some(signature) = self.cx.signature(name).cloned() else {
                    return Err(func.span.wrap(Error::UndefinedFunction(name.into())));
                };
                if args.len() != signature.params.len() {
                    let error = Error::ArgumentCount {
                        name: name.into(),
                        expected: signature.params.len(),
                        actual: args.len(),
                    };
                    return Err(span.wrap(error));
                }
                let mut values = Vec::with_capacity(args.len());
                for (arg, ty) in args.iter().zip(&signature.params) {
                    let value = self.expr(arg)?;
                    values.push(self.coerce(value, ty, arg.span)?);
                }
                Ok(self.b.call(name, signature.ret, values, "call"))
            }
        }
    }

    fn print(&mut self, args: &[Expr], span: Span) -> Result<()> {
        let [arg] = args else {
            let error = Error::ArgumentCount {
                name: builtins::PRINT.into(),
                expected: 1,
                actual: args.len(),
            };
            return Err(span.wrap(error));
        };
        let value = self.expr(arg)?;
        let is_string_array = value
            .ty
            .as_array_pointer()
            .is_some_and(|(_, element)| *element == Type::I8);
        let (callee, value) = if is_string_array {
            (builtins::PRINT_STR, self.decay(value))
        } else if value.ty == Type::str_ptr() {
            (builtins::PRINT_STR, value)
        } else {
            match value.ty {
                Type::Int(32) => (builtins::PRINT_I32, value),
                Type::Int(1 | 8) => (builtins::PRINT_I32, self.widen(value)),
                _ => return Err(arg.span.wrap(Error::NotPrintable(value.ty))),
            }
        };
        self.b.call(callee, Type::Void, vec![value], "");
        Ok(())
    }

    /// Resolved at compile time; the argument is never evaluated.
    fn len(&mut self, args: &[Expr], span: Span) -> Result<Value> {
        let [arg] = args else {
            let error = Error::ArgumentCount {
                name: builtins::LEN.into(),
                expected: 1,
                actual: args.len(),
            };
            return Err(span.wrap(error));
        };
        let length = match &arg.kind {
            ExprKind::Name { id } => {
                let Some(variable) = self.lookup(id) else {
                    return Err(arg.span.wrap(Error::UndefinedVariable(id.clone())));
                };
                variable
                    .length
                    .ok_or_else(|| arg.span.wrap(Error::UnknownLength(id.clone())))?
            }
            ExprKind::Constant {
                value: Constant::Str(_),
            }
            | ExprKind::List { .. } => self.static_length(arg).unwrap_or_default(),
            _ => return Err(arg.span.wrap(Error::Unsupported("`len` of an arbitrary expression"))),
        };
        Ok(index(length))
    }

    /// Address of `base[index]`, with the element type. Arrays are indexed
    /// through a leading zero; raw pointers directly.
    fn element_ptr(&mut self, base: &Expr, index: &Expr) -> Result<(Value, Type)> {
        let base_value = self.expr(base)?;
        let offset = self.expr(index)?;
        let offset = self.coerce(offset, &Type::I32, index.span)?;

        if let Some((_, element)) = base_value.ty.as_array_pointer() {
            let element = element.clone();
            let ptr = self.b.gep(base_value, vec![Value::i32(0), offset], "elem");
            return Ok((ptr, element));
        }
        match base_value.ty.pointee() {
            Some(element @ Type::Int(_)) => {
                let element = element.clone();
                Ok((self.b.gep(base_value, vec![offset], "elem"), element))
            }
            _ => Err(base.span.wrap(Error::NotIndexable(base_value.ty))),
        }
    }
}

/// Utility functions.
impl FunctionGen<'_> {
    fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn storage_of(&self, name: &str) -> Option<&Storage> {
        self.lookup(name).map(|variable| &variable.storage)
    }

    fn define(&mut self, name: &str, storage: Storage, length: Option<usize>) {
        let scope = self.scopes.last_mut().expect("function scope is never popped");
        scope.insert(name.into(), Variable { storage, length });
    }

    fn set_length(&mut self, name: &str, length: Option<usize>) {
        let variable = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name));
        if let Some(variable) = variable {
            variable.length = length;
        }
    }

    fn static_length(&self, expr: &Expr) -> Option<usize> {
        match &expr.kind {
            ExprKind::Constant {
                value: Constant::Str(s),
            } => Some(s.chars().count()),
            ExprKind::List { elts } => Some(elts.len()),
            ExprKind::Name { id } => self.lookup(id)?.length,
            _ => None,
        }
    }

    /// A new string constant, decayed to `i8*`.
    fn string_ptr(&mut self, contents: &str) -> Value {
        let global = self.cx.string(contents);
        self.decay(global)
    }

    /// Pointer to the first element of an array.
    fn decay(&mut self, array: Value) -> Value {
        self.b
            .gep(array, vec![Value::i32(0), Value::i32(0)], "decay")
    }

    fn widen(&mut self, value: Value) -> Value {
        self.b.cast(CastOp::ZExt, value, Type::I32, "ext")
    }

    /// Converts to `i1`, comparing integers against zero.
    fn truthy(&mut self, value: Value, span: Span) -> Result<Value> {
        match value.ty {
            Type::Int(1) => Ok(value),
            Type::Int(_) => {
                let zero = Value::const_int(value.ty.clone(), 0);
                Ok(self.b.icmp(IntPredicate::Ne, value, zero, "tobool"))
            }
            _ => Err(span.wrap(Error::TypeMismatch {
                expected: Type::I1,
                actual: value.ty,
            })),
        }
    }

    /// Makes `value` fit a slot of type `to`: narrower integers are zero
    /// extended, arrays decay to a pointer to their first element.
    fn coerce(&mut self, value: Value, to: &Type, span: Span) -> Result<Value> {
        if value.ty == *to {
            return Ok(value);
        }
        let widens = matches!(
            (&value.ty, to),
            (Type::Int(from), Type::Int(bits)) if from < bits
        );
        let decays = matches!(
            (value.ty.as_array_pointer(), to.pointee()),
            (Some((_, element)), Some(target)) if element == target
        );
        if widens {
            Ok(self.b.cast(CastOp::ZExt, value, to.clone(), "ext"))
        } else if decays {
            Ok(self.decay(value))
        } else {
            Err(span.wrap(Error::TypeMismatch {
                expected: to.clone(),
                actual: value.ty,
            }))
        }
    }

    /// Brings two integer operands to the wider of their widths.
    fn unify(
        &mut self,
        lhs: Value,
        lhs_span: Span,
        rhs: Value,
        rhs_span: Span,
    ) -> Result<(Value, Value)> {
        let (Some(l), Some(r)) = (lhs.ty.int_width(), rhs.ty.int_width()) else {
            let (value, span) = if lhs.ty.is_int() {
                (rhs, rhs_span)
            } else {
                (lhs, lhs_span)
            };
            return Err(span.wrap(Error::TypeMismatch {
                expected: Type::I32,
                actual: value.ty,
            }));
        };
        let width = Type::Int(l.max(r));
        let lhs = self.coerce(lhs, &width, lhs_span)?;
        let rhs = self.coerce(rhs, &width, rhs_span)?;
        Ok((lhs, rhs))
    }
}

fn param_type(annotation: Option<DataType>) -> Type {
    match annotation {
        Some(DataType::Bool) => Type::I1,
        Some(DataType::Char) => Type::I8,
        Some(DataType::Str) => Type::str_ptr(),
        Some(DataType::List) => Type::I32.pointer(),
        Some(DataType::Int | DataType::Unknown) | None => Type::I32,
    }
}

fn index(i: usize) -> Value {
    Value::i32(i32::try_from(i).expect("index fits in i32"))
}

/// Names assigned anywhere in a function body, nested functions excluded.
fn assigned_names(body: &[Stmt]) -> HashSet<&str> {
    fn collect<'a>(body: &'a [Stmt], names: &mut HashSet<&'a str>) {
        for stmt in body {
            match &stmt.kind {
                StmtKind::Assign { targets, .. } => {
                    names.extend(targets.iter().filter_map(Expr::as_name));
                }
                StmtKind::For {
                    target,
                    body,
                    orelse,
                    ..
                } => {
                    names.extend(target.as_name());
                    collect(body, names);
                    collect(orelse, names);
                }
                StmtKind::If { body, orelse, .. } | StmtKind::While { body, orelse, .. } => {
                    collect(body, names);
                    collect(orelse, names);
                }
                StmtKind::FunctionDef { .. } | StmtKind::Return { .. } | StmtKind::Expr { .. } => {}
            }
        }
    }

    let mut names = HashSet::new();
    collect(body, &mut names);
    names
}
