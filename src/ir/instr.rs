use std::fmt;

use crate::ir::{Type, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Alloca {
        result: Box<str>,
        ty: Type,
    },
    Store {
        value: Value,
        ptr: Value,
    },
    Load {
        result: Box<str>,
        ty: Type,
        ptr: Value,
    },
    /// `getelementptr inbounds`. The first index steps over `ptr` itself,
    /// the following ones into the pointee.
    Gep {
        result: Box<str>,
        ptr: Value,
        indices: Vec<Value>,
    },
    Binary {
        result: Box<str>,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    },
    Icmp {
        result: Box<str>,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    },
    Cast {
        result: Box<str>,
        op: CastOp,
        value: Value,
        to: Type,
    },
    Call {
        result: Option<Box<str>>,
        ret: Type,
        callee: Box<str>,
        args: Vec<Value>,
    },
    Br {
        dest: Box<str>,
    },
    CondBr {
        cond: Value,
        then_dest: Box<str>,
        else_dest: Box<str>,
    },
    Ret {
        value: Option<Value>,
    },
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    URem,
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CastOp {
    ZExt,
    Trunc,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::URem => "urem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        })
    }
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        })
    }
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CastOp::ZExt => "zext",
            CastOp::Trunc => "trunc",
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { result, ty } => write!(f, "%{result} = alloca {ty}"),
            Instruction::Store { value, ptr } => {
                write!(f, "store {}, {}", value.typed(), ptr.typed())
            }
            Instruction::Load { result, ty, ptr } => {
                write!(f, "%{result} = load {ty}, {}", ptr.typed())
            }
            Instruction::Gep {
                result,
                ptr,
                indices,
            } => {
                let pointee = ptr.ty.pointee().unwrap_or(&Type::Void);
                write!(
                    f,
                    "%{result} = getelementptr inbounds {pointee}, {}",
                    ptr.typed()
                )?;
                for index in indices {
                    write!(f, ", {}", index.typed())?;
                }
                Ok(())
            }
            Instruction::Binary {
                result,
                op,
                lhs,
                rhs,
            } => write!(f, "%{result} = {op} {}, {rhs}", lhs.typed()),
            Instruction::Icmp {
                result,
                predicate,
                lhs,
                rhs,
            } => write!(f, "%{result} = icmp {predicate} {}, {rhs}", lhs.typed()),
            Instruction::Cast {
                result,
                op,
                value,
                to,
            } => write!(f, "%{result} = {op} {} to {to}", value.typed()),
            Instruction::Call {
                result,
                ret,
                callee,
                args,
            } => {
                if let Some(result) = result {
                    write!(f, "%{result} = ")?;
                }
                write!(f, "call {ret} @{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg.typed())?;
                }
                f.write_str(")")
            }
            Instruction::Br { dest } => write!(f, "br label %{dest}"),
            Instruction::CondBr {
                cond,
                then_dest,
                else_dest,
            } => write!(
                f,
                "br {}, label %{then_dest}, label %{else_dest}",
                cond.typed()
            ),
            Instruction::Ret { value: Some(value) } => write!(f, "ret {}", value.typed()),
            Instruction::Ret { value: None } => f.write_str("ret void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_instruction_display() {
        let array = Value::local(Type::array(3, Type::I32).pointer(), "a");
        let cases = [
            (
                Instruction::Alloca {
                    result: "x".into(),
                    ty: Type::I32,
                },
                "%x = alloca i32",
            ),
            (
                Instruction::Store {
                    value: Value::i32(1),
                    ptr: Value::local(Type::I32.pointer(), "x"),
                },
                "store i32 1, i32* %x",
            ),
            (
                Instruction::Gep {
                    result: "elem".into(),
                    ptr: array,
                    indices: vec![Value::i32(0), Value::i32(2)],
                },
                "%elem = getelementptr inbounds [3 x i32], [3 x i32]* %a, i32 0, i32 2",
            ),
            (
                Instruction::Icmp {
                    result: "cmp".into(),
                    predicate: IntPredicate::Ugt,
                    lhs: Value::local(Type::I8, "c"),
                    rhs: Value::const_int(Type::I8, 100),
                },
                "%cmp = icmp ugt i8 %c, 100",
            ),
            (
                Instruction::Cast {
                    result: "ext".into(),
                    op: CastOp::ZExt,
                    value: Value::bool(false),
                    to: Type::I32,
                },
                "%ext = zext i1 false to i32",
            ),
            (
                Instruction::Call {
                    result: None,
                    ret: Type::Void,
                    callee: "print_i32".into(),
                    args: vec![Value::i32(7)],
                },
                "call void @print_i32(i32 7)",
            ),
            (
                Instruction::CondBr {
                    cond: Value::local(Type::I1, "cmp"),
                    then_dest: "then".into(),
                    else_dest: "else".into(),
                },
                "br i1 %cmp, label %then, label %else",
            ),
            (Instruction::Ret { value: None }, "ret void"),
        ];
        for (instruction, expected) in cases {
            assert_eq!(instruction.to_string(), expected);
        }
    }
}
