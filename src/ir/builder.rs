use std::collections::HashMap;

use tracing::trace;

use crate::ir::{
    BinaryOp, Block, CastOp, Function, Instruction, IntPredicate, Type, Value, ValueKind,
};

/// Index of a block within the function being built.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockId(usize);

/// Appends instructions to one function, block by block.
///
/// Local names are derived from the hints passed to each method and made
/// unique within the function by suffixing a counter (`then`, `then.1`, ...).
/// Labels and values share the same namespace.
pub struct FunctionBuilder {
    function: Function,
    current: usize,
    /// Number of allocas placed at the head of the entry block.
    entry_allocas: usize,
    names: NameGen,
}

impl FunctionBuilder {
    /// Starts a function whose parameters are the given named locals. The
    /// builder is positioned at the end of the entry block.
    pub fn new(name: &str, ret: Type, params: Vec<Value>) -> FunctionBuilder {
        let mut names = NameGen::default();
        for param in &params {
            if let ValueKind::Local(name) = &param.kind {
                names.reserve(name);
            }
        }
        let entry = Block {
            label: names.fresh("entry"),
            instructions: Vec::with_capacity(16),
        };
        FunctionBuilder {
            function: Function {
                name: name.into(),
                ret,
                params,
                blocks: vec![entry],
            },
            current: 0,
            entry_allocas: 0,
            names,
        }
    }

    pub fn finish(self) -> Function {
        self.function
    }

    /// Appends a new empty block. The insertion point is left unchanged.
    pub fn append_block(&mut self, hint: &str) -> BlockId {
        let label = self.names.fresh(hint);
        trace!(function = &*self.function.name, label = &*label, "new block");
        self.function.blocks.push(Block {
            label,
            instructions: Vec::new(),
        });
        BlockId(self.function.blocks.len() - 1)
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current = block.0;
    }

    pub fn label(&self, block: BlockId) -> &str {
        &self.function.blocks[block.0].label
    }

    /// Whether the current block already ends with a terminator.
    pub fn is_terminated(&self) -> bool {
        self.function.blocks[self.current].terminator().is_some()
    }

    /// Allocates storage at the head of the entry block, so that it
    /// dominates every use in the function.
    pub fn alloca_entry(&mut self, ty: Type, hint: &str) -> Value {
        let result = self.names.fresh(hint);
        let ptr = Value::local(ty.clone().pointer(), result.clone());
        let entry = &mut self.function.blocks[0].instructions;
        entry.insert(self.entry_allocas, Instruction::Alloca { result, ty });
        self.entry_allocas += 1;
        ptr
    }

    /// Allocates storage at the current position.
    pub fn alloca(&mut self, ty: Type, hint: &str) -> Value {
        let result = self.names.fresh(hint);
        let ptr = Value::local(ty.clone().pointer(), result.clone());
        self.push(Instruction::Alloca { result, ty });
        ptr
    }

    pub fn store(&mut self, value: Value, ptr: Value) {
        debug_assert_eq!(ptr.ty.pointee(), Some(&value.ty), "store type mismatch");
        self.push(Instruction::Store { value, ptr });
    }

    pub fn load(&mut self, ptr: Value, hint: &str) -> Value {
        let ty = ptr.ty.pointee().cloned().unwrap_or(Type::Void);
        let result = self.names.fresh(hint);
        let value = Value::local(ty.clone(), result.clone());
        self.push(Instruction::Load { result, ty, ptr });
        value
    }

    /// Computes an element address. The first index steps over `ptr`, any
    /// following one indexes into an array.
    pub fn gep(&mut self, ptr: Value, indices: Vec<Value>, hint: &str) -> Value {
        let mut ty = ptr.ty.pointee().cloned().unwrap_or(Type::Void);
        for _ in indices.iter().skip(1) {
            if let Type::Array(_, element) = ty {
                ty = *element;
            }
        }
        let result = self.names.fresh(hint);
        let value = Value::local(ty.pointer(), result.clone());
        self.push(Instruction::Gep {
            result,
            ptr,
            indices,
        });
        value
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, hint: &str) -> Value {
        debug_assert_eq!(lhs.ty, rhs.ty, "{op} operands differ in type");
        let result = self.names.fresh(hint);
        let value = Value::local(lhs.ty.clone(), result.clone());
        self.push(Instruction::Binary {
            result,
            op,
            lhs,
            rhs,
        });
        value
    }

    pub fn icmp(&mut self, predicate: IntPredicate, lhs: Value, rhs: Value, hint: &str) -> Value {
        debug_assert_eq!(lhs.ty, rhs.ty, "icmp operands differ in type");
        let result = self.names.fresh(hint);
        let value = Value::local(Type::I1, result.clone());
        self.push(Instruction::Icmp {
            result,
            predicate,
            lhs,
            rhs,
        });
        value
    }

    pub fn cast(&mut self, op: CastOp, value: Value, to: Type, hint: &str) -> Value {
        let result = self.names.fresh(hint);
        let cast = Value::local(to.clone(), result.clone());
        self.push(Instruction::Cast {
            result,
            op,
            value,
            to,
        });
        cast
    }

    /// Emits a direct call. Returns `None` for `void` callees.
    pub fn call(&mut self, callee: &str, ret: Type, args: Vec<Value>, hint: &str) -> Option<Value> {
        let (result, value) = if ret == Type::Void {
            (None, None)
        } else {
            let result = self.names.fresh(hint);
            let value = Value::local(ret.clone(), result.clone());
            (Some(result), Some(value))
        };
        self.push(Instruction::Call {
            result,
            ret,
            callee: callee.into(),
            args,
        });
        value
    }

    pub fn br(&mut self, dest: BlockId) {
        let dest = self.function.blocks[dest.0].label.clone();
        self.push(Instruction::Br { dest });
    }

    pub fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        let then_dest = self.function.blocks[then_block.0].label.clone();
        let else_dest = self.function.blocks[else_block.0].label.clone();
        self.push(Instruction::CondBr {
            cond,
            then_dest,
            else_dest,
        });
    }

    pub fn ret(&mut self, value: Value) {
        self.push(Instruction::Ret { value: Some(value) });
    }

    fn push(&mut self, instruction: Instruction) {
        debug_assert!(!self.is_terminated(), "emitting after a terminator");
        self.function.blocks[self.current]
            .instructions
            .push(instruction);
    }
}

#[derive(Default)]
struct NameGen {
    used: HashMap<Box<str>, usize>,
}

impl NameGen {
    fn reserve(&mut self, name: &str) {
        self.used.entry(name.into()).or_insert(0);
    }

    /// Returns `hint` the first time, then `hint.1`, `hint.2`, ...
    fn fresh(&mut self, hint: &str) -> Box<str> {
        match self.used.get_mut(hint) {
            None => {
                self.used.insert(hint.into(), 0);
                hint.into()
            }
            Some(count) => {
                *count += 1;
                format!("{hint}.{count}").into()
            }
        }
    }
}
