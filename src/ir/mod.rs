//! A minimal typed IR, printed as LLVM-style textual assembly.

use std::fmt;

mod builder;
mod instr;
mod types;

pub use builder::{BlockId, FunctionBuilder};
pub use instr::{BinaryOp, CastOp, Instruction, IntPredicate};
pub use types::{Type, Value, ValueKind};

#[derive(Debug, PartialEq, Eq)]
pub struct Module {
    pub name: Box<str>,
    pub globals: Vec<Global>,
    pub declarations: Vec<Declaration>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: &str) -> Module {
        Module {
            name: name.into(),
            globals: Vec::new(),
            declarations: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| &*f.name == name)
    }

    /// Adds a NUL-terminated constant byte array, returning a pointer to it.
    pub fn add_string(&mut self, name: Box<str>, contents: &str) -> Value {
        let mut bytes = contents.as_bytes().to_vec();
        bytes.push(0);
        let ty = Type::array(bytes.len(), Type::I8);
        let value = Value::global(ty.clone().pointer(), name.clone());
        self.globals.push(Global {
            name,
            ty,
            bytes: bytes.into(),
        });
        value
    }
}

/// A private constant byte array.
#[derive(Debug, PartialEq, Eq)]
pub struct Global {
    pub name: Box<str>,
    pub ty: Type,
    pub bytes: Box<[u8]>,
}

/// An external function, provided by the runtime.
#[derive(Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: Box<str>,
    pub ret: Type,
    pub params: Vec<Type>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Function {
    pub name: Box<str>,
    pub ret: Type,
    pub params: Vec<Value>,
    /// The first block is the entry block.
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn block(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| &*b.label == label)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| &b.instructions)
    }

    /// Returns the names of all functions called directly from this one.
    pub fn callees(&self) -> impl Iterator<Item = &str> {
        self.instructions().filter_map(|i| match i {
            Instruction::Call { callee, .. } => Some(&**callee),
            _ => None,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    pub label: Box<str>,
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", self.name)?;

        if !self.globals.is_empty() {
            writeln!(f)?;
        }
        for global in &self.globals {
            writeln!(f, "{global}")?;
        }

        if !self.declarations.is_empty() {
            writeln!(f)?;
        }
        for declaration in &self.declarations {
            writeln!(f, "{declaration}")?;
        }

        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{} = private unnamed_addr constant {} c\"",
            self.name, self.ty
        )?;
        for &byte in &*self.bytes {
            if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
                write!(f, "{}", char::from(byte))?;
            } else {
                write!(f, "\\{byte:02X}")?;
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "declare {} @{}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "define {} @{}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.typed())?;
        }
        writeln!(f, ") {{")?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for instruction in &block.instructions {
                writeln!(f, "  {instruction}")?;
            }
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_escapes() {
        let mut module = Module::new("m");
        let value = module.add_string("str_0".into(), "a \"b\"\\n");
        assert_eq!(value.ty, Type::array(8, Type::I8).pointer());
        assert_eq!(
            module.globals[0].to_string(),
            r#"@str_0 = private unnamed_addr constant [8 x i8] c"a \22b\22\5Cn\00""#
        );
    }

    #[test]
    fn test_module_display() {
        let mut module = Module::new("demo.py");
        module.declarations.push(Declaration {
            name: "print_i32".into(),
            ret: Type::Void,
            params: vec![Type::I32],
        });

        let n = Value::local(Type::I32, "n");
        let mut b = FunctionBuilder::new("twice", Type::I32, vec![n.clone()]);
        let doubled = b.binary(BinaryOp::Mul, n, Value::i32(2), "mul");
        b.ret(doubled);
        module.functions.push(b.finish());

        assert_eq!(
            module.to_string(),
            indoc! {"
                ; ModuleID = 'demo.py'
                source_filename = \"demo.py\"

                declare void @print_i32(i32)

                define i32 @twice(i32 %n) {
                entry:
                  %mul = mul i32 %n, 2
                  ret i32 %mul
                }
            "}
        );
    }
}
