use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast,
    ir::{self, Declaration, Type, Value},
    token::Spanned,
    types::builtins,
};

mod function;

#[cfg(test)]
mod tests;

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Name of the implicit function holding the module-level statements.
pub const MAIN: &str = "main";

/// Lowers a parsed module to IR.
///
/// Module-level statements make up `main`, which is always the first function
/// of the result. Every `def` becomes a function of its own, emitted once its
/// body is complete, so a nested definition precedes the one enclosing it.
pub fn generate(module: &ast::Module, name: &str) -> Result<ir::Module> {
    let mut cx = CompilationContext::new(name);
    let main = function::compile(&mut cx, MAIN, &[], &module.body)?;
    cx.module.functions.insert(0, main);
    debug!(
        functions = cx.module.functions.len(),
        strings = cx.module.globals.len(),
        "generated module"
    );
    Ok(cx.module)
}

/// State shared by every function of one compilation.
pub(crate) struct CompilationContext {
    module: ir::Module,
    functions: HashMap<Box<str>, Signature>,
    strings: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl CompilationContext {
    fn new(name: &str) -> CompilationContext {
        let mut cx = CompilationContext {
            module: ir::Module::new(name),
            functions: HashMap::with_capacity(16),
            strings: 0,
        };
        let runtime = [
            (builtins::PRINT_I32, Type::I32),
            (builtins::PRINT_STR, Type::str_ptr()),
        ];
        for (name, param) in runtime {
            let signature = Signature {
                params: vec![param],
                ret: Type::Void,
            };
            cx.module.declarations.push(Declaration {
                name: name.into(),
                ret: signature.ret.clone(),
                params: signature.params.clone(),
            });
            cx.functions.insert(name.into(), signature);
        }
        let main = Signature {
            params: Vec::new(),
            ret: Type::I32,
        };
        cx.functions.insert(MAIN.into(), main);
        cx
    }

    /// Registers a user function before its body is generated, so that it
    /// may call itself.
    fn declare(&mut self, name: &ast::Ident, signature: Signature) -> Result<()> {
        let reserved = builtins::ALL.contains(&&*name.name);
        if let Some(existing) = self.functions.get(&name.name) {
            let error = Error::Redefinition {
                name: name.name.clone(),
                same_signature: *existing == signature,
            };
            return Err(name.span.wrap(error));
        }
        if reserved {
            let error = Error::Redefinition {
                name: name.name.clone(),
                same_signature: false,
            };
            return Err(name.span.wrap(error));
        }
        self.functions.insert(name.name.clone(), signature);
        Ok(())
    }

    fn signature(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    /// Adds a string constant. Globals are numbered in creation order.
    fn string(&mut self, contents: &str) -> Value {
        let name = format!("str_{}", self.strings);
        self.strings += 1;
        self.module.add_string(name.into(), contents)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Unsupported(&'static str),
    UndefinedVariable(Box<str>),
    UndefinedFunction(Box<str>),
    UnknownLength(Box<str>),
    UnsupportedComparison(Type),
    NotIndexable(Type),
    NotPrintable(Type),
    Redefinition {
        name: Box<str>,
        same_signature: bool,
    },
    ArgumentCount {
        name: Box<str>,
        expected: usize,
        actual: usize,
    },
    RangeArity(usize),
    TypeMismatch {
        expected: Type,
        actual: Type,
    },
}
