use std::fmt;

/// Machine type of an IR value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// Integer of the given bit width.
    Int(u32),
    /// Fixed-length array of elements.
    Array(u32, Box<Type>),
    Pointer(Box<Type>),
}

impl Type {
    pub const I1: Type = Type::Int(1);
    pub const I8: Type = Type::Int(8);
    pub const I32: Type = Type::Int(32);

    pub fn pointer(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    pub fn array(len: usize, element: Type) -> Type {
        let len = u32::try_from(len).expect("array longer than u32::MAX elements");
        Type::Array(len, Box::new(element))
    }

    /// `i8*`, the type of a decayed string.
    pub fn str_ptr() -> Type {
        Type::I8.pointer()
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn int_width(&self) -> Option<u32> {
        match self {
            Type::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    /// For `[N x T]*`, returns `N` and `T`.
    pub fn as_array_pointer(&self) -> Option<(u32, &Type)> {
        match self.pointee()? {
            Type::Array(len, element) => Some((*len, element)),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Int(bits) => write!(f, "i{bits}"),
            Type::Array(len, element) => write!(f, "[{len} x {element}]"),
            Type::Pointer(inner) => write!(f, "{inner}*"),
        }
    }
}

/// A typed operand: a constant, a function-local register, or a global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    pub ty: Type,
    pub kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Const(i64),
    Local(Box<str>),
    Global(Box<str>),
}

impl Value {
    pub fn const_int(ty: Type, value: i64) -> Value {
        debug_assert!(ty.is_int(), "integer constant of type {ty}");
        Value {
            ty,
            kind: ValueKind::Const(value),
        }
    }

    pub fn i32(value: i32) -> Value {
        Value::const_int(Type::I32, value.into())
    }

    pub fn bool(value: bool) -> Value {
        Value::const_int(Type::I1, value.into())
    }

    pub fn local(ty: Type, name: impl Into<Box<str>>) -> Value {
        Value {
            ty,
            kind: ValueKind::Local(name.into()),
        }
    }

    pub fn global(ty: Type, name: impl Into<Box<str>>) -> Value {
        Value {
            ty,
            kind: ValueKind::Global(name.into()),
        }
    }

    /// Displays the operand preceded by its type, as in `i32 %x`.
    pub fn typed(&self) -> impl fmt::Display + '_ {
        Typed(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Const(value) if self.ty == Type::I1 => {
                f.write_str(if *value == 0 { "false" } else { "true" })
            }
            ValueKind::Const(value) => write!(f, "{value}"),
            ValueKind::Local(name) => write!(f, "%{name}"),
            ValueKind::Global(name) => write!(f, "@{name}"),
        }
    }
}

struct Typed<'a>(&'a Value);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.ty, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::I32.to_string(), "i32");
        assert_eq!(Type::str_ptr().to_string(), "i8*");
        assert_eq!(Type::array(3, Type::I8).pointer().to_string(), "[3 x i8]*");
        assert_eq!(Type::Void.to_string(), "void");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::i32(-4).typed().to_string(), "i32 -4");
        assert_eq!(Value::bool(true).typed().to_string(), "i1 true");
        assert_eq!(Value::local(Type::I32.pointer(), "x").typed().to_string(), "i32* %x");
        let global = Value::global(Type::array(3, Type::I8).pointer(), "str_0");
        assert_eq!(global.typed().to_string(), "[3 x i8]* @str_0");
    }

    #[test]
    fn test_array_pointer() {
        let ty = Type::array(5, Type::I32).pointer();
        assert_eq!(ty.as_array_pointer(), Some((5, &Type::I32)));
        assert_eq!(Type::I32.pointer().as_array_pointer(), None);
    }
}
