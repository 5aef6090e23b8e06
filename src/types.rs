use std::fmt;

use serde::Serialize;

/// Static type of a source-level name, as inferred by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Int,
    Bool,
    Str,
    List,
    Char,
    Unknown,
}

impl DataType {
    /// Resolves a parameter annotation such as `n: int`.
    pub fn from_annotation(name: &str) -> Option<DataType> {
        let ty = match name {
            "int" => DataType::Int,
            "bool" => DataType::Bool,
            "str" => DataType::Str,
            "list" => DataType::List,
            "char" => DataType::Char,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether values of this type can be subscripted.
    pub fn is_indexable(self) -> bool {
        matches!(self, DataType::List | DataType::Str)
    }

    /// Element type produced by subscripting a value of this type.
    pub fn element(self) -> DataType {
        match self {
            DataType::List => DataType::Int,
            DataType::Str => DataType::Char,
            _ => DataType::Unknown,
        }
    }

    /// Two types are compatible when equal or when either one is unresolved.
    pub fn is_compatible_with(self, other: DataType) -> bool {
        self == other || self == DataType::Unknown || other == DataType::Unknown
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::Str => "str",
            DataType::List => "list",
            DataType::Char => "char",
            DataType::Unknown => "unknown",
        })
    }
}

pub mod builtins {
    pub const PRINT: &str = "print";
    pub const RANGE: &str = "range";
    pub const LEN: &str = "len";

    /// Functions visible in the global scope without a definition.
    pub const ALL: &[&str] = &[PRINT, RANGE, LEN];

    /// Runtime primitive printing a 32-bit integer.
    pub const PRINT_I32: &str = "print_i32";
    /// Runtime primitive printing a NUL-terminated string.
    pub const PRINT_STR: &str = "print_str";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations() {
        assert_eq!(DataType::from_annotation("int"), Some(DataType::Int));
        assert_eq!(DataType::from_annotation("str"), Some(DataType::Str));
        assert_eq!(DataType::from_annotation("float"), None);
    }

    #[test]
    fn compatibility() {
        assert!(DataType::Int.is_compatible_with(DataType::Int));
        assert!(DataType::Int.is_compatible_with(DataType::Unknown));
        assert!(DataType::Unknown.is_compatible_with(DataType::Str));
        assert!(!DataType::Int.is_compatible_with(DataType::Str));
    }
}
