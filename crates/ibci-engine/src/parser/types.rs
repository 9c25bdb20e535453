//! Type descriptors and the promotion rules used by the checker.

use crate::parser::ast::BinaryOperator;
use crate::parser::scope::ScopeId;
use once_cell::sync::Lazy;
use std::fmt;

/// A resolved IBCI type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Void,
    /// Unknown or dynamic; assignable in both directions.
    Any,
    List(Box<Type>),
    Dict(Box<Type>, Box<Type>),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// A module value exposing the given scope to attribute access.
    Module(ScopeId),
}

impl Type {
    /// Whether a value of this type can be assigned where `other` is
    /// expected. `Any` is a wildcard in both directions; containers
    /// compare element-wise; everything else requires equality. There is
    /// no implicit int-to-float conversion on assignment.
    pub fn is_assignable_to(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::List(a), Type::List(b)) => a.is_assignable_to(b),
            (Type::Dict(ka, va), Type::Dict(kb, vb)) => {
                ka.is_assignable_to(kb) && va.is_assignable_to(vb)
            }
            (
                Type::Function { params: pa, ret: ra },
                Type::Function { params: pb, ret: rb },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb.iter()).all(|(a, b)| a.is_assignable_to(b))
                    && ra.is_assignable_to(rb)
            }
            _ => self == other,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "str"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Any => write!(f, "any"),
            Type::List(elem) => write!(f, "list[{}]", elem),
            Type::Dict(key, value) => write!(f, "dict[{}, {}]", key, value),
            Type::Function { params, ret } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Module(_) => write!(f, "module"),
        }
    }
}

/// Result type of a binary operation, or `None` when the operand types
/// do not support the operator.
pub fn promoted_type(op: BinaryOperator, left: &Type, right: &Type) -> Option<Type> {
    use BinaryOperator::*;

    if *left == Type::Any || *right == Type::Any {
        return Some(Type::Any);
    }

    match op {
        Add | Subtract | Multiply | Divide | Modulo => {
            if *left == Type::Int && *right == Type::Int {
                return Some(Type::Int);
            }
            if left.is_numeric() && right.is_numeric() {
                return Some(Type::Float);
            }
            if op == Add {
                if *left == Type::Str && *right == Type::Str {
                    return Some(Type::Str);
                }
                if let (Type::List(a), Type::List(b)) = (left, right) {
                    // Concatenating lists of different element types
                    // widens to list[any]
                    return Some(if a == b {
                        Type::List(a.clone())
                    } else {
                        Type::List(Box::new(Type::Any))
                    });
                }
            }
            None
        }
        BitwiseAnd | BitwiseOr | BitwiseXor | LeftShift | RightShift => {
            if *left == Type::Int && *right == Type::Int {
                Some(Type::Int)
            } else {
                None
            }
        }
        Equal | NotEqual => {
            if left.is_numeric() && right.is_numeric() {
                return Some(Type::Bool);
            }
            // None compares against anything with == and !=
            if *left == Type::Void || *right == Type::Void {
                return Some(Type::Bool);
            }
            if left == right {
                Some(Type::Bool)
            } else {
                None
            }
        }
        LessThan | LessEqual | GreaterThan | GreaterEqual => {
            if left.is_numeric() && right.is_numeric() {
                return Some(Type::Bool);
            }
            if left == right {
                Some(Type::Bool)
            } else {
                None
            }
        }
        And | Or | Is => Some(Type::Bool),
    }
}

/// Resolve a builtin type name, applying bracketed arguments for the
/// container types. Returns `None` for names that are not builtin types.
pub fn builtin_type(name: &str, args: &[Type]) -> Option<Type> {
    match name {
        "int" => Some(Type::Int),
        "float" => Some(Type::Float),
        "str" => Some(Type::Str),
        "bool" => Some(Type::Bool),
        "void" => Some(Type::Void),
        "any" | "var" => Some(Type::Any),
        "list" => Some(Type::List(Box::new(
            args.first().cloned().unwrap_or(Type::Any),
        ))),
        "dict" => Some(Type::Dict(
            Box::new(args.first().cloned().unwrap_or(Type::Any)),
            Box::new(args.get(1).cloned().unwrap_or(Type::Any)),
        )),
        _ => None,
    }
}

/// Builtin type names surfaced as symbols in the builtin scope.
pub static BUILTIN_TYPES: Lazy<Vec<(&'static str, Type)>> = Lazy::new(|| {
    vec![
        ("int", Type::Int),
        ("float", Type::Float),
        ("str", Type::Str),
        ("bool", Type::Bool),
        ("void", Type::Void),
        ("list", Type::List(Box::new(Type::Any))),
        ("dict", Type::Dict(Box::new(Type::Any), Box::new(Type::Any))),
    ]
});

/// Builtin function signatures. `str` and `int` double as conversion
/// functions and shadow the type symbols of the same name in the
/// builtin scope; annotations resolve through [`builtin_type`] instead
/// of the scope, so both uses keep working.
pub static BUILTIN_FUNCTIONS: Lazy<Vec<(&'static str, Type)>> = Lazy::new(|| {
    vec![
        (
            "print",
            Type::Function {
                params: vec![Type::Any],
                ret: Box::new(Type::Void),
            },
        ),
        (
            "len",
            Type::Function {
                params: vec![Type::Any],
                ret: Box::new(Type::Int),
            },
        ),
        (
            "range",
            Type::Function {
                params: vec![Type::Int],
                ret: Box::new(Type::List(Box::new(Type::Int))),
            },
        ),
        (
            "str",
            Type::Function {
                params: vec![Type::Any],
                ret: Box::new(Type::Str),
            },
        ),
        (
            "int",
            Type::Function {
                params: vec![Type::Any],
                ret: Box::new(Type::Int),
            },
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    #[test]
    fn test_any_is_wildcard() {
        assert!(Type::Any.is_assignable_to(&Type::Int));
        assert!(Type::Int.is_assignable_to(&Type::Any));
    }

    #[test]
    fn test_no_implicit_int_to_float() {
        assert!(!Type::Int.is_assignable_to(&Type::Float));
        assert!(!Type::Float.is_assignable_to(&Type::Int));
    }

    #[test]
    fn test_list_assignability_elementwise() {
        let ints = Type::List(Box::new(Type::Int));
        let floats = Type::List(Box::new(Type::Float));
        let anys = Type::List(Box::new(Type::Any));
        assert!(ints.is_assignable_to(&ints.clone()));
        assert!(!ints.is_assignable_to(&floats));
        assert!(ints.is_assignable_to(&anys));
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(promoted_type(Add, &Type::Int, &Type::Int), Some(Type::Int));
        assert_eq!(
            promoted_type(Add, &Type::Int, &Type::Float),
            Some(Type::Float)
        );
        assert_eq!(
            promoted_type(Multiply, &Type::Float, &Type::Float),
            Some(Type::Float)
        );
        assert_eq!(promoted_type(Subtract, &Type::Str, &Type::Str), None);
    }

    #[test]
    fn test_string_and_list_concatenation() {
        assert_eq!(promoted_type(Add, &Type::Str, &Type::Str), Some(Type::Str));
        let ints = Type::List(Box::new(Type::Int));
        let strs = Type::List(Box::new(Type::Str));
        assert_eq!(promoted_type(Add, &ints, &ints), Some(ints.clone()));
        assert_eq!(
            promoted_type(Add, &ints, &strs),
            Some(Type::List(Box::new(Type::Any)))
        );
    }

    #[test]
    fn test_bitwise_int_only() {
        assert_eq!(
            promoted_type(BitwiseAnd, &Type::Int, &Type::Int),
            Some(Type::Int)
        );
        assert_eq!(promoted_type(LeftShift, &Type::Int, &Type::Float), None);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            promoted_type(LessThan, &Type::Int, &Type::Float),
            Some(Type::Bool)
        );
        assert_eq!(
            promoted_type(Equal, &Type::Str, &Type::Str),
            Some(Type::Bool)
        );
        assert_eq!(promoted_type(LessThan, &Type::Str, &Type::Int), None);
        // None comparisons are allowed for equality only
        assert_eq!(
            promoted_type(Equal, &Type::Void, &Type::Int),
            Some(Type::Bool)
        );
        assert_eq!(promoted_type(LessThan, &Type::Void, &Type::Int), None);
    }

    #[test]
    fn test_any_propagates() {
        assert_eq!(promoted_type(Add, &Type::Any, &Type::Int), Some(Type::Any));
    }

    #[test]
    fn test_builtin_type_containers() {
        assert_eq!(builtin_type("int", &[]), Some(Type::Int));
        assert_eq!(
            builtin_type("list", &[Type::Int]),
            Some(Type::List(Box::new(Type::Int)))
        );
        assert_eq!(
            builtin_type("dict", &[Type::Str, Type::Int]),
            Some(Type::Dict(Box::new(Type::Str), Box::new(Type::Int)))
        );
        assert_eq!(builtin_type("widget", &[]), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::List(Box::new(Type::Int)).to_string(), "list[int]");
        let f = Type::Function {
            params: vec![Type::Int, Type::Str],
            ret: Box::new(Type::Bool),
        };
        assert_eq!(f.to_string(), "func(int, str) -> bool");
    }
}
