//! Name mangling, grounded on `original_source/src/compiler/Compiler.cpp`'s
//! `getQualifiedFunctionIdentifier` (SPEC_FULL.md §4.6).

use theta_ast::nodes::{Node, TypeName};

/// A function's mangled name is `base || arity || concat(parameterTypeName...)`.
/// Invocations compute the same string from the resolved types of their argument
/// expressions, so overload resolution is a string lookup against the module's
/// function namespace.
#[must_use]
pub fn mangle(base: &str, param_types: &[TypeName]) -> String {
    let mut mangled = format!("{base}{}", param_types.len());
    for t in param_types {
        mangled.push_str(&t.to_string());
    }
    mangled
}

/// Extracts the leaf `TypeName` a resolved type maps onto for mangling purposes. Only
/// `Number`/`Boolean`/`String` are codegen-supported value types; anything else is a
/// fatal codegen error at the call site, not handled here.
#[must_use]
pub fn leaf_type_name(ty: &Node) -> Option<TypeName> {
    match ty {
        Node::TypeDeclaration(t) => Some(t.name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_signatures_mangle_to_the_same_name() {
        let sig = [TypeName::Number, TypeName::String];
        assert_eq!(mangle("add", &sig), mangle("add", &sig));
    }

    #[test]
    fn different_parameter_types_mangle_differently() {
        let a = mangle("add", &[TypeName::Number]);
        let b = mangle("add", &[TypeName::String]);
        assert_ne!(a, b);
    }

    #[test]
    fn arity_is_encoded_so_overloads_by_arity_never_collide() {
        let zero_arg = mangle("main", &[]);
        let one_arg = mangle("main", &[TypeName::Number]);
        assert_ne!(zero_arg, one_arg);
        assert_eq!(zero_arg, "main0");
    }
}
