//! Construction and structural-equality helpers for `TypeDeclaration` nodes, the value
//! type this crate's side-table (`TypeTable`) maps every checked `NodeId` onto.

use theta_ast::location::Location;
use theta_ast::nodes::{Node, TypeDeclarationNode, TypeName};

#[must_use]
pub fn leaf(name: TypeName, location: Location) -> Node {
    Node::TypeDeclaration(TypeDeclarationNode::leaf(0, location, name))
}

#[must_use]
pub fn composite(name: TypeName, type_name: impl Into<String>, elements: Vec<Node>, location: Location) -> Node {
    Node::TypeDeclaration(TypeDeclarationNode::new(0, location, name, type_name.into(), elements))
}

/// The empty-`Tuple` convention used for blocks/enums with nothing to report a type
/// for — see DESIGN.md Open Question: "unit type" stand-in.
#[must_use]
pub fn unit(location: Location) -> Node {
    composite(TypeName::Tuple, String::new(), Vec::new(), location)
}

#[must_use]
pub fn number(location: Location) -> Node {
    leaf(TypeName::Number, location)
}

#[must_use]
pub fn boolean(location: Location) -> Node {
    leaf(TypeName::Boolean, location)
}

/// Structural type equality (SPEC_FULL.md §4.5): two `TypeDeclaration`s are equal when
/// their names, type names (struct/capsule reference), and element lists recursively
/// match.
#[must_use]
pub fn types_equal(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::TypeDeclaration(x), Node::TypeDeclaration(y)) => {
            x.name == y.name
                && x.type_name == y.type_name
                && x.elements.len() == y.elements.len()
                && x.elements.iter().zip(y.elements.iter()).all(|(ex, ey)| types_equal(ex, ey))
        }
        _ => false,
    }
}

/// Variadic satisfaction (SPEC_FULL.md §4.5): a right-hand-side `Variadic` is acceptable
/// against `expected` when every element type it lists matches at least one alternative
/// in `expected` (itself Variadic, or treated as a single-alternative set otherwise).
#[must_use]
pub fn satisfies(expected: &Node, actual: &Node) -> bool {
    if let Node::TypeDeclaration(a) = actual {
        if a.name == TypeName::Variadic {
            let alternatives: Vec<&Node> = match expected {
                Node::TypeDeclaration(e) if e.name == TypeName::Variadic => e.elements.iter().collect(),
                other => vec![other],
            };
            return a
                .elements
                .iter()
                .all(|elem| alternatives.iter().any(|alt| types_equal(alt, elem)));
        }
    }
    types_equal(expected, actual)
}

/// Folds a list of resolved types into a single type: the common type if all are
/// structurally equal, otherwise a `Variadic` of the distinct types in first-seen order
/// (SPEC_FULL.md §4.5 Block / Control flow). Deliberately uses an explicit seen-set
/// rather than the original's adjacent-only `std::unique` — see DESIGN.md Open
/// Question 4.
#[must_use]
pub fn fold_variadic(types: Vec<Node>, location: Location) -> Node {
    let mut unique: Vec<Node> = Vec::new();
    for t in types {
        if !unique.iter().any(|u| types_equal(u, &t)) {
            unique.push(t);
        }
    }
    match unique.len() {
        0 => unit(location),
        1 => unique.into_iter().next().unwrap(),
        _ => composite(TypeName::Variadic, String::new(), unique, location),
    }
}

#[must_use]
pub fn describe(node: &Node) -> String {
    let Node::TypeDeclaration(t) = node else {
        return "<?>".to_string();
    };
    if t.elements.is_empty() {
        if t.type_name.is_empty() {
            t.name.to_string()
        } else {
            format!("{}<{}>", t.name, t.type_name)
        }
    } else {
        let inner: Vec<String> = t.elements.iter().map(describe).collect();
        format!("{}<{}>", t.name, inner.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::synthetic(1, 1)
    }

    #[test]
    fn structural_equality_is_reflexive() {
        let t = composite(TypeName::List, "List", vec![number(loc())], loc());
        assert!(types_equal(&t, &t));
    }

    #[test]
    fn structural_equality_is_symmetric() {
        let a = composite(TypeName::List, "List", vec![number(loc())], loc());
        let b = composite(TypeName::List, "List", vec![number(loc())], loc());
        assert!(types_equal(&a, &b));
        assert!(types_equal(&b, &a));
    }

    #[test]
    fn distinct_leaf_types_are_not_equal() {
        assert!(!types_equal(&number(loc()), &boolean(loc())));
    }

    #[test]
    fn fold_variadic_of_a_single_repeated_type_collapses_to_that_type() {
        let folded = fold_variadic(vec![number(loc()), number(loc())], loc());
        assert!(types_equal(&folded, &number(loc())));
    }
}
