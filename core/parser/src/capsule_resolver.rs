//! Resolves `Link` nodes to the parsed `Capsule` they reference, grounded on
//! SPEC_FULL.md §4.3 and `original_source/src/compiler/Compiler.cpp`'s module linkage.
//!
//! The cache is consulted *before* recursing into a linked file, so a link cycle
//! terminates at the first revisit: the second reference re-uses the partially or fully
//! built node already sitting in the cache rather than re-parsing and recursing again.

use std::collections::HashMap;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use theta_ast::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use theta_ast::nodes::{LinkNode, Node};

use crate::parser::parse;
use theta_lexer::lex;

/// Maps a capsule name (as written after `link`) to the source file that defines it.
/// Built by a filesystem walk over `*.th` files; owned by the CLI (§6 Capsule discovery)
/// and handed to the resolver by reference.
pub type CapsuleMap = HashMap<String, PathBuf>;

/// Caches already-resolved `Link` nodes by capsule name across an entire compilation run.
#[derive(Default)]
pub struct CapsuleResolver {
    cache: FxHashMap<String, Node>,
}

impl CapsuleResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every `Link` reachable from `source`'s top-level link list, recursively
    /// resolving links transitively reached through linked capsules' own `link`
    /// declarations.
    pub fn resolve(
        &mut self,
        source: &Node,
        capsule_map: &CapsuleMap,
        diagnostics: &mut DiagnosticSink,
    ) {
        let Node::Source(source_node) = source else {
            return;
        };
        let links = source_node.links.borrow().clone();
        for link in links {
            self.resolve_link(&link, capsule_map, diagnostics);
        }
    }

    fn resolve_link(&mut self, link: &Node, capsule_map: &CapsuleMap, diagnostics: &mut DiagnosticSink) {
        let Node::Link(link_node) = link else {
            return;
        };
        if let Some(cached) = self.cache.get(&link_node.capsule_name) {
            *link_node.value.borrow_mut() = Some(cached.clone());
            return;
        }
        let Some(path) = capsule_map.get(&link_node.capsule_name) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::LinkageError,
                format!("capsule `{}` not found", link_node.capsule_name),
                Some(link_node.location),
            ));
            return;
        };
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::LinkageError,
                    format!("failed to read capsule `{}`: {err}", link_node.capsule_name),
                    Some(link_node.location),
                ));
                return;
            }
        };
        let tokens = lex(&text);
        let (linked_source, mut linked_diagnostics) = parse(tokens);
        diagnostics_append(diagnostics, &mut linked_diagnostics);

        // Cache before recursing so that a cycle back to this capsule name resolves to
        // this (possibly still link-incomplete) node instead of recursing again.
        self.cache.insert(link_node.capsule_name.clone(), linked_source.clone());
        *link_node.value.borrow_mut() = Some(linked_source.clone());

        self.resolve(&linked_source, capsule_map, diagnostics);
    }
}

fn diagnostics_append(into: &mut DiagnosticSink, from: &mut DiagnosticSink) {
    for d in from.drain() {
        into.push(d);
    }
}

/// Convenience used by tests: wraps a capsule name reference that was never linked.
#[must_use]
pub fn unresolved_link(name: impl Into<String>, location: theta_ast::location::Location) -> Node {
    Node::Link(LinkNode::new(0, location, name.into(), None))
}
