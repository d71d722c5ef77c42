//! The `Compilation` value: the process-wide state the original compiler models as
//! globals (diagnostic sink, parsed-link cache, capsule-name → path map), re-architected
//! as an explicit value threaded through every phase by reference, per SPEC_FULL.md §4.7
//! and §9's "Process-wide singletons" design note.

use theta_ast::diagnostic::DiagnosticSink;
use theta_parser::CapsuleMap;
use theta_parser::CapsuleResolver;

/// Bundles the state one compilation run accumulates: diagnostics, the capsule-name →
/// file-path map used to resolve `link` declarations, and the resolver's own cache of
/// already-parsed capsules.
///
/// One `Compilation` is constructed per CLI invocation. The REPL instead holds a single
/// long-lived instance across evaluations and calls [`Compilation::clear_diagnostics`]
/// between them, mirroring the source's `clearExceptions`.
pub struct Compilation {
    pub diagnostics: DiagnosticSink,
    pub capsule_map: CapsuleMap,
    resolver: CapsuleResolver,
}

impl Compilation {
    /// Builds a `Compilation` against a capsule map discovered by the caller (the CLI's
    /// filesystem walk, per SPEC_FULL.md §6 — an external collaborator to this crate).
    #[must_use]
    pub fn new(capsule_map: CapsuleMap) -> Self {
        Self {
            diagnostics: DiagnosticSink::new(),
            capsule_map,
            resolver: CapsuleResolver::new(),
        }
    }

    pub(crate) fn resolver_mut(&mut self) -> &mut CapsuleResolver {
        &mut self.resolver
    }

    /// Drains accumulated diagnostics, leaving the sink empty. Called between REPL
    /// evaluations so one input's errors never leak into the next.
    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new(CapsuleMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_compilation_starts_empty() {
        let compilation = Compilation::default();
        assert!(compilation.diagnostics.is_empty());
        assert!(compilation.capsule_map.is_empty());
    }

    #[test]
    fn independently_constructed_compilations_never_share_diagnostics() {
        let mut a = Compilation::default();
        let mut b = Compilation::default();
        a.diagnostics.report(
            theta_ast::diagnostic::DiagnosticKind::IntegrityError,
            "only in a",
            None,
        );
        assert!(!a.diagnostics.is_empty());
        assert!(b.diagnostics.is_empty());
        b.clear_diagnostics();
        assert!(b.diagnostics.is_empty());
    }

    #[test]
    fn clear_diagnostics_empties_the_sink() {
        let mut compilation = Compilation::default();
        compilation.diagnostics.report(
            theta_ast::diagnostic::DiagnosticKind::SyntaxError,
            "boom",
            None,
        );
        assert!(!compilation.diagnostics.is_empty());
        compilation.clear_diagnostics();
        assert!(compilation.diagnostics.is_empty());
    }
}
