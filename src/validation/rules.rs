//! Structural Rules
//!
//! Named, pure checks over a well-formed document tree, kept in a registry
//! that runs them in registration order.

use anyhow::{bail, Result};
use std::fmt;

use crate::core::Diagnostic;
use crate::parser::DocumentNode;

/// Signature every structural rule conforms to
pub type RuleFn = dyn Fn(&DocumentNode) -> Vec<Diagnostic> + Send + Sync;

/// A registered rule
pub struct Rule {
    name: String,
    check: Box<RuleFn>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the rule, attributing every finding to it
    pub fn check(&self, root: &DocumentNode) -> RuleResult {
        let diagnostics = (self.check)(root)
            .into_iter()
            .map(|d| d.with_rule(&self.name))
            .collect();

        RuleResult {
            rule: self.name.clone(),
            diagnostics,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Findings of one rule on one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub rule: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rules in registration order
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build the registry for a run: one root-only rule per configured element
    pub fn from_config(root_only: &[String]) -> Result<Self> {
        let mut registry = Self::new();
        for element in root_only {
            registry.register(&format!("root-only:{element}"), root_only_rule(element))?;
        }
        Ok(registry)
    }

    /// Add a rule; names must be unique
    pub fn register<F>(&mut self, name: &str, check: F) -> Result<()>
    where
        F: Fn(&DocumentNode) -> Vec<Diagnostic> + Send + Sync + 'static,
    {
        if self.rules.iter().any(|r| r.name == name) {
            bail!("rule '{}' is already registered", name);
        }

        log::debug!("Registered structural rule '{}'", name);
        self.rules.push(Rule {
            name: name.to_string(),
            check: Box::new(check),
        });
        Ok(())
    }

    /// List rule names in run order
    pub fn list_rules(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against the same tree
    pub fn run(&self, root: &DocumentNode) -> Vec<RuleResult> {
        self.rules.iter().map(|rule| rule.check(root)).collect()
    }
}

/// Rule allowing `element` only as the document root
pub fn root_only_rule(
    element: &str,
) -> impl Fn(&DocumentNode) -> Vec<Diagnostic> + Send + Sync + 'static {
    let element = element.to_string();

    move |root: &DocumentNode| {
        let mut diagnostics = Vec::new();

        root.walk_descendants(|node, ancestors| {
            if node.name != element {
                return;
            }
            let chain = ancestors
                .iter()
                .map(|a| format!("<{}>", a.name))
                .collect::<Vec<_>>()
                .join(" > ");
            diagnostics.push(Diagnostic::structural(
                node.position,
                format!("<{element}> may only appear as the document root, found inside {chain}"),
            ));
        });

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagnosticKind;
    use crate::parser::Position;

    fn node(name: &str, line: usize) -> DocumentNode {
        DocumentNode::new(name, Position::new(line, 1, 0))
    }

    #[test]
    fn test_root_only_allows_root() {
        let rule = root_only_rule("pl-question");
        let root = node("pl-question", 1).with_child(node("p", 2));
        assert!(rule(&root).is_empty());
    }

    #[test]
    fn test_root_only_flags_each_nested_occurrence() {
        let rule = root_only_rule("pl-question");
        let root = node("div", 1)
            .with_child(node("pl-question", 2))
            .with_child(node("section", 3).with_child(node("pl-question", 4)));

        let diags = rule(&root);

        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].line(), Some(2));
        assert_eq!(diags[1].line(), Some(4));
        assert_eq!(diags[1].kind, DiagnosticKind::StructuralViolation);
        assert!(diags[1].message.contains("<div> > <section>"));
    }

    #[test]
    fn test_root_only_flags_nested_inside_itself() {
        let rule = root_only_rule("x");
        let root = node("x", 1).with_child(node("x", 2));
        assert_eq!(rule(&root).len(), 1);
    }

    #[test]
    fn test_registry_runs_in_registration_order() {
        let mut registry = RuleRegistry::new();
        registry
            .register("first", |root: &DocumentNode| {
                vec![Diagnostic::structural(root.position, "first")]
            })
            .unwrap();
        registry
            .register("always-quiet", |_: &DocumentNode| Vec::new())
            .unwrap();
        registry
            .register("third", |root: &DocumentNode| {
                vec![Diagnostic::structural(root.position, "third")]
            })
            .unwrap();

        let results = registry.run(&node("a", 1));

        assert_eq!(registry.list_rules(), ["first", "always-quiet", "third"]);
        assert_eq!(results.len(), 3);
        assert!(results[1].diagnostics.is_empty());
        assert_eq!(results[2].diagnostics[0].rule.as_deref(), Some("third"));
    }

    #[test]
    fn test_duplicate_rule_name_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register("dup", |_: &DocumentNode| Vec::new()).unwrap();
        let err = registry.register("dup", |_: &DocumentNode| Vec::new()).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_from_config() {
        let registry =
            RuleRegistry::from_config(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(registry.list_rules(), ["root-only:a", "root-only:b"]);

        let duplicated = RuleRegistry::from_config(&["a".to_string(), "a".to_string()]);
        assert!(duplicated.is_err());
    }
}
