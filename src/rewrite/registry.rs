//! Rule registry for dialect rewrites

use std::cmp::Reverse;

use super::rules;
use super::traits::{RewriteContext, RewriteRule};
use super::walk::Walker;
use crate::ast::Statement;
use crate::error::TranspileResult;

/// Registry of rewrite rules, highest priority first.
pub struct RuleRegistry {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Create a registry with the built-in rules.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for rule in rules::builtin() {
            registry.register(rule);
        }
        registry
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule. Equal priorities keep registration order.
    pub fn register(&mut self, rule: Box<dyn RewriteRule>) {
        self.rules.push(rule);
        self.rules.sort_by_key(|r| Reverse(r.priority()));
    }

    /// Ids of the rules active for the context's dialect pair, in run order.
    pub fn active_ids(&self, ctx: &RewriteContext) -> Vec<&'static str> {
        self.active(ctx).iter().map(|r| r.id()).collect()
    }

    fn active(&self, ctx: &RewriteContext) -> Vec<&dyn RewriteRule> {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| r.applies(ctx.read, ctx.write))
            .collect()
    }

    /// Rewrite one statement bottom-up through every active rule.
    pub fn rewrite(&self, statement: Statement, ctx: &mut RewriteContext) -> TranspileResult<Statement> {
        let active = self.active(ctx);
        tracing::debug!(
            read = %ctx.read,
            write = %ctx.write,
            rules = ?active.iter().map(|r| r.id()).collect::<Vec<_>>(),
            "rewriting statement"
        );
        Walker::new(active).statement(statement, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::pipeline::TranspileOptions;

    struct Ranked(u32);

    impl RewriteRule for Ranked {
        fn id(&self) -> &'static str {
            "ranked"
        }

        fn priority(&self) -> u32 {
            self.0
        }

        fn applies(&self, _read: Dialect, _write: Dialect) -> bool {
            true
        }
    }

    #[test]
    fn test_registry_orders_by_priority() {
        let options = TranspileOptions::default();
        let ctx = RewriteContext::new(Dialect::Spark, Dialect::Doris, &options);
        let ids = RuleRegistry::new().active_ids(&ctx);
        assert_eq!(ids.first(), Some(&"user-functions"));
        assert_eq!(ids.last(), Some(&"function-renames"));
    }

    #[test]
    fn test_registry_filters_by_direction() {
        let options = TranspileOptions::default();
        let forward = RewriteContext::new(Dialect::Spark, Dialect::Doris, &options);
        let reverse = RewriteContext::new(Dialect::Doris, Dialect::Spark, &options);
        let same = RewriteContext::new(Dialect::Spark, Dialect::Hive, &options);
        let registry = RuleRegistry::new();

        assert!(registry.active_ids(&forward).contains(&"time-formats"));
        assert!(!registry.active_ids(&forward).contains(&"reverse-time-formats"));
        assert!(registry.active_ids(&reverse).contains(&"reverse-time-formats"));
        assert_eq!(registry.active_ids(&same), vec!["user-functions"]);
    }

    #[test]
    fn test_register_custom_rule() {
        let options = TranspileOptions::default();
        let ctx = RewriteContext::new(Dialect::Doris, Dialect::MySql, &options);
        let mut registry = RuleRegistry::empty();
        registry.register(Box::new(Ranked(10)));
        registry.register(Box::new(Ranked(500)));
        let priorities: Vec<u32> = registry.active(&ctx).iter().map(|r| r.priority()).collect();
        assert_eq!(priorities, vec![500, 10]);
    }
}
