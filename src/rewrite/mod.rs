//! Dialect rewrites over the syntax tree.
//!
//! Rules are small, independent tree rewrites selected by the dialect pair.
//! The [`RuleRegistry`] walks each statement bottom-up and feeds every node
//! through the active rules in priority order:
//!
//! ```text
//! date_add(d, 1)  ──date-arithmetic──►  DATE_ADD(d, INTERVAL 1 DAY)
//! nvl(a, b)       ──function-renames─►  IFNULL(a, b)
//! ```

pub mod registry;
pub mod rules;
pub mod timefmt;
pub mod traits;
mod walk;

pub use registry::RuleRegistry;
pub use traits::{RewriteContext, RewriteRule};
