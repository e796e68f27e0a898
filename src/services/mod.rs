//! Service layer module
//!
//! The optimization pipeline stages and the history/usage collaborators

pub mod composer;
pub mod fallback;
pub mod history;
pub mod insights;
pub mod optimizer;
pub mod parser;
pub mod resolver;
pub mod scorer;
pub mod usage;

pub use composer::compose_instruction;
pub use fallback::fallback_optimize;
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use insights::{compute_insights, Insights};
pub use optimizer::{validate_request, PromptOptimizer};
pub use parser::{parse_reply, ParsedReply};
pub use resolver::{resolve_settings, RawSettings};
pub use scorer::{QualityScorer, ScoreOutcome};
pub use usage::{InMemoryUsageLedger, QuotaStatus, UsageLedger};
