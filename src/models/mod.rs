pub mod case;
pub mod finding;

pub use case::CaseMetadata;
pub use finding::{Alert, Finding, RiskTag, TERMINAL_MARKER};
