pub mod audit_flow;
pub mod state;

pub use audit_flow::{AuditFlow, Classified, FailurePolicy, ScanOutcome};
pub use state::{AlertLog, CurrentDocument, ProcessingState, StateUpdate};
