pub mod alert_writer;
pub mod credentials;
pub mod document_store;
pub mod letter_drafter;
pub mod letter_export;
pub mod pdf_import;
pub mod risk_classifier;
pub mod state_store;

pub use alert_writer::AlertWriter;
pub use credentials::CredentialStore;
pub use document_store::DocumentStore;
pub use letter_drafter::LetterDrafter;
pub use letter_export::LetterExporter;
pub use risk_classifier::{MarkerTagParser, RiskClassifier, TagParser};
pub use state_store::StateStore;
