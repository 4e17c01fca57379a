//! Domain models for both engines

pub mod agent;
pub mod agreement;
pub mod incident;
pub mod party;
pub mod state;

// Re-exports
pub use agent::{Agent, AgentProfile, Beliefs};
pub use agreement::{Agreement, TermSet, TermValue};
pub use incident::{BeliefSnapshot, Incident, IncidentLog, IncidentRow};
pub use party::{Attribute, AttributeInteraction, Party, ValueShape};
pub use state::{ProcessState, StepContext};
