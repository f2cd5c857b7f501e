pub mod config;
pub mod orchestrator;
pub mod runner;

pub use config::EngineConfig;
pub use orchestrator::{AcceptedOutcome, EngineError, FallbackOrchestrator, OperationState};
pub use runner::{ReplicaBatch, ReplicaFault, ReplicaRunner, RunFailure};
