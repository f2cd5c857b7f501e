pub mod candidate;
pub mod normalize;
pub mod operation;
pub mod outcome;

pub use candidate::CandidateResult;
pub use normalize::{canonical_form, canonical_value};
pub use operation::{OperationRequest, PolicyKind, PolicySpec, RequestError};
pub use outcome::{AttemptRecord, PolicyOutcome};
