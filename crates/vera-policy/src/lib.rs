pub mod comparative;
pub mod noncomparative;
pub mod policy;
pub mod strict;

pub use comparative::ComparativePolicy;
pub use noncomparative::NonComparativePolicy;
pub use policy::{build_policy, AgreementPolicy};
pub use strict::StrictPolicy;
