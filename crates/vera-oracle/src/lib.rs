pub mod executor;
pub mod guard;
pub mod judge;
pub mod scripted;

pub use executor::{WorkExecutor, WorkFailure};
pub use guard::{produce_bounded, JudgeHandle};
pub use judge::{EquivalenceJudge, JudgeFailure};
pub use scripted::{ScriptedExecutor, ScriptedJudge};
