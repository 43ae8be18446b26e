//! Mixed-backend generation: request, token loop, and sinks.
//! The loop owns per-run state; the schedule and the token source stay in their modules.

pub mod request;
pub mod run;
pub mod sink;

pub use request::GenerationRequest;
pub use run::{CancellationFlag, GenerationOutcome, Generator, StopReason, TokenResult};
pub use sink::{NullSink, TokenSink};
