pub mod dns;

pub use dns::{CycleOutcome, CycleStats, DropReason, ResolveDatagramUseCase, ResolverSettings};
