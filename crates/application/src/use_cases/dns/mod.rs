mod resolve_datagram;

pub use resolve_datagram::{
    CycleOutcome, CycleStats, DropReason, ResolveDatagramUseCase, ResolverSettings,
};
