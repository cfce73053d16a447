pub mod lifecycle;

pub use lifecycle::{
    format_clock, Signal, SignalEngine, SignalError, SignalEvent, SignalState, ANALYSIS_STAGES,
};
