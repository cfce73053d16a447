pub mod remote;
pub mod simulator;

pub use remote::{RemoteSnapshot, RemoteStats, StatsBackend};
pub use simulator::{diurnal_target, StatsSimulator, StatsSnapshot};
