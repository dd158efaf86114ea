//! Domain types of the correlator subsystem.

pub mod errors;
pub mod pending;
pub mod state;

pub use errors::{CorrelatorError, IssueError};
pub use pending::{PendingRequestStore, PendingStats};
pub use state::{CorrelatorState, CorrelatorStats, CorrelatorStatsSnapshot};
