// # State
//
// The persisted state record and the StateStore implementations that
// load and save it.

pub mod file;
pub mod memory;
pub mod record;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;
pub use record::{ApiToken, ForceSchedule, LogLevel, NO_IP_SENTINEL, State};
