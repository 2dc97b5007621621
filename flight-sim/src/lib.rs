//! Flight simulation engine: keeps scheduled, active and landed flights,
//! promotes and lands them over time and moves active aircraft along their
//! route on every tick.

pub mod types;

pub use types::board::{FlightStats, LoadSummary, TickReport};
pub use types::clock::{Clock, ManualClock, SteppedClock, SystemClock};
pub use types::config::SimConfig;
pub use types::flight::{Endpoint, FlightRecord, Telemetry};
pub use types::flight_status::FlightStatus;
pub use types::sim_error::{SimError, SinkError};
pub use types::simulation::{Simulation, SimulationBuilder, TickObserver};
pub use types::sinks::{
    FileStore, FlightSnapshot, MemoryStore, Notification, NotificationKind, NotificationSink,
    SnapshotStore,
};
