// engine module: data fetch and command dispatch backend

mod interface;
pub mod snapshot;
pub mod stub;

pub use interface::{Engine, EngineHandle, Event, Request};
pub use snapshot::SnapshotEngine;
pub use stub::StubEngine;
