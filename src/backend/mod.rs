pub mod actor;
pub mod messages;

pub use actor::{BackendActor, BackendHandle};
pub use messages::{BackendCommand, BackendEvent, EventSink};
