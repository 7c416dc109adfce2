//! Rewind Observers
//!
//! Observer consoles connect, receive every state change of every tab,
//! and send control commands back. Delivery is fire-and-forget: an
//! observer whose channel is gone is simply dropped from the registry.

mod channel;
mod error;
mod protocol;
mod registry;

pub use channel::{ObserverHandle, ObserverId};
pub use error::ObserverError;
pub use protocol::{ObserverCommand, ObserverRequest, OutboundMessage};
pub use registry::ObserverRegistry;

pub type Result<T> = std::result::Result<T, ObserverError>;
