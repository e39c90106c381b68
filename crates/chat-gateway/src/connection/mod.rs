//! Connection management
//!
//! Sessions, the name registry, and the per-session idle watchdog.

mod registry;
mod session;
mod watchdog;

pub use registry::Registry;
pub use session::{DeliveryError, DeliveryPolicy, Mailbox, Session};
pub use watchdog::{Liveness, Watchdog};
