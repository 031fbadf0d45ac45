//! Concurrency primitives shared by the chain and consensus crates: the
//! upgrade lock guarding per-block derived caches, the ordered task
//! dispatcher, and the resubscriber notification bus.

mod dispatcher;
mod resubscriber;
mod upgrade_lock;

pub use dispatcher::{Dispatcher, Job, OrderedDispatch};
pub use resubscriber::{HandlerIntent, Resubscriber};
pub use upgrade_lock::UpgradeLock;
