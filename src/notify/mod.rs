//! Lifecycle notifications: listener contract and ordered dispatch.

mod dispatcher;
mod listener;

pub use dispatcher::NotifyFailure;
pub(crate) use dispatcher::Notifier;
pub use listener::{Listener, NotifyError, Phase};
