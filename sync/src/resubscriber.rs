use std::sync::Mutex;

/// What a handler wants to happen after being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerIntent {
    /// Do not invoke this handler again.
    Stop,
    /// Re-enroll this handler for the next `invoke`/`relay`.
    Resubscribe,
}

type Handler<T> = Box<dyn FnMut(&T) -> HandlerIntent + Send>;

/// A multi-consumer notification primitive holding a set of one-shot handlers.
///
/// Grounded on libbitcoin's resubscriber, redesigned per the "Resubscriber
/// re-entry risk" design note. The source notes that a handler "must not
/// return to invoke", a latent deadlock: here, a handler receives only an
/// immutable snapshot of the argument tuple, signals re-enrollment via a
/// returned [`HandlerIntent`] rather than a boolean, and re-enrollment is
/// enacted by the bus *after* the handler set has been moved out from under
/// the lock. A handler is therefore free to call `subscribe` or `invoke`
/// again on the same bus without deadlocking.
pub struct Resubscriber<T> {
    handlers: Mutex<Option<Vec<Handler<T>>>>,
}

impl<T> Default for Resubscriber<T> {
    fn default() -> Self {
        Resubscriber {
            handlers: Mutex::new(Some(Vec::new())),
        }
    }
}

impl<T> Resubscriber<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrolls `handler`, unless the bus has been stopped, in which case
    /// `handler` is invoked immediately against `stopped_args`.
    pub fn subscribe(&self, stopped_args: &T, mut handler: Handler<T>) {
        let mut guard = self.handlers.lock().unwrap();
        match guard.as_mut() {
            Some(handlers) => handlers.push(handler),
            None => {
                drop(guard);
                handler(stopped_args);
            }
        }
    }

    /// Moves the handler set out under exclusive lock, then invokes each
    /// handler outside any lock, re-enrolling those that ask to be kept.
    pub fn invoke(&self, args: &T) {
        let taken = {
            let mut guard = self.handlers.lock().unwrap();
            guard.as_mut().map(std::mem::take)
        };
        let mut handlers = match taken {
            Some(handlers) => handlers,
            None => return,
        };

        let mut keep = Vec::with_capacity(handlers.len());
        for mut handler in handlers.drain(..) {
            if handler(args) == HandlerIntent::Resubscribe {
                keep.push(handler);
            }
        }

        let mut guard = self.handlers.lock().unwrap();
        if let Some(current) = guard.as_mut() {
            current.extend(keep);
        }
    }

    /// Alias for [`Resubscriber::invoke`] that preserves submission order
    /// across relayed calls when fed through an [`crate::OrderedDispatch`] by
    /// the caller.
    pub fn relay(&self, args: &T) {
        self.invoke(args);
    }

    /// Re-enables enrollment after a previous `stop`.
    pub fn start(&self) {
        let mut guard = self.handlers.lock().unwrap();
        if guard.is_none() {
            *guard = Some(Vec::new());
        }
    }

    /// Drops all enrolled handlers and rejects future `subscribe` calls
    /// (invoking them immediately instead) until `start` is called again.
    pub fn stop(&self) {
        let mut guard = self.handlers.lock().unwrap();
        *guard = None;
    }
}
