/// A `Cached<T>` is a single-value cache slot that is never part of the wire
/// serialization.
///
/// It can be added to any struct without risking a consensus break: it
/// round-trips through `(de)serialize` as "absent" and is filled in lazily
/// the first time the value is asked for, the same way the block-level
/// derived-quantity cache is filled under [`bitcoin_sync::UpgradeLock`]. Two
/// values that differ only in whether this slot has been filled still
/// compare equal, so a freshly constructed value and its deserialized
/// counterpart are interchangeable for testing.
#[derive(Clone, Copy)]
pub struct Cached<T: Clone + Copy>(Option<T>);

impl<T: Clone + Copy> Cached<T> {
    pub const fn empty() -> Cached<T> {
        Cached(None)
    }

    pub const fn filled(value: T) -> Cached<T> {
        Cached(Some(value))
    }

    pub fn value(&self) -> Option<T> {
        self.0
    }

    pub fn get_or_init(&mut self, init: impl FnOnce() -> T) -> T {
        if let Some(value) = self.0 {
            return value;
        }
        let value = init();
        self.0 = Some(value);
        value
    }
}

impl<T: Clone + Copy> Default for Cached<T> {
    fn default() -> Self {
        Cached::empty()
    }
}

impl<T: Clone + Copy> crate::serialization::BitcoinSerialize for Cached<T> {
    fn bitcoin_serialize<W: std::io::Write>(&self, _target: W) -> Result<(), std::io::Error> {
        Ok(())
    }
}

impl<T: Clone + Copy> crate::serialization::BitcoinDeserialize for Cached<T> {
    fn bitcoin_deserialize<R: std::io::Read>(
        _reader: R,
    ) -> Result<Self, crate::serialization::SerializationError> {
        Ok(Cached::empty())
    }
}

impl<T: PartialEq + Copy> PartialEq for Cached<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl<T: Eq + Copy> Eq for Cached<T> {}

impl<T: Clone + Copy + std::fmt::Debug> std::fmt::Debug for Cached<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
