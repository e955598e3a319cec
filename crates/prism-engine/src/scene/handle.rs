use std::fmt;

/// Stable identity of an object inside a [`Scene`](super::Scene).
///
/// Handles are allocated monotonically on insertion and never reused by the
/// same scene, so a stale handle simply stops resolving.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
