use core::fmt;
use core::num::NonZeroU32;

/// Dense position of a node or pipe inside a built topology.
///
/// Stored off by one in a `NonZeroU32` so `Option<Id>` stays four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Saturates at `u32::MAX - 1`; topologies never get that large.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn from_usize(index: usize) -> Self {
        Self::from_index(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Position for slice access.
    pub fn idx(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type NodeId = Id;
pub type PipeId = Id;
