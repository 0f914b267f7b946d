use std::fmt;

pub mod customer;

/// A stored record addressed by a unique identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + PartialEq + fmt::Display + Send + Sync;

    /// Human-readable entity name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}
