//! Port traits implemented outside the factory.

pub mod outbound;
