//! Built-in card pools.

pub mod cinder;
