//! Application Layer

pub mod goals;
