//! Domain Layer

pub mod category;
pub mod goal;
pub mod transaction;
pub mod user_data;
