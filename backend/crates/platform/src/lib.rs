//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Local persistent key/value cache (in-memory and JSON-file backed)
//! - Remote document store port with an in-memory adapter
//! - Password hashing (Argon2id) for the embedded identity provider
//! - Rate limiting infrastructure

pub mod document;
pub mod password;
pub mod rate_limit;
pub mod storage;
