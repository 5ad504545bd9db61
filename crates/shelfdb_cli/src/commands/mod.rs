//! Command implementations.

pub mod admin;
pub mod documents;
pub mod inspect;
