//! Request handlers

pub mod donations;
pub mod finance;
pub mod health;
