//! Command implementations for the TreeAlign CLI

pub mod check;
pub mod extract;
