//! Command implementations for the jarcompat CLI

pub mod compare;
