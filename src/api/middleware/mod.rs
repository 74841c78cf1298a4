//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Identity resolver — bearer token → role-tagged caller
//! 2. Audit logger — logs after identity, has the caller name

pub mod audit;
pub mod identity;
