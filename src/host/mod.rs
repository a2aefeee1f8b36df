//! Host-facing contract, command router, and stdio transport for embedding
//! the planner in a desktop shell.

pub mod contract;
pub mod handler;
pub mod stdio;
