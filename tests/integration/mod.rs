//! Integration tests for caseflow
//!
//! These drive the transition engine over the on-disk store the CLI uses,
//! including catalog changes made while cases are in flight.

pub mod helpers;
pub mod pipeline;
pub mod reconfiguration;
pub mod workspace;
