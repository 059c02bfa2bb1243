pub mod case;
pub mod catalog;
pub mod common;
pub mod diagnose;
pub mod init;
pub mod permissions;
pub mod reconcile;
