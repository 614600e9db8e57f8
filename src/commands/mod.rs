//! CLI command implementations

pub mod check;
pub mod fmt;
pub mod init;
pub mod list;
pub mod new;
pub mod publish;
pub mod show;
