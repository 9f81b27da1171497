pub mod analyze;
pub mod answers;
pub mod config;
pub mod export;
pub mod history;
pub mod init;
pub mod items;
pub mod remote;
pub mod serve;
pub mod tab;
