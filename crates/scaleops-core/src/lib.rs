pub mod analysis;
pub mod answers;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod io;
pub mod paths;
pub mod store;
pub mod sync;
pub mod types;
pub mod view;
pub mod workflow;

pub use error::{Result, ScaleOpsError};
