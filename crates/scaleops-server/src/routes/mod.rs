pub mod analysis;
pub mod items;
pub mod workspace;
