pub mod data;
pub mod migration;
