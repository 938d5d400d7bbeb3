pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod forge;
pub mod lister;
pub mod planner;
pub mod sequence;

pub use cli::{Args, Command};
pub use error::{AssetError, Result};

#[cfg(test)]
pub mod test_helpers;
