//! FastCV library: structured resumes, AI tailoring, in-place editing and export

pub mod ai;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod output;
pub mod profile;
pub mod workspace;

pub use config::Config;
pub use error::{FastCvError, Result};
pub use workspace::Workspace;
