// Instagram Interaction Analyzer - API Core
//
// Background analysis of how one Instagram account interacts with another's
// recent posts. Submissions become tasks in a store; a runner fills them in.
//
// Business logic lives in domains/, infrastructure in kernel/.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
