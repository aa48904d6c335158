// HTTP routes
pub mod analyze;
pub mod health;
pub mod profile;
pub mod status;

pub use analyze::*;
pub use health::*;
pub use profile::*;
pub use status::*;
