pub mod report;
pub mod request;
pub mod scope;

pub use report::*;
pub use request::*;
pub use scope::*;
