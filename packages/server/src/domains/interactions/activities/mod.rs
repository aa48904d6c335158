pub mod analyze;
pub mod profile;
pub mod submit;

pub use analyze::analyze_interactions;
pub use profile::{compare_followers, fetch_profile_with_retry, lookup_profile, RetryPolicy};
pub use submit::start_analysis;
