pub mod normalizer;
pub mod record_filter;

pub use normalizer::normalize;
pub use record_filter::retain_recorded;
