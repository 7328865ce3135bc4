pub mod js;
pub mod errors;

pub use errors::{is_context_lost, to_harvest_error};
