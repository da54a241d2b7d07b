pub mod caller;
pub mod error;
