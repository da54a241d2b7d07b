pub mod error;
pub mod interfaces;
pub mod service;
pub mod signature;
pub mod transcode;
