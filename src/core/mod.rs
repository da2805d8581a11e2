pub mod backoff;
pub mod client;
pub mod errors;
pub mod job;
pub mod prompts;
