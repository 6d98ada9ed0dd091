#![deny(warnings)]
#![deny(unused_imports)]

pub mod client;
pub mod prompt;
pub mod tool;
pub mod types;

pub use client::Answerer;
pub use types::{AnswerError, AnswerResult};
