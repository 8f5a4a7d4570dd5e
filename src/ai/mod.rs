//! AI gateway: prompts, response schema and the Gemini client

pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod schema;

pub use gateway::{AiGateway, Operation};
pub use gemini::{GeminiGateway, GeminiSettings};
