// Conversational Q&A adapter: prompt construction and API client.

pub mod client;
pub mod prompt;
