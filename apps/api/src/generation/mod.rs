// Digest generation: prompt building, comparative scoring, content ideas,
// and the pipeline that ties them to fetch, render and delivery.
// All model calls go through llm_client::TextGenerator.

pub mod content;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod scorer;
