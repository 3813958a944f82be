pub mod article;
pub mod content;
