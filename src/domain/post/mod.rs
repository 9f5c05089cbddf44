pub mod model;
pub mod repository;

pub use model::{AnalyzedPost, Post, Sentiment, SentimentResult, NO_CONTENT_PLACEHOLDER};
pub use repository::{MemoryPostRepository, PgPostRepository, PostQuery, PostRepository};
