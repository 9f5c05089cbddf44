pub mod scorer;

pub use scorer::{SentimentScorer, VaderScorer};

use crate::domain::post::model::{Post, SentimentResult};

/// 投稿ごとに本文の複合スコアを計算し、符号で分類する
///
/// 入力と同じ順序で結果を返す。
pub fn analyse_sentiment(posts: &[Post], scorer: &dyn SentimentScorer) -> Vec<SentimentResult> {
    posts
        .iter()
        .map(|post| {
            let score = scorer.compound(&post.content);
            SentimentResult::new(post.title.clone(), post.content.clone(), score)
        })
        .collect()
}
