use vader_sentiment::SentimentIntensityAnalyzer;

/// 感情スコアラーの抽象化トレイト
pub trait SentimentScorer: Send + Sync {
    /// テキストの複合スコア（-1.0〜1.0）を返す
    fn compound(&self, text: &str) -> f64;
}

/// VADER辞書による感情スコアラー
///
/// 辞書・強調語・否定語・大文字・"but"・感嘆符の補正は `vader_sentiment` に任せ、
/// 複合スコアだけを小数第4位に丸めて返す。
#[derive(Debug, Default, Clone, Copy)]
pub struct VaderScorer;

impl VaderScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        // 辞書は crate 側で一度だけ読み込まれるので、アナライザの生成は軽い
        let analyzer = SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or(0.0);
        round4(compound)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        VaderScorer::new().compound(text)
    }

    #[test]
    fn test_polarity_basic() {
        assert!(score("This is a good day") > 0.0);
        assert!(score("This is a horrible day") < 0.0);
        assert_eq!(score("The report lists the quarterly numbers"), 0.0);
        assert_eq!(score(""), 0.0);
        assert_eq!(score("   \n"), 0.0);
    }

    #[test]
    fn test_full_lexicon_words_are_scored() {
        // 一般的な語彙の多くが辞書に含まれていること
        let died = score("He died of cancer");
        assert!(died < 0.0, "否定的な文が負にならない: {}", died);

        let fraud = score("The murder was a fraud by a corrupt and greedy official");
        assert!(fraud < 0.0, "否定的な文が負にならない: {}", fraud);

        let victory = score("A thrilled crowd celebrated the victory");
        assert!(victory > 0.0, "肯定的な文が正にならない: {}", victory);
        println!("✅ died={}, fraud={}, victory={}", died, fraud, victory);
    }

    #[test]
    fn test_range_is_bounded() {
        let text = "love love love amazing awesome best wonderful perfect great!!!!";
        let value = score(text);
        assert!(value > 0.9 && value <= 1.0, "範囲外: {}", value);

        let value = score("hate hate worst horrible disaster tragedy kill");
        assert!(value < -0.9 && value >= -1.0, "範囲外: {}", value);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(score("The movie was good") > 0.0);
        assert!(score("The movie was not good") < 0.0);
        assert!(score("I don't like it") < 0.0);
    }

    #[test]
    fn test_booster_and_caps_strengthen() {
        let plain = score("The food was good");
        let boosted = score("The food was very good");
        let shouted = score("The food was GOOD");
        assert!(boosted > plain, "{} <= {}", boosted, plain);
        assert!(shouted > plain, "{} <= {}", shouted, plain);
    }

    #[test]
    fn test_but_shifts_weight() {
        // 後半の否定的な内容が優勢になる
        assert!(score("The hotel was nice but the service was terrible") < 0.0);
    }

    #[test]
    fn test_exclamation_amplifies() {
        assert!(score("Great job!!!") > score("Great job"));
    }

    #[test]
    fn test_rounded_to_four_places() {
        let value = score("I enjoy Finance and tech. Any help?");
        assert_eq!(value, round4(value));
        assert_eq!(value, score("I enjoy Finance and tech. Any help?"));
    }
}
