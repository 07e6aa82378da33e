//! 曖昧一致のための類似度スコア
//!
//! スコアは 0〜100 の整数。選択処理が依存するのはこの範囲としきい値の意味
//! だけで、具体的なアルゴリズムは差し替えられる。

use strsim::normalized_levenshtein;

/// 問い合わせ文字列と候補の類似度を計算する
pub trait SimilarityScorer: Send + Sync {
    /// `0..=100` の類似度
    fn score(&self, query: &str, candidate: &str) -> u8;
}

/// 長さの差に応じて全体一致と部分一致を重み付けするスコア
///
/// 短い問い合わせ（`ap` など）が長い識別子の一部と一致する場合でも
/// 高いスコアになる。
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl WeightedRatio {
    /// 全体の編集距離による類似度
    pub fn ratio(a: &str, b: &str) -> f64 {
        normalized_levenshtein(a, b) * 100.0
    }

    /// 短い方を長い方の上で滑らせたときの最大類似度
    pub fn partial_ratio(a: &str, b: &str) -> f64 {
        let (short, long) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };
        let short_len = short.chars().count();
        let long_chars: Vec<char> = long.chars().collect();
        if short_len == 0 {
            return 0.0;
        }

        (0..=long_chars.len() - short_len)
            .map(|start| {
                let window: String = long_chars[start..start + short_len].iter().collect();
                Self::ratio(short, &window)
            })
            .fold(0.0, f64::max)
    }

    /// 単語を並べ替えてから比較した類似度
    pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
        Self::ratio(&sorted_tokens(a), &sorted_tokens(b))
    }
}

impl SimilarityScorer for WeightedRatio {
    fn score(&self, query: &str, candidate: &str) -> u8 {
        let query = normalize(query);
        let candidate = normalize(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0;
        }

        let base = Self::ratio(&query, &candidate);
        let query_len = query.chars().count() as f64;
        let candidate_len = candidate.chars().count() as f64;
        let length_ratio = query_len.max(candidate_len) / query_len.min(candidate_len);

        let best = if length_ratio < 1.5 {
            base.max(Self::token_sort_ratio(&query, &candidate) * 0.95)
        } else {
            let partial_scale = if length_ratio < 8.0 { 0.9 } else { 0.6 };
            base.max(Self::partial_ratio(&query, &candidate) * partial_scale)
        };

        best.round().clamp(0.0, 100.0) as u8
    }
}

/// 小文字化し、英数字以外を空白にして連続空白をまとめる
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
