use std::path::PathBuf;
use tracing::debug;

use super::similarity::{SimilarityScorer, WeightedRatio};

/// 曖昧一致として受け入れる最低スコア
pub const FUZZY_THRESHOLD: u8 = 65;

/// 全件を選ぶ回答
const EVERY_TOKENS: [&str; 2] = ["a", "all"];

/// キャンセルとみなす回答
const CANCEL_TOKENS: [&str; 4] = ["c", "cancel", "q", "quit"];

/// 選択結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 空でない識別子の列
    Selected(Vec<String>),
    /// 何も選ばれなかった
    Cancelled,
}

impl Selection {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Selection::Cancelled)
    }

    pub fn ids(&self) -> &[String] {
        match self {
            Selection::Selected(ids) => ids,
            Selection::Cancelled => &[],
        }
    }

    fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            Selection::Cancelled
        } else {
            Selection::Selected(ids)
        }
    }
}

/// 候補の中から選んでもらうための問い合わせ
///
/// 有効な番号は `1..=choices.len()`。`None` は入力が得られなかったことを表し、
/// キャンセルとして扱われる。
pub trait SelectionPrompt {
    fn choose(&mut self, question: &str, choices: &[String]) -> Option<String>;
}

/// 常に同じ回答を返すプロンプト（`--force` やテスト用）
#[derive(Debug, Clone)]
pub struct FixedPrompt {
    answer: Option<String>,

    /// 提示された候補の記録
    pub asked: Vec<Vec<String>>,
}

impl FixedPrompt {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            asked: Vec::new(),
        }
    }

    /// 何も答えないプロンプト
    pub fn silent() -> Self {
        Self {
            answer: None,
            asked: Vec::new(),
        }
    }
}

impl SelectionPrompt for FixedPrompt {
    fn choose(&mut self, _question: &str, choices: &[String]) -> Option<String> {
        self.asked.push(choices.to_vec());
        self.answer.clone()
    }
}

/// 問い合わせ文字列をリポジトリ識別子に解決する
pub struct SelectionResolver {
    scorer: Box<dyn SimilarityScorer>,
    current_dir: Option<PathBuf>,
}

impl Default for SelectionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionResolver {
    pub fn new() -> Self {
        Self {
            scorer: Box::new(WeightedRatio),
            current_dir: std::env::current_dir().ok(),
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// `.` の解決に使うディレクトリ
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// `query` を `candidates` に対して解決する
    ///
    /// 優先順位は `all`、`.`（カレントディレクトリ名）、完全一致、表示番号、
    /// 曖昧一致。曖昧一致で最高点が並んだ場合だけ `prompt` に問い合わせる。
    pub fn resolve(
        &self,
        query: &str,
        candidates: &[String],
        prompt: &mut dyn SelectionPrompt,
    ) -> Selection {
        let sorted = sorted_unique(candidates);
        if sorted.is_empty() {
            return Selection::Cancelled;
        }

        let mut query = query.trim().to_string();
        if query.eq_ignore_ascii_case("all") {
            return Selection::Selected(sorted);
        }

        if query == "." {
            match self.current_dir_name() {
                Some(name) => query = name,
                None => return Selection::Cancelled,
            }
        }

        if sorted.contains(&query) {
            return Selection::Selected(vec![query]);
        }

        if !query.is_empty() && query.chars().all(|c| c.is_ascii_digit()) {
            return match pick_numbered(&query, &sorted) {
                Some(id) => Selection::Selected(vec![id]),
                None => {
                    debug!("Number {} is outside 1-{}", query, sorted.len());
                    Selection::Cancelled
                }
            };
        }

        self.resolve_fuzzy(&query, &sorted, prompt)
    }

    /// 一覧から選んでもらう（セレクタが指定されなかった場合）
    pub fn select_interactively(
        &self,
        candidates: &[String],
        prompt: &mut dyn SelectionPrompt,
    ) -> Selection {
        let sorted = sorted_unique(candidates);
        if sorted.is_empty() {
            return Selection::Cancelled;
        }

        let Some(answer) = prompt.choose("Which repo(s)?", &sorted) else {
            return Selection::Cancelled;
        };
        let answer = answer.trim().to_lowercase();
        if EVERY_TOKENS.contains(&answer.as_str()) {
            return Selection::Selected(sorted);
        }
        if answer.is_empty() || CANCEL_TOKENS.contains(&answer.as_str()) {
            return Selection::Cancelled;
        }
        self.resolve(&answer, &sorted, prompt)
    }

    fn resolve_fuzzy(
        &self,
        query: &str,
        sorted: &[String],
        prompt: &mut dyn SelectionPrompt,
    ) -> Selection {
        let scores: Vec<(&String, u8)> = sorted
            .iter()
            .map(|id| (id, self.scorer.score(query, id)))
            .collect();
        let best = scores.iter().map(|(_, score)| *score).max().unwrap_or(0);
        debug!("Best fuzzy score for '{}' is {}", query, best);
        if best < FUZZY_THRESHOLD {
            return Selection::Cancelled;
        }

        let tied: Vec<String> = scores
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(id, _)| id.clone())
            .collect();
        if tied.len() == 1 {
            return Selection::Selected(tied);
        }

        match prompt.choose("Multiple matches, which one(s)?", &tied) {
            Some(answer) => interpret_answer(&answer, &tied),
            None => Selection::Cancelled,
        }
    }

    fn current_dir_name(&self) -> Option<String> {
        self.current_dir
            .as_ref()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// 番号・`all`・キャンセルの回答を解釈する（それ以外はキャンセル）
pub fn interpret_answer(answer: &str, choices: &[String]) -> Selection {
    let answer = answer.trim().to_lowercase();
    if EVERY_TOKENS.contains(&answer.as_str()) {
        return Selection::from_ids(sorted_unique(choices));
    }
    if CANCEL_TOKENS.contains(&answer.as_str()) {
        return Selection::Cancelled;
    }
    let sorted = sorted_unique(choices);
    match pick_numbered(&answer, &sorted) {
        Some(id) => Selection::Selected(vec![id]),
        None => Selection::Cancelled,
    }
}

fn pick_numbered(number: &str, sorted: &[String]) -> Option<String> {
    let n: usize = number.parse().ok()?;
    if n == 0 {
        return None;
    }
    sorted.get(n - 1).cloned()
}

fn sorted_unique(ids: &[String]) -> Vec<String> {
    let mut sorted = ids.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}
