use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::application::use_cases::classify_state::StateClassifier;
use crate::domain::entities::registry::RegistryView;
use crate::domain::entities::repository::Repository;
use crate::domain::value_objects::identity::Identity;
use crate::domain::value_objects::status_flags::StatusFlags;
use crate::infrastructure::scm::scm_interface::{HeadState, PushRequest};

/// 一括処理の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Stage,
    Commit,
    Push,
}

impl ActionKind {
    /// 成功時の表示（`Indexed repo` など）
    pub fn past_tense(&self) -> &'static str {
        match self {
            ActionKind::Stage => "Indexed",
            ActionKind::Commit => "Committed",
            ActionKind::Push => "Pushed",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Stage => "stage",
            ActionKind::Commit => "commit",
            ActionKind::Push => "push",
        };
        write!(f, "{}", name)
    }
}

/// リポジトリ1件分の処理結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ActionOutcome {
    Success(String),
    Skipped(String),
    Failed(String),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ActionOutcome::Failed(_))
    }
}

/// 1種類の一括処理の結果（選択順）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub action: ActionKind,
    pub results: Vec<(String, ActionOutcome)>,
}

impl ActionReport {
    pub fn outcome(&self, id: &str) -> Option<&ActionOutcome> {
        self.results
            .iter()
            .find(|(result_id, _)| result_id == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|(_, outcome)| outcome.is_failed())
    }

    pub fn count_successes(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn count_failures(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_failed()).count()
    }
}

/// 一括処理の設定
#[derive(Debug, Clone)]
pub struct BulkActionConfig {
    /// 同時に処理するリポジトリ数
    pub jobs: usize,

    /// コミッター（作者とは別のボット）
    pub committer: Identity,

    /// プッシュ先と認証情報
    pub push: PushRequest,
}

/// 選択されたリポジトリにステージ・コミット・プッシュを適用する
///
/// 各リポジトリは独立に処理され、1件の失敗がバッチを止めることはない。
/// ワーカーは処理の前後でそのリポジトリを分類し直すため、次の処理は
/// 常に最新の `dirty`/`staged`/`ahead` を読む。
pub struct BulkActionExecutor {
    config: BulkActionConfig,
}

impl BulkActionExecutor {
    pub fn new(config: BulkActionConfig) -> Self {
        Self { config }
    }

    /// 変更をインデックスに反映する
    pub async fn stage(&self, registry: &mut RegistryView, selection: &[String]) -> ActionReport {
        self.run(ActionKind::Stage, registry, selection, Self::stage_repository)
            .await
    }

    /// インデックスの内容をコミットする
    pub async fn commit(
        &self,
        registry: &mut RegistryView,
        selection: &[String],
        message: &str,
    ) -> ActionReport {
        let message = message.to_string();
        let committer = self.config.committer.clone();
        self.run(ActionKind::Commit, registry, selection, move |repository| {
            Self::commit_repository(repository, &message, &committer)
        })
        .await
    }

    /// 上流より進んでいるブランチをプッシュする
    pub async fn push(&self, registry: &mut RegistryView, selection: &[String]) -> ActionReport {
        let request = self.config.push.clone();
        self.run(ActionKind::Push, registry, selection, move |repository| {
            Self::push_repository(repository, &request)
        })
        .await
    }

    async fn run<F>(
        &self,
        action: ActionKind,
        registry: &mut RegistryView,
        selection: &[String],
        operation: F,
    ) -> ActionReport
    where
        F: Fn(&mut Repository) -> ActionOutcome + Send + Sync + 'static,
    {
        let mut seen = HashSet::new();
        let ordered: Vec<String> = selection
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let (repositories, missing) = registry.take(&ordered);
        let operation = Arc::new(operation);
        let semaphore = Arc::new(Semaphore::new(self.config.jobs.max(1)));

        let tasks = repositories.into_iter().map(|mut repository| {
            let operation = operation.clone();
            let semaphore = semaphore.clone();
            let id = repository.id().to_string();
            async move {
                let _permit = semaphore.acquire_owned().await;
                let joined = tokio::task::spawn_blocking(move || {
                    StateClassifier::classify_repository(&mut repository);
                    let outcome = (*operation)(&mut repository);
                    StateClassifier::classify_repository(&mut repository);
                    (repository, outcome)
                })
                .await;
                (id, joined)
            }
        });

        let mut outcomes: HashMap<String, ActionOutcome> = HashMap::new();
        for (id, joined) in join_all(tasks).await {
            match joined {
                Ok((repository, outcome)) => {
                    debug!("{} {}: {:?}", action, id, outcome);
                    registry.insert(repository);
                    outcomes.insert(id, outcome);
                }
                Err(e) => {
                    error!("{} worker for {} failed, repository dropped: {}", action, id, e);
                    outcomes.insert(id, ActionOutcome::Failed(format!("worker failed: {}", e)));
                }
            }
        }
        for id in missing {
            outcomes.insert(id, ActionOutcome::Failed("unknown repository".to_string()));
        }

        let results: Vec<(String, ActionOutcome)> = ordered
            .into_iter()
            .filter_map(|id| outcomes.remove(&id).map(|outcome| (id, outcome)))
            .collect();
        let report = ActionReport { action, results };
        info!(
            "{}: {} succeeded, {} failed, {} total",
            action,
            report.count_successes(),
            report.count_failures(),
            report.results.len()
        );
        report
    }

    /// 作業ツリー層の変更をインデックスに追加・削除する
    pub fn stage_repository(repository: &mut Repository) -> ActionOutcome {
        if repository.is_blocked() {
            return ActionOutcome::Skipped(blocked_reason(repository));
        }
        if !repository.is_dirty() {
            return ActionOutcome::Skipped("clean".to_string());
        }

        let mut additions = Vec::new();
        let mut removals = Vec::new();
        for change in repository.file_changes() {
            if !change.flags.has_worktree_changes() {
                continue;
            }
            if change.is_nested_working_copy() {
                warn!(
                    "{}: skipping nested working copy {}",
                    repository.id(),
                    change.path
                );
                continue;
            }
            if change.flags.contains(StatusFlags::WT_DELETED) {
                removals.push(change.path.clone());
            } else {
                additions.push(change.path.clone());
            }
        }
        if additions.is_empty() && removals.is_empty() {
            return ActionOutcome::Skipped("nothing to stage".to_string());
        }

        match repository.handle_mut().update_index(&additions, &removals) {
            Ok(()) => ActionOutcome::Success(format!(
                "{} added, {} removed",
                additions.len(),
                removals.len()
            )),
            Err(e) => ActionOutcome::Failed(e.to_string()),
        }
    }

    /// インデックスに差分があればコミットする
    pub fn commit_repository(
        repository: &mut Repository,
        message: &str,
        committer: &Identity,
    ) -> ActionOutcome {
        if repository.is_blocked() {
            return ActionOutcome::Skipped(blocked_reason(repository));
        }
        if !repository.is_staged() {
            return ActionOutcome::Skipped("nothing staged".to_string());
        }

        match repository.handle_mut().commit_index(message, committer) {
            Ok(oid) => ActionOutcome::Success(oid.chars().take(7).collect()),
            Err(e) => ActionOutcome::Failed(e.to_string()),
        }
    }

    /// 進んでいるブランチをプッシュする
    pub fn push_repository(repository: &mut Repository, request: &PushRequest) -> ActionOutcome {
        if repository.is_blocked() {
            return ActionOutcome::Skipped(blocked_reason(repository));
        }
        if !repository.is_ahead() {
            let reason = match repository.head() {
                Some(HeadState::Branch { upstream: None, .. }) => "no upstream",
                Some(HeadState::Detached { .. }) => "detached HEAD",
                Some(HeadState::Unborn) => "no commits",
                _ => "up to date",
            };
            return ActionOutcome::Skipped(reason.to_string());
        }

        match repository.handle_mut().push_current_branch(request) {
            Ok(refname) => ActionOutcome::Success(format!("{} -> {}", refname, request.remote)),
            Err(e) => ActionOutcome::Failed(e.to_string()),
        }
    }
}

fn blocked_reason(repository: &Repository) -> String {
    match repository.status_error() {
        Some(message) => format!("status unavailable: {}", message),
        None => "blocked, resolve manually".to_string(),
    }
}
