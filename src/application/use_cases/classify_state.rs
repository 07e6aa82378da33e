use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::domain::entities::registry::RegistryView;
use crate::domain::entities::repository::{Classification, FileChange, Repository};
use crate::domain::value_objects::status_flags::StatusFlagCodec;
use crate::infrastructure::scm::scm_interface::HeadState;

/// 分類中に見つかった問題（いずれもバッチ全体には致命的でない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationIssue {
    #[error("{id}: resolve manually ({})", .paths.join(", "))]
    BlockingState { id: String, paths: Vec<String> },

    #[error("{id}: branch '{branch}' has no upstream, not checking for unpushed commits")]
    UpstreamMissing { id: String, branch: String },

    #[error("{id}: status unavailable: {message}")]
    StatusFailed { id: String, message: String },

    #[error("{id}: classification worker failed: {message}")]
    WorkerFailed { id: String, message: String },
}

impl ClassificationIssue {
    pub fn id(&self) -> &str {
        match self {
            ClassificationIssue::BlockingState { id, .. }
            | ClassificationIssue::UpstreamMissing { id, .. }
            | ClassificationIssue::StatusFailed { id, .. }
            | ClassificationIssue::WorkerFailed { id, .. } => id,
        }
    }

    /// 対象リポジトリの自動処理を止める問題か
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ClassificationIssue::UpstreamMissing { .. })
    }
}

/// 分類パスの結果
#[derive(Debug, Clone, Default)]
pub struct ClassificationReport {
    /// 分類したリポジトリ数
    pub classified: usize,

    /// 識別子順の問題一覧
    pub issues: Vec<ClassificationIssue>,
}

impl ClassificationReport {
    pub fn blocking_issues(&self) -> impl Iterator<Item = &ClassificationIssue> {
        self.issues.iter().filter(|issue| issue.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ClassificationIssue> {
        self.issues.iter().filter(|issue| !issue.is_blocking())
    }
}

/// 各リポジトリのファイル変更と派生フラグを計算する
#[derive(Debug, Clone)]
pub struct StateClassifier {
    jobs: usize,
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl StateClassifier {
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    /// 1件のリポジトリを分類する
    ///
    /// ステータスの取得に失敗しても他のリポジトリには影響しない。
    pub fn classify_repository(repository: &mut Repository) -> Vec<ClassificationIssue> {
        let id = repository.id().to_string();
        let mut issues = Vec::new();

        let (file_changes, status_error) = match repository.handle().status_entries() {
            Ok(entries) => {
                let changes = entries
                    .into_iter()
                    .map(|entry| FileChange::new(entry.path, StatusFlagCodec::flags(entry.raw)))
                    .collect();
                (changes, None)
            }
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

        let (head, status_error) = match repository.handle().head_state() {
            Ok(head) => (Some(head), status_error),
            Err(e) => (None, status_error.or_else(|| Some(e.to_string()))),
        };

        repository.apply_classification(Classification {
            file_changes,
            head,
            status_error,
        });

        if let Some(message) = repository.status_error() {
            warn!("{}: status unavailable: {}", id, message);
            issues.push(ClassificationIssue::StatusFailed {
                id: id.clone(),
                message: message.to_string(),
            });
        }

        if repository.has_blocking_error() {
            let paths: Vec<String> = repository
                .file_changes()
                .iter()
                .filter(|change| change.flags.is_blocking())
                .map(|change| change.path.clone())
                .collect();
            warn!("{}: blocking state in {}, resolve manually", id, paths.join(", "));
            issues.push(ClassificationIssue::BlockingState {
                id: id.clone(),
                paths,
            });
        }

        if let Some(HeadState::Branch {
            name,
            upstream: None,
        }) = repository.head()
        {
            warn!("{}: branch '{}' has no upstream", id, name);
            issues.push(ClassificationIssue::UpstreamMissing {
                id: id.clone(),
                branch: name.clone(),
            });
        }

        debug!(
            "{}: dirty={} staged={} ahead={} blocked={}",
            id,
            repository.is_dirty(),
            repository.is_staged(),
            repository.is_ahead(),
            repository.is_blocked()
        );
        issues
    }

    /// レジストリ全体を分類する
    ///
    /// `&mut` 借用の間はどのリポジトリにも他の処理は走らない。
    pub async fn classify(&self, registry: &mut RegistryView) -> ClassificationReport {
        let repositories = registry.take_all();
        let outcomes = self.classify_all(repositories).await;

        let mut report = ClassificationReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok((repository, issues)) => {
                    report.classified += 1;
                    report.issues.extend(issues);
                    registry.insert(repository);
                }
                Err(message) => {
                    error!("{}: classification worker failed, repository dropped: {}", id, message);
                    report
                        .issues
                        .push(ClassificationIssue::WorkerFailed { id, message });
                }
            }
        }
        report.issues.sort_by(|a, b| a.id().cmp(b.id()));
        report
    }

    /// 取り出したリポジトリを並列に分類する（入力順で返す）
    pub async fn classify_all(
        &self,
        repositories: Vec<Repository>,
    ) -> Vec<(String, Result<(Repository, Vec<ClassificationIssue>), String>)> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let tasks = repositories.into_iter().map(|mut repository| {
            let semaphore = semaphore.clone();
            let id = repository.id().to_string();
            async move {
                let _permit = semaphore.acquire_owned().await;
                let joined = tokio::task::spawn_blocking(move || {
                    let issues = Self::classify_repository(&mut repository);
                    (repository, issues)
                })
                .await
                .map_err(|e| e.to_string());
                (id, joined)
            }
        });
        join_all(tasks).await
    }
}
