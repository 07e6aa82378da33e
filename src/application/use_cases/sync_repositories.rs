use serde::Serialize;
use tracing::info;

use crate::application::use_cases::bulk_actions::{ActionKind, ActionReport, BulkActionExecutor};
use crate::domain::entities::registry::RegistryView;

/// リポジトリ同期の設定
#[derive(Debug, Clone)]
pub struct SyncRepositoriesConfig {
    /// 作業ツリーの変更をインデックスに反映するか
    pub stage: bool,

    /// インデックスをコミットするか
    pub commit: bool,

    /// 進んでいるブランチをプッシュするか
    pub push: bool,

    /// コミットメッセージ
    pub message: String,
}

impl SyncRepositoriesConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            stage: false,
            commit: false,
            push: false,
            message: message.into(),
        }
    }

    /// stage・commit・push をすべて行う
    pub fn full(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_stage(true)
            .with_commit(true)
            .with_push(true)
    }

    pub fn with_stage(mut self, stage: bool) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// 実行する処理（常に stage → commit → push の順）
    pub fn actions(&self) -> Vec<ActionKind> {
        [
            (self.stage, ActionKind::Stage),
            (self.commit, ActionKind::Commit),
            (self.push, ActionKind::Push),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    pub fn has_actions(&self) -> bool {
        self.stage || self.commit || self.push
    }
}

/// 同期結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    /// 実行順の処理結果
    pub reports: Vec<ActionReport>,
}

impl SyncResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        !self.reports.iter().any(ActionReport::has_failures)
    }

    pub fn report(&self, action: ActionKind) -> Option<&ActionReport> {
        self.reports.iter().find(|report| report.action == action)
    }
}

/// 選択されたリポジトリに stage → commit → push を順に適用する
pub struct SyncRepositoriesUseCase {
    config: SyncRepositoriesConfig,
    executor: BulkActionExecutor,
}

impl SyncRepositoriesUseCase {
    pub fn new(config: SyncRepositoriesConfig, executor: BulkActionExecutor) -> Self {
        Self { config, executor }
    }

    /// 同期を実行
    ///
    /// 各処理の結果は完了するたびに `on_report` に渡される。
    pub async fn execute<F>(
        &self,
        registry: &mut RegistryView,
        selection: &[String],
        mut on_report: F,
    ) -> SyncResult
    where
        F: FnMut(&ActionReport),
    {
        let mut result = SyncResult::new();
        for action in self.config.actions() {
            info!("Running {} on {} repositories", action, selection.len());
            let report = match action {
                ActionKind::Stage => self.executor.stage(registry, selection).await,
                ActionKind::Commit => {
                    self.executor
                        .commit(registry, selection, &self.config.message)
                        .await
                }
                ActionKind::Push => self.executor.push(registry, selection).await,
            };
            on_report(&report);
            result.reports.push(report);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::bulk_actions::{ActionOutcome, BulkActionConfig};
    use crate::domain::entities::repository::Repository;
    use crate::domain::value_objects::identity::Identity;
    use crate::domain::value_objects::status_flags::StatusFlags;
    use crate::infrastructure::git::remote::SshAgentCredentials;
    use crate::infrastructure::scm::scm_interface::{
        HeadState, MockWorkingCopy, PushRequest, StatusEntry, UpstreamInfo,
    };
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn executor() -> BulkActionExecutor {
        BulkActionExecutor::new(BulkActionConfig {
            jobs: 1,
            committer: Identity::default_committer(),
            push: PushRequest {
                remote: "origin".to_string(),
                credentials: Arc::new(SshAgentCredentials::new("git")),
            },
        })
    }

    #[test]
    fn test_actions_follow_fixed_order() {
        let config = SyncRepositoriesConfig::new("m")
            .with_push(true)
            .with_stage(true);
        assert_eq!(config.actions(), vec![ActionKind::Stage, ActionKind::Push]);
        assert_eq!(
            SyncRepositoriesConfig::full("m").actions(),
            vec![ActionKind::Stage, ActionKind::Commit, ActionKind::Push]
        );
        assert!(!SyncRepositoriesConfig::new("m").has_actions());
    }

    /// ステージ・コミット・プッシュで状態が進む作業コピーを模擬する
    #[tokio::test]
    async fn test_full_sync_reads_fresh_state_between_actions() {
        // 0: dirty, 1: staged, 2: committed and ahead, 3: pushed
        let phase = Arc::new(Mutex::new(0u8));
        let mut mock = MockWorkingCopy::new();

        let status_phase = phase.clone();
        mock.expect_status_entries().returning(move || {
            let flags = match *status_phase.lock().unwrap() {
                0 => StatusFlags::WT_MODIFIED,
                1 => StatusFlags::INDEX_MODIFIED,
                _ => return Ok(vec![]),
            };
            Ok(vec![StatusEntry::new("notes.md", flags.bits())])
        });

        let head_phase = phase.clone();
        mock.expect_head_state().returning(move || {
            let ahead = if *head_phase.lock().unwrap() == 2 { 1 } else { 0 };
            Ok(HeadState::Branch {
                name: "main".to_string(),
                upstream: Some(UpstreamInfo {
                    name: "origin/main".to_string(),
                    ahead,
                    behind: 0,
                }),
            })
        });

        let stage_phase = phase.clone();
        mock.expect_update_index().times(1).returning(move |_, _| {
            *stage_phase.lock().unwrap() = 1;
            Ok(())
        });
        let commit_phase = phase.clone();
        mock.expect_commit_index().times(1).returning(move |_, _| {
            *commit_phase.lock().unwrap() = 2;
            Ok("feedfacecafebeef".to_string())
        });
        let push_phase = phase.clone();
        mock.expect_push_current_branch().times(1).returning(move |_| {
            *push_phase.lock().unwrap() = 3;
            Ok("refs/heads/main".to_string())
        });

        let mut registry = RegistryView::new();
        registry.insert(Repository::new("notes", "/r/notes", Box::new(mock)));

        let use_case = SyncRepositoriesUseCase::new(SyncRepositoriesConfig::full("sync"), executor());
        let mut seen = Vec::new();
        let result = use_case
            .execute(&mut registry, &["notes".to_string()], |report| {
                seen.push(report.action)
            })
            .await;

        assert!(result.is_success());
        assert_eq!(seen, vec![ActionKind::Stage, ActionKind::Commit, ActionKind::Push]);
        assert_eq!(
            result.report(ActionKind::Commit).unwrap().outcome("notes"),
            Some(&ActionOutcome::Success("feedfac".to_string()))
        );
        let notes = registry.get("notes").unwrap();
        assert!(!notes.is_dirty());
        assert!(!notes.is_ahead());
    }
}
