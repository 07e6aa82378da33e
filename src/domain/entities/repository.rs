use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::change_category::ChangeCategory;
use crate::domain::value_objects::status_flags::StatusFlags;
use crate::infrastructure::scm::scm_interface::{HeadState, WorkingCopy};

/// 1ファイル分の変更記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// 作業コピーのルートからの相対パス
    pub path: String,
    /// インデックス層と作業ツリー層を区別したフラグ
    pub flags: StatusFlags,
}

impl FileChange {
    pub fn new(path: impl Into<String>, flags: StatusFlags) -> Self {
        Self {
            path: path.into(),
            flags,
        }
    }

    /// このファイルの変更カテゴリ
    pub fn categories(&self) -> BTreeSet<ChangeCategory> {
        self.flags.categories()
    }

    /// 入れ子の作業コピー（`vendor/inner/` のように `/` で終わる未追跡ディレクトリ）か
    ///
    /// インデックスには追加できないため、ステージ対象にも `dirty` の判定にも含めない。
    pub fn is_nested_working_copy(&self) -> bool {
        self.path.ends_with('/')
    }
}

/// 1回の分類パスで得られた生の結果
///
/// 派生フラグはここからのみ計算される。
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub file_changes: Vec<FileChange>,
    pub head: Option<HeadState>,
    pub status_error: Option<String>,
}

/// 発見された作業コピー1件
pub struct Repository {
    /// レジストリ内の識別子（ディレクトリ名）
    id: String,

    /// 作業コピーのルート
    path: PathBuf,

    /// 発見時に開いたハンドル（以後すべての操作で再利用）
    handle: Box<dyn WorkingCopy>,

    /// パス順に並んだファイル変更。分類のたびに丸ごと置き換える
    file_changes: Vec<FileChange>,

    dirty: bool,
    staged: bool,
    ahead: bool,
    has_blocking_error: bool,
    head: Option<HeadState>,
    status_error: Option<String>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("file_changes", &self.file_changes)
            .field("dirty", &self.dirty)
            .field("staged", &self.staged)
            .field("ahead", &self.ahead)
            .field("has_blocking_error", &self.has_blocking_error)
            .field("head", &self.head)
            .field("status_error", &self.status_error)
            .finish()
    }
}

impl Repository {
    /// 未分類のリポジトリを作成
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, handle: Box<dyn WorkingCopy>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            handle,
            file_changes: Vec::new(),
            dirty: false,
            staged: false,
            ahead: false,
            has_blocking_error: false,
            head: None,
            status_error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> &dyn WorkingCopy {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> &mut dyn WorkingCopy {
        self.handle.as_mut()
    }

    pub fn file_changes(&self) -> &[FileChange] {
        &self.file_changes
    }

    /// `(相対パス, カテゴリ)` の組をパス・カテゴリ順に列挙
    pub fn change_pairs(&self) -> impl Iterator<Item = (&str, ChangeCategory)> + '_ {
        self.file_changes.iter().flat_map(|change| {
            change
                .categories()
                .into_iter()
                .map(move |category| (change.path.as_str(), category))
        })
    }

    /// ステージ可能な変更があるか
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// インデックスにHEADとの差分があるか
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// 上流ブランチにないコミットがあるか
    ///
    /// 上流より遅れているだけのブランチは `ahead` ではない（プッシュするものがない）。
    /// 分岐している場合は、ローカルにしかないコミットがあるので `ahead` になる。
    pub fn is_ahead(&self) -> bool {
        self.ahead
    }

    pub fn has_blocking_error(&self) -> bool {
        self.has_blocking_error
    }

    /// ステータスの取得自体に失敗した理由
    pub fn status_error(&self) -> Option<&str> {
        self.status_error.as_deref()
    }

    /// 自動処理の対象外か（ブロッキング状態またはステータス取得失敗）
    pub fn is_blocked(&self) -> bool {
        self.has_blocking_error || self.status_error.is_some()
    }

    pub fn head(&self) -> Option<&HeadState> {
        self.head.as_ref()
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.head.as_ref().and_then(HeadState::branch_name)
    }

    /// 分類結果を反映し、派生フラグを再計算する
    pub fn apply_classification(&mut self, classification: Classification) {
        let Classification {
            mut file_changes,
            head,
            status_error,
        } = classification;
        file_changes.sort_by(|a, b| a.path.cmp(&b.path));

        let categories: BTreeSet<ChangeCategory> = file_changes
            .iter()
            .filter(|change| !change.is_nested_working_copy())
            .flat_map(FileChange::categories)
            .collect();

        self.has_blocking_error = categories.iter().any(ChangeCategory::is_blocking);
        self.dirty = categories.iter().any(ChangeCategory::is_actionable);
        self.staged = file_changes.iter().any(|c| c.flags.has_index_changes());
        // 遅れているだけ (ahead == 0, behind > 0) なら false
        self.ahead = head
            .as_ref()
            .and_then(HeadState::upstream)
            .map(|upstream| upstream.ahead > 0)
            .unwrap_or(false);
        self.file_changes = file_changes;
        self.head = head;
        self.status_error = status_error;
    }

    /// 出力用の要約
    pub fn summary(&self, index: usize) -> RepositorySummary {
        RepositorySummary {
            index,
            id: self.id.clone(),
            path: self.path.clone(),
            branch: self.branch_name().map(str::to_string),
            upstream: self
                .head
                .as_ref()
                .and_then(HeadState::upstream)
                .map(|u| u.name.clone()),
            dirty: self.dirty,
            staged: self.staged,
            ahead: self.ahead,
            blocked: self.is_blocked(),
            status_error: self.status_error.clone(),
            changes: self
                .file_changes
                .iter()
                .map(|change| FileChangeSummary {
                    path: change.path.clone(),
                    categories: change.categories().into_iter().collect(),
                })
                .collect(),
        }
    }
}

/// 一覧出力（JSON/YAML）用のリポジトリ要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    /// 1始まりの表示番号
    pub index: usize,
    pub id: String,
    pub path: PathBuf,
    pub branch: Option<String>,
    pub upstream: Option<String>,
    pub dirty: bool,
    pub staged: bool,
    pub ahead: bool,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_error: Option<String>,
    pub changes: Vec<FileChangeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeSummary {
    pub path: String,
    pub categories: Vec<ChangeCategory>,
}
