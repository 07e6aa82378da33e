use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::entities::{registry::RegistryView, repository::Repository};
use crate::infrastructure::filesystem::config_store::expand_home;
use crate::infrastructure::git::repository::GitRepository;
use crate::infrastructure::scm::scm_interface::{ScmError, WorkingCopy};

/// 作業コピーのマーカー名
pub const MARKER_NAME: &str = ".git";

/// 発見処理で起きた致命的でない問題
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid root pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Cannot read {path}: {message}")]
    WalkFailed { path: PathBuf, message: String },

    #[error("Cannot open working copy at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: ScmError,
    },

    #[error("Repository id '{id}' at {shadowed} is replaced by {kept}")]
    DuplicateId {
        id: String,
        kept: PathBuf,
        shadowed: PathBuf,
    },

    #[error("Discovery worker failed: {0}")]
    WorkerFailed(String),
}

/// 発見処理の設定
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// ルートパスのパターン（`~` とシェルのglobを使用可）
    pub roots: Vec<String>,

    /// 各ルート以下でマーカーを探す深さ
    pub max_depth: usize,

    /// 同時に開くリポジトリ数
    pub jobs: usize,
}

impl DiscoveryConfig {
    pub fn new(roots: Vec<String>) -> Self {
        Self {
            roots,
            max_depth: 6,
            jobs: num_cpus::get(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

/// 発見処理の結果
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    /// 構築されたレジストリ
    pub registry: RegistryView,

    /// 展開後に存在したルートディレクトリ
    pub roots: Vec<PathBuf>,

    /// 除外・置換の記録
    pub issues: Vec<DiscoveryError>,
}

/// ルート以下の作業コピーを探してレジストリを構築する
///
/// ファイルシステムには一切書き込まない。
pub struct RepositoryDiscovery {
    config: DiscoveryConfig,
}

impl RepositoryDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// 発見処理を実行
    pub async fn discover(&self) -> DiscoveryResult {
        let mut issues = Vec::new();
        let roots = resolve_roots(&self.config.roots, &mut issues);
        debug!("Scanning {} root(s)", roots.len());

        // ルートごとの探索は並列、結果はルート順に連結する
        let max_depth = self.config.max_depth;
        let walks = roots.iter().cloned().map(|root| {
            tokio::task::spawn_blocking(move || find_working_copies(&root, max_depth))
        });
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        for walk in join_all(walks).await {
            match walk {
                Ok((paths, walk_issues)) => {
                    issues.extend(walk_issues);
                    for path in paths {
                        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
                        if seen.insert(key) {
                            candidates.push(path);
                        } else {
                            debug!("Skipping {} (already found)", path.display());
                        }
                    }
                }
                Err(e) => issues.push(DiscoveryError::WorkerFailed(e.to_string())),
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.jobs.max(1)));
        let opens = candidates.into_iter().map(|path| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire_owned().await;
                let worker_path = path.clone();
                let opened = tokio::task::spawn_blocking(move || open_working_copy(&worker_path)).await;
                (path, opened)
            }
        });

        let mut registry = RegistryView::new();
        for (path, opened) in join_all(opens).await {
            let handle = match opened {
                Ok(Ok(handle)) => handle,
                Ok(Err(source)) => {
                    warn!("Cannot open working copy at {}: {}", path.display(), source);
                    issues.push(DiscoveryError::OpenFailed { path, source });
                    continue;
                }
                Err(e) => {
                    issues.push(DiscoveryError::WorkerFailed(e.to_string()));
                    continue;
                }
            };

            let id = repository_id(&path);
            if let Some(shadowed) = registry.insert(Repository::new(id.clone(), path.clone(), handle)) {
                warn!(
                    "Repository id '{}' is used by {} and {}; keeping the latter",
                    id,
                    shadowed.path().display(),
                    path.display()
                );
                issues.push(DiscoveryError::DuplicateId {
                    id,
                    kept: path,
                    shadowed: shadowed.path().to_path_buf(),
                });
            }
        }

        info!("Discovered {} repositories", registry.len());
        DiscoveryResult {
            registry,
            roots,
            issues,
        }
    }
}

/// ルートパターンを展開し、存在するディレクトリだけを残す
///
/// 何にも一致しないパターンは黙って読み飛ばす。
pub fn resolve_roots(patterns: &[String], issues: &mut Vec<DiscoveryError>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for pattern in patterns {
        let expanded = expand_home(pattern);
        let paths = match glob::glob(&expanded) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid root pattern '{}': {}", pattern, e);
                issues.push(DiscoveryError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        for entry in paths {
            match entry {
                Ok(path) if path.is_dir() => {
                    if !roots.contains(&path) {
                        roots.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => issues.push(DiscoveryError::WalkFailed {
                    path: e.path().to_path_buf(),
                    message: e.error().to_string(),
                }),
            }
        }
    }
    roots
}

/// `root` 以下で `.git` を持つディレクトリを名前順に探す
///
/// 作業コピーの中もたどるため、入れ子のリポジトリも見つかる。
pub fn find_working_copies(root: &Path, max_depth: usize) -> (Vec<PathBuf>, Vec<DiscoveryError>) {
    let mut found = Vec::new();
    let mut issues = Vec::new();

    let mut walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                debug!("Walk error below {}: {}", root.display(), e);
                issues.push(DiscoveryError::WalkFailed {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if entry.file_name() != MARKER_NAME {
            continue;
        }
        if let Some(parent) = entry.path().parent() {
            found.push(parent.to_path_buf());
        }
        if entry.file_type().is_dir() {
            walker.skip_current_dir();
        }
    }

    (found, issues)
}

/// 作業コピーのディレクトリ名を識別子にする
pub fn repository_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn open_working_copy(path: &Path) -> Result<Box<dyn WorkingCopy>, ScmError> {
    let repository = GitRepository::open(path)?;
    Ok(Box::new(repository))
}
