//! Common test utilities and helpers
//!
//! Builds throwaway fleets of real git working copies (with bare remotes and
//! upstream tracking) below a temporary directory.

#![allow(dead_code)]

use git2::{Repository, RepositoryInitOptions, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding working copies and their bare remotes
pub struct Fleet {
    pub temp_dir: TempDir,
}

impl Fleet {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Directory scanned for working copies
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("src")
    }

    /// Directory holding the bare remotes, outside of [`Fleet::root`]
    pub fn remotes(&self) -> PathBuf {
        self.temp_dir.path().join("remotes")
    }

    /// Empty configuration file so the user's own configuration never leaks in
    pub fn config_file(&self) -> PathBuf {
        let path = self.temp_dir.path().join("config.yaml");
        if !path.exists() {
            std::fs::write(&path, "").expect("Failed to write config");
        }
        path
    }

    /// Working copy with one commit on `main` and no remote
    pub fn local_repo(&self, name: &str) -> Repository {
        let path = self.root().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create repo dir");
        let repo = init_repo(&path);
        commit_file(&repo, "README.md", &format!("# {}\n", name), "initial commit");
        repo
    }

    /// Working copy whose `main` tracks `origin/main` on a bare remote, in sync
    pub fn tracked_repo(&self, name: &str) -> Repository {
        let repo = self.local_repo(name);
        let remote_path = self.remotes().join(format!("{}.git", name));
        std::fs::create_dir_all(&remote_path).expect("Failed to create remote dir");
        Repository::init_bare(&remote_path).expect("Failed to init bare remote");

        repo.remote("origin", remote_path.to_str().expect("utf-8 path"))
            .expect("Failed to add remote");
        {
            let mut remote = repo.find_remote("origin").expect("origin");
            remote
                .push(&["refs/heads/main:refs/heads/main"], None)
                .expect("Failed to seed remote");
        }
        let head = repo.head().expect("head").target().expect("oid");
        repo.reference("refs/remotes/origin/main", head, true, "seed tracking ref")
            .expect("Failed to create tracking ref");
        {
            let mut config = repo.config().expect("config");
            config
                .set_str("branch.main.remote", "origin")
                .expect("branch remote");
            config
                .set_str("branch.main.merge", "refs/heads/main")
                .expect("branch merge");
        }
        repo
    }

    /// Tip of `main` on the bare remote of `name`
    pub fn remote_head(&self, name: &str) -> git2::Oid {
        let remote = Repository::open_bare(self.remotes().join(format!("{}.git", name)))
            .expect("Failed to open bare remote");
        remote
            .refname_to_id("refs/heads/main")
            .expect("remote main")
    }
}

/// `git init` with `main` as initial branch and a configured author
pub fn init_repo(path: &Path) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    let repo = Repository::init_opts(path, &options).expect("Failed to init repo");
    {
        let mut config = repo.config().expect("config");
        config.set_str("user.name", "Test Author").expect("user.name");
        config
            .set_str("user.email", "author@example.com")
            .expect("user.email");
    }
    repo
}

/// Write `name`, stage it and commit it on HEAD
pub fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
    let root = repo.workdir().expect("workdir").to_path_buf();
    std::fs::write(root.join(name), content).expect("Failed to write file");
    let mut index = repo.index().expect("index");
    index.add_path(Path::new(name)).expect("add_path");
    index.write().expect("index write");
    let tree = repo
        .find_tree(index.write_tree().expect("write_tree"))
        .expect("tree");
    let sig = Signature::now("Test Author", "author@example.com").expect("signature");
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("head commit")],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("Failed to commit")
}

/// Overwrite a file in the working tree without staging it
pub fn write_file(repo: &Repository, name: &str, content: &str) {
    let root = repo.workdir().expect("workdir").to_path_buf();
    if let Some(parent) = root.join(name).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create dir");
    }
    std::fs::write(root.join(name), content).expect("Failed to write file");
}

/// Message of the commit HEAD points at
pub fn head_message(repo: &Repository) -> String {
    repo.head()
        .expect("head")
        .peel_to_commit()
        .expect("commit")
        .message()
        .unwrap_or_default()
        .to_string()
}
