use std::collections::BTreeMap;

use super::repository::{Repository, RepositorySummary};

/// 識別子からリポジトリへの対応表
///
/// 1回の実行の間だけ存在し、発見処理で一度だけ構築される。分類パスや
/// 一括処理はリポジトリを一時的に取り出し（[`take`](Self::take)）、処理後に
/// 戻す（[`restore`](Self::restore)）。
#[derive(Debug, Default)]
pub struct RegistryView {
    repositories: BTreeMap<String, Repository>,
}

impl RegistryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// リポジトリを登録し、同じ識別子で置き換えられたものを返す
    pub fn insert(&mut self, repository: Repository) -> Option<Repository> {
        self.repositories
            .insert(repository.id().to_string(), repository)
    }

    pub fn get(&self, id: &str) -> Option<&Repository> {
        self.repositories.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Repository> {
        self.repositories.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.repositories.contains_key(id)
    }

    /// 辞書順に並んだ識別子
    pub fn ids(&self) -> Vec<String> {
        self.repositories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// 識別子順に列挙
    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.values()
    }

    /// 指定されたリポジトリを取り出す
    ///
    /// 戻り値は取り出せたもの（指定順）と、登録されていなかった識別子。
    pub fn take(&mut self, ids: &[String]) -> (Vec<Repository>, Vec<String>) {
        let mut taken = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match self.repositories.remove(id) {
                Some(repository) => taken.push(repository),
                None => missing.push(id.clone()),
            }
        }
        (taken, missing)
    }

    /// すべてのリポジトリを取り出す
    pub fn take_all(&mut self) -> Vec<Repository> {
        std::mem::take(&mut self.repositories).into_values().collect()
    }

    /// 取り出したリポジトリを戻す
    pub fn restore(&mut self, repositories: impl IntoIterator<Item = Repository>) {
        for repository in repositories {
            self.insert(repository);
        }
    }

    /// 表示番号付きの要約（番号は識別子順に1から）
    pub fn summaries(&self) -> Vec<RepositorySummary> {
        self.repositories
            .values()
            .enumerate()
            .map(|(i, repository)| repository.summary(i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scm::scm_interface::MockWorkingCopy;
    use pretty_assertions::assert_eq;

    fn repo(id: &str, path: &str) -> Repository {
        Repository::new(id, path, Box::new(MockWorkingCopy::new()))
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut registry = RegistryView::new();
        registry.insert(repo("zeta", "/z"));
        registry.insert(repo("alpha", "/a"));
        registry.insert(repo("mid", "/m"));
        assert_eq!(registry.ids(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.summaries()[2].index, 3);
    }

    #[test]
    fn test_insert_returns_displaced_repository() {
        let mut registry = RegistryView::new();
        assert!(registry.insert(repo("tools", "/one/tools")).is_none());
        let displaced = registry.insert(repo("tools", "/two/tools")).unwrap();
        assert_eq!(displaced.path().to_str(), Some("/one/tools"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("tools").unwrap().path().to_str(),
            Some("/two/tools")
        );
    }

    #[test]
    fn test_take_and_restore() {
        let mut registry = RegistryView::new();
        registry.insert(repo("a", "/a"));
        registry.insert(repo("b", "/b"));

        let (taken, missing) = registry.take(&["b".to_string(), "x".to_string()]);
        assert_eq!(taken.len(), 1);
        assert_eq!(missing, vec!["x".to_string()]);
        assert!(!registry.contains("b"));

        registry.restore(taken);
        assert_eq!(registry.ids(), vec!["a", "b"]);

        let all = registry.take_all();
        assert_eq!(all.len(), 2);
        assert!(registry.is_empty());
    }
}
