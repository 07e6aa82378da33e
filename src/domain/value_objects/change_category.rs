use serde::{Deserialize, Serialize};
use std::fmt;

/// ファイル単位の変更カテゴリ
///
/// 作業ツリー・インデックス・HEADの比較結果を意味的に分類したもの。
/// `TypeChanged`、`Unreadable`、`Conflicted` は手動での解決が必要な
/// ブロッキング状態として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    /// 新規ファイル
    New,
    /// 変更されたファイル
    Modified,
    /// 削除されたファイル
    Deleted,
    /// リネームされたファイル
    Renamed,
    /// 種別が変わったファイル（通常ファイル⇔シンボリックリンクなど）
    TypeChanged,
    /// 読み取りできないファイル
    Unreadable,
    /// コンフリクト中のファイル
    Conflicted,
    /// 無視されたファイル
    Ignored,
    /// 変更なし
    Current,
}

impl ChangeCategory {
    /// すべてのカテゴリ
    pub const ALL: [ChangeCategory; 9] = [
        ChangeCategory::New,
        ChangeCategory::Modified,
        ChangeCategory::Deleted,
        ChangeCategory::Renamed,
        ChangeCategory::TypeChanged,
        ChangeCategory::Unreadable,
        ChangeCategory::Conflicted,
        ChangeCategory::Ignored,
        ChangeCategory::Current,
    ];

    /// 自動処理をブロックするカテゴリか
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ChangeCategory::TypeChanged | ChangeCategory::Unreadable | ChangeCategory::Conflicted
        )
    }

    /// ステージ・コミットの対象になるカテゴリか
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            ChangeCategory::New
                | ChangeCategory::Modified
                | ChangeCategory::Deleted
                | ChangeCategory::Renamed
        )
    }

    /// 一覧表示用の一文字コード
    pub fn short_code(&self) -> char {
        match self {
            ChangeCategory::New => 'A',
            ChangeCategory::Modified => 'M',
            ChangeCategory::Deleted => 'D',
            ChangeCategory::Renamed => 'R',
            ChangeCategory::TypeChanged => 'T',
            ChangeCategory::Unreadable => 'X',
            ChangeCategory::Conflicted => 'U',
            ChangeCategory::Ignored => '!',
            ChangeCategory::Current => ' ',
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeCategory::New => "new",
            ChangeCategory::Modified => "modified",
            ChangeCategory::Deleted => "deleted",
            ChangeCategory::Renamed => "renamed",
            ChangeCategory::TypeChanged => "type-changed",
            ChangeCategory::Unreadable => "unreadable",
            ChangeCategory::Conflicted => "conflicted",
            ChangeCategory::Ignored => "ignored",
            ChangeCategory::Current => "current",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_categories() {
        let blocking: Vec<_> = ChangeCategory::ALL
            .iter()
            .filter(|c| c.is_blocking())
            .copied()
            .collect();
        assert_eq!(
            blocking,
            vec![
                ChangeCategory::TypeChanged,
                ChangeCategory::Unreadable,
                ChangeCategory::Conflicted
            ]
        );
    }

    #[test]
    fn test_actionable_and_blocking_are_disjoint() {
        for category in ChangeCategory::ALL {
            assert!(!(category.is_actionable() && category.is_blocking()));
        }
        assert!(!ChangeCategory::Ignored.is_actionable());
        assert!(!ChangeCategory::Current.is_actionable());
    }

    #[test]
    fn test_display() {
        assert_eq!(ChangeCategory::TypeChanged.to_string(), "type-changed");
        assert_eq!(ChangeCategory::New.to_string(), "new");
    }
}
