//! Per-file status bitmask and its decoding into [`ChangeCategory`] values.
//!
//! Bit positions follow libgit2's `git_status_t`, so raw values coming out of
//! the version-control backend can be decoded without translation.
//!
//! Unknown bits are dropped on decode. A future backend that grows new status
//! bits therefore degrades to "no information" for those bits instead of
//! failing the whole classification pass.

use super::change_category::ChangeCategory;
use bitflags::bitflags;
use std::collections::BTreeSet;

bitflags! {
    /// Raw per-file status flags, split by the layer that differs.
    ///
    /// `INDEX_*` flags compare the index to HEAD, `WT_*` flags compare the
    /// working tree to the index. An empty set means the file is current.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct StatusFlags: u32 {
        const INDEX_NEW = 1 << 0;
        const INDEX_MODIFIED = 1 << 1;
        const INDEX_DELETED = 1 << 2;
        const INDEX_RENAMED = 1 << 3;
        const INDEX_TYPECHANGE = 1 << 4;
        const WT_NEW = 1 << 7;
        const WT_MODIFIED = 1 << 8;
        const WT_DELETED = 1 << 9;
        const WT_TYPECHANGE = 1 << 10;
        const WT_RENAMED = 1 << 11;
        const WT_UNREADABLE = 1 << 12;
        const IGNORED = 1 << 14;
        const CONFLICTED = 1 << 15;
    }
}

impl StatusFlags {
    /// Flags describing a difference between the index and HEAD.
    pub const INDEX_CHANGES: StatusFlags = StatusFlags::INDEX_NEW
        .union(StatusFlags::INDEX_MODIFIED)
        .union(StatusFlags::INDEX_DELETED)
        .union(StatusFlags::INDEX_RENAMED);

    /// Flags describing a stageable difference between the working tree and the index.
    pub const WORKTREE_CHANGES: StatusFlags = StatusFlags::WT_NEW
        .union(StatusFlags::WT_MODIFIED)
        .union(StatusFlags::WT_DELETED)
        .union(StatusFlags::WT_RENAMED);

    /// Semantic categories carried by this flag set.
    pub fn categories(&self) -> BTreeSet<ChangeCategory> {
        if self.is_empty() {
            return BTreeSet::from([ChangeCategory::Current]);
        }
        self.iter().filter_map(category_of).collect()
    }

    pub fn has_index_changes(&self) -> bool {
        self.intersects(Self::INDEX_CHANGES)
    }

    pub fn has_worktree_changes(&self) -> bool {
        self.intersects(Self::WORKTREE_CHANGES)
    }

    pub fn is_blocking(&self) -> bool {
        self.categories().iter().any(ChangeCategory::is_blocking)
    }
}

fn category_of(flag: StatusFlags) -> Option<ChangeCategory> {
    let category = if flag == StatusFlags::INDEX_NEW || flag == StatusFlags::WT_NEW {
        ChangeCategory::New
    } else if flag == StatusFlags::INDEX_MODIFIED || flag == StatusFlags::WT_MODIFIED {
        ChangeCategory::Modified
    } else if flag == StatusFlags::INDEX_DELETED || flag == StatusFlags::WT_DELETED {
        ChangeCategory::Deleted
    } else if flag == StatusFlags::INDEX_RENAMED || flag == StatusFlags::WT_RENAMED {
        ChangeCategory::Renamed
    } else if flag == StatusFlags::INDEX_TYPECHANGE || flag == StatusFlags::WT_TYPECHANGE {
        ChangeCategory::TypeChanged
    } else if flag == StatusFlags::WT_UNREADABLE {
        ChangeCategory::Unreadable
    } else if flag == StatusFlags::CONFLICTED {
        ChangeCategory::Conflicted
    } else if flag == StatusFlags::IGNORED {
        ChangeCategory::Ignored
    } else {
        return None;
    };
    Some(category)
}

/// Decoder between raw status integers and categories.
pub struct StatusFlagCodec;

impl StatusFlagCodec {
    /// Decode a raw status value into its semantic categories.
    ///
    /// `0` decodes to `{Current}`; unknown bits are ignored.
    pub fn decode(raw: u32) -> BTreeSet<ChangeCategory> {
        Self::flags(raw).categories()
    }

    /// Decode a raw status value keeping the index/working-tree split.
    pub fn flags(raw: u32) -> StatusFlags {
        StatusFlags::from_bits_truncate(raw)
    }

    /// Encode categories back into a raw value.
    ///
    /// Categories that exist on both layers are encoded on the working-tree
    /// layer. `Current` contributes no bits.
    pub fn encode(categories: &BTreeSet<ChangeCategory>) -> u32 {
        categories
            .iter()
            .map(|category| match category {
                ChangeCategory::New => StatusFlags::WT_NEW,
                ChangeCategory::Modified => StatusFlags::WT_MODIFIED,
                ChangeCategory::Deleted => StatusFlags::WT_DELETED,
                ChangeCategory::Renamed => StatusFlags::WT_RENAMED,
                ChangeCategory::TypeChanged => StatusFlags::WT_TYPECHANGE,
                ChangeCategory::Unreadable => StatusFlags::WT_UNREADABLE,
                ChangeCategory::Conflicted => StatusFlags::CONFLICTED,
                ChangeCategory::Ignored => StatusFlags::IGNORED,
                ChangeCategory::Current => StatusFlags::empty(),
            })
            .fold(StatusFlags::empty(), |acc, flag| acc | flag)
            .bits()
    }
}
