use crate::common::error::GitstatError;

/// gitstat全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use gitstat::common::result::GitstatResult;
/// use gitstat::common::error::GitstatError;
///
/// fn check_jobs(jobs: usize) -> GitstatResult<usize> {
///     if jobs == 0 {
///         return Err(GitstatError::validation_error("--jobs", "must be at least 1", None));
///     }
///     Ok(jobs)
/// }
///
/// assert!(check_jobs(0).is_err());
/// ```
pub type GitstatResult<T> = Result<T, GitstatError>;
