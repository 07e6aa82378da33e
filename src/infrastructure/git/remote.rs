use crate::infrastructure::scm::scm_interface::ScmError;
use git2::{
    Cred, CredentialType, Error as Git2Error, ErrorClass, ErrorCode, PushOptions, RemoteCallbacks,
    Repository as Git2Repository,
};
use tracing::debug;

/// Upper bound on credential callbacks per push. libgit2 keeps asking as long
/// as the callback returns a credential, even when the agent has none that fits.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Produces credentials for the push transport.
pub trait CredentialSource: Send + Sync {
    /// Account the credentials belong to
    fn username(&self) -> &str;

    /// Answer one credential request from the transport
    fn credentials(
        &self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, Git2Error>;
}

/// SSH-agent backed keys for a fixed service account.
#[derive(Debug, Clone)]
pub struct SshAgentCredentials {
    user: String,
}

impl SshAgentCredentials {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl CredentialSource for SshAgentCredentials {
    fn username(&self) -> &str {
        &self.user
    }

    fn credentials(
        &self,
        url: &str,
        _username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, Git2Error> {
        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(&self.user);
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            debug!("Requesting key for '{}' from ssh-agent ({})", self.user, url);
            return Cred::ssh_key_from_agent(&self.user);
        }
        Err(Git2Error::from_str(
            "remote asked for an authentication method other than ssh-agent keys",
        ))
    }
}

/// Push `refname` to the same name on `remote_name`.
pub fn push_reference(
    repo: &Git2Repository,
    remote_name: &str,
    refname: &str,
    credentials: &dyn CredentialSource,
) -> Result<(), ScmError> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| ScmError::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    let mut rejection: Option<String> = None;
    {
        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(Git2Error::from_str("no accepted credentials from ssh-agent"));
            }
            credentials.credentials(url, username_from_url, allowed)
        });
        callbacks.push_update_reference(|reference, status| {
            if let Some(message) = status {
                rejection = Some(format!("{}: {}", reference, message));
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("{}:{}", refname, refname);
        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(classify_push_error)?;
    }

    match rejection {
        Some(message) => Err(ScmError::PushRejected { message }),
        None => Ok(()),
    }
}

fn classify_push_error(error: Git2Error) -> ScmError {
    if error.code() == ErrorCode::Auth {
        return ScmError::auth_failed(error.message());
    }
    match error.class() {
        ErrorClass::Net | ErrorClass::Ssh | ErrorClass::Http | ErrorClass::Ssl => {
            ScmError::network_error(error.message())
        }
        _ => ScmError::Git(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_agent_credentials_username() {
        let source = SshAgentCredentials::new("git");
        assert_eq!(source.username(), "git");
    }

    #[test]
    fn test_username_request_answered_with_service_account() {
        let source = SshAgentCredentials::new("deploy");
        let cred = source
            .credentials("ssh://host/repo.git", None, CredentialType::USERNAME)
            .unwrap();
        assert!(cred.has_username());
    }

    #[test]
    fn test_plaintext_request_rejected() {
        let source = SshAgentCredentials::new("git");
        let result = source.credentials(
            "https://host/repo.git",
            None,
            CredentialType::USER_PASS_PLAINTEXT,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_errors_are_classified() {
        let error = Git2Error::new(ErrorCode::Auth, ErrorClass::Ssh, "denied");
        assert!(matches!(
            classify_push_error(error),
            ScmError::AuthenticationFailed { .. }
        ));

        let error = Git2Error::new(ErrorCode::GenericError, ErrorClass::Net, "unreachable");
        assert!(matches!(
            classify_push_error(error),
            ScmError::NetworkError { .. }
        ));
    }

    #[test]
    fn test_push_to_missing_remote_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let repo = Git2Repository::init(temp_dir.path()).unwrap();
        let result = push_reference(
            &repo,
            "origin",
            "refs/heads/main",
            &SshAgentCredentials::new("git"),
        );
        assert!(matches!(result, Err(ScmError::RemoteNotFound { .. })));
    }
}
