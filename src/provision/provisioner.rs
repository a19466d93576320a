use std::path::PathBuf;

use snafu::{ResultExt, Snafu};
use tracing::info;

use super::{CommandError, CommandRunner};
use crate::ext::BestEffortPathExt;
use crate::filesystem::io;

pub const REPOSITORY_NAME: &str = "personal-notes";
pub const REPOSITORY_DESCRIPTION: &str = "A minimalist and versioned notes collection";

pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub login: String,
    pub name: Option<String>,
}

impl RemoteUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub clone_url: String,
}

/// Authenticated client of the service hosting the notes repository.
pub trait RemoteRepositoryClient {
    async fn authenticated_user(&self) -> Result<RemoteUser, RemoteError>;

    async fn create_private_repository(
        &self,
        name: &str,
        description: &str,
    ) -> Result<RemoteRepository, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The notes directory was already present, nothing was touched.
    WelcomeBack { user: RemoteUser },
    Provisioned {
        user: RemoteUser,
        clone_url: String,
    },
}

pub struct Provisioner<C, R> {
    client: C,
    runner: R,
    root: PathBuf,
}

impl<C: RemoteRepositoryClient, R: CommandRunner> Provisioner<C, R> {
    pub fn new(client: C, runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            runner,
            root: root.into(),
        }
    }

    /// Makes sure the notes directory exists, creating and cloning the remote
    /// repository on first run.
    pub async fn login(&self) -> Result<ProvisionOutcome, ProvisionError> {
        let user = self
            .client
            .authenticated_user()
            .await
            .context(IdentitySnafu)?;

        if io::exists(&self.root).await {
            info!(
                "Notes already present at {}, welcome back {}",
                self.root.best_effort_path_display(),
                user.display_name()
            );
            return Ok(ProvisionOutcome::WelcomeBack { user });
        }

        let repository = self
            .client
            .create_private_repository(REPOSITORY_NAME, REPOSITORY_DESCRIPTION)
            .await
            .context(CreateRepositorySnafu)?;
        info!("Created remote repository {}", repository.clone_url);

        let args = vec![
            "clone".to_owned(),
            repository.clone_url.clone(),
            self.root.to_string_lossy().into_owned(),
        ];
        self.runner.run("git", &args).await.context(CloneSnafu {
            clone_url: repository.clone_url.clone(),
        })?;

        Ok(ProvisionOutcome::Provisioned {
            user,
            clone_url: repository.clone_url,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ProvisionError {
    #[snafu(display("Failed to fetch the authenticated user"))]
    IdentityError { source: RemoteError },
    #[snafu(display("Failed to create the remote notes repository"))]
    CreateRepositoryError { source: RemoteError },
    #[snafu(display("Failed to clone {}", clone_url))]
    CloneError {
        clone_url: String,
        source: CommandError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeClient {
        created: RefCell<Vec<String>>,
        fail_identity: bool,
    }

    impl RemoteRepositoryClient for FakeClient {
        async fn authenticated_user(&self) -> Result<RemoteUser, RemoteError> {
            if self.fail_identity {
                return Err("token expired".into());
            }
            Ok(RemoteUser {
                login: "octo".to_owned(),
                name: Some("Octo Cat".to_owned()),
            })
        }

        async fn create_private_repository(
            &self,
            name: &str,
            _description: &str,
        ) -> Result<RemoteRepository, RemoteError> {
            self.created.borrow_mut().push(name.to_owned());
            Ok(RemoteRepository {
                clone_url: format!("https://example.test/octo/{name}.git"),
            })
        }
    }

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<(String, Vec<String>)>>,
    }

    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<(), CommandError> {
            self.calls
                .borrow_mut()
                .push((program.to_owned(), args.to_vec()));
            Ok(())
        }
    }

    #[compio::test]
    async fn test_existing_root_is_welcomed_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let provisioner = Provisioner::new(
            FakeClient::default(),
            RecordingRunner::default(),
            temp_dir.path(),
        );

        let outcome = provisioner.login().await.expect("Failed to log in");

        assert!(matches!(outcome, ProvisionOutcome::WelcomeBack { .. }));
        assert!(provisioner.client.created.borrow().is_empty());
        assert!(provisioner.runner.calls.borrow().is_empty());
    }

    #[compio::test]
    async fn test_first_run_creates_and_clones() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("notes");
        let provisioner =
            Provisioner::new(FakeClient::default(), RecordingRunner::default(), &root);

        let outcome = provisioner.login().await.expect("Failed to log in");

        let clone_url = "https://example.test/octo/personal-notes.git".to_owned();
        assert_eq!(
            outcome,
            ProvisionOutcome::Provisioned {
                user: RemoteUser {
                    login: "octo".to_owned(),
                    name: Some("Octo Cat".to_owned()),
                },
                clone_url: clone_url.clone(),
            }
        );
        assert_eq!(
            *provisioner.client.created.borrow(),
            vec![REPOSITORY_NAME.to_owned()]
        );
        assert_eq!(
            *provisioner.runner.calls.borrow(),
            vec![(
                "git".to_owned(),
                vec![
                    "clone".to_owned(),
                    clone_url,
                    root.to_string_lossy().into_owned()
                ]
            )]
        );
    }

    #[compio::test]
    async fn test_identity_failure_stops_provisioning() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let client = FakeClient {
            fail_identity: true,
            ..FakeClient::default()
        };
        let provisioner = Provisioner::new(
            client,
            RecordingRunner::default(),
            temp_dir.path().join("notes"),
        );

        let result = provisioner.login().await;

        assert!(matches!(result, Err(ProvisionError::IdentityError { .. })));
        assert!(provisioner.runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let user = RemoteUser {
            login: "octo".to_owned(),
            name: None,
        };
        assert_eq!(user.display_name(), "octo");
    }
}
