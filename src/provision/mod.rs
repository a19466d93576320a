//! First-run provisioning of the notes directory from a private remote
//! repository. The hosting API client is an external collaborator; only the
//! interface this crate needs from it lives here.

mod command_runner;
mod provisioner;

pub use command_runner::{CommandError, CommandRunner, SystemCommandRunner};
pub use provisioner::{
    ProvisionError, ProvisionOutcome, Provisioner, REPOSITORY_DESCRIPTION, REPOSITORY_NAME,
    RemoteError, RemoteRepository, RemoteRepositoryClient, RemoteUser,
};
