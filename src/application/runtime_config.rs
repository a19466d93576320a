use std::path::PathBuf;

use snafu::OptionExt;

use crate::application::{ApplicationError, application::HomeDirSnafu};
use crate::cli::{Cli, Command};

/// Name of the notes directory inside the home directory.
pub const DEFAULT_ROOT_DIR_NAME: &str = ".notes";

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub command: Command,
}

impl TryFrom<Cli> for RuntimeConfig {
    type Error = ApplicationError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let root = match cli.root {
            Some(root) => root,
            None => dirs::home_dir()
                .context(HomeDirSnafu)?
                .join(DEFAULT_ROOT_DIR_NAME),
        };

        Ok(Self {
            root,
            command: cli.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_explicit_root_wins() {
        let cli = Cli::try_parse_from(["notes-fs", "--root", "/srv/notes", "tree"])
            .expect("Failed to parse");

        let config = RuntimeConfig::try_from(cli).expect("Failed to build config");

        assert_eq!(config.root, PathBuf::from("/srv/notes"));
        assert_eq!(config.command, Command::Tree);
    }

    #[test]
    fn test_default_root_is_under_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let cli = Cli::try_parse_from(["notes-fs", "tree"]).expect("Failed to parse");

        let config = RuntimeConfig::try_from(cli).expect("Failed to build config");

        assert_eq!(config.root, home.join(DEFAULT_ROOT_DIR_NAME));
    }
}
