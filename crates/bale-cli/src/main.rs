use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
mod config;
mod workspace;

use bale_store::StoreError;
use workspace::WorkspaceError;

fn main() {
    let args = match commands::expand_alias_args(std::env::args().collect()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red());
            std::process::exit(exit_code(&err));
        }
    };
    let cli = cli::Cli::parse_from(args);

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = commands::run_command(cli) {
        eprintln!("{} {err:#}", "error:".red());
        std::process::exit(exit_code(&err));
    }
}

/// Scripts can tell an uninitialized directory (2) and an unopenable
/// staging database (3) apart from ordinary command failures (1).
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.downcast_ref::<WorkspaceError>().is_some() {
            return 2;
        }
        if matches!(cause.downcast_ref::<StoreError>(), Some(StoreError::Open { .. })) {
            return 3;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_errors_exit_2() {
        let err = anyhow::Error::from(WorkspaceError::NotFound);
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn context_wrapping_keeps_the_workspace_code() {
        let err = anyhow::Error::from(WorkspaceError::NotFound).context("while staging");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn unopenable_database_exits_3() {
        // opening a database at a directory path fails with Open
        let dir = tempfile::tempdir().unwrap();
        let err = bale_store::StagingStore::open(dir.path()).unwrap_err();
        assert_eq!(exit_code(&anyhow::Error::from(err)), 3);
    }

    #[test]
    fn other_store_errors_stay_generic() {
        let err = anyhow::Error::from(StoreError::NotFound(7));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn anything_else_exits_1() {
        let err = anyhow::anyhow!("remote rejected the record");
        assert_eq!(exit_code(&err), 1);
    }
}
