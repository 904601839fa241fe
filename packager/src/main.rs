//! Release packager CLI entrypoint.
//!
//! This binary extracts the release version, builds the plugin, rebuilds the
//! release tree, stamps the metadata file and optionally packages the tree.
//! Progress and errors go to standard output; the exit status reports the
//! first failure.

use clap::Parser;
use release_packager::cli::Cli;
use release_packager::config::ReleaseConfig;
use release_packager::error::Result;
use release_packager::executor::SystemCommandExecutor;
use release_packager::output::write_error_line;
use release_packager::pipeline::run_release;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stdout);
    if stdout.flush().is_err() {
        // Best-effort output; ignore flush failures.
    }
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let config = ReleaseConfig::load(&cli.config)?;
    run_release(&config, cli.run_flags(), &SystemCommandExecutor, stdout)?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stdout: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_error_line(stdout, &err);
            err.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_packager::error::ReleaseError;
    use rstest::rstest;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stdout = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stdout);
        assert_eq!(exit_code, 0);
        assert!(stdout.is_empty());
    }

    #[rstest]
    #[case::validation(ReleaseError::VersionNotFound { path: "AssemblyInfo.cs".into() }, -1)]
    #[case::build(ReleaseError::BuildFailed { command: "make_binary.cmd".to_owned(), status: 3 }, 3)]
    #[case::packaging(ReleaseError::PackagingFailed { status: 2 }, 2)]
    fn exit_code_for_run_result_prints_error(#[case] err: ReleaseError, #[case] expected: i32) {
        let message = err.to_string();
        let mut stdout = Vec::new();

        let exit_code = exit_code_for_run_result(Err(err), &mut stdout);

        assert_eq!(exit_code, expected);
        let output = String::from_utf8(stdout).expect("stdout was not UTF-8");
        assert_eq!(output, format!("ERROR: {message}\n"));
    }
}
