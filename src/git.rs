use std::path::Path;
use log::{debug, info};
use thiserror::Error;
use crate::process::{self, CommandLine, Runner};

#[derive(Error, Debug)]
pub enum Error {
    #[error("git clone failed: {0}")]
    Clone(process::Error),

    #[error("could not determine the current commit: {0}")]
    CommitHash(process::Error),

    #[error("git rev-parse printed no commit hash")]
    EmptyCommitHash,

    #[error("could not list remote branches: {0}")]
    LsRemote(process::Error),
}

const HEADS_PREFIX: &str = "refs/heads/";

pub fn clone(runner: &dyn Runner, url: &str, branch: &str, destination: &Path) -> Result<(), Error> {
    info!("Cloning branch {branch} of {url}");
    runner
        .run(
            &CommandLine::new("git")
                .arg("clone")
                .arg("-b")
                .arg(branch)
                .arg(url)
                .path_arg(destination),
        )
        .map_err(Error::Clone)
}

/// Abbreviated hash of the checked out commit.
pub fn short_head(runner: &dyn Runner, repository: &Path) -> Result<String, Error> {
    let output = runner
        .capture(
            &CommandLine::new("git")
                .arg("rev-parse")
                .arg("--short")
                .arg("HEAD")
                .current_dir(repository),
        )
        .map_err(Error::CommitHash)?;

    let hash = output.trim();
    if hash.is_empty() {
        return Err(Error::EmptyCommitHash);
    }
    debug!("HEAD is at {hash}");
    Ok(hash.to_string())
}

/// Branch names of a remote repository, in the order git reports them.
pub fn remote_branches(runner: &dyn Runner, url: &str) -> Result<Vec<String>, Error> {
    let output = runner
        .capture(&CommandLine::new("git").arg("ls-remote").arg("--heads").arg(url))
        .map_err(Error::LsRemote)?;
    Ok(parse_heads(&output))
}

fn parse_heads(ls_remote: &str) -> Vec<String> {
    ls_remote
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix(HEADS_PREFIX))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_heads, remote_branches, short_head, Error};
    use crate::process::testing::FakeRunner;
    use std::path::Path;

    #[test]
    fn parses_ls_remote_output() {
        let output = "\
8a1f0c2d9e\trefs/heads/main
0bb34c11aa\trefs/heads/feature/login
ffee001122\trefs/tags/v1.0
";
        assert_eq!(parse_heads(output), vec!["main", "feature/login"]);
    }

    #[test]
    fn ignores_noise() {
        assert!(parse_heads("\nwarning: redirecting\n").is_empty());
    }

    #[test]
    fn lists_branches_through_the_runner() {
        let runner = FakeRunner {
            outputs: vec![(
                "git ls-remote".into(),
                "abc\trefs/heads/main\ndef\trefs/heads/develop\n".into(),
            )],
            ..Default::default()
        };
        let branches = remote_branches(&runner, "https://example/orders.git").unwrap();
        assert_eq!(branches, vec!["main", "develop"]);
        assert_eq!(
            runner.rendered(),
            vec!["git ls-remote --heads https://example/orders.git"]
        );
    }

    #[test]
    fn empty_rev_parse_output_is_an_error() {
        let runner = FakeRunner::default();
        assert!(matches!(
            short_head(&runner, Path::new("/tmp")),
            Err(Error::EmptyCommitHash)
        ));
    }

    #[test]
    fn failing_rev_parse_is_an_error() {
        let runner = FakeRunner::failing_on("git rev-parse");
        assert!(matches!(
            short_head(&runner, Path::new("/tmp")),
            Err(Error::CommitHash(_))
        ));
    }

    #[test]
    fn trims_the_commit_hash() {
        let runner = FakeRunner {
            outputs: vec![("git rev-parse".into(), "1a2b3c4\n".into())],
            ..Default::default()
        };
        assert_eq!(short_head(&runner, Path::new("/tmp")).unwrap(), "1a2b3c4");
    }
}
