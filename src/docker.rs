use std::path::Path;
use log::{debug, warn};
use thiserror::Error;
use crate::process::{self, CommandLine, Runner};

#[derive(Error, Debug)]
pub enum Error {
    #[error("docker build failed: {0}")]
    Build(process::Error),

    #[error("docker login failed: {0}")]
    Login(process::Error),

    #[error("docker push failed: {0}")]
    Push(process::Error),

    #[error("read registry password from {path}: {err}")]
    PasswordFile {
        err: std::io::Error,
        path: String,
    },
}

/// Build the Dockerfile in `context`, passing the build artifact as a build argument.
pub fn build(
    runner: &dyn Runner,
    context: &Path,
    build_arg: (&str, &str),
    image: &str,
) -> Result<(), Error> {
    let (arg_name, arg_value) = build_arg;
    runner
        .run(
            &CommandLine::new("docker")
                .arg("build")
                .arg("--build-arg")
                .arg(format!("{arg_name}={arg_value}"))
                .arg("--tag")
                .arg(image)
                .arg(".")
                .current_dir(context),
        )
        .map_err(Error::Build)
}

/// Log in to a registry with the password stored in `password_file`.
pub fn login(runner: &dyn Runner, registry: &str, username: &str, password_file: &Path) -> Result<(), Error> {
    debug!("Logging in to Docker registry {} as {}", registry, username);
    let password = std::fs::read_to_string(password_file).map_err(|err| Error::PasswordFile {
        err,
        path: password_file.display().to_string(),
    })?;

    runner
        .run(
            &CommandLine::new("docker")
                .arg("login")
                .arg("--username")
                .arg(username)
                .arg("--password-stdin")
                .arg(registry)
                .stdin(password.trim_end().to_string()),
        )
        .map_err(Error::Login)
}

pub fn push(runner: &dyn Runner, image: &str) -> Result<(), Error> {
    debug!("Pushing image {}", image);
    runner
        .run(&CommandLine::new("docker").arg("push").arg(image))
        .map_err(Error::Push)
}

/// A locally built image, removed from the local image store when dropped.
///
/// Removal is best effort: failures are logged and otherwise ignored.
pub struct LocalImage<'a> {
    runner: &'a dyn Runner,
    image: String,
}

impl<'a> LocalImage<'a> {
    pub fn new(runner: &'a dyn Runner, image: &str) -> Self {
        Self {
            runner,
            image: image.to_string(),
        }
    }
}

impl Drop for LocalImage<'_> {
    fn drop(&mut self) {
        debug!("Removing local image {}", self.image);
        if let Err(err) = self
            .runner
            .run(&CommandLine::new("docker").arg("rmi").arg(&self.image))
        {
            warn!("could not remove local image {}: {}", self.image, err);
        }
    }
}
