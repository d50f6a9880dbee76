use std::path::{Path, PathBuf};
use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod global;
pub mod registry;

/// Name of the configuration directory inside the user's home directory.
pub const DEFAULT_DIRECTORY: &str = ".dpcfg";

const REGISTRY_FILE: &str = "service.yaml";
const GLOBAL_FILE: &str = "conf.yaml";

#[derive(Error, Debug)]
pub enum Error {
    #[error("HOME is not set; use --config-dir to point at the configuration directory")]
    NoHome,

    #[error("read {path}: {err}")]
    Read {
        err: std::io::Error,
        path: String,
    },

    #[error("parse {path}: {err}")]
    Parse {
        err: serde_yaml::Error,
        path: String,
    },

    #[error("parse {path}: {message}")]
    Schema {
        message: String,
        path: String,
    },

    #[error("no such service: {0}")]
    ServiceNotFound(String),
}

/// Directory holding `service.yaml`, `conf.yaml` and the files they refer to.
#[derive(Debug, Clone)]
pub struct Root(PathBuf);

impl Root {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    /// `$HOME/.dpcfg`
    pub fn from_home() -> Result<Self, Error> {
        let home = std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .ok_or(Error::NoHome)?;
        Ok(Self(PathBuf::from(home).join(DEFAULT_DIRECTORY)))
    }

    /// Resolve a path found in the configuration.
    /// Relative paths are taken relative to the configuration directory.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.0.join(path)
    }

    pub fn registry(&self) -> Result<registry::Registry, Error> {
        registry::Registry::parse_file(&self.0.join(REGISTRY_FILE))
    }

    pub fn global(&self) -> Result<global::GlobalConfig, Error> {
        load(&self.0.join(GLOBAL_FILE))
    }
}

/// Read a YAML file and deserialize it.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
        err,
        path: path.display().to_string(),
    })?;
    serde_yaml::from_str(&contents).map_err(|err| Error::Parse {
        err,
        path: path.display().to_string(),
    })
}

#[cfg(test)]
pub mod test {
    use super::{Error, Root};
    use std::path::Path;

    pub const SERVICE_YAML: &str = r#"
frontend:
  web:
    gitUrl: https://example/web.git
    buildScriptPath: web
backend:
  orders:
    gitUrl: https://example/orders.git
    buildScriptPath: svc
  billing:
    gitUrl: https://example/billing.git
    buildScriptPath: ""
"#;

    pub const CONF_YAML: &str = r#"
DockerRepo: registry.example.com/team
DockerRepoUser: deployer
DockerRepoPassFile: docker-pass
DockerRepoUrl: registry.example.com
HelmRepo: https://charts.example.com
HelmValuesPath: helm
MicroServiceDockerfile: Dockerfile.template
kubeCtxdev: dev-cluster
kubeCtxtest: test-cluster
kubeCtxstage: stage-cluster
"#;

    /// Lay out a configuration directory the way users keep it under `~/.dpcfg`.
    pub fn write_root(dir: &Path) -> Root {
        std::fs::write(dir.join("service.yaml"), SERVICE_YAML).unwrap();
        std::fs::write(dir.join("conf.yaml"), CONF_YAML).unwrap();
        std::fs::write(dir.join("docker-pass"), "s3cret\n").unwrap();
        std::fs::write(dir.join("Dockerfile.template"), "FROM openjdk:8\n").unwrap();
        Root::new(dir)
    }

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let root = Root::new("/home/user/.dpcfg");
        assert_eq!(
            root.resolve("kube-config"),
            Path::new("/home/user/.dpcfg/kube-config")
        );
        assert_eq!(root.resolve("/etc/helm"), Path::new("/etc/helm"));
    }

    #[test]
    fn loads_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write_root(tmp.path());
        assert_eq!(root.registry().unwrap().services().len(), 3);
        assert_eq!(root.global().unwrap().docker_repo, "registry.example.com/team");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Root::new(tmp.path());
        assert!(matches!(root.registry(), Err(Error::Read { .. })));
        assert!(matches!(root.global(), Err(Error::Read { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("conf.yaml"), "DockerRepo: [unterminated").unwrap();
        let root = Root::new(tmp.path());
        assert!(matches!(root.global(), Err(Error::Parse { .. })));
    }
}
