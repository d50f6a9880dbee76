use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("no such env: {0}, the available env is [dev, test, stage, production]")]
    Unknown(String),
}

/// Deployment target. Selects the namespace, the Kubernetes context and the Helm values files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Stage,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Dev,
        Environment::Test,
        Environment::Stage,
        Environment::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Stage => "stage",
            Environment::Production => "production",
        }
    }

    /// Helm release name for a service.
    /// Dev releases get a suffix so they can share a cluster with the others.
    pub fn app_name(&self, service: &str) -> String {
        match self {
            Environment::Dev => format!("{service}-dev"),
            _ => service.to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| Error::Unknown(s.to_string()))
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Environment, Error};

    #[test]
    fn parses_the_four_environments() {
        for env in Environment::ALL {
            assert_eq!(env.as_str().parse::<Environment>(), Ok(env));
        }
    }

    #[test]
    fn rejects_anything_else() {
        for input in ["staging", "prod", "Dev", "", " dev"] {
            assert_eq!(
                input.parse::<Environment>(),
                Err(Error::Unknown(input.to_string()))
            );
        }
    }

    #[test]
    fn only_dev_gets_a_suffixed_app_name() {
        assert_eq!(Environment::Dev.app_name("orders"), "orders-dev");
        assert_eq!(Environment::Test.app_name("orders"), "orders");
        assert_eq!(Environment::Stage.app_name("orders"), "orders");
        assert_eq!(Environment::Production.app_name("orders"), "orders");
    }
}
