use log::info;
use thiserror::Error;
use crate::config::registry::Registry;
use crate::config;
use crate::git;
use crate::presenter::{BranchRow, ServiceRow};
use crate::process::Runner;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Git(#[from] git::Error),
}

/// Every `(type, name)` pair in the registry, in file order.
pub fn services(registry: &Registry) -> Vec<ServiceRow> {
    registry
        .services()
        .iter()
        .map(|service| ServiceRow {
            kind: service.kind.clone(),
            name: service.name.clone(),
        })
        .collect()
}

/// Remote branches of a service's repository.
pub fn branches(registry: &Registry, runner: &dyn Runner, service: &str) -> Result<Vec<BranchRow>, Error> {
    let entry = registry.resolve(service)?;
    info!("Listing branches of {}", entry.git_url);

    Ok(git::remote_branches(runner, &entry.git_url)?
        .into_iter()
        .map(|branch| BranchRow {
            service: service.to_string(),
            branch,
        })
        .collect())
}
