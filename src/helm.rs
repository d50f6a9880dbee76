use std::path::PathBuf;
use log::info;
use thiserror::Error;
use crate::process::{self, CommandLine, Runner};

#[derive(Error, Debug)]
pub enum Error {
    #[error("helm repo add failed: {0}")]
    RepoAdd(process::Error),

    #[error("helm upgrade failed: {0}")]
    Upgrade(process::Error),
}

/// All field names correspond with `helm upgrade` flags.
#[derive(Debug, Clone)]
pub struct Release {
    /// Release name, the first positional argument.
    pub name: String,
    /// Chart reference, the second positional argument.
    pub chart: String,
    pub values: Vec<PathBuf>,
    /// `key=value` pairs, joined into a single `--set`.
    pub set: Vec<(String, String)>,
    pub kubeconfig: PathBuf,
    pub kube_context: String,
    pub namespace: String,
    /// Seconds
    pub timeout: u64,
}

/// Register (or refresh) a chart repository under `name`.
pub fn repo_add(runner: &dyn Runner, name: &str, url: &str) -> Result<(), Error> {
    runner
        .run(
            &CommandLine::new("helm")
                .arg("repo")
                .arg("add")
                .arg("--force-update")
                .arg(name)
                .arg(url),
        )
        .map_err(Error::RepoAdd)
}

/// `helm upgrade --install`, waiting for the rollout to complete.
pub fn upgrade_install(runner: &dyn Runner, release: &Release) -> Result<(), Error> {
    info!(
        "Rolling out {} to {} (context {})",
        release.name, release.namespace, release.kube_context
    );

    let mut command = CommandLine::new("helm")
        .arg("upgrade")
        .arg("--install")
        .arg("--wait")
        .arg("--timeout")
        .arg(format!("{}s", release.timeout));

    for values in &release.values {
        command = command.arg("-f").path_arg(values);
    }
    if !release.set.is_empty() {
        let set = release
            .set
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        command = command.arg("--set").arg(set);
    }

    command = command
        .arg("--kubeconfig")
        .path_arg(&release.kubeconfig)
        .arg("--kube-context")
        .arg(&release.kube_context)
        .arg("--namespace")
        .arg(&release.namespace)
        .arg(&release.name)
        .arg(&release.chart);

    runner.run(&command).map_err(Error::Upgrade)
}

#[cfg(test)]
mod tests {
    use super::{repo_add, upgrade_install, Error, Release};
    use crate::process::testing::FakeRunner;

    #[test]
    fn upgrade_install_command_line() {
        let runner = FakeRunner::default();
        let release = Release {
            name: "orders-dev".into(),
            chart: "deploy/microservice".into(),
            values: vec!["/helm/default-dev.yaml".into(), "/helm/values/orders/values-dev.yaml".into()],
            set: vec![
                ("image.tag".into(), "t1".into()),
                ("image.repository".into(), "orders".into()),
            ],
            kubeconfig: "/cfg/kube-config".into(),
            kube_context: "dev-cluster".into(),
            namespace: "dev".into(),
            timeout: 600,
        };
        upgrade_install(&runner, &release).unwrap();
        assert_eq!(
            runner.rendered(),
            vec![
                "helm upgrade --install --wait --timeout 600s \
                 -f /helm/default-dev.yaml -f /helm/values/orders/values-dev.yaml \
                 --set image.tag=t1,image.repository=orders \
                 --kubeconfig /cfg/kube-config --kube-context dev-cluster \
                 --namespace dev orders-dev deploy/microservice"
            ]
        );
    }

    #[test]
    fn repo_add_failure() {
        let runner = FakeRunner::failing_on("helm repo add");
        assert!(matches!(
            repo_add(&runner, "deploy", "https://charts.example.com"),
            Err(Error::RepoAdd(_))
        ));
    }
}
