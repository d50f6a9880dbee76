use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use crate::environment::Environment;

/// The `conf.yaml` file.
///
/// Paths are relative to the configuration directory unless absolute.
#[serde_inline_default]
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalConfig {
    /// Image name prefix, e.g. `registry.example.com/team`.
    pub docker_repo: String,
    pub docker_repo_user: String,
    pub docker_repo_pass_file: String,
    /// Registry host passed to `docker login`.
    pub docker_repo_url: String,
    /// Helm chart repository URL.
    pub helm_repo: String,
    pub helm_values_path: String,
    /// Dockerfile copied into every service before the image build.
    pub micro_service_dockerfile: String,

    #[serde_inline_default("kube-config".to_string())]
    pub kube_config: String,
    #[serde_inline_default("deploy".to_string())]
    pub helm_repo_name: String,
    #[serde_inline_default("deploy/microservice".to_string())]
    pub helm_chart: String,
    /// Seconds to wait for a rollout.
    #[serde_inline_default(600)]
    pub helm_timeout: u64,
    #[serde_inline_default("JAR_FILE".to_string())]
    pub build_arg_name: String,

    #[serde(rename = "kubeCtxdev", alias = "kubeCtxDev")]
    pub kube_ctx_dev: Option<String>,
    #[serde(rename = "kubeCtxtest", alias = "kubeCtxTest")]
    pub kube_ctx_test: Option<String>,
    #[serde(rename = "kubeCtxstage", alias = "kubeCtxStage")]
    pub kube_ctx_stage: Option<String>,
    #[serde(rename = "kubeCtxproduction", alias = "kubeCtxProduction")]
    pub kube_ctx_production: Option<String>,
}

impl GlobalConfig {
    /// Kubernetes context to deploy to, if one is configured for the environment.
    pub fn kube_context(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Dev => &self.kube_ctx_dev,
            Environment::Test => &self.kube_ctx_test,
            Environment::Stage => &self.kube_ctx_stage,
            Environment::Production => &self.kube_ctx_production,
        }
        .as_deref()
        .filter(|ctx| !ctx.is_empty())
    }
}
