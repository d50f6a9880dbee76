use std::path::{Path, PathBuf};
use chrono::Utc;
use log::{debug, info};
use thiserror::Error;
use crate::config::global::GlobalConfig;
use crate::config::registry::Registry;
use crate::docker::LocalImage;
use crate::environment::Environment;
use crate::process::{CommandLine, Runner};
use crate::{config, docker, environment, git, helm, image, pom, presenter, process};

const BUILD_SCRIPT: &str = "build.sh";
const POM_FILE: &str = "pom.xml";
const DOCKERFILE: &str = "Dockerfile";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] environment::Error),

    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error("no Kubernetes context configured for {0}; set kubeCtx{0} in conf.yaml")]
    MissingKubeContext(Environment),

    #[error("create workspace: {0}")]
    Workspace(std::io::Error),

    #[error(transparent)]
    Git(#[from] git::Error),

    #[error("build script failed: {0}")]
    Build(process::Error),

    #[error("copy Dockerfile {from} to {to}: {err}")]
    StageDockerfile {
        err: std::io::Error,
        from: String,
        to: String,
    },

    #[error("build artifact: {0}")]
    Artifact(#[from] pom::Error),

    #[error(transparent)]
    Docker(#[from] docker::Error),

    #[error("rollout: {0}")]
    Rollout(#[from] helm::Error),
}

/// What to deploy, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub service: String,
    pub branch: String,
    pub env: Environment,
}

impl Request {
    pub fn new(service: &str, branch: &str, env: &str) -> Result<Self, Error> {
        let env = env.parse::<Environment>()?;
        if service.is_empty() {
            return Err(Error::EmptyArgument("service"));
        }
        if branch.is_empty() {
            return Err(Error::EmptyArgument("branch"));
        }
        Ok(Self {
            service: service.to_string(),
            branch: branch.to_string(),
            env,
        })
    }
}

/// Outcome of a successful deploy.
#[derive(Debug)]
pub struct Deployment {
    /// `<repository>/<service>:<tag>`
    pub image: String,
    pub tag: image::Tag,
    pub app_name: String,
}

/// Clone, build, package, push and roll out a single service.
pub struct Pipeline<'a> {
    pub root: &'a config::Root,
    pub registry: &'a Registry,
    pub global: &'a GlobalConfig,
    pub runner: &'a dyn Runner,
}

impl Pipeline<'_> {
    pub fn deploy(&self, request: &Request) -> Result<Deployment, Error> {
        let entry = self.registry.resolve(&request.service)?;
        let kube_context = self
            .global
            .kube_context(request.env)
            .ok_or(Error::MissingKubeContext(request.env))?;
        info!(
            "Deploying branch {} of {} to {}",
            request.branch, request.service, request.env
        );

        presenter::step(1, "Pull Code...");
        // Removed when dropped, on every return path.
        let workspace = tempfile::Builder::new()
            .prefix("deploy")
            .tempdir()
            .map_err(Error::Workspace)?;
        debug!("workspace: {}", workspace.path().display());
        git::clone(self.runner, &entry.git_url, &request.branch, workspace.path())?;

        presenter::step(2, "Build Package...");
        let build_dir = workspace.path().join(&entry.build_script_path);
        self.runner
            .run(&CommandLine::new("sh").arg(BUILD_SCRIPT).current_dir(&build_dir))
            .map_err(Error::Build)?;

        presenter::step(3, "Build Docker Image...");
        self.stage_dockerfile(&build_dir)?;
        let commit = git::short_head(self.runner, workspace.path())?;
        let tag = image::Tag::new(Utc::now(), &commit, &request.branch);
        let image = format!("{}:{}", image::name(&self.global.docker_repo, &request.service), tag);
        let artifact = pom::Artifact::parse_file(&build_dir.join(POM_FILE))?;
        info!("Image: {image}");
        docker::build(
            self.runner,
            &build_dir,
            (self.global.build_arg_name.as_str(), artifact.file_name().as_str()),
            &image,
        )?;

        presenter::step(4, "Push Docker Image...");
        docker::login(
            self.runner,
            &self.global.docker_repo_url,
            &self.global.docker_repo_user,
            &self.root.resolve(&self.global.docker_repo_pass_file),
        )?;
        docker::push(self.runner, &image)?;
        let _local_image = LocalImage::new(self.runner, &image);

        presenter::step(5, "Deploy to Kubernetes...");
        let release = self.release(request, kube_context, &tag);
        helm::repo_add(self.runner, &self.global.helm_repo_name, &self.global.helm_repo)?;
        helm::upgrade_install(self.runner, &release)?;

        presenter::finished("Finished success!");
        Ok(Deployment {
            image,
            tag,
            app_name: release.name,
        })
    }

    /// Replace the service's Dockerfile with the shared template.
    fn stage_dockerfile(&self, build_dir: &Path) -> Result<(), Error> {
        let from = self.root.resolve(&self.global.micro_service_dockerfile);
        let to = build_dir.join(DOCKERFILE);
        debug!("Copying {} to {}", from.display(), to.display());
        std::fs::copy(&from, &to)
            .map(|_| ())
            .map_err(|err| Error::StageDockerfile {
                err,
                from: from.display().to_string(),
                to: to.display().to_string(),
            })
    }

    fn release(&self, request: &Request, kube_context: &str, tag: &image::Tag) -> helm::Release {
        let values_path = self.root.resolve(&self.global.helm_values_path);
        let env = request.env.as_str();
        let values: Vec<PathBuf> = vec![
            values_path.join(format!("default-{env}.yaml")),
            values_path
                .join("values")
                .join(&request.service)
                .join(format!("values-{env}.yaml")),
        ];

        helm::Release {
            name: request.env.app_name(&request.service),
            chart: self.global.helm_chart.clone(),
            values,
            set: vec![
                ("image.tag".into(), tag.to_string()),
                ("image.repository".into(), request.service.clone()),
            ],
            kubeconfig: self.root.resolve(&self.global.kube_config),
            kube_context: kube_context.to_string(),
            namespace: env.to_string(),
            timeout: self.global.helm_timeout,
        }
    }
}
