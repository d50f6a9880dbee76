use std::path::Path;
use log::debug;
use sxd_document::dom::Document;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile {
        err: std::io::Error,
        path: String,
    },

    #[error("parse {path}: {message}")]
    Parse {
        message: String,
        path: String,
    },

    #[error("xpath: {0}")]
    XPath(#[from] sxd_xpath::Error),

    #[error("{path} has no <{field}>")]
    MissingField {
        field: &'static str,
        path: String,
    },
}

const DEFAULT_PACKAGING: &str = "jar";

/// Coordinates of the artifact a Maven build produces.
#[derive(Debug, PartialEq)]
pub struct Artifact {
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
}

impl Artifact {
    pub fn parse(xml: &str, path: &str) -> Result<Self, Error> {
        let package = sxd_document::parser::parse(xml).map_err(|err| Error::Parse {
            message: format!("{err:?}"),
            path: path.to_string(),
        })?;
        let document = package.as_document();

        let missing = |field| Error::MissingField {
            field,
            path: path.to_string(),
        };

        let artifact_id = text(&document, &["artifactId"])?.ok_or_else(|| missing("artifactId"))?;
        // Modules commonly inherit their version from the parent POM.
        let version = match text(&document, &["version"])? {
            Some(version) => version,
            None => text(&document, &["parent", "version"])?.ok_or_else(|| missing("version"))?,
        };
        let packaging = text(&document, &["packaging"])?.unwrap_or_else(|| DEFAULT_PACKAGING.to_string());

        Ok(Self {
            artifact_id,
            version,
            packaging,
        })
    }

    pub fn parse_file(path: &Path) -> Result<Self, Error> {
        let display = path.display().to_string();
        let artifact = Self::parse(
            &std::fs::read_to_string(path).map_err(|err| Error::ReadFile {
                err,
                path: display.clone(),
            })?,
            &display,
        )?;
        debug!("Maven artifact: {}", artifact.file_name());
        Ok(artifact)
    }

    /// `<artifactId>-<version>.<packaging>`, the file name Maven writes to `target/`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.artifact_id, self.version, self.packaging)
    }
}

/// Text of the element at `path` below `<project>`, ignoring the POM namespace.
fn text(document: &Document, path: &[&str]) -> Result<Option<String>, Error> {
    let steps: String = path
        .iter()
        .map(|name| format!("/*[local-name()='{name}']"))
        .collect();
    let xpath = format!("normalize-space(/*[local-name()='project']{steps})");
    let value = sxd_xpath::evaluate_xpath(document, &xpath)?.string();
    Ok(Some(value).filter(|value| !value.is_empty()))
}
