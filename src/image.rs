use std::fmt::{Display, Formatter};
use chrono::{DateTime, Utc};

/// How the deploy was triggered; part of every image tag.
const DEPLOY_TYPE: &str = "cli";

/// Image tag of the form `<YYYYmmdd>-<HHMMSS>-<commit>-cli-<branch>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag(String);

impl Tag {
    pub fn new(time: DateTime<Utc>, commit: &str, branch: &str) -> Self {
        Self(format!(
            "{}-{}-{}-{}",
            time.format("%Y%m%d-%H%M%S"),
            commit,
            DEPLOY_TYPE,
            sanitize(branch)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Docker tags allow ASCII letters, digits, `_`, `.` and `-`.
fn sanitize(branch: &str) -> String {
    branch
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `<repository>/<service>`
pub fn name(repository: &str, service: &str) -> String {
    format!("{}/{}", repository.trim_end_matches('/'), service)
}
