use std::path::Path;
use log::debug;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use super::Error;

/// Where a service's code lives and how it is built.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub git_url: String,
    /// Directory inside the repository holding `build.sh`, `pom.xml` and the Dockerfile.
    pub build_script_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub kind: String,
    pub name: String,
    pub entry: ServiceEntry,
}

/// The `service.yaml` file: service type, then service name, then entry.
///
/// Services are kept in file order.
#[derive(Debug)]
pub struct Registry {
    services: Vec<Service>,
}

impl Registry {
    pub fn parse(yaml_string: &str, path: &str) -> Result<Self, Error> {
        let schema = |message: String| Error::Schema {
            message,
            path: path.to_string(),
        };
        let parse = |err: serde_yaml::Error| Error::Parse {
            err,
            path: path.to_string(),
        };

        let document: Value = serde_yaml::from_str(yaml_string).map_err(parse)?;
        let types = match document {
            Value::Null => Mapping::new(),
            Value::Mapping(types) => types,
            _ => return Err(schema("expected a mapping of service types".into())),
        };

        let mut services = Vec::new();
        for (kind, names) in types {
            let kind = key(kind).ok_or_else(|| schema("service type must be a string".into()))?;
            let names = match names {
                Value::Mapping(names) => names,
                _ => return Err(schema(format!("service type {kind}: expected a mapping of services"))),
            };
            for (name, entry) in names {
                let name = key(name)
                    .ok_or_else(|| schema(format!("service type {kind}: service name must be a string")))?;
                let entry: ServiceEntry = serde_yaml::from_value(entry)
                    .map_err(|err| schema(format!("service {kind}.{name}: {err}")))?;
                services.push(Service {
                    kind: kind.clone(),
                    name,
                    entry,
                });
            }
        }

        debug!("{} services found in {path}", services.len());
        Ok(Self { services })
    }

    pub fn parse_file(path: &Path) -> Result<Self, Error> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
            err,
            path: display.clone(),
        })?;
        Self::parse(&contents, &display)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Find a service by name across all service types. The first match wins.
    ///
    /// A match with an empty git URL or build script path counts as no match.
    pub fn resolve(&self, name: &str) -> Result<&ServiceEntry, Error> {
        self.services
            .iter()
            .find(|service| service.name == name)
            .map(|service| &service.entry)
            .filter(|entry| !entry.git_url.is_empty() && !entry.build_script_path.is_empty())
            .ok_or_else(|| Error::ServiceNotFound(name.to_string()))
    }
}

fn key(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::config::test::SERVICE_YAML;
    use crate::config::Error;

    fn registry() -> Registry {
        Registry::parse(SERVICE_YAML, "service.yaml").unwrap()
    }

    #[test]
    fn keeps_file_order() {
        let registry = registry();
        let pairs: Vec<_> = registry
            .services()
            .iter()
            .map(|s| (s.kind.as_str(), s.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("frontend", "web"), ("backend", "orders"), ("backend", "billing")]
        );
    }

    #[test]
    fn resolves_across_types() {
        let registry = registry();
        let entry = registry.resolve("orders").unwrap();
        assert_eq!(entry.git_url, "https://example/orders.git");
        assert_eq!(entry.build_script_path, "svc");
    }

    #[test]
    fn unknown_service_is_not_found() {
        assert!(matches!(
            registry().resolve("inventory"),
            Err(Error::ServiceNotFound(name)) if name == "inventory"
        ));
    }

    #[test]
    fn empty_fields_count_as_not_found() {
        assert!(matches!(
            registry().resolve("billing"),
            Err(Error::ServiceNotFound(_))
        ));
    }

    #[test]
    fn first_match_wins() {
        let yaml = r#"
a:
  svc: { gitUrl: first, buildScriptPath: one }
b:
  svc: { gitUrl: second, buildScriptPath: two }
"#;
        let registry = Registry::parse(yaml, "service.yaml").unwrap();
        assert_eq!(registry.resolve("svc").unwrap().git_url, "first");
    }

    #[test]
    fn empty_file_is_an_empty_registry() {
        assert!(Registry::parse("", "service.yaml").unwrap().services().is_empty());
    }

    #[test]
    fn missing_field_is_reported_with_the_service() {
        let yaml = "backend:\n  orders:\n    gitUrl: x\n";
        match Registry::parse(yaml, "service.yaml") {
            Err(Error::Schema { message, .. }) => {
                assert!(message.contains("backend.orders"), "{message}");
                assert!(message.contains("buildScriptPath"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn scalar_service_type_is_rejected() {
        assert!(matches!(
            Registry::parse("backend: 3\n", "service.yaml"),
            Err(Error::Schema { .. })
        ));
    }
}
