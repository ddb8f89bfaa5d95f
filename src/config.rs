//! Listen address and public host resolution for the deployment environment.

use std::collections::HashMap;

pub const LOCAL_HOST: &str = "127.0.0.1";
pub const LOCAL_PORT: u16 = 8910;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    OpenShift,
    Heroku,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Host (and port) advertised in descriptor and index URLs.
    pub public_host: String,
}

impl ListenConfig {
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(|key| vars.get(key).cloned())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let port_of = |key: &str| get(key).and_then(|v| v.parse::<u16>().ok());

        if let Some(dns) = get("OPENSHIFT_APP_DNS") {
            return Self {
                environment: Environment::OpenShift,
                host: get("OPENSHIFT_NODEJS_IP").unwrap_or_else(|| LOCAL_HOST.to_string()),
                port: port_of("OPENSHIFT_NODEJS_PORT").unwrap_or(LOCAL_PORT),
                public_host: dns,
            };
        }

        if get("PORT").is_some() {
            let port = port_of("PORT").unwrap_or(LOCAL_PORT);
            return Self {
                environment: Environment::Heroku,
                host: "0.0.0.0".to_string(),
                port,
                public_host: get("HOST").unwrap_or_else(|| format!("localhost:{port}")),
            };
        }

        Self {
            environment: Environment::Local,
            host: LOCAL_HOST.to_string(),
            port: LOCAL_PORT,
            public_host: format!("{LOCAL_HOST}:{LOCAL_PORT}"),
        }
    }

    /// Applies explicit `--host`, `--port` and `--public-host` overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        public_host: Option<String>,
    ) -> Self {
        let explicit_bind = host.is_some() || port.is_some();
        let derived_public_host =
            self.derived_public_host().as_deref() == Some(self.public_host.as_str());
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(public_host) = public_host {
            self.public_host = public_host;
        } else if explicit_bind && derived_public_host {
            if let Some(derived) = self.derived_public_host() {
                self.public_host = derived;
            }
        }
        self
    }

    /// Public host implied by the bind address when nothing names one.
    /// OpenShift always publishes its app DNS name.
    fn derived_public_host(&self) -> Option<String> {
        match self.environment {
            Environment::OpenShift => None,
            Environment::Heroku => Some(format!("localhost:{}", self.port)),
            Environment::Local => Some(self.bind_addr()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(pairs: &[(&str, &str)]) -> ListenConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListenConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn local_is_the_default() {
        let cfg = from(&[]);
        assert_eq!(cfg.environment, Environment::Local);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8910");
        assert_eq!(cfg.public_host, "127.0.0.1:8910");
    }

    #[test]
    fn openshift_wins_over_port() {
        let cfg = from(&[
            ("OPENSHIFT_APP_DNS", "opensearch-go.rhcloud.com"),
            ("OPENSHIFT_NODEJS_IP", "10.0.0.5"),
            ("OPENSHIFT_NODEJS_PORT", "8080"),
            ("PORT", "5000"),
        ]);
        assert_eq!(cfg.environment, Environment::OpenShift);
        assert_eq!(cfg.bind_addr(), "10.0.0.5:8080");
        assert_eq!(cfg.public_host, "opensearch-go.rhcloud.com");
    }

    #[test]
    fn heroku_binds_all_interfaces_on_port() {
        let cfg = from(&[("PORT", "5000")]);
        assert_eq!(cfg.environment, Environment::Heroku);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn unparseable_port_falls_back() {
        let cfg = from(&[("PORT", "http")]);
        assert_eq!(cfg.environment, Environment::Heroku);
        assert_eq!(cfg.port, LOCAL_PORT);
    }

    #[test]
    fn overrides_replace_detected_values() {
        let cfg = from(&[]).with_overrides(Some("0.0.0.0".into()), Some(9000), None);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.public_host, "0.0.0.0:9000");

        let cfg = from(&[("PORT", "5000")]).with_overrides(
            None,
            None,
            Some("go-search.example.org".into()),
        );
        assert_eq!(cfg.public_host, "go-search.example.org");
        assert_eq!(cfg.port, 5000);
    }

    #[test]
    fn heroku_port_override_moves_derived_public_host() {
        let cfg = from(&[("PORT", "5000")]).with_overrides(None, Some(6000), None);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:6000");
        assert_eq!(cfg.public_host, "localhost:6000");
    }

    #[test]
    fn port_override_keeps_named_public_host() {
        let cfg = from(&[("PORT", "5000"), ("HOST", "go-search.example.org")])
            .with_overrides(None, Some(6000), None);
        assert_eq!(cfg.port, 6000);
        assert_eq!(cfg.public_host, "go-search.example.org");

        let cfg = from(&[
            ("OPENSHIFT_APP_DNS", "opensearch-go.rhcloud.com"),
            ("OPENSHIFT_NODEJS_PORT", "8080"),
        ])
        .with_overrides(None, Some(9000), None);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.public_host, "opensearch-go.rhcloud.com");
    }
}
