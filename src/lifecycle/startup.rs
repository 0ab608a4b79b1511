//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Load the route source and build the route table
//! - Assemble the SiteContext handed to the server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A partially valid route table is never served

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{load_config, load_route_source, ConfigError, SiteConfig};
use crate::context::SiteContext;
use crate::routing::{RouteError, RouteTable};

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config/site.toml";

/// Why the site could not start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("route table {} rejected: {source}", .path.display())]
    Routes {
        path: PathBuf,
        #[source]
        source: RouteError,
    },
}

/// Load the site configuration.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is used
/// when present and built-in defaults otherwise.
pub fn load_site_config(path: Option<&Path>) -> Result<SiteConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Ok(load_config(Path::new(DEFAULT_CONFIG_PATH))?)
        }
        None => {
            tracing::info!("No configuration file found, using defaults");
            Ok(SiteConfig::default())
        }
    }
}

/// Load the route table named by `config`.
pub fn load_route_table(config: &SiteConfig) -> Result<RouteTable, StartupError> {
    let path = config.routes_path.as_ref();
    let source = load_route_source(path)?;
    RouteTable::from_source(&source).map_err(|source| StartupError::Routes {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the request-serving context from a validated configuration.
pub fn build_context(config: SiteConfig) -> Result<SiteContext, StartupError> {
    let table = load_route_table(&config)?;

    tracing::info!(
        routes = table.len(),
        routes_path = %config.routes_path.0,
        "Route table loaded"
    );
    for entry in table.entries() {
        tracing::debug!(pattern = %entry.pattern, policy = %entry.policy, "Route");
    }

    Ok(SiteContext::with_shell_renderer(config, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RoutesPath;
    use std::fs;

    #[test]
    fn test_build_context_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes.yaml");
        fs::write(
            &routes,
            "routes:\n  - pattern: \"/\"\n    title: Home\n    component: HomePage\n    revalidate: 60\n",
        )
        .unwrap();

        let mut config = SiteConfig::default();
        config.routes_path = RoutesPath(routes.display().to_string());
        let ctx = build_context(config).unwrap();
        assert_eq!(ctx.routes().len(), 1);
    }

    #[test]
    fn test_bracket_patterns_abort_startup() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes.yaml");
        fs::write(
            &routes,
            "routes:\n  - pattern: \"/author/[authorId]\"\n    title: Author\n    component: AuthorPage\n    revalidate: 60\n",
        )
        .unwrap();

        let mut config = SiteConfig::default();
        config.routes_path = RoutesPath(routes.display().to_string());
        assert!(matches!(
            build_context(config),
            Err(StartupError::Routes {
                source: RouteError::InvalidPattern { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_missing_route_source() {
        let mut config = SiteConfig::default();
        config.routes_path = RoutesPath("/definitely/not/routes.yaml".into());
        assert!(matches!(
            build_context(config),
            Err(StartupError::Config(ConfigError::Io { .. }))
        ));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(load_site_config(Some(Path::new("/definitely/not/site.toml"))).is_err());
    }
}
