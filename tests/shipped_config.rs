//! The configuration shipped in `config/` must load and build.

use std::path::Path;

use news_site::config::{load_config, load_route_source};
use news_site::normalize::normalize_text;
use news_site::{RenderingPolicy, RouteTable};

fn config_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
}

#[test]
fn test_site_config_loads() {
    let config = load_config(&config_dir().join("site.toml")).unwrap();
    assert_eq!(config.site.name, "Regional News");
    assert_eq!(config.routes_path.0, "config/routes.yaml");
}

#[test]
fn test_route_source_builds() {
    let source = load_route_source(&config_dir().join("routes.yaml")).unwrap();
    let table = RouteTable::from_source(&source).unwrap();

    let profile = table.lookup("/author/profile-creator").unwrap();
    assert_eq!(profile.entry.policy, RenderingPolicy::Dynamic);

    let author = table.lookup("/author/jsmith").unwrap();
    assert_eq!(author.entry.policy, RenderingPolicy::incremental(86400).unwrap());

    let memorial = table.lookup("/memorials/1942").unwrap();
    assert_eq!(memorial.entry.policy, RenderingPolicy::Static);

    assert!(table.lookup("/nonexistent/path").unwrap_err().is_not_found());
}

#[test]
fn test_route_source_is_normalized() {
    let text = std::fs::read_to_string(config_dir().join("routes.yaml")).unwrap();
    assert!(!normalize_text(&text).changed());
}
