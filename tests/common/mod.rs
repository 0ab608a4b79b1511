//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use news_site::config::schema::RoutesPath;
use news_site::lifecycle::build_context;
use news_site::{RouteTable, Shutdown, SiteConfig, SiteContext, SiteServer};

pub const ADMIN_KEY: &str = "integration-admin-key";

/// Route source used by most server tests.
pub const ROUTES: &str = r#"
routes:
  - pattern: "/"
    title: "Home"
    component: "HomePage"
    revalidate: 300
  - pattern: "/about"
    title: "About Us"
    component: "AboutPage"
    dynamic: force-static
  - pattern: "/events"
    title: "Events"
    component: "EventsPage"
    revalidate: 300
  - pattern: "/events/:slug"
    title: "Event"
    component: "EventPage"
    revalidate: 86400
  - pattern: "/author/:authorId"
    title: "Author"
    component: "AuthorPage"
    revalidate: 86400
  - pattern: "/author/profile-creator"
    title: "Create Author Profile"
    component: "AuthorProfileCreator"
    client_only: true
  - pattern: "/search"
    title: "Search"
    component: "SearchPage"
    dynamic: force-dynamic
"#;

/// A running server plus the handles a test needs to drive it.
#[allow(dead_code)]
pub struct TestSite {
    pub addr: SocketAddr,
    pub ctx: Arc<SiteContext>,
    pub updates: mpsc::UnboundedSender<RouteTable>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestSite {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Write `routes` and a public directory to a temp dir and start a server on
/// an ephemeral port.
pub async fn start_site<F>(routes: &str, configure: F) -> TestSite
where
    F: FnOnce(&mut SiteConfig),
{
    let dir = tempfile::tempdir().unwrap();
    let routes_path = dir.path().join("routes.yaml");
    std::fs::write(&routes_path, routes).unwrap();

    let public = dir.path().join("public");
    std::fs::create_dir(&public).unwrap();
    std::fs::write(public.join("robots.txt"), "User-agent: *\n").unwrap();
    std::fs::write(public.join("404.html"), "<h1>Page not found</h1>").unwrap();

    let mut config = SiteConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.routes_path = RoutesPath(routes_path.to_string_lossy().into_owned());
    config.static_files.dir = public.to_string_lossy().into_owned();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();
    configure(&mut config);

    let ctx = Arc::new(build_context(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (updates, updates_rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let server = SiteServer::new(ctx.clone());
    let handle = tokio::spawn(async move { server.run(listener, updates_rx, shutdown_rx).await });

    TestSite {
        addr,
        ctx,
        updates,
        shutdown,
        handle,
        dir,
    }
}
