//! Page renderer seam.
//!
//! The UI layer is external; the server only needs something that turns a
//! matched route into HTML. [`ShellRenderer`] produces the document shell
//! the client bundle hydrates.

use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::config::schema::SiteInfoConfig;
use crate::routing::RouteEntry;

/// Everything a renderer gets to see about a request.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Concrete request path.
    pub path: &'a str,
    pub entry: &'a RouteEntry,
    pub params: &'a HashMap<String, String>,
}

/// Rendering failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("component {component} failed to render: {reason}")]
    Component { component: String, reason: String },

    #[error("failed to encode page props: {0}")]
    Props(#[from] serde_json::Error),
}

/// Turns a matched route into an HTML document.
pub trait PageRenderer: Send + Sync + std::fmt::Debug {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, RenderError>;
}

/// Renders the HTML shell: head metadata plus a mount point for the component.
#[derive(Debug, Clone)]
pub struct ShellRenderer {
    site_name: String,
    lang: String,
}

impl ShellRenderer {
    pub fn new(site: &SiteInfoConfig) -> Self {
        Self {
            site_name: site.name.clone(),
            lang: site.lang.clone(),
        }
    }
}

impl PageRenderer for ShellRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<String, RenderError> {
        let descriptor = &request.entry.descriptor;
        let props = serde_json::to_string(&serde_json::json!({
            "path": request.path,
            "params": request.params,
        }))?;

        let title = if descriptor.title.is_empty() {
            self.site_name.clone()
        } else {
            format!("{} | {}", descriptor.title, self.site_name)
        };

        let mut html = String::with_capacity(512);
        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n\
             <meta name=\"description\" content=\"{description}\">\n\
             </head>\n<body>\n\
             <div id=\"root\" data-component=\"{component}\" data-props=\"{props}\"></div>\n\
             </body>\n</html>\n",
            lang = escape_html(&self.lang),
            title = escape_html(&title),
            description = escape_html(&descriptor.description),
            component = escape_html(descriptor.component.as_str()),
            props = escape_html(&props),
        );
        Ok(html)
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RenderingPolicy;
    use crate::routing::{ComponentRef, PageDescriptor, RoutePattern};

    fn author_entry() -> RouteEntry {
        RouteEntry::new(
            RoutePattern::parse("/author/:authorId").unwrap(),
            PageDescriptor {
                title: "Author".into(),
                description: "Stories by \"our\" reporters".into(),
                component: ComponentRef::new("AuthorPage"),
            },
            RenderingPolicy::Static,
        )
    }

    #[test]
    fn test_shell_contains_metadata() {
        let renderer = ShellRenderer::new(&SiteInfoConfig::default());
        let entry = author_entry();
        let params = HashMap::from([("authorId".to_string(), "jsmith".to_string())]);
        let html = renderer
            .render(&RenderRequest {
                path: "/author/jsmith",
                entry: &entry,
                params: &params,
            })
            .unwrap();

        assert!(html.contains("<title>Author | Regional News</title>"));
        assert!(html.contains("content=\"Stories by &quot;our&quot; reporters\""));
        assert!(html.contains("data-component=\"AuthorPage\""));
        assert!(html.contains("&quot;authorId&quot;:&quot;jsmith&quot;"));
    }

    #[test]
    fn test_params_are_escaped() {
        let renderer = ShellRenderer::new(&SiteInfoConfig::default());
        let entry = author_entry();
        let params = HashMap::from([("authorId".to_string(), "<script>".to_string())]);
        let html = renderer
            .render(&RenderRequest {
                path: "/author/x",
                entry: &entry,
                params: &params,
            })
            .unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b <c> 'd'"), "a &amp; b &lt;c&gt; &#x27;d&#x27;");
    }
}
