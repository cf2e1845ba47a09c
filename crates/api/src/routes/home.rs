//! Landing page.

use askama::Template;

/// Chat page template.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
}

/// Render the chat page.
pub async fn index() -> IndexTemplate {
    IndexTemplate {
        title: "Sales Assistant",
    }
}
