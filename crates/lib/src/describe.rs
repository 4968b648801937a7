//! Renders the human-readable item description.
//!
//! The destination shows one HTML description per item; it is rendered from an
//! embedded template with the synthesized metadata as context. The template
//! output is collapsed to a single line, since the destination treats the
//! description as inline HTML.

use minijinja::{context, AutoEscape, Environment};
use serde_json::Value;

const TEMPLATE_NAME: &str = "description.html";
const TEMPLATE: &str = include_str!("../templates/description.html");

/// Renders the description for one metadata document.
pub fn render_description(metadata: &Value) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    // The description is raw HTML assembled by the template itself (it writes
    // literal entities like `&quot;`), matching the reference jinja2.Template
    // which does not auto-escape. minijinja would otherwise auto-escape the
    // `.html`-named template and mangle values such as the source URL.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let rendered = env.get_template(TEMPLATE_NAME)?.render(context! { metadata })?;
    Ok(rendered.replace('\n', "").trim().to_string())
}
