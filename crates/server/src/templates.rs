//! Embedded HTML templates rendered with MiniJinja.
//!
//! Templates are compiled into the binary and loaded once into a global
//! environment; `.html` names get HTML auto-escaping.

use minijinja::{Environment, Error as MiniJinjaError, Value as MJValue};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("people.html", include_str!("../templates/people.html")),
    ("photos.html", include_str!("../templates/photos.html")),
    ("groups.html", include_str!("../templates/groups.html")),
    ("favusers.html", include_str!("../templates/favusers.html")),
    ("explore.html", include_str!("../templates/explore.html")),
];

static GLOBAL_ENV: Lazy<Environment<'static>> = Lazy::new(build_environment);

/// Render the template `name` with a serializable context.
pub fn render<T: Serialize>(name: &str, context: &T) -> Result<String, MiniJinjaError> {
    let template = GLOBAL_ENV.get_template(name)?;
    template.render(MJValue::from_serialize(context))
}

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    for (name, source) in TEMPLATES {
        // A broken template surfaces as a missing-template error at render time.
        if let Err(e) = env.add_template(*name, *source) {
            error!(template = *name, error = %e, "failed to register template");
        }
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_template_compiles() {
        for (name, _) in TEMPLATES {
            assert!(GLOBAL_ENV.get_template(name).is_ok(), "template {name} did not compile");
        }
    }

    #[test]
    fn html_is_escaped() {
        let page = render(
            "error.html",
            &json!({"status": 400, "reason": "Bad Request", "message": "<script>alert(1)</script>"}),
        )
        .unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
    }
}
