//! Build-time utility: substitute `${VAR}` environment placeholders into the
//! push service-worker template so web clients get their Firebase config
//! without the values living in the repo.
//!
//! Usage: render-sw [template] [output]

use anyhow::{bail, Context, Result};

const DEFAULT_TEMPLATE: &str = "templates/service-worker.js.tmpl";
const DEFAULT_OUTPUT: &str = "dist/firebase-messaging-sw.js";

/// Replace every `${NAME}` with the value of the environment variable NAME.
/// Unset variables are an error: a half-rendered worker is worse than a
/// failed build.
fn render(template: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("unterminated placeholder near: {}", &rest[start..]))?;
        let name = &after[..end];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid placeholder name: {name:?}");
        }
        let value =
            std::env::var(name).with_context(|| format!("environment variable {name} not set"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let template_path = args.next().unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    let output_path = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let template = std::fs::read_to_string(&template_path)
        .with_context(|| format!("read template {template_path}"))?;

    let rendered = render(&template)?;

    if let Some(parent) = std::path::Path::new(&output_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    std::fs::write(&output_path, rendered)
        .with_context(|| format!("write output {output_path}"))?;

    println!("rendered {template_path} -> {output_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::render;

    #[test]
    fn substitutes_set_variables() {
        std::env::set_var("RENDER_SW_TEST_KEY", "abc123");
        let out = render("const apiKey = \"${RENDER_SW_TEST_KEY}\";").unwrap();
        assert_eq!(out, "const apiKey = \"abc123\";");
    }

    #[test]
    fn unset_variable_is_an_error() {
        std::env::remove_var("RENDER_SW_MISSING_KEY");
        assert!(render("${RENDER_SW_MISSING_KEY}").is_err());
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        assert_eq!(render("self.addEventListener();").unwrap(), "self.addEventListener();");
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        assert!(render("${OOPS").is_err());
    }
}
