//! Result rendering for the command line

use anyhow::Result;
use serde::Serialize;

/// Render a value as indented JSON
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Print a value as indented JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_is_indented() {
        let rendered = render_json(&json!({"exit_code": 0})).unwrap();
        assert_eq!(rendered, "{\n  \"exit_code\": 0\n}");
    }
}
