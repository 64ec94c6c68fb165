use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Notes:\n\n{{ text }}";
        let context = HashMap::from([("text", "- [ ] Set up database")]);

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Notes:\n\n- [ ] Set up database");
    }

    #[test]
    fn test_load_prompt_does_not_escape_markup() {
        let context = HashMap::from([("text", "<b>ship</b> & \"deploy\"")]);
        let result = load_prompt("{{ text }}", &context).unwrap();
        assert_eq!(result, "<b>ship</b> & \"deploy\"");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let context: HashMap<&str, &str> = HashMap::new();
        assert!(load_prompt("Hello, {{ name }}!", &context).is_err());
    }
}
