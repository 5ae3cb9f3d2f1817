//! Implementation of the `loreweave inspect` command.

use serde_json::{Value, json};

use loreweave_adapters::{LocalFilesystem, SerdeCodec};
use loreweave_core::{
    application::{ModelSummary, TemplateService},
    domain::FieldSchema,
};

use crate::{
    cli::{InspectArgs, InspectFormat, OutputFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: InspectArgs, output: OutputManager) -> CliResult<()> {
    let service = TemplateService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SerdeCodec::new()),
    );
    let models = service.inspect(&args.input, args.model.as_deref())?;

    let format = if output.format() == OutputFormat::Json {
        InspectFormat::Json
    } else {
        args.format
    };

    match format {
        InspectFormat::Json => {
            output.json(&Value::Array(models.iter().map(model_json).collect()))?;
        }
        InspectFormat::List => {
            for model in &models {
                output.print(&model.name)?;
            }
        }
        InspectFormat::Table => {
            if models.is_empty() {
                output.warning("No models found")?;
            }
            for model in &models {
                output.header(&model_heading(model))?;
                if let Some(description) = &model.description {
                    output.print(&format!("  {}", first_line(description)))?;
                }
                for field in &model.fields {
                    let description = field.description.as_deref().unwrap_or("");
                    output.row(&field_signature(field), description)?;
                }
                output.print("")?;
            }
        }
    }

    Ok(())
}

fn model_heading(model: &ModelSummary) -> String {
    let inherited = model.fields.len().saturating_sub(model.own_fields);
    let bases = if model.bases.is_empty() {
        String::new()
    } else {
        format!("({})", model.bases.join(", "))
    };
    format!(
        "{}{bases}  [{} field(s), {inherited} inherited]",
        model.name,
        model.fields.len()
    )
}

/// `name: Type = default`
fn field_signature(field: &FieldSchema) -> String {
    match &field.default {
        Some(default) => format!("{}: {} = {}", field.name, field.ty, default.placeholder()),
        None => format!("{}: {}", field.name, field.ty),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn model_json(model: &ModelSummary) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "type": field.ty.to_string(),
                "default": field.default.as_ref().map(|d| d.placeholder().to_string()),
                "description": field.description,
            })
        })
        .collect();

    json!({
        "name": model.name,
        "bases": model.bases,
        "description": model.description,
        "own_fields": model.own_fields,
        "fields": fields,
    })
}

#[cfg(test)]
mod tests {
    use loreweave_core::domain::{DefaultValue, Literal, TypeDescriptor};

    use super::*;

    fn summary() -> ModelSummary {
        ModelSummary {
            name: "Weapon".into(),
            bases: vec!["Item".into()],
            description: Some("Something sharp.\n\nMore detail.".into()),
            own_fields: 1,
            fields: vec![
                FieldSchema::new("name", TypeDescriptor::named("str")),
                FieldSchema::new("damage", TypeDescriptor::named("int"))
                    .with_default(DefaultValue::Literal(Literal::Integer(4)))
                    .with_description("Base damage"),
            ],
        }
    }

    #[test]
    fn heading_counts_inherited_fields() {
        assert_eq!(
            model_heading(&summary()),
            "Weapon(Item)  [2 field(s), 1 inherited]"
        );
    }

    #[test]
    fn signature_shows_defaults() {
        let model = summary();
        assert_eq!(field_signature(&model.fields[0]), "name: str");
        assert_eq!(field_signature(&model.fields[1]), "damage: int = 4");
    }

    #[test]
    fn json_shape() {
        let value = model_json(&summary());
        assert_eq!(value["name"], "Weapon");
        assert_eq!(value["bases"][0], "Item");
        assert_eq!(value["fields"][1]["type"], "int");
        assert_eq!(value["fields"][1]["default"], "4");
        assert_eq!(value["fields"][1]["description"], "Base damage");
        assert!(value["fields"][0]["default"].is_null());
    }

    #[test]
    fn first_line_of_docstring() {
        assert_eq!(first_line("One.\nTwo."), "One.");
        assert_eq!(first_line(""), "");
    }
}
