//! Filling templates end to end with the in-memory filesystem, the serde
//! codec and a canned generator.

use std::path::Path;

use loreweave_adapters::{CannedGenerator, LocalFilesystem, MemoryFilesystem, SerdeCodec};
use loreweave_core::{
    application::{ContentService, TemplateService, ports::Filesystem},
    domain::{OutputLayout, ProcessingMode, TemplateFormat, TemplateValue},
};

const SOURCE: &str = r#"
from pydantic import BaseModel, Field

class Place(BaseModel):
    """Somewhere on the map."""
    name: str = Field(..., description="Place name")
    population: int = 0
"#;

fn content_service(fs: &MemoryFilesystem, generator: &CannedGenerator) -> ContentService {
    ContentService::new(
        Box::new(generator.clone()),
        Box::new(fs.clone()),
        Box::new(SerdeCodec::new()),
    )
}

#[test]
fn fills_the_annotated_merged_template() {
    let fs = MemoryFilesystem::new().with_file("models.py", SOURCE);
    let layout = OutputLayout::for_source("lore", Path::new("models.py"));
    TemplateService::new(Box::new(fs.clone()), Box::new(SerdeCodec::new()))
        .materialize(Path::new("models.py"), &layout, &[TemplateFormat::Yaml])
        .unwrap()
        .into_result()
        .unwrap();

    let generator = CannedGenerator::new(
        "```yaml\nPlace:\n  name: Harrowgate\n  population: 1200\n```\n",
    );
    let template = layout.merged_path(TemplateFormat::Yaml, ProcessingMode::Annotated);
    let output = layout.generated_path(TemplateFormat::Yaml);

    let document = content_service(&fs, &generator)
        .fill(&template, TemplateFormat::Yaml, "a river town", &output)
        .unwrap();

    let place = match document.get("Place") {
        Some(TemplateValue::Mapping(place)) => place.clone(),
        other => panic!("unexpected document: {other:?}"),
    };
    assert_eq!(place.get("name"), Some(&TemplateValue::from("Harrowgate")));
    assert_eq!(place.get("population"), Some(&TemplateValue::Integer(1200)));

    let written = fs.read_file(Path::new("lore/generated_content.yaml")).unwrap();
    assert!(written.starts_with("Place:\n"));

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "a river town");
    assert!(requests[0].system.contains("Place name"));
}

#[test]
fn unparseable_reply_writes_nothing() {
    let fs = MemoryFilesystem::new().with_file("lore/t.json", "{\"A\": {}}\n");
    let generator = CannedGenerator::new("Sure! Here is your world.");

    let err = content_service(&fs, &generator)
        .fill(
            Path::new("lore/t.json"),
            TemplateFormat::Json,
            "anything",
            Path::new("lore/generated_content.json"),
        )
        .unwrap_err();

    assert!(err.to_string().starts_with("Content generation failed"));
    assert!(!fs.exists(Path::new("lore/generated_content.json")));
}

#[test]
fn generator_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.yaml");
    std::fs::write(&template, "A:\n  b: <str>\n").unwrap();

    let service = ContentService::new(
        Box::new(CannedGenerator::failing("connection refused")),
        Box::new(LocalFilesystem::new()),
        Box::new(SerdeCodec::new()),
    );
    let output = dir.path().join("generated_content.yaml");
    let err = service
        .fill(&template, TemplateFormat::Yaml, "a dragon", &output)
        .unwrap_err();

    assert!(err.to_string().contains("connection refused"));
    assert!(!output.exists());
}
