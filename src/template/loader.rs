// src/template/loader.rs
use bevy::log::info;
use std::path::{Path, PathBuf};

use super::builder::build_template;
use super::definition::Template;
use super::menu::TemplateMenu;
use super::schema::SchemaDocument;
use crate::error::SchemaLoadError;

/// Where a template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// `schema/Template` entry of the template menu.
    Menu(String),
    /// Uploaded schema file; the template is its first interface class.
    File(PathBuf),
}

impl SchemaSource {
    /// Treats arguments ending in `.json` or naming an existing file as uploads.
    pub fn from_argument(arg: &str) -> Self {
        let path = Path::new(arg);
        let looks_like_file = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            || path.is_file();
        if looks_like_file {
            SchemaSource::File(path.to_path_buf())
        } else {
            SchemaSource::Menu(arg.to_string())
        }
    }
}

pub fn load_template(source: &SchemaSource, menu: &TemplateMenu) -> Result<Template, SchemaLoadError> {
    match source {
        SchemaSource::Menu(template_path) => {
            let entry = menu
                .find(template_path)
                .ok_or_else(|| SchemaLoadError::TemplateNotFound(template_path.clone()))?;
            let document = SchemaDocument::read(&entry.schema_path)?;
            build_template(&document, &entry.schema_name, &entry.template_name)
        }
        SchemaSource::File(path) => load_uploaded_schema(path),
    }
}

pub fn load_uploaded_schema(path: &Path) -> Result<Template, SchemaLoadError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(SchemaLoadError::NotASchemaFile(path.display().to_string()));
    }
    let document = SchemaDocument::read(path)?;
    let template_name = document
        .default_interface()
        .ok_or_else(|| SchemaLoadError::NoInterfaceClass(path.display().to_string()))?
        .to_string();
    let schema_name = if document.name.is_empty() {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploaded".to_string())
    } else {
        document.name.clone()
    };
    info!(
        "Loading uploaded schema '{}' as template '{}/{}'.",
        path.display(),
        schema_name,
        template_name
    );
    build_template(&document, &schema_name, &template_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn uploaded_schema_resolves_interface_class() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mine.json");
        fs::write(
            &path,
            r#"{"classes": {"Bar": {"slots": []}, "Foo": {"is_a": "dh_interface", "slots": [{"name": "x", "slot_group": "A"}]}}}"#,
        )
        .unwrap();
        let template = load_uploaded_schema(&path).unwrap();
        assert_eq!(template.name, "Foo");
        assert_eq!(template.schema_name, "mine");
    }

    #[test]
    fn uploaded_schema_must_be_json() {
        let err = load_uploaded_schema(Path::new("schema.yaml")).unwrap_err();
        assert!(matches!(err, SchemaLoadError::NotASchemaFile(_)));
    }

    #[test]
    fn unknown_menu_path_is_not_found() {
        let err = load_template(&SchemaSource::Menu("x/Y".into()), &TemplateMenu::default()).unwrap_err();
        assert!(matches!(err, SchemaLoadError::TemplateNotFound(_)));
    }

    #[test]
    fn source_from_argument() {
        assert_eq!(
            SchemaSource::from_argument("covid/Covid"),
            SchemaSource::Menu("covid/Covid".into())
        );
        assert_eq!(
            SchemaSource::from_argument("my/schema.json"),
            SchemaSource::File(PathBuf::from("my/schema.json"))
        );
    }
}
