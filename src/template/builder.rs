// src/template/builder.rs
//! Derives the flat field list of a template from its schema class.

use bevy::log::{debug, info};
use std::collections::{HashMap, HashSet};

use super::definition::Template;
use super::field::{Field, FieldPattern, Section};
use super::schema::{RawClass, RawSlot, SchemaDocument};
use super::vocabulary::flatten_vocabulary;
use crate::error::{ConfigurationError, SchemaLoadError};

/// Looks up `template_name` in the document and builds it.
pub fn build_template(
    document: &SchemaDocument,
    schema_name: &str,
    template_name: &str,
) -> Result<Template, SchemaLoadError> {
    let class = document
        .class(template_name)
        .ok_or_else(|| SchemaLoadError::TemplateNotFound(format!("{}/{}", schema_name, template_name)))?;
    let (sections, fields) = build_fields(class)?;
    info!(
        "Built template '{}/{}': {} sections, {} fields.",
        schema_name,
        template_name,
        sections.len(),
        fields.len()
    );
    Ok(Template::assemble(
        schema_name.to_string(),
        template_name.to_string(),
        class.see_also.clone(),
        sections,
        fields,
        document.export_formats.clone(),
    ))
}

/// Groups slots into contiguous sections and derives per-field attributes.
pub fn build_fields(class: &RawClass) -> Result<(Vec<Section>, Vec<Field>), ConfigurationError> {
    // Declared order first, then any slot group in order of first use.
    let mut section_titles: Vec<String> = Vec::new();
    for title in &class.sections {
        if !section_titles.contains(title) {
            section_titles.push(title.clone());
        }
    }
    for slot in &class.slots {
        let group = slot
            .slot_group
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| ConfigurationError::FieldWithoutSection {
                field: slot.display_title().to_string(),
            })?;
        if !section_titles.iter().any(|t| t == group) {
            section_titles.push(group.to_string());
        }
    }
    if section_titles.is_empty() {
        return Err(ConfigurationError::EmptyTemplate);
    }

    let mut grouped: Vec<Vec<&RawSlot>> = vec![Vec::new(); section_titles.len()];
    for slot in &class.slots {
        // Every slot has a group at this point.
        let group = slot.slot_group.as_deref().unwrap_or_default();
        if let Some(idx) = section_titles.iter().position(|t| t == group) {
            grouped[idx].push(slot);
        }
    }
    if let Some(idx) = grouped.iter().position(|slots| slots.is_empty()) {
        return Err(ConfigurationError::EmptySection {
            section: section_titles[idx].clone(),
        });
    }

    let own_vocabularies = own_vocabularies(&class.slots);

    let mut sections = Vec::with_capacity(section_titles.len());
    let mut fields = Vec::with_capacity(class.slots.len());
    let mut seen_titles = HashSet::new();
    for (section_idx, (title, slots)) in section_titles.into_iter().zip(grouped).enumerate() {
        let start = fields.len();
        for slot in slots {
            let field = build_field(slot, section_idx, &own_vocabularies)?;
            if !seen_titles.insert(field.title.clone()) {
                return Err(ConfigurationError::DuplicateFieldTitle { title: field.title });
            }
            fields.push(field);
        }
        sections.push(Section {
            title,
            columns: start..fields.len(),
        });
    }
    Ok((sections, fields))
}

/// Flattened vocabulary of each slot before any borrowing, keyed by both
/// name and title so `source` may use either.
fn own_vocabularies(slots: &[RawSlot]) -> HashMap<&str, Vec<String>> {
    let mut out = HashMap::new();
    for slot in slots {
        if slot.vocabulary.is_empty() {
            continue;
        }
        let flat = flatten_vocabulary(&slot.vocabulary);
        out.insert(slot.display_title(), flat.clone());
        out.insert(slot.name.as_str(), flat);
    }
    out
}

fn build_field(
    slot: &RawSlot,
    section: usize,
    own_vocabularies: &HashMap<&str, Vec<String>>,
) -> Result<Field, ConfigurationError> {
    let title = slot.display_title().to_string();

    let mut flat_vocabulary = own_vocabularies
        .get(slot.name.as_str())
        .cloned()
        .unwrap_or_default();
    if let Some(source) = &slot.source {
        let borrowed = own_vocabularies.get(source.as_str()).ok_or_else(|| {
            ConfigurationError::UnknownVocabularySource {
                field: title.clone(),
                source_field: source.clone(),
            }
        })?;
        flat_vocabulary.extend(borrowed.iter().cloned());
    }
    if let Some(transform) = slot.capitalize {
        for entry in flat_vocabulary.iter_mut() {
            if !entry.is_empty() {
                *entry = transform.apply(entry);
            }
        }
    }

    let pattern = match slot.pattern.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => Some(FieldPattern::compile(&title, p)?),
        None => None,
    };

    debug!(
        "Field '{}': {} vocabulary entries, pattern: {}",
        title,
        flat_vocabulary.len(),
        pattern.is_some()
    );

    Ok(Field {
        name: slot.name.clone(),
        title,
        datatype: slot.datatype,
        required: slot.is_required(),
        recommended: slot.is_recommended(),
        pattern,
        flat_vocabulary,
        null_values: slot.null_values.clone(),
        multivalued: slot.datatype.is_multivalued(),
        capitalize: slot.capitalize,
        source: slot.source.clone(),
        section,
        description: slot.description.clone(),
        guidance: slot.guidance.clone(),
        examples: slot.examples.clone(),
    })
}
