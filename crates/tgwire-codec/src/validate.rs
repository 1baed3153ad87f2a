//! Schema-driven validation of wire JSON
//!
//! Walks a `serde_json::Value` against the static tables in [`crate::schema`]
//! before any typed record is built, so failures carry the full field path
//! and container ambiguities can be reported instead of silently resolved.

use crate::config::CodecConfig;
use crate::diagnostic::{Diagnostic, UnknownVariantWarning, VariantIssue};
use crate::error::{DecodeError, Result};
use crate::path::FieldPath;
use crate::schema::{EntityKind, EntitySchema, FieldKind, FieldSpec, Presence};
use serde_json::{Map, Value};
use tgwire_types::{Identifier, Utf16Text};
use tracing::trace;

pub(crate) struct Validator<'a> {
    config: &'a CodecConfig,
    path: FieldPath,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(config: &'a CodecConfig) -> Self {
        Self {
            config,
            path: FieldPath::root(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Validate a JSON array whose items are all `entity`
    pub(crate) fn list(&mut self, entity: EntityKind, value: &Value) -> Result<()> {
        let Some(items) = value.as_array() else {
            return Err(self.mismatch(&FieldKind::ListOf(&FieldKind::Object), value));
        };
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            self.entity(entity, item)?;
            self.path.pop();
        }
        Ok(())
    }

    /// Validate one record and everything nested in it
    pub(crate) fn entity(&mut self, entity: EntityKind, value: &Value) -> Result<()> {
        let Some(map) = value.as_object() else {
            return Err(self.mismatch(&FieldKind::Entity(entity), value));
        };
        let schema = entity.schema();
        if let Some(base) = schema.extends {
            self.fields(base.schema(), map)?;
        }
        self.fields(schema, map)?;
        if schema.is_container() {
            self.variant(schema, map)?;
        }
        for &(text, entities) in schema.spans {
            self.spans(map, text, entities)?;
        }
        self.trace_unrecognised(schema, map);
        Ok(())
    }

    fn fields(&mut self, schema: &EntitySchema, map: &Map<String, Value>) -> Result<()> {
        for spec in schema.fields {
            match present(map, spec.name) {
                Some(value) => self.child(spec.name, |v| v.value(&spec.kind, value))?,
                None if is_required(spec, map) => {
                    return Err(DecodeError::MissingField {
                        path: self.path.child(spec.name),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    fn value(&mut self, kind: &FieldKind, value: &Value) -> Result<()> {
        let ok = match kind {
            FieldKind::Identifier => match Identifier::from_json(value) {
                Some(Ok(_)) => true,
                Some(Err(source)) => {
                    return Err(DecodeError::PrecisionLoss {
                        path: self.path.clone(),
                        source,
                    });
                }
                None => false,
            },
            FieldKind::Integer => value.is_i64(),
            FieldKind::Count => value.as_u64().is_some_and(|n| u32::try_from(n).is_ok()),
            FieldKind::Float => value.is_number(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::True => value.as_bool() == Some(true),
            FieldKind::String => value.is_string(),
            FieldKind::Enum(names) => value.as_str().is_some_and(|s| names.contains(&s)),
            FieldKind::Object => value.is_object(),
            FieldKind::Entity(entity) => return self.entity(*entity, value),
            FieldKind::ListOf(inner) => {
                let Some(items) = value.as_array() else {
                    return Err(self.mismatch(kind, value));
                };
                for (index, item) in items.iter().enumerate() {
                    self.path.push_index(index);
                    self.value(inner, item)?;
                    self.path.pop();
                }
                return Ok(());
            }
        };
        if ok {
            Ok(())
        } else {
            Err(self.mismatch(kind, value))
        }
    }

    /// Pick the populated variant of a container and validate only that one
    fn variant(&mut self, schema: &EntitySchema, map: &Map<String, Value>) -> Result<()> {
        let mut populated = schema
            .variants
            .iter()
            .filter_map(|spec| present(map, spec.name).map(|value| (spec, value)));

        let Some((chosen, value)) = populated.next() else {
            let unrecognised = map
                .keys()
                .filter(|key| !schema.knows(key))
                .cloned()
                .collect();
            self.warn(schema.entity, VariantIssue::NonePopulated { unrecognised });
            return Ok(());
        };

        let ignored: Vec<&'static str> = populated
            .map(|(spec, _)| spec.name)
            .filter(|name| !schema.companions.contains(&(chosen.name, *name)))
            .collect();
        if !ignored.is_empty() {
            if self.config.is_strict() {
                return Err(DecodeError::AmbiguousVariant {
                    path: self.path.clone(),
                    chosen: chosen.name,
                    ignored,
                });
            }
            self.warn(
                schema.entity,
                VariantIssue::Ambiguous {
                    chosen: chosen.name,
                    ignored,
                },
            );
        }

        self.child(chosen.name, |v| v.value(&chosen.kind, value))
    }

    fn spans(&mut self, map: &Map<String, Value>, text: &str, entities: &str) -> Result<()> {
        if !self.config.check_entity_ranges {
            return Ok(());
        }
        let (Some(text), Some(items)) = (
            present(map, text).and_then(Value::as_str),
            present(map, entities).and_then(Value::as_array),
        ) else {
            return Ok(());
        };

        let text = Utf16Text::new(text);
        for (index, item) in items.iter().enumerate() {
            let (Some(offset), Some(length)) = (count(item, "offset"), count(item, "length"))
            else {
                continue;
            };
            if let Err(source) = text.check_span(offset, length) {
                let mut path = self.path.child(entities);
                path.push_index(index);
                if self.config.is_strict() {
                    return Err(DecodeError::EntityOutOfRange { path, source });
                }
                self.diagnostics
                    .push(Diagnostic::EntityOutOfRange { path, source });
            }
        }
        Ok(())
    }

    fn trace_unrecognised(&self, schema: &EntitySchema, map: &Map<String, Value>) {
        for key in map.keys().filter(|key| !schema.knows(key)) {
            trace!(
                path = %self.path,
                entity = %schema.entity,
                field = %key,
                "Dropping unrecognised field"
            );
        }
    }

    fn child<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.path.push_field(name);
        let result = f(self);
        self.path.pop();
        result
    }

    fn warn(&mut self, container: EntityKind, issue: VariantIssue) {
        self.diagnostics
            .push(Diagnostic::UnknownVariant(UnknownVariantWarning {
                path: self.path.clone(),
                container,
                issue,
            }));
    }

    fn mismatch(&self, kind: &FieldKind, value: &Value) -> DecodeError {
        DecodeError::TypeMismatch {
            path: self.path.clone(),
            expected: kind.to_string(),
            found: describe(kind, value),
        }
    }
}

/// The field's value, treating an explicit `null` as absent
fn present<'v>(map: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    map.get(name).filter(|value| !value.is_null())
}

fn is_required(spec: &FieldSpec, map: &Map<String, Value>) -> bool {
    match spec.presence {
        Presence::Required => true,
        Presence::Optional => false,
        Presence::RequiredWhen { field, equals } => {
            map.get(field).and_then(Value::as_str) == Some(equals)
        }
    }
}

fn count(item: &Value, field: &str) -> Option<u32> {
    item.get(field)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn describe(kind: &FieldKind, value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if matches!(kind, FieldKind::Enum(_)) => format!("{s:?}"),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(entity: EntityKind, value: Value) -> Result<Vec<Diagnostic>> {
        let config = CodecConfig::default();
        let mut validator = Validator::new(&config);
        validator.entity(entity, &value)?;
        Ok(validator.into_diagnostics())
    }

    #[test]
    fn test_nested_path() {
        let err = validate(
            EntityKind::Message,
            json!({
                "message_id": 1,
                "date": 0,
                "chat": { "id": 1, "type": "private" },
                "photo": [{ "file_id": "a", "file_unique_id": "b", "width": 1, "height": "tall" }]
            }),
        )
        .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "photo[0].height");
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_conditional_field() {
        let link = json!({ "type": "text_link", "offset": 0, "length": 1 });
        let err = validate(EntityKind::MessageEntity, link).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "url");

        let bold = json!({ "type": "bold", "offset": 0, "length": 1 });
        assert!(validate(EntityKind::MessageEntity, bold).unwrap().is_empty());
    }

    #[test]
    fn test_enum_mismatch_names_value() {
        let err = validate(EntityKind::Chat, json!({ "id": 1, "type": "secret" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field `type`: expected one of private|group|supergroup|channel, found \"secret\""
        );
    }

    #[test]
    fn test_true_rejects_false() {
        let err = validate(
            EntityKind::Message,
            json!({
                "message_id": 1,
                "date": 0,
                "chat": { "id": -5, "type": "group" },
                "group_chat_created": false
            }),
        )
        .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "group_chat_created");
    }

    #[test]
    fn test_null_required_is_missing() {
        let err = validate(
            EntityKind::User,
            json!({ "id": 1, "is_bot": false, "first_name": null }),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { .. }));
    }

    #[test]
    fn test_detail_record_checks_summary_fields() {
        let err = validate(EntityKind::ChatFullInfo, json!({ "id": 1, "bio": "hi" })).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "type");
    }

    #[test]
    fn test_list_paths_start_with_index() {
        let config = CodecConfig::default();
        let mut validator = Validator::new(&config);
        let err = validator
            .list(
                EntityKind::Update,
                &json!([{ "update_id": 1 }, { "update_id": "two" }]),
            )
            .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "[1].update_id");
    }
}
