//! Declarative validation rules for the application's forms.
//!
//! A [`Schema`] describes every known field. Forms validate against a
//! [`Schema::pick`] view so that only the fields they render are checked.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastFields;
use crate::embed;

/// Form fields known to the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    BroadCastingDate,
    BroadCastUrl,
    Body,
    Name,
}

impl Field {
    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::BroadCastingDate => "broadCastingDate",
            Field::BroadCastUrl => "broadCastUrl",
            Field::Body => "body",
            Field::Name => "name",
        }
    }
}

/// Field-level error messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    /// Record an error; the first message for a field wins.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.name(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Source of raw field values for validation.
pub trait FormInput {
    fn value(&self, field: Field) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Date,
    VideoUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRule {
    field: Field,
    kind: Kind,
    required: Option<&'static str>,
    max_chars: Option<usize>,
    invalid: &'static str,
}

impl FieldRule {
    fn check(&self, raw: Option<&str>) -> Result<(), String> {
        let value = raw.unwrap_or_default();
        if value.trim().is_empty() {
            return match self.required {
                Some(message) => Err(message.to_string()),
                None => Ok(()),
            };
        }
        if let Some(max) = self.max_chars
            && value.chars().count() > max
        {
            return Err(format!("{max}文字以内で入力してください"));
        }
        let valid = match self.kind {
            Kind::Text => true,
            Kind::Date => parse_date(value).is_some(),
            Kind::VideoUrl => embed::normalize(value).is_ok(),
        };
        if valid {
            Ok(())
        } else {
            Err(self.invalid.to_string())
        }
    }
}

/// The full set of form rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            rules: vec![
                FieldRule {
                    field: Field::Title,
                    kind: Kind::Text,
                    required: Some("タイトルを入力してください"),
                    max_chars: Some(100),
                    invalid: "タイトルが不正です",
                },
                FieldRule {
                    field: Field::BroadCastingDate,
                    kind: Kind::Date,
                    required: Some("放送日を入力してください"),
                    max_chars: None,
                    invalid: "正しい日付を入力してください",
                },
                FieldRule {
                    field: Field::BroadCastUrl,
                    kind: Kind::VideoUrl,
                    required: Some("URLを入力してください"),
                    max_chars: Some(2048),
                    invalid: "YouTubeの動画URLを入力してください",
                },
                FieldRule {
                    field: Field::Body,
                    kind: Kind::Text,
                    required: Some("エンジビアを入力してください"),
                    max_chars: Some(200),
                    invalid: "エンジビアが不正です",
                },
                FieldRule {
                    field: Field::Name,
                    kind: Kind::Text,
                    required: Some("ユーザー名を入力してください"),
                    max_chars: Some(50),
                    invalid: "ユーザー名が不正です",
                },
            ],
        }
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view of the schema restricted to `fields`.
    pub fn pick<'a>(&'a self, fields: &'a [Field]) -> Picked<'a> {
        Picked {
            schema: self,
            fields,
        }
    }

    /// Validate every field of the schema.
    pub fn check(&self, input: &impl FormInput) -> Result<(), FieldErrors> {
        check_rules(self.rules.iter(), input)
    }
}

/// A borrowed subset of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct Picked<'a> {
    schema: &'a Schema,
    fields: &'a [Field],
}

impl Picked<'_> {
    pub fn check(&self, input: &impl FormInput) -> Result<(), FieldErrors> {
        check_rules(
            self.schema
                .rules
                .iter()
                .filter(|rule| self.fields.contains(&rule.field)),
            input,
        )
    }
}

fn check_rules<'r>(
    rules: impl Iterator<Item = &'r FieldRule>,
    input: &impl FormInput,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    for rule in rules {
        if let Err(message) = rule.check(input.value(rule.field)) {
            errors.insert(rule.field, message);
        }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Parse a calendar date given as `yyyy-MM-dd` or as an RFC 3339 date-time.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Raw input of the broadcast registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastForm {
    pub title: String,
    pub broad_casting_date: String,
}

impl FormInput for BroadcastForm {
    fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(&self.title),
            Field::BroadCastingDate => Some(&self.broad_casting_date),
            _ => None,
        }
    }
}

impl BroadcastForm {
    pub const FIELDS: [Field; 2] = [Field::Title, Field::BroadCastingDate];

    /// Validate title and date only, returning the fields to persist.
    pub fn validate(&self, schema: &Schema) -> Result<BroadcastFields, FieldErrors> {
        schema.pick(&Self::FIELDS).check(self)?;
        let broad_casting_date = parse_date(&self.broad_casting_date).ok_or_else(|| {
            FieldErrors::single(Field::BroadCastingDate, "正しい日付を入力してください")
        })?;
        Ok(BroadcastFields {
            title: self.title.clone(),
            broad_casting_date,
        })
    }
}

/// Input of a single field, for one-field forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleField<'a> {
    pub field: Field,
    pub value: &'a str,
}

impl FormInput for SingleField<'_> {
    fn value(&self, field: Field) -> Option<&str> {
        (field == self.field).then_some(self.value)
    }
}

impl SingleField<'_> {
    pub fn validate(&self, schema: &Schema) -> Result<(), FieldErrors> {
        schema.pick(std::slice::from_ref(&self.field)).check(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, date: &str) -> BroadcastForm {
        BroadcastForm {
            title: title.into(),
            broad_casting_date: date.into(),
        }
    }

    #[test]
    fn valid_pairs_are_returned_unchanged() {
        let schema = Schema::new();
        for (title, date) in [("Demo", "2024-01-01"), ("  spaced  ", "2021-09-03")] {
            let fields = form(title, date).validate(&schema).unwrap();
            assert_eq!(fields.title, title);
            assert_eq!(crate::broadcast::format_date(fields.broad_casting_date), date);
        }
    }

    #[test]
    fn missing_fields_get_field_specific_messages() {
        let schema = Schema::new();

        let errors = form("", "2024-01-01").validate(&schema).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Title), Some("タイトルを入力してください"));

        let errors = form("Demo", "  ").validate(&schema).unwrap_err();
        assert_eq!(errors.get(Field::BroadCastingDate), Some("放送日を入力してください"));
        assert!(errors.get(Field::Title).is_none());

        let errors = form("", "").validate(&schema).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn dates_must_be_calendar_dates() {
        let schema = Schema::new();
        let errors = form("Demo", "2024-02-30").validate(&schema).unwrap_err();
        assert_eq!(
            errors.get(Field::BroadCastingDate),
            Some("正しい日付を入力してください")
        );

        let fields = form("Demo", "2021-09-03T10:00:00+09:00").validate(&schema).unwrap();
        assert_eq!(fields.broad_casting_date, NaiveDate::from_ymd_opt(2021, 9, 3).unwrap());
    }

    #[test]
    fn pick_only_checks_listed_fields() {
        let schema = Schema::new();
        // The full schema also requires a URL and a body, which this form lacks.
        assert!(schema.check(&form("Demo", "2024-01-01")).is_err());
        assert!(schema.pick(&BroadcastForm::FIELDS).check(&form("Demo", "2024-01-01")).is_ok());
        // Picking does not alter the full definition.
        assert_eq!(schema, Schema::new());
    }

    #[test]
    fn single_field_validation() {
        let schema = Schema::new();
        let url = SingleField {
            field: Field::BroadCastUrl,
            value: "not a url",
        };
        let errors = url.validate(&schema).unwrap_err();
        assert_eq!(
            errors.get(Field::BroadCastUrl),
            Some("YouTubeの動画URLを入力してください")
        );

        let long_body = "あ".repeat(201);
        let body = SingleField {
            field: Field::Body,
            value: &long_body,
        };
        assert_eq!(
            body.validate(&schema).unwrap_err().get(Field::Body),
            Some("200文字以内で入力してください")
        );
    }
}
