//! Engineer request and response shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use enghub_core::query::Projection;
use enghub_core::types::{Filter, FilterField, SortField};
use enghub_entity::Engineer;

use crate::validation::rules::{not_blank, not_nil};

/// Payload for creating an engineer.
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation instead of by the JSON decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEngineerDto {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name cannot be empty."),
        length(max = 100, message = "Max length for name is 100 characters.")
    )]
    pub name: String,

    #[serde(default, rename = "nameAR", alias = "name_ar")]
    #[validate(
        custom(function = "not_blank", message = "NameAR cannot be empty."),
        length(max = 100, message = "Max length for NameAR is 100 characters.")
    )]
    pub name_ar: String,
}

impl CreateEngineerDto {
    /// Build a new engineer from this payload.
    pub fn into_entity(self) -> Engineer {
        Engineer::new(self.name, self.name_ar)
    }
}

/// An engineer as returned to clients, also used as the update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EngineerDto {
    #[serde(default)]
    #[validate(custom(function = "not_nil", message = "Id cannot be empty."))]
    pub id: Uuid,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name cannot be empty."),
        length(max = 100, message = "Max length for name is 100 characters.")
    )]
    pub name: String,

    #[serde(default, rename = "nameAR", alias = "name_ar")]
    #[validate(
        custom(function = "not_blank", message = "NameAR cannot be empty."),
        length(max = 100, message = "Max length for NameAR is 100 characters.")
    )]
    pub name_ar: String,
}

impl From<Engineer> for EngineerDto {
    fn from(engineer: Engineer) -> Self {
        Self {
            id: engineer.id.into_uuid(),
            name: engineer.name,
            name_ar: engineer.name_ar,
        }
    }
}

/// Rows are read straight into the DTO, so the column names are accepted
/// as aliases of the JSON property names.
impl Projection<Engineer> for EngineerDto {
    const COLUMNS: &'static [&'static str] = &["id", "name", "name_ar"];
}

/// Name search and ordering for the paged engineer list.
#[derive(Debug, Clone, Default)]
pub struct EngineerSearch {
    /// Case-insensitive substring of the display name.
    pub search: Option<String>,
    /// Optional ordering.
    pub sort: Option<SortField>,
}

impl EngineerSearch {
    /// Translate the search text into a filter. Blank text matches everything.
    pub fn filter(&self) -> Option<Filter> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(Filter::from_field(FilterField::ilike(
            "name",
            format!("%{}%", escape_like(term)),
        )))
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use enghub_core::types::FilterValue;

    use super::*;

    #[test]
    fn test_create_dto_accepts_both_spellings() {
        let dto: CreateEngineerDto =
            serde_json::from_str(r#"{"name":"Ali","nameAR":"علي"}"#).expect("camel");
        assert_eq!(dto.name_ar, "علي");
        let dto: CreateEngineerDto =
            serde_json::from_str(r#"{"name":"Ali","name_ar":"علي"}"#).expect("snake");
        assert_eq!(dto.name_ar, "علي");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let dto: CreateEngineerDto = serde_json::from_str("{}").expect("empty object");
        assert!(dto.name.is_empty());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_dto_serializes_name_ar_as_name_ar_property() {
        let dto = EngineerDto::from(Engineer::new("Sara", "سارة"));
        let json = serde_json::to_value(&dto).expect("serialize");
        assert_eq!(json["nameAR"], "سارة");
        assert!(json.get("name_ar").is_none());
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let search = EngineerSearch {
            search: Some(" 50%_off ".to_string()),
            sort: None,
        };
        let filter = search.filter().expect("filter");
        assert_eq!(
            filter.fields[0].value,
            FilterValue::String("%50\\%\\_off%".to_string())
        );
        assert!(EngineerSearch::default().filter().is_none());
        assert!(
            EngineerSearch {
                search: Some("   ".to_string()),
                sort: None
            }
            .filter()
            .is_none()
        );
    }
}
