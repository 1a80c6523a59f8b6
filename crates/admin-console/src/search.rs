//! Advanced search form: declared fields per entity and the sparse filter
//! object submitted to the list endpoint.

use affiliate_api::Filter;
use affiliate_core::types::{CampaignStatus, PartnerStatus, UserStatus, Visibility};
use affiliate_core::EntityKind;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select(Vec<String>),
    CheckboxGroup(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl SearchField {
    fn input(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Input,
        }
    }

    fn select(name: &'static str, label: &'static str, options: Vec<String>) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select(options),
        }
    }

    fn checkboxes(name: &'static str, label: &'static str, options: Vec<String>) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::CheckboxGroup(options),
        }
    }
}

fn options<T: ToString>(values: Vec<T>) -> Vec<String> {
    values.into_iter().map(|v| v.to_string()).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Searchable fields for an entity's advanced search form.
pub fn search_fields(kind: EntityKind) -> Vec<SearchField> {
    match kind {
        EntityKind::Campaign => vec![
            SearchField::input("id", "Campaign ID"),
            SearchField::input("title", "Title"),
            SearchField::select("status", "Status", options(CampaignStatus::all())),
            SearchField::select("visibility", "Visibility", options(Visibility::all())),
            SearchField::input("advertiser", "Advertiser"),
            SearchField::input("category", "Category"),
            SearchField::input("geo", "Country"),
            SearchField::checkboxes("device", "Device", strings(&["desktop", "mobile", "tablet"])),
            SearchField::checkboxes(
                "operatingSystem",
                "Operating System",
                strings(&["android", "ios", "windows", "macos", "linux"]),
            ),
        ],
        EntityKind::Publisher => vec![
            SearchField::input("id", "Publisher ID"),
            SearchField::input("name", "Name"),
            SearchField::input("email", "Email"),
            SearchField::input("company", "Company"),
            SearchField::input("country", "Country"),
            SearchField::select("status", "Status", options(PartnerStatus::all())),
        ],
        EntityKind::Advertiser => vec![
            SearchField::input("id", "Advertiser ID"),
            SearchField::input("name", "Name"),
            SearchField::input("email", "Email"),
            SearchField::input("company", "Company"),
            SearchField::input("country", "Country"),
            SearchField::select("status", "Status", options(PartnerStatus::all())),
        ],
        EntityKind::User => vec![
            SearchField::input("name", "Name"),
            SearchField::input("email", "Email"),
            SearchField::input("role", "Role"),
            SearchField::select("status", "Status", options(UserStatus::all())),
        ],
    }
}

/// A submitted search with empty fields stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter(Filter);

impl SearchFilter {
    /// Drop nulls, blank strings, and empty arrays from raw form values.
    /// No other validation happens client-side.
    pub fn from_form(values: Filter) -> Self {
        let sparse = values
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::Array(items) => {
                    let items: Vec<Value> = items
                        .into_iter()
                        .filter(|v| !v.is_null() && v.as_str().map_or(true, |s| !s.trim().is_empty()))
                        .collect();
                    (!items.is_empty()).then(|| (key, Value::Array(items)))
                }
                other => Some((key, other)),
            })
            .collect();
        SearchFilter(sparse)
    }

    /// Parse `key=value` pairs; `a,b` becomes a list.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Filter::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got `{pair}`"))?;
            let value = if value.contains(',') {
                Value::Array(
                    value
                        .split(',')
                        .map(|v| Value::String(v.trim().to_string()))
                        .collect(),
                )
            } else {
                Value::String(value.trim().to_string())
            };
            values.insert(key.trim().to_string(), value);
        }
        Ok(Self::from_form(values))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_filter(&self) -> &Filter {
        &self.0
    }
}
