//! Sparse equality filters plus offset/limit for person queries.

use std::collections::{BTreeMap, HashMap};

/// Filterable person columns, declared in the order predicates are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Id,
    Name,
    Surname,
    Patronymic,
    Age,
    Gender,
    Nationality,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Id,
        FilterKey::Name,
        FilterKey::Surname,
        FilterKey::Patronymic,
        FilterKey::Age,
        FilterKey::Gender,
        FilterKey::Nationality,
    ];

    /// Column name in the `people` table.
    pub fn column(&self) -> &'static str {
        match self {
            FilterKey::Id => "id",
            FilterKey::Name => "name",
            FilterKey::Surname => "surname",
            FilterKey::Patronymic => "patronymic",
            FilterKey::Age => "age",
            FilterKey::Gender => "gender",
            FilterKey::Nationality => "nationality",
        }
    }

    /// Whether the column is stored as an integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, FilterKey::Id | FilterKey::Age)
    }

    /// Maps a query parameter name to a key. `nation` is the legacy name of
    /// the nationality parameter.
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "id" => Some(FilterKey::Id),
            "name" => Some(FilterKey::Name),
            "surname" => Some(FilterKey::Surname),
            "patronymic" => Some(FilterKey::Patronymic),
            "age" => Some(FilterKey::Age),
            "gender" => Some(FilterKey::Gender),
            "nationality" | "nation" => Some(FilterKey::Nationality),
            _ => None,
        }
    }
}

/// A filter value converted to its column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue<'a> {
    Text(&'a str),
    Integer(i32),
}

/// Optional equality filters plus pagination.
///
/// Only non-empty values are stored, so "no entry" is the single sentinel for
/// "no constraint on this column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    values: BTreeMap<FilterKey, String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from raw query parameters.
    ///
    /// Unknown parameters are ignored. Offset and limit that do not parse as
    /// non-negative integers are dropped with a warning.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut spec = Self::new();

        for (param, value) in params {
            if let Some(key) = FilterKey::from_param(param) {
                // The canonical name wins over the legacy alias.
                if param == "nation" && spec.get(key).is_some() {
                    continue;
                }
                if param == "nationality" && value.is_empty() {
                    continue;
                }
                spec.set(key, value);
            }
        }

        spec.offset = params
            .get("offset")
            .and_then(|raw| parse_non_negative("offset", raw));
        spec.limit = params
            .get("limit")
            .and_then(|raw| parse_non_negative("limit", raw));

        spec
    }

    /// Sets or clears (when `value` is empty) the constraint for `key`.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Populated constraints in column order.
    pub fn constraints(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Constraints typed for their column, in column order.
    ///
    /// An integer column whose value does not parse as `i32` is skipped with
    /// a warning, so the rest of the filter still applies.
    pub fn applicable(&self) -> impl Iterator<Item = (FilterKey, FilterValue<'_>)> {
        self.constraints().filter_map(|(key, value)| {
            if !key.is_integer() {
                return Some((key, FilterValue::Text(value)));
            }
            match value.trim().parse::<i32>() {
                Ok(n) => Some((key, FilterValue::Integer(n))),
                Err(_) => {
                    tracing::warn!("ignoring non-numeric {} filter: {:?}", key.column(), value);
                    None
                }
            }
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.values.is_empty() && self.offset.is_none() && self.limit.is_none()
    }
}

fn parse_non_negative(param: &str, raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Some(v),
        _ => {
            tracing::warn!("ignoring unparsable {} value: {:?}", param, raw);
            None
        }
    }
}
