//! In-memory sort and pagination of merged result sets

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Object;

/// Key a reverse-reference listing is sorted by
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PublicId,
    TypeId,
    CreationTime,
    LastEditTime,
    Version,
    /// A stored field value, by field name
    Field(String),
}

impl SortKey {
    /// Parse the sort parameter used by listing endpoints
    ///
    /// Known object attributes map to their variant; anything else is taken
    /// as a field name.
    pub fn parse(name: &str) -> Self {
        match name {
            "public_id" => SortKey::PublicId,
            "type_id" => SortKey::TypeId,
            "creation_time" => SortKey::CreationTime,
            "last_edit_time" => SortKey::LastEditTime,
            "version" => SortKey::Version,
            other => SortKey::Field(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Map the `1` / `-1` direction convention; anything negative is descending
    pub fn from_direction(direction: i32) -> Self {
        if direction < 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// One page of a listing plus the size of the whole set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub results: Vec<T>,
    pub total: usize,
    pub skip: usize,
    pub limit: i64,
}

impl<T> PagedResult<T> {
    /// Whether items exist after this page
    pub fn has_more(&self) -> bool {
        self.skip + self.results.len() < self.total
    }
}

/// Sort objects by `key`, breaking ties by ascending public_id
pub fn sort_objects(objects: &mut [Object], key: &SortKey, order: SortOrder) {
    objects.sort_by(|a, b| {
        let primary = compare_by(a, b, key);
        let primary = match order {
            SortOrder::Ascending => primary,
            SortOrder::Descending => primary.reverse(),
        };
        primary.then_with(|| a.public_id.cmp(&b.public_id))
    });
}

fn compare_by(a: &Object, b: &Object, key: &SortKey) -> Ordering {
    match key {
        SortKey::PublicId => a.public_id.cmp(&b.public_id),
        SortKey::TypeId => a.type_id.cmp(&b.type_id),
        SortKey::CreationTime => a.creation_time.cmp(&b.creation_time),
        SortKey::LastEditTime => a.last_edit_time.cmp(&b.last_edit_time),
        SortKey::Version => compare_versions(&a.version, &b.version),
        SortKey::Field(name) => compare_values(a.get_value(name), b.get_value(name)),
    }
}

/// Dotted versions compare numerically per component; non-numeric parts
/// fall back to text order
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Missing and null sort first, then booleans, numbers, strings, the rest
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(l)), Some(Value::Bool(r))) => l.cmp(r),
        (Some(Value::Number(l)), Some(Value::Number(r))) => {
            let l = l.as_f64().unwrap_or(0.0);
            let r = r.as_f64().unwrap_or(0.0);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Slice `[skip, skip + limit)` out of `items`; `limit <= 0` takes the rest
pub fn paginate<T>(items: Vec<T>, skip: usize, limit: i64) -> Vec<T> {
    let rest = items.into_iter().skip(skip);
    if limit <= 0 {
        rest.collect()
    } else {
        rest.take(limit as usize).collect()
    }
}
