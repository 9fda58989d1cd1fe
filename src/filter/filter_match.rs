use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_where::{FilterWhere, WhereNode};
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection};
use crate::types::{ColumnKind, Table};

/// Evaluates the filter language against in-memory rows, mirroring the SQL that
/// `FilterWhere` / `FilterOrder` generate for Postgres.
pub struct FilterMatch;

impl FilterMatch {
    pub fn compile(table: &Table, where_data: Option<&Value>) -> Result<WhereNode, FilterError> {
        match where_data {
            Some(data) => FilterWhere::parse(table, data),
            None => Ok(WhereNode::And(vec![])),
        }
    }

    pub fn matches(table: &Table, node: &WhereNode, row: &Map<String, Value>) -> bool {
        match node {
            WhereNode::Field(info) => Self::matches_condition(table, info, row),
            WhereNode::And(children) => children.iter().all(|c| Self::matches(table, c, row)),
            WhereNode::Or(children) => children.iter().any(|c| Self::matches(table, c, row)),
            WhereNode::Not(inner) => !Self::matches(table, inner, row),
        }
    }

    fn matches_condition(table: &Table, info: &FilterWhereInfo, row: &Map<String, Value>) -> bool {
        let kind = table.column(&info.column).map(|c| c.kind).unwrap_or(ColumnKind::Text);
        let value = row.get(&info.column).unwrap_or(&Value::Null);

        match info.operator {
            FilterOp::Eq if info.data.is_null() => value.is_null(),
            FilterOp::Neq if info.data.is_null() => !value.is_null(),
            // SQL semantics: comparisons against NULL are never true
            _ if value.is_null() => false,
            FilterOp::Eq => Self::compare(kind, value, &info.data) == Some(Ordering::Equal),
            FilterOp::Neq => matches!(Self::compare(kind, value, &info.data), Some(o) if o != Ordering::Equal),
            FilterOp::Gt => Self::compare(kind, value, &info.data) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(Self::compare(kind, value, &info.data), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => Self::compare(kind, value, &info.data) == Some(Ordering::Less),
            FilterOp::Lte => matches!(Self::compare(kind, value, &info.data), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::In | FilterOp::NIn => {
                let found = info
                    .data
                    .as_array()
                    .map(|values| values.iter().any(|v| Self::compare(kind, value, v) == Some(Ordering::Equal)))
                    .unwrap_or(false);
                found == (info.operator == FilterOp::In)
            }
            FilterOp::Between => match info.data.as_array().map(|v| v.as_slice()) {
                Some([low, high]) => {
                    matches!(Self::compare(kind, value, low), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(Self::compare(kind, value, high), Some(Ordering::Less | Ordering::Equal))
                }
                _ => false,
            },
        }
    }

    /// Typed comparison of two JSON values. `None` when either side does not parse as `kind`.
    pub fn compare(kind: ColumnKind, left: &Value, right: &Value) -> Option<Ordering> {
        match kind {
            ColumnKind::Timestamp => {
                let l = left.as_str()?.parse::<DateTime<Utc>>().ok()?;
                let r = right.as_str()?.parse::<DateTime<Utc>>().ok()?;
                Some(l.cmp(&r))
            }
            ColumnKind::Date => {
                let l = NaiveDate::parse_from_str(left.as_str()?, "%Y-%m-%d").ok()?;
                let r = NaiveDate::parse_from_str(right.as_str()?, "%Y-%m-%d").ok()?;
                Some(l.cmp(&r))
            }
            ColumnKind::Numeric => left.as_f64()?.partial_cmp(&right.as_f64()?),
            ColumnKind::Bool => Some(left.as_bool()?.cmp(&right.as_bool()?)),
            ColumnKind::Uuid => {
                let l = left.as_str()?.parse::<uuid::Uuid>().ok()?;
                let r = right.as_str()?.parse::<uuid::Uuid>().ok()?;
                Some(l.cmp(&r))
            }
            ColumnKind::Text => Some(left.as_str()?.cmp(right.as_str()?)),
        }
    }

    /// Sort rows the way Postgres does by default: NULLS LAST ascending, NULLS FIRST descending
    pub fn sort(table: &Table, order: &[FilterOrderInfo], rows: &mut [Map<String, Value>]) {
        rows.sort_by(|a, b| {
            for info in order {
                let kind = table.column(&info.column).map(|c| c.kind).unwrap_or(ColumnKind::Text);
                let left = a.get(&info.column).unwrap_or(&Value::Null);
                let right = b.get(&info.column).unwrap_or(&Value::Null);
                let ordering = match (left.is_null(), right.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => Self::compare(kind, left, right).unwrap_or(Ordering::Equal),
                };
                let ordering = match info.sort {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use serde_json::json;

    static SAMPLES: Table = Table {
        name: "samples",
        columns: &[
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("date", ColumnKind::Date),
            Column::new("hours", ColumnKind::Numeric),
            Column::new("created_at", ColumnKind::Timestamp),
        ],
        owner: Some("user_id"),
    };

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn timestamps_compare_chronologically_not_lexically() {
        let earlier = json!("2025-03-01T10:00:00.5Z");
        let later = json!("2025-03-01T10:00:00.25+01:00");
        // 10:00:00.25+01:00 is 09:00:00.25Z
        assert_eq!(FilterMatch::compare(ColumnKind::Timestamp, &earlier, &later), Some(Ordering::Greater));
    }

    #[test]
    fn between_is_inclusive() {
        let node = FilterMatch::compile(&SAMPLES, Some(&json!({ "date": { "$between": ["2025-03-01", "2025-03-07"] } }))).unwrap();
        assert!(FilterMatch::matches(&SAMPLES, &node, &row(json!({ "date": "2025-03-07" }))));
        assert!(!FilterMatch::matches(&SAMPLES, &node, &row(json!({ "date": "2025-03-08" }))));
    }

    #[test]
    fn null_never_satisfies_comparisons() {
        let node = FilterMatch::compile(&SAMPLES, Some(&json!({ "hours": { "$lt": 3 } }))).unwrap();
        assert!(!FilterMatch::matches(&SAMPLES, &node, &row(json!({ "hours": null }))));
    }

    #[test]
    fn descending_sort_puts_nulls_first() {
        let mut rows = vec![
            row(json!({ "hours": 1.0 })),
            row(json!({ "hours": null })),
            row(json!({ "hours": 4.5 })),
        ];
        let order = vec![FilterOrderInfo { column: "hours".into(), sort: SortDirection::Desc }];
        FilterMatch::sort(&SAMPLES, &order, &mut rows);
        let hours: Vec<Value> = rows.iter().map(|r| r["hours"].clone()).collect();
        assert_eq!(hours, vec![json!(null), json!(4.5), json!(1.0)]);
    }
}
