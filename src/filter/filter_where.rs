use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};
use crate::types::{ColumnKind, Table};

/// Parsed WHERE tree
#[derive(Debug, Clone)]
pub enum WhereNode {
    Field(FilterWhereInfo),
    And(Vec<WhereNode>),
    Or(Vec<WhereNode>),
    Not(Box<WhereNode>),
}

pub struct FilterWhere<'t> {
    table: &'t Table,
    param_values: Vec<Value>,
    param_index: usize,
}

impl<'t> FilterWhere<'t> {
    pub fn new(table: &'t Table, starting_param_index: usize) -> Self {
        Self {
            table,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Compile a WHERE object to SQL. Placeholders start after `starting_param_index`.
    pub fn generate(
        table: &'t Table,
        where_data: &Value,
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let node = Self::parse(table, where_data)?;
        let mut filter_where = Self::new(table, starting_param_index);
        let sql = filter_where.build_sql(&node)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    /// Parse and validate a WHERE object against the table's columns
    pub fn parse(table: &Table, where_data: &Value) -> Result<WhereNode, FilterError> {
        match where_data {
            Value::Null => Ok(WhereNode::And(vec![])),
            Value::Object(obj) => {
                let mut nodes = Vec::with_capacity(obj.len());
                for (key, value) in obj {
                    if key.starts_with('$') {
                        nodes.push(Self::parse_logical_operator(table, key, value)?);
                    } else {
                        nodes.extend(Self::parse_field_condition(table, key, value)?);
                    }
                }
                Ok(WhereNode::And(nodes))
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(table: &Table, op: &str, value: &Value) -> Result<WhereNode, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let children = arr
                    .iter()
                    .map(|v| Self::parse(table, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" { WhereNode::And(children) } else { WhereNode::Or(children) })
            }
            "$not" => Ok(WhereNode::Not(Box::new(Self::parse(table, value)?))),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(table: &Table, field: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
        if !table.has_column(field) {
            return Err(FilterError::InvalidColumn(format!("{}.{}", table.name, field)));
        }

        let mut nodes = vec![];
        match value {
            Value::Object(obj) if obj.keys().all(|k| k.starts_with('$')) && !obj.is_empty() => {
                for (op_key, op_val) in obj {
                    let operator = Self::map_operator(op_key)?;
                    Self::validate_operator_data(operator, op_val)?;
                    nodes.push(WhereNode::Field(FilterWhereInfo {
                        column: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    }));
                }
            }
            // Implicit equality: { field: value }
            _ => nodes.push(WhereNode::Field(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            })),
        }
        Ok(nodes)
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Neq,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn validate_operator_data(operator: FilterOp, data: &Value) -> Result<(), FilterError> {
        match operator {
            FilterOp::In | FilterOp::NIn if !data.is_array() => Err(FilterError::InvalidOperatorData(
                "$in/$nin require an array".to_string(),
            )),
            FilterOp::Between => match data.as_array() {
                Some(values) if values.len() == 2 => Ok(()),
                _ => Err(FilterError::InvalidOperatorData(
                    "$between requires exactly 2 values".to_string(),
                )),
            },
            _ => Ok(()),
        }
    }

    fn build_sql(&mut self, node: &WhereNode) -> Result<String, FilterError> {
        match node {
            WhereNode::Field(info) => self.build_sql_condition(info),
            WhereNode::And(children) | WhereNode::Or(children) => {
                if children.is_empty() {
                    // Empty $or matches nothing, empty $and matches everything
                    return Ok(if matches!(node, WhereNode::Or(_)) { "1=0" } else { "1=1" }.to_string());
                }
                let joiner = if matches!(node, WhereNode::And(_)) { " AND " } else { " OR " };
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    parts.push(format!("({})", self.build_sql(child)?));
                }
                Ok(parts.join(joiner))
            }
            WhereNode::Not(inner) => Ok(format!("NOT ({})", self.build_sql(inner)?)),
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let kind = self
            .table
            .column(&condition.column)
            .map(|c| c.kind)
            .ok_or_else(|| FilterError::InvalidColumn(condition.column.clone()))?;
        let quoted_column = format!("\"{}\"", condition.column);

        Ok(match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() { format!("{} IS NULL", quoted_column) }
                else { format!("{} = {}", quoted_column, self.param(kind, condition.data.clone())) }
            }
            FilterOp::Neq => {
                if condition.data.is_null() { format!("{} IS NOT NULL", quoted_column) }
                else { format!("{} <> {}", quoted_column, self.param(kind, condition.data.clone())) }
            }
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(kind, condition.data.clone())),
            FilterOp::In | FilterOp::NIn => {
                let values = condition.data.as_array().cloned().unwrap_or_default();
                let negate = condition.operator == FilterOp::NIn;
                if values.is_empty() {
                    return Ok(if negate { "1=1" } else { "1=0" }.to_string());
                }
                let params: Vec<String> = values.into_iter().map(|v| self.param(kind, v)).collect();
                let keyword = if negate { "NOT IN" } else { "IN" };
                format!("{} {} ({})", quoted_column, keyword, params.join(", "))
            }
            FilterOp::Between => {
                let values = condition.data.as_array().cloned().unwrap_or_default();
                if values.len() != 2 {
                    return Err(FilterError::InvalidOperatorData("$between requires exactly 2 values".to_string()));
                }
                let low = self.param(kind, values[0].clone());
                let high = self.param(kind, values[1].clone());
                format!("{} BETWEEN {} AND {}", quoted_column, low, high)
            }
        })
    }

    fn param(&mut self, kind: ColumnKind, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}::{}", self.param_index, kind.pg_cast())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use serde_json::json;

    static ITEMS: Table = Table {
        name: "items",
        columns: &[
            Column::new("id", ColumnKind::Uuid),
            Column::new("user_id", ColumnKind::Uuid),
            Column::new("done", ColumnKind::Bool),
            Column::new("date", ColumnKind::Date),
        ],
        owner: Some("user_id"),
    };

    #[test]
    fn implicit_equality_casts_by_column_kind() {
        let (sql, params) = FilterWhere::generate(&ITEMS, &json!({ "user_id": "abc", "done": true }), 0).unwrap();
        // serde_json maps iterate in key order
        assert_eq!(sql, "(\"done\" = $1::boolean) AND (\"user_id\" = $2::uuid)");
        assert_eq!(params, vec![json!(true), json!("abc")]);
    }

    #[test]
    fn in_with_empty_array_matches_nothing() {
        let (sql, params) = FilterWhere::generate(&ITEMS, &json!({ "id": { "$in": [] } }), 0).unwrap();
        assert_eq!(sql, "(1=0)");
        assert!(params.is_empty());
    }

    #[test]
    fn placeholders_continue_from_starting_index() {
        let (sql, _) = FilterWhere::generate(
            &ITEMS,
            &json!({ "$or": [{ "date": { "$gte": "2025-01-01" } }, { "done": false }] }),
            2,
        )
        .unwrap();
        assert_eq!(sql, "(((\"date\" >= $3::date)) OR ((\"done\" = $4::boolean)))");
    }

    #[test]
    fn rejects_unknown_columns() {
        let err = FilterWhere::generate(&ITEMS, &json!({ "password": "x" }), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }
}
