use std::collections::HashMap;

use serde_json::Value;

use crate::driver::ColumnSpec;
use crate::value::{GenericValue, row_to_json};

/// Column carrying the outcome of a conditional (`IF ...`) write
const APPLIED_COLUMN: &str = "[applied]";

/// One decoded row: column name to value, in result column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, GenericValue)>,
}

impl Row {
    /// Insert a column; a repeated name replaces the earlier value in place
    pub(crate) fn insert(&mut self, name: &str, value: GenericValue) {
        match self.columns.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&GenericValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenericValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, GenericValue> {
        self.columns.into_iter().collect()
    }

    pub fn to_json(&self) -> Value {
        row_to_json(self.iter())
    }
}

impl FromIterator<(String, GenericValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, GenericValue)>>(iter: I) -> Self {
        let mut row = Row::default();
        for (name, value) in iter {
            row.insert(&name, value);
        }
        row
    }
}

/// Rows of one executed page plus the token to fetch the next one.
///
/// Built once per execution and never mutated; it holds no connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    paging_state: Option<Vec<u8>>,
}

impl ResultSet {
    pub(crate) fn new(
        columns: Vec<ColumnSpec>,
        rows: Vec<Row>,
        paging_state: Option<Vec<u8>>,
    ) -> Self {
        Self {
            columns,
            rows,
            paging_state: paging_state.filter(|state| !state.is_empty()),
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Rows in the order the database returned them
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Opaque continuation token; `None` when this was the last page
    pub fn page_state(&self) -> Option<&[u8]> {
        self.paging_state.as_deref()
    }

    pub fn has_more_pages(&self) -> bool {
        self.paging_state.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Outcome of a lightweight transaction, if this result came from one
    pub fn applied(&self) -> Option<bool> {
        self.rows.first()?.get(APPLIED_COLUMN)?.as_bool()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::CqlType;

    fn row(pairs: &[(&str, GenericValue)]) -> Row {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_row_keeps_column_order_and_unique_names() {
        let row = row(&[
            ("b", GenericValue::Int32(1)),
            ("a", GenericValue::Int32(2)),
            ("b", GenericValue::Int32(3)),
        ]);

        let names: Vec<_> = row.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(row.get("b"), Some(&GenericValue::Int32(3)));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_row_to_json() {
        let row = row(&[("id", GenericValue::Int32(1)), ("name", GenericValue::Null)]);
        assert_eq!(row.to_json(), json!({ "id": 1, "name": null }));
        assert_eq!(row.into_map().len(), 2);
    }

    #[test]
    fn test_empty_paging_state_means_last_page() {
        let result = ResultSet::new(Vec::new(), Vec::new(), Some(Vec::new()));
        assert!(result.page_state().is_none());
        assert!(!result.has_more_pages());

        let result = ResultSet::new(Vec::new(), Vec::new(), Some(vec![7]));
        assert_eq!(result.page_state(), Some(&[7u8][..]));
    }

    #[test]
    fn test_applied_reads_lwt_column() {
        let columns = vec![ColumnSpec::new("[applied]", CqlType::Boolean)];
        let result = ResultSet::new(
            columns,
            vec![row(&[("[applied]", GenericValue::Boolean(false))])],
            None,
        );
        assert_eq!(result.applied(), Some(false));
        assert_eq!(ResultSet::default().applied(), None);
    }
}
