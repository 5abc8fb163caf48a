//! Data table component types.
//!
//! A [`DataTableConfig`] describes the columns and filter controls of a list
//! page. The table partial renders headers, sort links and the filter bar
//! from it; the rows themselves are page specific.

use emporium_core::{OrderStatus, PaymentStatus};

/// A table column. Sortable columns use `key` as the backend sort key.
#[derive(Debug, Clone, Copy)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    /// Right-aligned (amounts and counts).
    pub numeric: bool,
}

impl TableColumn {
    const fn plain(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
            numeric: false,
        }
    }

    const fn sorted(key: &'static str, label: &'static str) -> Self {
        Self {
            sortable: true,
            ..Self::plain(key, label)
        }
    }

    const fn numeric(self) -> Self {
        Self {
            numeric: true,
            ..self
        }
    }
}

/// A `value`/`label` pair in a select filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// A filter control in the filter bar.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Query parameter; date ranges use `{key}_from` and `{key}_to`.
    pub key: &'static str,
    pub label: &'static str,
    /// Select options. Empty for date ranges.
    pub options: Vec<FilterOption>,
}

impl TableFilter {
    fn select(key: &'static str, label: &'static str, options: Vec<FilterOption>) -> Self {
        Self {
            key,
            label,
            options,
        }
    }

    const fn date_range(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        !self.options.is_empty()
    }

    #[must_use]
    pub fn is_date_range(&self) -> bool {
        self.options.is_empty()
    }
}

/// Columns, filters and empty state of a list page.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Element id of the table, which HTMX requests swap.
    pub table_id: &'static str,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub search_placeholder: &'static str,
    pub empty_title: &'static str,
    pub empty_description: Option<&'static str>,
}

/// The orders list table.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    let status_options = OrderStatus::ALL
        .iter()
        .map(|s| FilterOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect();
    let payment_options = PaymentStatus::ALL
        .iter()
        .map(|s| FilterOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect();

    DataTableConfig {
        table_id: "orders-table",
        columns: vec![
            TableColumn::sorted("order_number", "Order"),
            TableColumn::sorted("customer_name", "Customer"),
            TableColumn::plain("status", "Status"),
            TableColumn::plain("payment_status", "Payment"),
            TableColumn::plain("items", "Items").numeric(),
            TableColumn::sorted("total_amount", "Total").numeric(),
            TableColumn::sorted("created_at", "Placed"),
        ],
        filters: vec![
            TableFilter::select("status", "Status", status_options),
            TableFilter::select("payment_status", "Payment", payment_options),
            TableFilter::date_range("date", "Placed"),
        ],
        search_placeholder: "Search by order number, name or email...",
        empty_title: "No orders found",
        empty_description: Some("Try adjusting your search or filters"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SORT_COLUMNS;

    #[test]
    fn test_sortable_columns_match_backend_sort_keys() {
        let config = orders_table_config();
        for column in config.columns.iter().filter(|c| c.sortable) {
            assert!(
                SORT_COLUMNS.contains(&column.key),
                "{} is not a backend sort key",
                column.key
            );
        }
    }

    #[test]
    fn test_status_filters_list_every_status() {
        let config = orders_table_config();
        let status = config
            .filters
            .iter()
            .find(|f| f.key == "status")
            .map(|f| f.options.len());
        assert_eq!(status, Some(OrderStatus::ALL.len()));
        assert!(config.filters.iter().any(TableFilter::is_date_range));
    }

    #[test]
    fn test_amount_columns_are_right_aligned() {
        let config = orders_table_config();
        let numeric: Vec<_> = config
            .columns
            .iter()
            .filter(|c| c.numeric)
            .map(|c| c.key)
            .collect();
        assert_eq!(numeric, ["items", "total_amount"]);
    }
}
