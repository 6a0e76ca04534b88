//! Filter, sort and paginate
//!
//! Pure functions over a borrowed snapshot. Intermediate results are lists
//! of snapshot positions, so the records themselves are never cloned or
//! reordered. Identical inputs always give an identical view.

use std::ops::Range;

use crate::column::ColumnSet;
use crate::record::Record;
use crate::state::{is_blank, FilterState, PaginationState, SortDirection, SortState, ViewState};
use crate::value::SortKey;
use crate::view::{DerivedView, ViewRow};

/// Positions of the records that match every non-blank filter, in input order.
///
/// Filters naming unknown or non-filterable columns are skipped. Matching
/// is a case-insensitive substring test on the cell's string form.
pub fn apply_filters<R>(records: &[R], filters: &FilterState, columns: &ColumnSet<R>) -> Vec<usize> {
    let active: Vec<_> = filters
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .filter_map(|(id, value)| {
            columns
                .get(id)
                .filter(|c| c.is_filterable())
                .map(|c| (c, value.to_lowercase()))
        })
        .collect();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            active
                .iter()
                .all(|(column, needle)| column.value(record).contains_lowercase(needle))
        })
        .map(|(position, _)| position)
        .collect()
}

/// Reorder `rows` by the sort column.
///
/// Keys follow [`SortKey`]'s total order, so the result does not depend on
/// the input order beyond ties. Rows with equal keys keep their order from
/// `rows`, whatever the direction. Without a usable sort the input order is
/// returned as is.
pub fn apply_sort<R>(records: &[R], rows: &[usize], sort: Option<&SortState>, columns: &ColumnSet<R>) -> Vec<usize> {
    let Some(sort) = sort else {
        return rows.to_vec();
    };
    let Some(column) = columns.get(&sort.column_id).filter(|c| c.is_sortable()) else {
        return rows.to_vec();
    };

    let mut keyed: Vec<(usize, usize, SortKey)> = rows
        .iter()
        .enumerate()
        .map(|(order, &position)| (order, position, column.value(&records[position]).sort_key()))
        .collect();

    keyed.sort_unstable_by(|a, b| {
        let by_key = a.2.cmp(&b.2);
        let by_key = match sort.direction {
            SortDirection::Asc => by_key,
            SortDirection::Desc => by_key.reverse(),
        };
        by_key.then(a.0.cmp(&b.0))
    });

    keyed.into_iter().map(|(_, position, _)| position).collect()
}

/// Pages needed for `total` rows; an empty sequence still has one page
pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// One page of a filtered and sorted sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page index after clamping to the last valid page
    pub page_index: usize,
    /// Slice bounds within the sequence
    pub range: Range<usize>,
    pub page_count: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

/// Slice out the requested page. A page index past the end is clamped to
/// the last page instead of producing an out-of-range page.
pub fn paginate(total: usize, pagination: &PaginationState) -> Page {
    let page_size = pagination.page_size.max(1);
    let page_count = page_count(total, page_size);
    let page_index = pagination.page_index.min(page_count - 1);

    let start = (page_index * page_size).min(total);
    let end = (start + page_size).min(total);

    Page {
        page_index,
        range: start..end,
        page_count,
        can_go_next: page_index + 1 < page_count,
        can_go_previous: page_index > 0,
    }
}

/// Filter, sort and paginate `records` under `state`.
///
/// The returned view's `page_index` is the clamped one; callers owning the
/// state should write it back.
pub fn derive<R: Record>(records: &[R], columns: &ColumnSet<R>, state: &ViewState) -> DerivedView {
    let filtered = apply_filters(records, &state.filters, columns);
    let sorted = apply_sort(records, &filtered, state.sort.as_ref(), columns);
    let page = paginate(sorted.len(), &state.pagination);

    let rows = sorted[page.range.clone()]
        .iter()
        .zip(page.range.clone())
        .map(|(&position, global_index)| {
            let id = records[position].id().to_string();
            ViewRow {
                selected: state.is_selected(&id),
                id,
                number: global_index + 1,
                position,
            }
        })
        .collect();

    let visible_columns = columns
        .iter()
        .filter(|c| !state.is_hidden(c.id()))
        .map(|c| c.id().to_string())
        .collect();

    DerivedView {
        rows,
        page_index: page.page_index,
        page_size: state.pagination.page_size.max(1),
        page_count: page.page_count,
        can_go_next: page.can_go_next,
        can_go_previous: page.can_go_previous,
        total_filtered: sorted.len(),
        total_records: records.len(),
        visible_columns,
        sort: state.sort.clone(),
        version: 0,
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::value::{parse_date, CellValue};

    #[derive(Debug, Clone)]
    struct Item {
        id: String,
        name: String,
        amount: f64,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: u32, name: &str, amount: f64) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            amount,
        }
    }

    fn columns() -> ColumnSet<Item> {
        ColumnSet::new(vec![
            ColumnDescriptor::index(),
            ColumnDescriptor::text("name", "Name", |i: &Item| CellValue::text(&i.name)),
            ColumnDescriptor::text("amount", "Amount", |i: &Item| CellValue::number(i.amount)),
            ColumnDescriptor::text("note", "Note", |i: &Item| CellValue::text(&i.name)).not_sortable(),
            ColumnDescriptor::text("label", "Label", |i: &Item| {
                if i.name.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::text(&i.name)
                }
            }),
            ColumnDescriptor::text("created", "Created", |i: &Item| CellValue::from(parse_date(&i.name))),
            ColumnDescriptor::actions(),
        ])
        .unwrap()
    }

    fn sample() -> Vec<Item> {
        vec![item(1, "b", 3.0), item(2, "a", 1.0), item(3, "a", 2.0)]
    }

    fn ids(records: &[Item], rows: &[usize]) -> Vec<u32> {
        rows.iter().map(|&p| records[p].id.parse().unwrap()).collect()
    }

    fn filters(pairs: &[(&str, &str)]) -> FilterState {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sort(column: &str, direction: SortDirection) -> SortState {
        SortState {
            column_id: column.to_string(),
            direction,
        }
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let records = vec![item(1, "Toko Maju", 0.0), item(2, "Warung", 0.0), item(3, "MAJU jaya", 0.0)];
        let rows = apply_filters(&records, &filters(&[("name", "maju")]), &columns());
        assert_eq!(ids(&records, &rows), vec![1, 3]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let records = vec![item(1, "alpha", 10.0), item(2, "alpha", 25.0), item(3, "beta", 25.0)];
        let rows = apply_filters(&records, &filters(&[("name", "alp"), ("amount", "25")]), &columns());
        assert_eq!(ids(&records, &rows), vec![2]);
    }

    #[test]
    fn test_blank_and_unknown_filters_ignored() {
        let records = sample();
        let rows = apply_filters(
            &records,
            &filters(&[("name", "  "), ("missing", "zzz"), ("index", "9")]),
            &columns(),
        );
        assert_eq!(ids(&records, &rows), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_result_is_subset_satisfying_predicate() {
        let records = vec![
            item(1, "Apple", 1.0),
            item(2, "banana", 2.0),
            item(3, "grape", 3.0),
            item(4, "PineApple", 4.0),
        ];
        let f = filters(&[("name", "APP")]);
        let rows = apply_filters(&records, &f, &columns());
        assert!(rows.iter().all(|&p| p < records.len()));
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
        for &p in &rows {
            assert!(records[p].name.to_lowercase().contains("app"));
        }
        assert_eq!(ids(&records, &rows), vec![1, 4]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let cols = columns();
        let f = filters(&[("name", "a")]);
        let once: Vec<Item> = apply_filters(&records, &f, &cols)
            .into_iter()
            .map(|p| records[p].clone())
            .collect();
        let twice = apply_filters(&once, &f, &cols);
        assert_eq!(twice, (0..once.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_sort_by_name_is_stable() {
        let records = sample();
        let all: Vec<usize> = (0..records.len()).collect();
        let rows = apply_sort(&records, &all, Some(&sort("name", SortDirection::Asc)), &columns());
        assert_eq!(ids(&records, &rows), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_desc_keeps_ties_in_input_order() {
        let records = sample();
        let all: Vec<usize> = (0..records.len()).collect();
        let rows = apply_sort(&records, &all, Some(&sort("name", SortDirection::Desc)), &columns());
        assert_eq!(ids(&records, &rows), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_numbers_numerically() {
        let records = vec![item(1, "x", 10.0), item(2, "y", 9.0), item(3, "z", 100.0)];
        let all: Vec<usize> = (0..records.len()).collect();
        let rows = apply_sort(&records, &all, Some(&sort("amount", SortDirection::Asc)), &columns());
        assert_eq!(ids(&records, &rows), vec![2, 1, 3]);
    }

    fn names(records: &[Item], rows: &[usize]) -> Vec<String> {
        rows.iter().map(|&p| records[p].name.clone()).collect()
    }

    fn sort_all(records: &[Item], column: &str, direction: SortDirection) -> Vec<usize> {
        let all: Vec<usize> = (0..records.len()).collect();
        apply_sort(records, &all, Some(&sort(column, direction)), &columns())
    }

    #[test]
    fn test_sort_mixed_text_independent_of_input_order() {
        let orders = [
            ["9", "10", "1a"],
            ["9", "1a", "10"],
            ["10", "9", "1a"],
            ["10", "1a", "9"],
            ["1a", "9", "10"],
            ["1a", "10", "9"],
        ];
        for order in orders {
            let records: Vec<Item> = order
                .iter()
                .enumerate()
                .map(|(i, name)| item(i as u32 + 1, name, 0.0))
                .collect();
            let asc = sort_all(&records, "name", SortDirection::Asc);
            assert_eq!(names(&records, &asc), vec!["9", "10", "1a"], "input {:?}", order);
            let desc = sort_all(&records, "name", SortDirection::Desc);
            assert_eq!(names(&records, &desc), vec!["1a", "10", "9"], "input {:?}", order);
        }
    }

    #[test]
    fn test_sort_with_empty_cells() {
        let records = vec![item(1, "b", 0.0), item(2, "", 0.0), item(3, "a", 0.0), item(4, "", 0.0)];
        let asc = sort_all(&records, "label", SortDirection::Asc);
        assert_eq!(ids(&records, &asc), vec![2, 4, 3, 1]);
        let desc = sort_all(&records, "label", SortDirection::Desc);
        assert_eq!(ids(&records, &desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_date_column_chronologically() {
        let records = vec![
            item(1, "2024-10-01", 0.0),
            item(2, "2024-02-01T00:00:00.000Z", 0.0),
            item(3, "not a date", 0.0),
            item(4, "2023-12-31T23:00:00+07:00", 0.0),
        ];
        let asc = sort_all(&records, "created", SortDirection::Asc);
        assert_eq!(ids(&records, &asc), vec![3, 4, 2, 1]);
        let desc = sort_all(&records, "created", SortDirection::Desc);
        assert_eq!(ids(&records, &desc), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_sort_without_state_or_on_unsortable_column_keeps_order() {
        let records = sample();
        let all: Vec<usize> = (0..records.len()).collect();
        let cols = columns();
        assert_eq!(apply_sort(&records, &all, None, &cols), all);
        assert_eq!(
            apply_sort(&records, &all, Some(&sort("note", SortDirection::Asc)), &cols),
            all
        );
    }

    #[test]
    fn test_page_count_minimum_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(3, 2), 2);
    }

    #[test]
    fn test_paginate_slices_and_flags() {
        let first = paginate(3, &PaginationState { page_index: 0, page_size: 2 });
        assert_eq!(first.range, 0..2);
        assert!(first.can_go_next);
        assert!(!first.can_go_previous);

        let second = paginate(3, &PaginationState { page_index: 1, page_size: 2 });
        assert_eq!(second.range, 2..3);
        assert!(!second.can_go_next);
        assert!(second.can_go_previous);
    }

    #[test]
    fn test_paginate_clamps_stale_index() {
        let page = paginate(3, &PaginationState { page_index: 7, page_size: 2 });
        assert_eq!(page.page_index, 1);
        assert_eq!(page.range, 2..3);

        let empty = paginate(0, &PaginationState { page_index: 4, page_size: 2 });
        assert_eq!(empty.page_index, 0);
        assert_eq!(empty.range, 0..0);
        assert_eq!(empty.page_count, 1);
    }

    #[test]
    fn test_pages_cover_every_row_once() {
        for total in [0usize, 1, 9, 10, 11, 37] {
            let pages = page_count(total, 10);
            let covered: usize = (0..pages)
                .map(|i| paginate(total, &PaginationState { page_index: i, page_size: 10 }).range.len())
                .sum();
            assert_eq!(covered, total);
        }
    }

    #[test]
    fn test_derive_sorted_pages() {
        let records = sample();
        let cols = columns();
        let mut state = ViewState::new(2);
        state.toggle_sort(&cols, "name");

        let page0 = derive(&records, &cols, &state);
        assert_eq!(page0.ids(), vec!["2", "3"]);
        assert_eq!(page0.page_count, 2);
        assert!(page0.can_go_next);

        state.next_page(page0.page_count);
        let page1 = derive(&records, &cols, &state);
        assert_eq!(page1.ids(), vec!["1"]);
        assert!(!page1.can_go_next);
        assert_eq!(page1.rows[0].number, 3);
    }

    #[test]
    fn test_derive_filter_recomputes_page_count() {
        let records = sample();
        let cols = columns();
        let mut state = ViewState::new(2);
        state.set_filter(&cols, "name", "a");
        let view = derive(&records, &cols, &state);
        assert_eq!(view.ids(), vec!["2", "3"]);
        assert_eq!(view.page_count, 1);
        assert_eq!(view.total_filtered, 2);
        assert_eq!(view.total_records, 3);
    }

    #[test]
    fn test_derive_numbers_rows_by_filtered_position() {
        let records = vec![item(1, "x", 0.0), item(2, "a1", 0.0), item(3, "y", 0.0), item(4, "a2", 0.0)];
        let cols = columns();
        let mut state = ViewState::new(1);
        state.set_filter(&cols, "name", "a");
        state.pagination.page_index = 1;
        let view = derive(&records, &cols, &state);
        assert_eq!(view.ids(), vec!["4"]);
        assert_eq!(view.rows[0].number, 2);
        assert_eq!(view.rows[0].position, 3);
    }

    #[test]
    fn test_derive_empty_collection() {
        let records: Vec<Item> = vec![];
        let view = derive(&records, &columns(), &ViewState::new(10));
        assert!(view.is_empty());
        assert_eq!(view.page_count, 1);
        assert!(!view.can_go_next);
        assert!(!view.can_go_previous);
    }

    #[test]
    fn test_hidden_column_still_filters_and_sorts() {
        let records = sample();
        let cols = columns();
        let mut state = ViewState::new(10);
        state.toggle_visibility(&cols, "name");
        state.set_filter(&cols, "name", "a");
        state.set_sort(&cols, "name", SortDirection::Asc);
        let view = derive(&records, &cols, &state);
        assert!(!view.visible_columns.contains(&"name".to_string()));
        assert_eq!(view.ids(), vec!["2", "3"]);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let records = sample();
        let cols = columns();
        let mut state = ViewState::new(2);
        state.set_sort(&cols, "amount", SortDirection::Desc);
        assert_eq!(derive(&records, &cols, &state), derive(&records, &cols, &state));
    }
}
