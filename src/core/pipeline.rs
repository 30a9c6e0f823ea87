//! The catalog query pipeline: pure filtering and sorting of toy lists
//!
//! Both passes borrow their input and return a fresh `Vec`, so a snapshot
//! fetched once can be re-filtered any number of times. Re-applying the same
//! criteria to the same snapshot always yields the same ordered result.

use feruca::Collator;
use std::cmp::Ordering;

use crate::core::query::{FilterCriteria, SortCriteria, SortField, ToyQuery};
use crate::core::toy::Toy;

/// Keep the toys matching every active predicate, in input order
///
/// Price bounds are inclusive and are not swapped when `min > max`; such a
/// filter simply matches nothing.
pub fn apply_filter(toys: &[Toy], filter: &FilterCriteria) -> Vec<Toy> {
    let needle = filter
        .txt
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    toys.iter()
        .filter(|toy| matches(toy, filter, needle.as_deref()))
        .cloned()
        .collect()
}

/// Order toys by the selected field, keeping equal elements in input order
///
/// An unset field returns the input unchanged.
pub fn apply_sort(toys: &[Toy], sort: &SortCriteria) -> Vec<Toy> {
    let mut sorted = toys.to_vec();
    sort_in_place(&mut sorted, sort);
    sorted
}

/// Filter then sort, as `query_toys` does after fetching
pub fn run(toys: &[Toy], query: &ToyQuery) -> Vec<Toy> {
    let mut result = apply_filter(toys, &query.filter);
    sort_in_place(&mut result, &query.sort);
    result
}

/// Single-record predicate behind [`apply_filter`]
///
/// `needle` is the lowercased search text. Cheap checks run first.
fn matches(toy: &Toy, filter: &FilterCriteria, needle: Option<&str>) -> bool {
    if filter.in_stock.is_some_and(|wanted| toy.in_stock != wanted) {
        return false;
    }
    if filter.min_price.is_some_and(|min| toy.price < min) {
        return false;
    }
    if filter.max_price.is_some_and(|max| toy.price > max) {
        return false;
    }
    if !toy.has_all_labels(&filter.labels) {
        return false;
    }
    needle.is_none_or(|needle| toy.name.to_lowercase().contains(needle))
}

fn sort_in_place(toys: &mut [Toy], sort: &SortCriteria) {
    let Some(field) = sort.field else {
        return;
    };
    let mut collator = Collator::default();
    // slice::sort_by is stable, and reversing an Equal leaves it Equal
    toys.sort_by(|a, b| {
        let ordering = compare(&mut collator, field, a, b);
        if sort.desc {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare(collator: &mut Collator, field: SortField, a: &Toy, b: &Toy) -> Ordering {
    match field {
        SortField::Name => compare_names(collator, &a.name, &b.name),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Unicode Collation Algorithm (CLDR root order), code points as tie-break
///
/// Accents and case are secondary and tertiary differences, so "Éclair"
/// sorts between "apple" and "Zebra", and "a" before "A".
fn compare_names(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}
