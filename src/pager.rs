use std::num::NonZeroUsize;

/// One window of a filtered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub rows: &'a [T],
    pub page_index: usize, // 1-indexed
    pub total_pages: usize,
    pub total_count: usize,
}

/// Number of pages needed for `total_count` items. Never less than one.
pub fn total_pages(total_count: usize, page_size: NonZeroUsize) -> usize {
    std::cmp::max(1, total_count.div_ceil(page_size.get()))
}

/// Slices `[(page_index-1)*page_size, page_index*page_size)` out of `items`.
///
/// Out of range windows, including page 0, give an empty slice rather than an
/// error. Clamping is the caller's job.
pub fn page<T>(items: &[T], page_index: usize, page_size: NonZeroUsize) -> PageView<'_, T> {
    let size = page_size.get();
    let rows = match page_index.checked_sub(1).and_then(|p| p.checked_mul(size)) {
        Some(begin) if begin < items.len() => {
            let end = std::cmp::min(begin.saturating_add(size), items.len());
            &items[begin..end]
        }
        _ => &items[0..0],
    };
    PageView {
        rows,
        page_index,
        total_pages: total_pages(items.len(), page_size),
        total_count: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> NonZeroUsize {
        NonZeroUsize::new(10).unwrap()
    }

    #[test]
    fn twenty_three_items_make_three_pages() {
        let items: Vec<usize> = (0..23).collect();
        let first = page(&items, 1, ten());
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_count, 23);
        assert_eq!(first.rows.len(), 10);
        assert_eq!(first.rows[0], 0);

        let last = page(&items, 3, ten());
        assert_eq!(last.rows, &[20, 21, 22]);
    }

    #[test]
    fn empty_input_still_has_one_page() {
        let items: Vec<usize> = Vec::new();
        let view = page(&items, 1, ten());
        assert_eq!(view.total_pages, 1);
        assert!(view.rows.is_empty());
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<usize> = (0..5).collect();
        assert!(page(&items, 0, ten()).rows.is_empty());
        assert!(page(&items, 2, ten()).rows.is_empty());
        assert!(page(&items, usize::MAX, ten()).rows.is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        assert_eq!(total_pages(20, ten()), 2);
        assert_eq!(total_pages(21, ten()), 3);
        assert_eq!(total_pages(0, ten()), 1);
    }
}
