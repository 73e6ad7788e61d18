//! Page spec resolution against documents of varying length.

use niobium::{NiobiumError, PageLabelMap, resolve_page_range};

#[test]
fn test_range_and_single_page() {
    let pages: Vec<usize> = resolve_page_range("5-10", 20, None).unwrap().into_iter().collect();
    assert_eq!(pages, vec![4, 5, 6, 7, 8, 9]);

    let err = resolve_page_range("25", 20, None).unwrap_err();
    assert!(matches!(err, NiobiumError::OutOfRange { ref spec, total_pages: 20 } if spec == "25"));
    assert!(err.is_page_error());
}

#[test]
fn test_resolved_indices_always_in_bounds() {
    for total in 1..12usize {
        for start in 0..14usize {
            for end in 0..14usize {
                let spec = format!("{}-{}", start, end);
                if let Ok(pages) = resolve_page_range(&spec, total, None) {
                    assert!(start >= 1 && start <= end && end <= total, "{} accepted for {}", spec, total);
                    assert_eq!(pages.len(), end - start + 1);
                    assert!(pages.iter().all(|&i| i < total));
                }
            }
            if let Ok(pages) = resolve_page_range(&start.to_string(), total, None) {
                assert_eq!(pages.len(), 1);
                assert!(pages.iter().all(|&i| i < total));
            }
        }
    }
}

#[test]
fn test_labeled_front_matter() {
    let labels = PageLabelMap::from_labels(["Cover", "i", "ii", "1", "2", "3", "4", "5"]);
    let total = labels.len();

    let body: Vec<usize> = resolve_page_range("2-4", total, Some(&labels)).unwrap().into_iter().collect();
    assert_eq!(body, vec![4, 5, 6]);

    let mixed: Vec<usize> = resolve_page_range("ii-2", total, Some(&labels)).unwrap().into_iter().collect();
    assert_eq!(mixed, vec![2, 3, 4]);

    let cover: Vec<usize> = resolve_page_range("Cover", total, Some(&labels)).unwrap().into_iter().collect();
    assert_eq!(cover, vec![0]);

    assert!(matches!(
        resolve_page_range("4-ii", total, Some(&labels)).unwrap_err(),
        NiobiumError::InvalidRange { .. }
    ));
}
