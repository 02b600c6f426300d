use std::collections::BTreeSet;

use clonesync_analyze::{
    diff_directories, diff_listings, order_deepest_first, path_depth, plan_actions,
    plan_directories, DiffKind, DiffSummary, ListingEntry,
};
use clonesync_core::ModTime;

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn file(path: &str, size: u64, modified: &str) -> ListingEntry {
    ListingEntry::file(path, size, ModTime::parse(modified))
}

#[test]
fn test_directory_diff_partitions_union() {
    let cases = [
        (set(&["a", "a/b", "c"]), set(&["a", "d", "d/e"])),
        (set(&[]), set(&["x", "x/y"])),
        (set(&["only", "only/here"]), set(&[])),
        (set(&["same", "same/dir"]), set(&["same", "same/dir"])),
    ];

    for (source, destination) in cases {
        let diff = diff_directories(&source, &destination);
        let to_create: BTreeSet<String> = diff.to_create.iter().cloned().collect();
        let to_delete: BTreeSet<String> = diff.to_delete.iter().cloned().collect();

        assert!(to_create.is_disjoint(&to_delete));

        let common: BTreeSet<String> = source.intersection(&destination).cloned().collect();
        let mut rebuilt = to_create.clone();
        rebuilt.extend(to_delete.iter().cloned());
        rebuilt.extend(common);

        let union: BTreeSet<String> = source.union(&destination).cloned().collect();
        assert_eq!(rebuilt, union);
    }
}

#[test]
fn test_diff_is_idempotent() {
    let source = vec![
        file("a.txt", 1, "2024-01-01T00:00:00Z"),
        file("dir/b.txt", 2, "2024-01-01T00:00:00Z"),
    ];
    let destination = vec![
        file("a.txt", 1, "2024-01-01T00:00:05Z"),
        file("old.txt", 3, "2024-01-01T00:00:00Z"),
    ];

    let first = diff_listings(&source, &destination);
    let second = diff_listings(&source, &destination);
    assert_eq!(first, second);
}

#[test]
fn test_every_path_classified_exactly_once() {
    let source = vec![
        file("keep.txt", 5, "2024-03-01T12:00:00Z"),
        file("grow.txt", 5, "2024-03-01T12:00:00Z"),
        file("new/one.txt", 1, "2024-03-01T12:00:00Z"),
    ];
    let destination = vec![
        file("keep.txt", 5, "2024-03-01T12:00:00Z"),
        file("grow.txt", 9, "2024-03-01T12:00:00Z"),
        file("gone/two.txt", 2, "2024-03-01T12:00:00Z"),
    ];

    let records = diff_listings(&source, &destination);
    let paths: Vec<&str> = records.iter().map(|r| r.relative_path()).collect();
    assert_eq!(
        paths,
        vec!["gone/two.txt", "grow.txt", "keep.txt", "new/one.txt"]
    );

    let kinds: Vec<DiffKind> = records.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            DiffKind::MissingOnSource,
            DiffKind::Changed,
            DiffKind::Equal,
            DiffKind::MissingOnDestination,
        ]
    );

    let summary = DiffSummary::from_records(&records);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.differences(), 3);
}

#[test]
fn test_subsecond_difference_is_equal() {
    let source = vec![file("f.bin", 100, "2024-06-01T08:00:00.100Z")];
    let destination = vec![file("f.bin", 100, "2024-06-01T08:00:00.600Z")];

    let records = diff_listings(&source, &destination);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), DiffKind::Equal);
    assert!(!records[0].time_differs());
}

#[test]
fn test_same_instant_in_other_offset_is_equal() {
    let source = vec![file("f.bin", 1, "2024-06-01T10:00:00+02:00")];
    let destination = vec![file("f.bin", 1, "2024-06-01T08:00:00Z")];

    let records = diff_listings(&source, &destination);
    assert_eq!(records[0].kind(), DiffKind::Equal);
}

#[test]
fn test_whole_second_difference_is_changed() {
    let source = vec![file("f.bin", 100, "2024-06-01T08:00:01Z")];
    let destination = vec![file("f.bin", 100, "2024-06-01T08:00:00Z")];

    let records = diff_listings(&source, &destination);
    assert_eq!(records[0].kind(), DiffKind::Changed);
    assert!(records[0].time_differs());
    assert!(!records[0].size_differs());
}

#[test]
fn test_new_nested_file_plans_single_copy() {
    let source = vec![file("a/b/c.txt", 10, "2024-01-01T00:00:00Z")];
    let records = diff_listings(&source, &[]);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), DiffKind::MissingOnDestination);

    let plan = plan_actions(&records);
    assert_eq!(plan.copy_set, vec!["a/b/c.txt"]);
    assert!(plan.delete_set.is_empty());
    assert!(plan.delete_order.is_empty());
    assert_eq!(plan.parent_dirs, vec!["a", "a/b"]);
    assert_eq!(plan.copy_bytes, 10);
}

#[test]
fn test_delete_order_places_deepest_first() {
    let paths: Vec<String> = ["p", "q/r/s", "q", "t/u", "v/w/x", "y"]
        .iter()
        .map(|p| p.to_string())
        .collect();

    let ordered = order_deepest_first(&paths);
    let depths: Vec<usize> = ordered.iter().map(|p| path_depth(p)).collect();
    assert_eq!(depths, vec![3, 3, 2, 1, 1, 1]);

    let last_depth3 = ordered.iter().rposition(|p| path_depth(p) == 3).unwrap();
    let first_depth1 = ordered.iter().position(|p| path_depth(p) == 1).unwrap();
    assert!(last_depth3 < first_depth1);
}

#[test]
fn test_covered_children_are_not_deleted_separately() {
    let diff = diff_directories(&set(&[]), &set(&["x/y", "x/y/z.txt"]));
    let plan = plan_directories(&diff);
    assert_eq!(plan.delete_order, vec!["x/y"]);

    let diff = diff_directories(&set(&[]), &set(&["x", "x/y"]));
    let plan = plan_directories(&diff);
    assert_eq!(plan.delete_order, vec!["x"]);
}

#[test]
fn test_file_plan_orders_deletions_and_skips_equal() {
    let t = "2024-01-01T00:00:00Z";
    let source = vec![file("same.txt", 1, t), file("changed.txt", 2, t)];
    let destination = vec![
        file("same.txt", 1, t),
        file("changed.txt", 3, t),
        file("old/deep/a.txt", 1, t),
        file("old.txt", 1, t),
    ];

    let plan = plan_actions(&diff_listings(&source, &destination));
    assert_eq!(plan.copy_set, vec!["changed.txt"]);
    assert_eq!(plan.delete_order, vec!["old/deep/a.txt", "old.txt"]);
    assert!(plan.parent_dirs.is_empty());
    assert!(!plan.is_empty());
}

#[test]
fn test_identical_structures_plan_nothing() {
    let dirs = set(&["a", "a/b"]);
    let diff = diff_directories(&dirs, &dirs);
    assert!(diff.is_empty());
    assert!(plan_directories(&diff).is_empty());
}
