//! Process-wide warning deduplication.

use vellum_common::warning::{
    MAX_REMEMBERED_WARNINGS, clear_warnings, remembered_warnings, warn_once, was_warned,
};

#[test]
fn test_distinct_warnings_stay_bounded() {
    clear_warnings();
    for i in 0..MAX_REMEMBERED_WARNINGS * 3 {
        warn_once("css-rules", &format!("failed to parse selector 'x{i}:::'"));
    }
    assert_eq!(remembered_warnings(), MAX_REMEMBERED_WARNINGS);

    let last = MAX_REMEMBERED_WARNINGS * 3 - 1;
    assert!(was_warned("css-rules", &format!("failed to parse selector 'x{last}:::'")));
    assert!(!was_warned("css-rules", "failed to parse selector 'x0:::'"));

    clear_warnings();
    assert_eq!(remembered_warnings(), 0);
}
