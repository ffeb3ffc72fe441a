use luna_core::{reconstruct, CycleDate, CycleEntry, PhaseMarker, Symptom, MAX_FILL_DAYS};
use std::collections::BTreeSet;
use uuid::Uuid;

fn d(text: &str) -> CycleDate {
    CycleDate::parse(text).unwrap()
}

fn marked(user: Uuid, date: &str, marker: PhaseMarker) -> CycleEntry {
    CycleEntry::new(user, d(date)).with_marker(marker)
}

fn dates(texts: &[&str]) -> BTreeSet<CycleDate> {
    texts.iter().map(|text| d(text)).collect()
}

#[test]
fn start_and_end_fill_inclusive_range() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-01-05", PhaseMarker::PeriodEnd),
        marked(user, "2024-01-01", PhaseMarker::PeriodStart),
    ]);

    assert_eq!(
        calendar.period_days(),
        &dates(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"])
    );
    assert_eq!(calendar.start_markers(), &dates(&["2024-01-01"]));
    assert_eq!(calendar.end_markers(), &dates(&["2024-01-05"]));
}

#[test]
fn distant_end_marker_fills_at_most_ten_days() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-01-01", PhaseMarker::PeriodStart),
        marked(user, "2024-01-20", PhaseMarker::PeriodEnd),
    ]);

    let filled = calendar
        .period_days()
        .iter()
        .filter(|day| **day < d("2024-01-20"))
        .count();
    assert_eq!(filled, MAX_FILL_DAYS);
    assert!(calendar.is_period_day(d("2024-01-10")));
    assert!(!calendar.is_period_day(d("2024-01-11")));
    // The end marker still seeds itself.
    assert!(calendar.is_period_day(d("2024-01-20")));
}

#[test]
fn unmatched_start_contributes_only_itself() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-02-10", PhaseMarker::PeriodEnd),
        marked(user, "2024-03-01", PhaseMarker::PeriodStart),
    ]);

    assert_eq!(calendar.period_days(), &dates(&["2024-02-10", "2024-03-01"]));
}

#[test]
fn start_pairs_with_earliest_end_on_or_after_it() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-04-01", PhaseMarker::PeriodStart),
        marked(user, "2024-04-03", PhaseMarker::PeriodEnd),
        marked(user, "2024-04-08", PhaseMarker::PeriodEnd),
    ]);

    assert!(calendar.is_period_day(d("2024-04-03")));
    assert!(!calendar.is_period_day(d("2024-04-04")));
    assert!(calendar.is_period_day(d("2024-04-08")));
}

#[test]
fn overlapping_fills_union() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-05-01", PhaseMarker::PeriodStart),
        marked(user, "2024-05-03", PhaseMarker::PeriodStart),
        marked(user, "2024-05-06", PhaseMarker::PeriodEnd),
    ]);

    assert_eq!(
        calendar.period_days(),
        &dates(&[
            "2024-05-01",
            "2024-05-02",
            "2024-05-03",
            "2024-05-04",
            "2024-05-05",
            "2024-05-06"
        ])
    );
}

#[test]
fn explicit_period_days_seed_and_safe_or_symptom_rows_do_not() {
    let user = Uuid::new_v4();
    let mut symptom_only = CycleEntry::new(user, d("2024-06-09"));
    symptom_only.symptoms.insert(Symptom::Headache);

    let calendar = reconstruct(&[
        marked(user, "2024-06-02", PhaseMarker::Period),
        marked(user, "2024-06-03", PhaseMarker::Safe),
        symptom_only,
    ]);

    assert_eq!(calendar.period_days(), &dates(&["2024-06-02"]));
    assert!(calendar.start_markers().is_empty());
    let log = calendar.symptom_log(d("2024-06-09")).expect("symptom log kept");
    assert!(log.symptoms.contains(&Symptom::Headache));
    assert!(calendar.symptom_log(d("2024-06-02")).is_none());
}

#[test]
fn reconstruction_is_idempotent_and_order_independent() {
    let user = Uuid::new_v4();
    let entries = vec![
        marked(user, "2024-07-01", PhaseMarker::PeriodStart),
        marked(user, "2024-07-04", PhaseMarker::PeriodEnd),
        marked(user, "2024-07-29", PhaseMarker::PeriodStart),
        marked(user, "2024-07-15", PhaseMarker::Period),
    ];
    let first = reconstruct(&entries);
    let second = reconstruct(&entries);
    assert_eq!(first, second);

    let mut reversed = entries.clone();
    reversed.reverse();
    assert_eq!(reconstruct(&reversed), first);
}

#[test]
fn cycle_length_comes_from_latest_entry() {
    let user = Uuid::new_v4();
    let calendar = reconstruct(&[
        marked(user, "2024-08-20", PhaseMarker::Period).with_cycle_length(31),
        marked(user, "2024-08-01", PhaseMarker::PeriodStart).with_cycle_length(26),
    ]);
    assert_eq!(calendar.cycle_length(), 31);

    assert_eq!(reconstruct(&[]).cycle_length(), 28);
    assert_eq!(calendar.with_cycle_length(30).cycle_length(), 30);
}
