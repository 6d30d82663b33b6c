use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::error::MatchError;
use crate::models::matching::{MeetingOutlook, SlotBucket};
use crate::models::profile::Profile;
use crate::models::slot::{SlotGrid, Weekday};
use crate::services::matcher::{
    compute_match, day_credit, find_team_slots, normalize_ids, rank_candidates, resolve_days,
};
use crate::tests::common::fixtures::{
    always_free, days, matcher_with, sample_matcher, slot, student,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_resolve_days_defaults_to_whole_week() {
    assert_eq!(resolve_days(None).unwrap(), Weekday::ALL.to_vec());
    assert_eq!(resolve_days(Some(&[])).unwrap(), Weekday::ALL.to_vec());
}

#[test]
fn test_resolve_days_normalizes_and_dedups() {
    let requested = days(&["Wednesday", "monday", "WEDNESDAY"]);
    assert_eq!(
        resolve_days(Some(&requested)).unwrap(),
        vec![Weekday::Wednesday, Weekday::Monday]
    );
}

#[test]
fn test_resolve_days_rejects_unknown_names() {
    let requested = days(&["monday", "someday"]);
    assert!(matches!(
        resolve_days(Some(&requested)),
        Err(MatchError::InvalidDayName(name)) if name == "someday"
    ));
}

#[test]
fn test_normalize_ids() {
    let ids = days(&[" usn001", "USN001", "", "usn002 "]);
    assert_eq!(normalize_ids(&ids), vec!["USN001", "USN002"]);
}

#[test]
fn test_exact_grid_match_scores_one_point() {
    let grid = SlotGrid::two_hour();
    let a = student("A", "Ann", "Lee")
        .with_available(Weekday::Monday, slot("08:00", "10:00"))
        .with_available(Weekday::Monday, slot("18:00", "20:00"));
    let b = student("B", "Ben", "Kim").with_available(Weekday::Monday, slot("08:00", "10:00"));

    let result = compute_match(&grid, &a, &b, &[Weekday::Monday]);

    assert_close(result.common_slots, 1.0);
    assert_eq!(result.total_possible_slots, 12);
    assert_eq!(result.match_percentage, 8.3);

    let monday = &result.day_breakdown[&Weekday::Monday];
    assert_close(monday.day_percentage, 100.0 / 12.0);
    assert_eq!(monday.total_possible, 12);
    assert_eq!(monday.user1_available, 2);
    assert_eq!(monday.user2_available, 1);
}

#[test]
fn test_partial_overlap_earns_half_credit_per_pair() {
    let grid = SlotGrid::two_hour();
    let a = student("A", "Ann", "Lee").with_available(Weekday::Monday, slot("09:00", "11:00"));
    let b = student("B", "Ben", "Kim")
        .with_available(Weekday::Monday, slot("08:00", "10:00"))
        .with_available(Weekday::Monday, slot("10:00", "12:00"));

    assert_close(day_credit(&grid, a.day(Weekday::Monday), b.day(Weekday::Monday)), 1.0);
}

// Counts every event that reaches the subscriber
struct EventCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_scoring_is_quiet_at_debug_level() {
    let grid = SlotGrid::two_hour();
    let mut a = student("A", "Ann", "Lee");
    let mut b = student("B", "Ben", "Kim");
    for hour in 8..20u16 {
        let start = format!("{:02}:30", hour);
        let end = format!("{:02}:30", hour + 1);
        a.mark_available(Weekday::Monday, slot(&start, &end));
        b.mark_available(Weekday::Monday, slot(&format!("{:02}:00", hour), &end));
    }

    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry()
        .with(EventCounter(Arc::clone(&count)).with_filter(LevelFilter::DEBUG));

    let credit = tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("scoring Monday");
        day_credit(&grid, a.day(Weekday::Monday), b.day(Weekday::Monday))
    });

    assert!(credit > 0.0);
    // Only the marker event; overlapping pairs log below debug
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_identical_custom_slots_earn_nothing() {
    let grid = SlotGrid::two_hour();
    let a = student("A", "Ann", "Lee").with_available(Weekday::Monday, slot("09:00", "11:00"));
    let b = student("B", "Ben", "Kim").with_available(Weekday::Monday, slot("09:00", "11:00"));

    assert_close(day_credit(&grid, a.day(Weekday::Monday), b.day(Weekday::Monday)), 0.0);
}

#[test]
fn test_day_percentage_is_not_capped() {
    let grid = SlotGrid::four_block();
    let mut a = student("A", "Ann", "Lee");
    let mut b = student("B", "Ben", "Kim");
    for (start, end) in [("09:00", "10:00"), ("09:10", "10:10"), ("09:20", "10:20")] {
        a.mark_available(Weekday::Monday, slot(start, end));
    }
    for (start, end) in [("09:30", "10:30"), ("09:40", "10:40"), ("09:50", "10:50")] {
        b.mark_available(Weekday::Monday, slot(start, end));
    }

    let result = compute_match(&grid, &a, &b, &[Weekday::Monday]);

    assert_close(result.common_slots, 4.5);
    assert_close(result.day_breakdown[&Weekday::Monday].day_percentage, 112.5);
    assert_eq!(result.match_percentage, 112.5);
    // Dense day bonus applies once credit reaches 3
    assert_close(result.meeting_potential, 135.0);
    assert_close(result.recommendation_score, 121.5);
}

#[test]
fn test_fully_available_pair_matches_completely() {
    let grid = SlotGrid::two_hour();
    let a = always_free("A", "Ann", &grid);
    let b = always_free("B", "Ben", &grid);

    let result = compute_match(&grid, &a, &b, &Weekday::ALL);

    assert_eq!(result.match_percentage, 100.0);
    assert_close(result.common_slots, 84.0);
    assert_eq!(result.total_possible_slots, 84);
    assert_eq!(result.day_breakdown.len(), 7);
    assert_close(result.meeting_potential, 120.0);
    assert_close(result.recommendation_score, 108.0);
}

#[test]
fn test_match_is_symmetric() {
    let grid = SlotGrid::two_hour();
    let a = student("A", "Ann", "Lee")
        .with_available(Weekday::Monday, slot("09:00", "11:00"))
        .with_available(Weekday::Monday, slot("14:00", "16:00"))
        .with_available(Weekday::Tuesday, slot("22:00", "00:00"))
        .with_available(Weekday::Tuesday, slot("08:00", "10:00"))
        .with_available(Weekday::Friday, slot("10:00", "12:00"))
        .with_avoid(Weekday::Friday, slot("12:00", "14:00"));
    let b = student("B", "Ben", "Kim")
        .with_available(Weekday::Monday, slot("08:00", "10:00"))
        .with_available(Weekday::Monday, slot("10:00", "12:00"))
        .with_available(Weekday::Monday, slot("14:00", "16:00"))
        .with_available(Weekday::Tuesday, slot("23:00", "01:00"))
        .with_available(Weekday::Wednesday, slot("08:00", "10:00"))
        .with_available(Weekday::Friday, slot("10:00", "12:00"))
        .with_available(Weekday::Friday, slot("12:00", "14:00"));

    let ab = compute_match(&grid, &a, &b, &Weekday::ALL);
    let ba = compute_match(&grid, &b, &a, &Weekday::ALL);

    // Mon: 14-16 exact plus two half pairs, Tue: one half pair, Fri: 10-12 exact
    assert_close(ab.common_slots, 3.5);
    assert_eq!(ab.match_percentage, ba.match_percentage);
    assert_close(ab.common_slots, ba.common_slots);
    assert_close(ab.meeting_potential, ba.meeting_potential);
    assert_close(ab.recommendation_score, ba.recommendation_score);

    for day in Weekday::ALL {
        let forward = &ab.day_breakdown[&day];
        let backward = &ba.day_breakdown[&day];
        assert_close(forward.common_slots, backward.common_slots);
        assert_close(forward.day_percentage, backward.day_percentage);
        assert_eq!(forward.user1_available, backward.user2_available);
        assert_eq!(forward.user2_available, backward.user1_available);
    }
}

#[test]
fn test_match_over_no_days_is_zero() {
    let grid = SlotGrid::two_hour();
    let a = always_free("A", "Ann", &grid);
    let b = always_free("B", "Ben", &grid);

    let result = compute_match(&grid, &a, &b, &[]);

    assert_eq!(result.match_percentage, 0.0);
    assert_eq!(result.total_possible_slots, 0);
    assert_eq!(result.meeting_potential, 0.0);
    assert!(result.day_breakdown.is_empty());
}

#[test]
fn test_avoided_slots_stay_available_for_scoring() {
    let morning = slot("08:00", "10:00");
    let profile = student("A", "Ann", "Lee")
        .with_available(Weekday::Monday, morning)
        .with_available(Weekday::Monday, slot("10:00", "12:00"))
        .with_avoid(Weekday::Monday, morning);

    let monday = profile.day(Weekday::Monday);
    assert_eq!(monday.available().len(), 2);
    assert!(monday.avoid().contains(&morning));
    assert!(!monday.valid().contains(&morning));
    assert_eq!(monday.valid().len(), 1);

    // Marking available again does not resurrect an avoided slot
    let profile = profile.with_available(Weekday::Monday, morning);
    assert!(!profile.day(Weekday::Monday).valid().contains(&morning));
}

#[test]
fn test_rank_candidates_orders_by_score_and_filters() {
    let grid = SlotGrid::two_hour();
    let subject = always_free("S", "Sam", &grid);
    let strong = always_free("STRONG", "Sue", &grid);
    let weak = student("WEAK", "Wes", "Low").with_available(Weekday::Monday, slot("08:00", "10:00"));
    let idle = student("IDLE", "Ida", "Off");

    let candidates = vec![&weak, &subject, &idle, &strong];
    let ranked = rank_candidates(&grid, &subject, candidates.clone(), &Weekday::ALL, 0.0);

    let order: Vec<&str> = ranked.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(order, vec!["STRONG", "WEAK", "IDLE"]);
    assert_eq!(ranked[0].recommendation_priority, ranked[0].schedule_match.recommendation_score);
    assert_eq!(ranked[0].name, "Sue Free");

    let filtered = rank_candidates(&grid, &subject, candidates, &Weekday::ALL, 20.0);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].user_id, "STRONG");
}

#[test]
fn test_rank_candidates_keeps_input_order_on_ties() {
    let grid = SlotGrid::two_hour();
    let subject = student("S", "Sam", "Solo");
    let others: Vec<Profile> = ["C", "A", "B"]
        .iter()
        .map(|id| student(id, "Same", "Score"))
        .collect();

    let ranked = rank_candidates(&grid, &subject, &others, &Weekday::ALL, 0.0);

    let order: Vec<&str> = ranked.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(order, vec!["C", "A", "B"]);
}

#[test]
fn test_slot_bucket_boundaries() {
    assert_eq!(SlotBucket::classify(5, 5), Some(SlotBucket::Perfect));
    assert_eq!(SlotBucket::classify(4, 5), Some(SlotBucket::Good));
    assert_eq!(SlotBucket::classify(3, 5), Some(SlotBucket::Backup));
    assert_eq!(SlotBucket::classify(2, 3), Some(SlotBucket::Backup));
    assert_eq!(SlotBucket::classify(1, 2), Some(SlotBucket::Backup));
    assert_eq!(SlotBucket::classify(1, 3), None);
    assert_eq!(SlotBucket::classify(0, 2), None);
    assert_eq!(SlotBucket::classify(0, 0), None);
}

#[test]
fn test_meeting_outlook_tiers() {
    assert_eq!(MeetingOutlook::from_counts(5, 0, 0), MeetingOutlook::Excellent);
    assert_eq!(MeetingOutlook::from_counts(2, 0, 0), MeetingOutlook::Good);
    assert_eq!(MeetingOutlook::from_counts(1, 0, 0), MeetingOutlook::Fair);
    assert_eq!(MeetingOutlook::from_counts(0, 3, 0), MeetingOutlook::Fair);
    assert_eq!(MeetingOutlook::from_counts(0, 1, 0), MeetingOutlook::Challenging);
    assert_eq!(MeetingOutlook::from_counts(0, 0, 3), MeetingOutlook::Challenging);
    assert_eq!(MeetingOutlook::from_counts(0, 0, 2), MeetingOutlook::Difficult);
    assert_eq!(
        MeetingOutlook::Difficult.message(),
        "Difficult - Very few meeting opportunities"
    );
}

#[test]
fn test_two_of_three_members_is_backup() {
    let grid = SlotGrid::two_hour();
    let late_morning = slot("10:00", "12:00");
    let a = student("A", "Ann", "Lee").with_available(Weekday::Monday, late_morning);
    let b = student("B", "Ben", "Kim").with_available(Weekday::Monday, late_morning);
    let c = student("C", "Cal", "Day");

    let report = find_team_slots(&grid, &[&a, &b, &c], &[Weekday::Monday], 2);

    assert!(report.perfect_slots.is_empty());
    assert!(report.good_slots.is_empty());
    assert_eq!(report.backup_slots.len(), 1);

    let backup = &report.backup_slots[0];
    assert_eq!(backup.day, "Monday");
    assert_eq!(backup.time_slot, "10:00 - 12:00");
    assert_eq!(backup.start_time, "10:00");
    assert_eq!(backup.end_time, "12:00");
    assert_eq!(backup.availability_percentage, 66.7);
    assert_eq!(backup.available_members, 2);
    assert_eq!(backup.total_members, 3);
    assert_eq!(backup.available_member_names, vec!["Ann Lee", "Ben Kim"]);
    assert_eq!(backup.unavailable_member_names, vec!["Cal Day"]);

    assert_eq!(report.team_info.team_size, 3);
    assert_eq!(report.team_info.member_ids, vec!["A", "B", "C"]);
    assert_eq!(report.statistics.total_checked_slots, 12);
    assert_eq!(report.statistics.success_rate, 0.0);
    assert_eq!(report.min_duration_hours, 2);
}

#[test]
fn test_four_of_five_members_is_good() {
    let grid = SlotGrid::two_hour();
    let morning = slot("08:00", "10:00");
    let mut members: Vec<Profile> = ["A", "B", "C", "D"]
        .iter()
        .map(|id| student(id, id, "Member").with_available(Weekday::Tuesday, morning))
        .collect();
    members.push(student("E", "E", "Member"));
    let refs: Vec<&Profile> = members.iter().collect();

    let report = find_team_slots(&grid, &refs, &[Weekday::Tuesday], 2);

    assert_eq!(report.good_slots.len(), 1);
    assert_eq!(report.good_slots[0].availability_percentage, 80.0);
    assert_eq!(report.statistics.total_good_slots, 1);
    assert_eq!(report.statistics.outlook, MeetingOutlook::Challenging);
}

#[test]
fn test_overlapping_custom_slot_counts_as_attending() {
    let grid = SlotGrid::two_hour();
    let a = student("A", "Ann", "Lee").with_available(Weekday::Friday, slot("09:00", "11:00"));
    let b = student("B", "Ben", "Kim").with_available(Weekday::Friday, slot("08:00", "10:00"));

    let report = find_team_slots(&grid, &[&a, &b], &[Weekday::Friday], 2);

    // 08-10 is covered by both; 10-12 only by the custom slot
    assert_eq!(report.perfect_slots.len(), 1);
    assert_eq!(report.perfect_slots[0].time_slot, "08:00 - 10:00");
    assert_eq!(report.backup_slots.len(), 1);
    assert_eq!(report.backup_slots[0].time_slot, "10:00 - 12:00");
}

#[test]
fn test_statistics_count_before_truncation() {
    let grid = SlotGrid::two_hour();
    let a = always_free("A", "Ann", &grid);
    let b = always_free("B", "Ben", &grid);

    let report = find_team_slots(&grid, &[&a, &b], &Weekday::ALL, 2);

    assert_eq!(report.perfect_slots.len(), 10);
    assert_eq!(report.statistics.total_perfect_slots, 84);
    assert_eq!(report.statistics.total_checked_slots, 84);
    assert_eq!(report.statistics.success_rate, 100.0);
    assert_eq!(report.statistics.outlook, MeetingOutlook::Excellent);
    assert_eq!(
        report.statistics.recommendation,
        "Excellent - Multiple perfect meeting times available"
    );
    assert_eq!(report.statistics.day_breakdown[&Weekday::Sunday].perfect_slots, 12);
    assert_eq!(report.statistics.day_breakdown[&Weekday::Sunday].total_viable_slots, 12);
    // Day order follows the requested scope, grid order within a day
    assert_eq!(report.perfect_slots[0].day, "Sunday");
    assert_eq!(report.perfect_slots[0].time_slot, "00:00 - 02:00");
}

#[test]
fn test_backup_list_is_capped_at_five() {
    let grid = SlotGrid::two_hour();
    let a = always_free("A", "Ann", &grid);
    let b = student("B", "Ben", "Busy");

    let report = find_team_slots(&grid, &[&a, &b], &Weekday::ALL, 2);

    assert_eq!(report.backup_slots.len(), 5);
    assert_eq!(report.statistics.total_backup_slots, 84);
    assert_eq!(report.statistics.success_rate, 0.0);
    assert_eq!(report.statistics.outlook, MeetingOutlook::Challenging);
}

#[tokio::test]
async fn test_match_percentage_on_sample_data() {
    let matcher = sample_matcher();
    let scope = days(&["monday", "tuesday", "wednesday"]);

    let result = matcher
        .match_percentage("usn001", "USN003", Some(&scope))
        .await
        .unwrap();

    assert_eq!(result.user1_id, "USN001");
    assert_eq!(result.user2_id, "USN003");
    assert_close(result.common_slots, 2.0);
    assert_eq!(result.total_possible_slots, 36);
    assert_eq!(result.match_percentage, 5.6);
    assert_close(result.meeting_potential, 100.0 / 18.0);
    assert_close(result.recommendation_score, 100.0 / 18.0);
    assert_eq!(result.day_breakdown.len(), 3);
}

#[tokio::test]
async fn test_match_percentage_reports_missing_users() {
    let matcher = sample_matcher();

    let err = matcher
        .match_percentage("USN001", "NOPE", None)
        .await
        .unwrap_err();

    match err {
        MatchError::NotFound(ids) => assert_eq!(ids, vec!["NOPE"]),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_match_percentage_rejects_bad_day() {
    let matcher = sample_matcher();
    let scope = days(&["monday", "caturday"]);

    let err = matcher
        .match_percentage("USN001", "USN003", Some(&scope))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_DAY_NAME");
}

#[tokio::test]
async fn test_recommendations_with_default_threshold() {
    let matcher = sample_matcher();
    let candidates = days(&["USN002", "USN003", "USN004", "USN005"]);
    let scope = days(&["monday", "tuesday", "wednesday"]);

    let ranked = matcher
        .recommendations("USN001", &candidates, Some(&scope), None)
        .await
        .unwrap();

    assert!(ranked.is_empty());
}

#[tokio::test]
async fn test_recommendations_with_zero_threshold() {
    let matcher = sample_matcher();
    let candidates = days(&["USN002", "usn003", "USN003", "USN001", "USN004", "USN005", "GHOST"]);
    let scope = days(&["monday", "tuesday", "wednesday"]);

    let ranked = matcher
        .recommendations("USN001", &candidates, Some(&scope), Some(0.0))
        .await
        .unwrap();

    let order: Vec<&str> = ranked.iter().map(|c| c.user_id.as_str()).collect();
    assert_eq!(order, vec!["USN003", "USN002", "USN004", "USN005"]);
    assert_eq!(ranked[0].name, "Mike Johnson");
    assert_eq!(ranked[0].skills.len(), 2);
    assert_eq!(ranked[0].schedule_match.match_percentage, 5.6);
}

#[tokio::test]
async fn test_recommendations_for_unknown_user() {
    let matcher = sample_matcher();
    let candidates = days(&["USN002"]);

    let err = matcher
        .recommendations("USN999", &candidates, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::NotFound(ids) if ids == vec!["USN999"]));
}

#[tokio::test]
async fn test_team_meeting_slots_on_sample_data() {
    let matcher = sample_matcher();
    let members = days(&["USN001", "USN003"]);
    let scope = days(&["monday"]);

    let report = matcher
        .team_meeting_slots(&members, Some(&scope), None)
        .await
        .unwrap();

    assert_eq!(report.statistics.total_perfect_slots, 1);
    assert_eq!(report.statistics.total_good_slots, 0);
    assert_eq!(report.statistics.total_backup_slots, 2);
    assert_eq!(report.perfect_slots[0].time_slot, "08:00 - 10:00");
    assert_eq!(report.statistics.outlook, MeetingOutlook::Fair);
    assert_eq!(report.statistics.success_rate, 8.3);
    assert_eq!(report.team_info.member_names, vec!["John Doe", "Mike Johnson"]);
    assert_eq!(report.min_duration_hours, 2);
}

#[tokio::test]
async fn test_team_meeting_slots_needs_two_distinct_members() {
    let matcher = sample_matcher();

    let err = matcher
        .team_meeting_slots(&days(&["USN001", "usn001"]), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::InsufficientMembers(1)));

    let err = matcher.team_meeting_slots(&[], None, None).await.unwrap_err();
    assert!(matches!(err, MatchError::InsufficientMembers(0)));
}

#[tokio::test]
async fn test_team_meeting_slots_reports_missing_members() {
    let matcher = sample_matcher();

    let err = matcher
        .team_meeting_slots(&days(&["USN001", "X1", "X2"]), None, Some(3))
        .await
        .unwrap_err();

    assert!(matches!(err, MatchError::NotFound(ids) if ids == vec!["X1", "X2"]));
}

#[tokio::test]
async fn test_profile_lookup() {
    let grid = SlotGrid::four_block();
    let matcher = matcher_with(vec![always_free("A1", "Ann", &grid)], grid);

    let profile = matcher.profile(" a1 ").await.unwrap();
    assert_eq!(profile.id, "A1");
    assert_eq!(profile.day(Weekday::Monday).available().len(), 4);

    assert!(matches!(
        matcher.profile("B2").await,
        Err(MatchError::NotFound(_))
    ));
}
