//! Schedule matching engine.
//!
//! The free functions in this module are pure: they take already-loaded
//! profiles and a day scope and return fresh result structures. [`Matcher`]
//! wraps them with identifier normalization, day-name validation and
//! profile loading through a [`ProfileStore`].
//!
//! # Pairwise credit
//!
//! For each day, every canonical grid slot present in both students'
//! `available` sets earns 1 point. In addition, every pair of distinct
//! available slots (one per student) that overlap earns 0.5 points. The
//! partial credit is additive and may count one custom slot against several
//! slots of the other student, so a day can score above 100%.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::MatchError;
use crate::models::matching::{
    DayBreakdown, DaySlotStats, MatchResult, MeetingOutlook, MeetingSlotReport, RankedCandidate,
    SlotBucket, SlotCandidate, SlotStatistics, TeamInfo,
};
use crate::models::profile::{normalize_id, DaySchedule, Profile};
use crate::models::slot::{SlotGrid, Weekday};
use crate::services::store::ProfileStore;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 20.0;
pub const DEFAULT_MIN_DURATION_HOURS: u32 = 2;

const EXACT_CREDIT: f64 = 1.0;
const PARTIAL_CREDIT: f64 = 0.5;
const DENSE_DAY_CREDIT: f64 = 3.0;
const DENSE_DAY_BONUS: f64 = 1.2;
const MATCH_WEIGHT: f64 = 0.6;
const POTENTIAL_WEIGHT: f64 = 0.4;

const PERFECT_DISPLAY_LIMIT: usize = 10;
const GOOD_DISPLAY_LIMIT: usize = 10;
const BACKUP_DISPLAY_LIMIT: usize = 5;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Resolve a requested day scope.
///
/// `None` or an empty list means all seven days. Names are case-insensitive;
/// repeats are dropped keeping the first occurrence.
pub fn resolve_days(days: Option<&[String]>) -> Result<Vec<Weekday>, MatchError> {
    let requested = match days {
        Some(days) if !days.is_empty() => days,
        _ => return Ok(Weekday::ALL.to_vec()),
    };

    let mut resolved = Vec::with_capacity(requested.len());
    for name in requested {
        let day: Weekday = name.parse()?;
        if !resolved.contains(&day) {
            resolved.push(day);
        }
    }
    Ok(resolved)
}

/// Normalize identifiers, dropping blanks and repeats while keeping order
pub fn normalize_ids(ids: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = normalize_id(id);
        if !id.is_empty() && !normalized.contains(&id) {
            normalized.push(id);
        }
    }
    normalized
}

/// Credited points for one day between two schedules
pub fn day_credit(grid: &SlotGrid, first: &DaySchedule, second: &DaySchedule) -> f64 {
    let a = first.available();
    let b = second.available();

    let exact = grid
        .slots()
        .iter()
        .filter(|slot| a.contains(*slot) && b.contains(*slot))
        .count() as f64;

    let partial = a
        .iter()
        .flat_map(|slot1| b.iter().map(move |slot2| (slot1, slot2)))
        .filter(|(slot1, slot2)| slot1 != slot2 && slot1.overlaps(slot2))
        .count() as f64;

    exact * EXACT_CREDIT + partial * PARTIAL_CREDIT
}

/// Score two profiles against each other over `days`
pub fn compute_match(
    grid: &SlotGrid,
    first: &Profile,
    second: &Profile,
    days: &[Weekday],
) -> MatchResult {
    let day_total = grid.len();
    let mut common_slots = 0.0;
    let mut total_possible_slots = 0;
    let mut day_breakdown = BTreeMap::new();

    for day in days {
        let first_day = first.day(*day);
        let second_day = second.day(*day);
        let credit = day_credit(grid, first_day, second_day);

        day_breakdown.insert(
            *day,
            DayBreakdown {
                common_slots: credit,
                total_possible: day_total,
                day_percentage: percentage(credit, day_total as f64),
                user1_available: first_day.available().len(),
                user2_available: second_day.available().len(),
            },
        );

        common_slots += credit;
        total_possible_slots += day_total;
    }

    let match_percentage = percentage(common_slots, total_possible_slots as f64);
    let meeting_potential = meeting_potential(&day_breakdown);

    MatchResult {
        user1_id: first.id.clone(),
        user2_id: second.id.clone(),
        match_percentage: round1(match_percentage),
        common_slots,
        total_possible_slots,
        day_breakdown,
        meeting_potential,
        recommendation_score: match_percentage * MATCH_WEIGHT + meeting_potential * POTENTIAL_WEIGHT,
    }
}

// Mean day percentage, with days holding 3+ credited slots boosted by 20%
fn meeting_potential(day_breakdown: &BTreeMap<Weekday, DayBreakdown>) -> f64 {
    if day_breakdown.is_empty() {
        return 0.0;
    }

    let total: f64 = day_breakdown
        .values()
        .map(|day| {
            if day.common_slots >= DENSE_DAY_CREDIT {
                day.day_percentage * DENSE_DAY_BONUS
            } else {
                day.day_percentage
            }
        })
        .sum();

    total / day_breakdown.len() as f64
}

/// Rank candidates for `subject`, best recommendation score first.
///
/// The subject itself is skipped, candidates under `threshold` are dropped,
/// and ties keep the candidates' original order.
pub fn rank_candidates<'a>(
    grid: &SlotGrid,
    subject: &Profile,
    candidates: impl IntoIterator<Item = &'a Profile>,
    days: &[Weekday],
    threshold: f64,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter_map(|candidate| {
            let schedule_match = compute_match(grid, subject, candidate, days);
            if schedule_match.match_percentage < threshold {
                debug!(
                    "Candidate {} below threshold ({} < {})",
                    candidate.id, schedule_match.match_percentage, threshold
                );
                return None;
            }

            Some(RankedCandidate {
                user_id: candidate.id.clone(),
                name: candidate.name.clone(),
                first_name: candidate.first_name.clone(),
                last_name: candidate.last_name.clone(),
                department: candidate.department.clone(),
                year: candidate.year,
                skills: candidate.skills.clone(),
                recommendation_priority: schedule_match.recommendation_score,
                schedule_match,
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.recommendation_priority.total_cmp(&a.recommendation_priority));
    ranked
}

/// Scan the grid for slots the team can meet in.
///
/// A member attends a grid slot if it is in their available set or overlaps
/// one of their available slots. Bucket lists are truncated for display;
/// the statistics always carry the full counts.
pub fn find_team_slots(
    grid: &SlotGrid,
    members: &[&Profile],
    days: &[Weekday],
    min_duration_hours: u32,
) -> MeetingSlotReport {
    let team_size = members.len();
    let mut perfect_slots = Vec::new();
    let mut good_slots = Vec::new();
    let mut backup_slots = Vec::new();
    let mut day_statistics = BTreeMap::new();

    for day in days {
        let mut stats = DaySlotStats::default();

        for slot in grid.slots() {
            let (attending, absent): (Vec<&Profile>, Vec<&Profile>) = members
                .iter()
                .copied()
                .partition(|member| member.day(*day).covers(slot));

            let Some(bucket) = SlotBucket::classify(attending.len(), team_size) else {
                continue;
            };

            let candidate = SlotCandidate {
                day: day.title().to_string(),
                time_slot: slot.label(),
                start_time: slot.start_label(),
                end_time: slot.end_label(),
                availability_percentage: round1(percentage(
                    attending.len() as f64,
                    team_size as f64,
                )),
                available_members: attending.len(),
                total_members: team_size,
                available_member_names: attending.iter().map(|m| m.name.clone()).collect(),
                unavailable_member_names: absent.iter().map(|m| m.name.clone()).collect(),
            };

            match bucket {
                SlotBucket::Perfect => {
                    stats.perfect_slots += 1;
                    perfect_slots.push(candidate);
                }
                SlotBucket::Good => {
                    stats.good_slots += 1;
                    good_slots.push(candidate);
                }
                SlotBucket::Backup => {
                    stats.backup_slots += 1;
                    backup_slots.push(candidate);
                }
            }
        }

        stats.total_viable_slots = stats.perfect_slots + stats.good_slots + stats.backup_slots;
        day_statistics.insert(*day, stats);
    }

    let total_perfect = perfect_slots.len();
    let total_good = good_slots.len();
    let total_backup = backup_slots.len();
    let total_checked = days.len() * grid.len();
    let outlook = MeetingOutlook::from_counts(total_perfect, total_good, total_backup);

    perfect_slots.truncate(PERFECT_DISPLAY_LIMIT);
    good_slots.truncate(GOOD_DISPLAY_LIMIT);
    backup_slots.truncate(BACKUP_DISPLAY_LIMIT);

    MeetingSlotReport {
        team_info: TeamInfo {
            member_ids: members.iter().map(|m| m.id.clone()).collect(),
            member_names: members.iter().map(|m| m.name.clone()).collect(),
            team_size,
        },
        perfect_slots,
        good_slots,
        backup_slots,
        statistics: SlotStatistics {
            total_perfect_slots: total_perfect,
            total_good_slots: total_good,
            total_backup_slots: total_backup,
            total_checked_slots: total_checked,
            success_rate: round1(percentage(
                (total_perfect + total_good) as f64,
                total_checked as f64,
            )),
            day_breakdown: day_statistics,
            outlook,
            recommendation: outlook.message().to_string(),
        },
        min_duration_hours,
    }
}

/// Entry point for the three matcher operations.
///
/// Holds no mutable state of its own; concurrent calls only share the
/// profile store, which must be safe for concurrent reads.
pub struct Matcher {
    store: Arc<dyn ProfileStore>,
    grid: SlotGrid,
}

impl Matcher {
    pub fn new(store: Arc<dyn ProfileStore>, grid: SlotGrid) -> Self {
        Self { store, grid }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    async fn load(&self, ids: &[String]) -> Result<HashMap<String, Profile>, MatchError> {
        let profiles = self.store.load_profiles(ids).await?;
        debug!("Loaded {} of {} requested profiles", profiles.len(), ids.len());
        Ok(profiles)
    }

    /// Load a single profile
    pub async fn profile(&self, id: &str) -> Result<Profile, MatchError> {
        let id = normalize_id(id);
        let mut profiles = self.load(std::slice::from_ref(&id)).await?;
        profiles.remove(&id).ok_or(MatchError::NotFound(vec![id]))
    }

    /// Schedule match between two students
    pub async fn match_percentage(
        &self,
        user1_id: &str,
        user2_id: &str,
        days: Option<&[String]>,
    ) -> Result<MatchResult, MatchError> {
        let days = resolve_days(days)?;
        let user1_id = normalize_id(user1_id);
        let user2_id = normalize_id(user2_id);

        let profiles = self.load(&[user1_id.clone(), user2_id.clone()]).await?;

        let (Some(first), Some(second)) = (profiles.get(&user1_id), profiles.get(&user2_id)) else {
            let missing: Vec<String> = [user1_id, user2_id]
                .into_iter()
                .filter(|id| !profiles.contains_key(id))
                .collect();
            info!("Match requested for unknown users: {:?}", missing);
            return Err(MatchError::NotFound(missing));
        };

        let result = compute_match(&self.grid, first, second, &days);
        info!(
            "Match {} <-> {}: {}% over {} days",
            first.id,
            second.id,
            result.match_percentage,
            days.len()
        );
        Ok(result)
    }

    /// Ranked teammate recommendations for `user_id`.
    ///
    /// Unknown candidates are skipped; an unknown subject is an error.
    pub async fn recommendations(
        &self,
        user_id: &str,
        candidate_ids: &[String],
        days: Option<&[String]>,
        min_match_threshold: Option<f64>,
    ) -> Result<Vec<RankedCandidate>, MatchError> {
        let days = resolve_days(days)?;
        let threshold = min_match_threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD);
        let user_id = normalize_id(user_id);
        let candidate_ids = normalize_ids(candidate_ids);

        let mut all_ids = Vec::with_capacity(candidate_ids.len() + 1);
        all_ids.push(user_id.clone());
        all_ids.extend(candidate_ids.iter().cloned());

        let profiles = self.load(&all_ids).await?;

        let subject = profiles
            .get(&user_id)
            .ok_or_else(|| MatchError::NotFound(vec![user_id.clone()]))?;

        let candidates = candidate_ids.iter().filter_map(|id| profiles.get(id));
        let ranked = rank_candidates(&self.grid, subject, candidates, &days, threshold);

        info!(
            "{} of {} candidates recommended for {} (threshold {})",
            ranked.len(),
            candidate_ids.len(),
            user_id,
            threshold
        );
        Ok(ranked)
    }

    /// Meeting slot suggestions for a team of at least two students
    pub async fn team_meeting_slots(
        &self,
        member_ids: &[String],
        days: Option<&[String]>,
        min_duration_hours: Option<u32>,
    ) -> Result<MeetingSlotReport, MatchError> {
        let member_ids = normalize_ids(member_ids);
        if member_ids.len() < 2 {
            return Err(MatchError::InsufficientMembers(member_ids.len()));
        }
        let days = resolve_days(days)?;

        let profiles = self.load(&member_ids).await?;

        let missing: Vec<String> = member_ids
            .iter()
            .filter(|id| !profiles.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(MatchError::NotFound(missing));
        }

        let members: Vec<&Profile> = member_ids
            .iter()
            .filter_map(|id| profiles.get(id))
            .collect();

        let report = find_team_slots(
            &self.grid,
            &members,
            &days,
            min_duration_hours.unwrap_or(DEFAULT_MIN_DURATION_HOURS),
        );

        info!(
            "Team of {}: {} perfect, {} good, {} backup slots ({})",
            members.len(),
            report.statistics.total_perfect_slots,
            report.statistics.total_good_slots,
            report.statistics.total_backup_slots,
            report.statistics.recommendation
        );
        Ok(report)
    }
}
