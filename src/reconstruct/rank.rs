//! Minute-grid dense-rank reconstruction (SPEC_FULL.md §4.5), a port of
//! `original_source/app/core/rank.py::aggregate_rank_at_time_point` /
//! `save_real_time_rank`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{DataRegion, Submission};

/// Aggregated standing for one participant at a single time point.
#[derive(Debug, Clone, PartialEq)]
struct Standing {
    username: String,
    data_region: DataRegion,
    credit_sum: u32,
    fail_count_sum: u32,
    latest_accept: DateTime<Utc>,
}

impl Standing {
    fn penalty_time(&self) -> DateTime<Utc> {
        self.latest_accept + chrono::Duration::minutes(5 * self.fail_count_sum as i64)
    }
}

/// Groups `submissions` with `date <= at` by `(username, dataRegion)`,
/// summing credit and fail counts per
/// `original_source/app/core/rank.py::aggregate_rank_at_time_point`.
fn standings_at(submissions: &[Submission], at: DateTime<Utc>) -> Vec<Standing> {
    let mut by_user: HashMap<(&str, DataRegion), Standing> = HashMap::new();
    for s in submissions {
        if s.date > at {
            continue;
        }
        let entry = by_user
            .entry((s.username.as_str(), s.data_region))
            .or_insert_with(|| Standing {
                username: s.username.clone(),
                data_region: s.data_region,
                credit_sum: 0,
                fail_count_sum: 0,
                latest_accept: s.date,
            });
        entry.credit_sum += s.credit;
        entry.fail_count_sum += s.fail_count;
        if s.date > entry.latest_accept {
            entry.latest_accept = s.date;
        }
    }
    by_user.into_values().collect()
}

/// Dense rank with ties: participants with the same `(credit_sum,
/// penalty_time)` share a rank; the next distinct group's rank advances by
/// the size of the tie group (not just by 1), matching SPEC_FULL.md §4.5 and
/// the scenario in SPEC_FULL.md §8 item 5. Keyed by `(username, dataRegion)`
/// so a username shared across CN/US never collapses onto one entry.
pub fn dense_rank_at(submissions: &[Submission], at: DateTime<Utc>) -> HashMap<(String, DataRegion), u32> {
    let mut standings = standings_at(submissions, at);
    standings.sort_by(|a, b| {
        b.credit_sum
            .cmp(&a.credit_sum)
            .then(a.penalty_time().cmp(&b.penalty_time()))
    });

    let mut ranks = HashMap::new();
    let mut idx = 0usize;
    while idx < standings.len() {
        let mut group_end = idx + 1;
        while group_end < standings.len()
            && standings[group_end].credit_sum == standings[idx].credit_sum
            && standings[group_end].penalty_time() == standings[idx].penalty_time()
        {
            group_end += 1;
        }
        let rank = (idx + 1) as u32;
        for s in &standings[idx..group_end] {
            ranks.insert((s.username.clone(), s.data_region), rank);
        }
        idx = group_end;
    }
    ranks
}

/// Builds the 90-length minute-grid rank vector for every participant with
/// `score != 0` in `scored_participants` (Open Question #2, DESIGN.md):
/// participants absent from the aggregation at a grid point receive
/// `last_rank + 1`. Keyed by `(username, dataRegion)` per SPEC_FULL.md §4.5.
pub fn real_time_rank_series(
    submissions: &[Submission],
    grid: &[DateTime<Utc>],
    scored_participants: &[(String, DataRegion)],
) -> HashMap<(String, DataRegion), Vec<u32>> {
    let mut series: HashMap<(String, DataRegion), Vec<u32>> = scored_participants
        .iter()
        .map(|k| (k.clone(), Vec::with_capacity(grid.len())))
        .collect();

    for &t in grid {
        let ranks = dense_rank_at(submissions, t);
        let last_rank = ranks.values().copied().max().unwrap_or(0);
        for key in scored_participants {
            let rank = ranks.get(key).copied().unwrap_or(last_rank + 1);
            series.get_mut(key).unwrap().push(rank);
        }
    }
    series
}
