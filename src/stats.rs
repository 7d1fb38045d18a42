use std::collections::HashMap;

use serde::Serialize;
use sqlx::{query_as, PgPool};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_votes: i64,
    pub yes_votes: i64,
    pub no_votes: i64,
    pub yes_percentage: i64,
    pub no_percentage: i64,
}

impl Statistics {
    /// Percentages are rounded independently, so they need not sum to 100.
    pub fn from_counts(yes_votes: i64, no_votes: i64) -> Statistics {
        let total_votes = yes_votes + no_votes;
        let percentage = |part: i64| {
            if total_votes > 0 {
                (part as f64 / total_votes as f64 * 100.0).round() as i64
            } else {
                0
            }
        };
        Statistics {
            total_votes,
            yes_votes,
            no_votes,
            yes_percentage: percentage(yes_votes),
            no_percentage: percentage(no_votes),
        }
    }

    pub fn empty() -> Statistics {
        Statistics::from_counts(0, 0)
    }
}

/// Yes/no counts for one poll, single grouped query.
pub async fn for_poll(pool: &PgPool, poll_id: &str) -> Result<Statistics, Error> {
    let rows: Vec<(bool, i64)> =
        query_as("SELECT answer, COUNT(*) FROM votes WHERE poll_id = $1 GROUP BY answer")
            .bind(poll_id)
            .fetch_all(pool)
            .await?;
    let mut yes = 0;
    let mut no = 0;
    for (answer, count) in rows {
        if answer {
            yes = count;
        } else {
            no = count;
        }
    }
    Ok(Statistics::from_counts(yes, no))
}

/// Counts for a whole poll set in one grouped query, for the history and
/// admin views. Polls without votes are absent from the map.
pub async fn for_polls(pool: &PgPool, poll_ids: &[String]) -> Result<HashMap<String, Statistics>, Error> {
    if poll_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(String, bool, i64)> = query_as(
        "SELECT poll_id, answer, COUNT(*) FROM votes WHERE poll_id = ANY($1) GROUP BY poll_id, answer",
    )
    .bind(poll_ids)
    .fetch_all(pool)
    .await?;
    let mut counts: HashMap<String, (i64, i64)> = HashMap::new();
    for (poll_id, answer, count) in rows {
        let entry = counts.entry(poll_id).or_insert((0, 0));
        if answer {
            entry.0 = count;
        } else {
            entry.1 = count;
        }
    }
    Ok(counts
        .into_iter()
        .map(|(poll_id, (yes, no))| (poll_id, Statistics::from_counts(yes, no)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_votes_means_all_zeros() {
        let stats = Statistics::from_counts(0, 0);
        assert_eq!(stats.total_votes, 0);
        assert_eq!(stats.yes_percentage, 0);
        assert_eq!(stats.no_percentage, 0);
    }

    #[test]
    fn three_yes_one_no() {
        let stats = Statistics::from_counts(3, 1);
        assert_eq!(stats.total_votes, 4);
        assert_eq!(stats.yes_votes, 3);
        assert_eq!(stats.no_votes, 1);
        assert_eq!(stats.yes_percentage, 75);
        assert_eq!(stats.no_percentage, 25);
    }

    #[test]
    fn independent_rounding_may_exceed_100() {
        // 1/3 and 2/3 both round away from the exact thirds
        let stats = Statistics::from_counts(1, 2);
        assert_eq!(stats.yes_percentage, 33);
        assert_eq!(stats.no_percentage, 67);
    }
}
