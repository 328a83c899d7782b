//! Published benchmark figures: the leaderboard, headline stats and insight
//! cards, plus the aggregates derived from them.

use serde::Serialize;

/// Where a model was trained and curated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Global,
    Indic,
}

impl Origin {
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Global => "Global",
            Origin::Indic => "Indic",
        }
    }
}

/// One row of the comparative performance matrix (N=1,024).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: u8,
    pub name: &'static str,
    /// BNS accuracy, percent. Higher is better.
    pub accuracy: u8,
    /// IPC legacy bias, percent. Lower is better.
    pub legacy_bias: u8,
    pub safety: u8,
    /// Reasoning quality out of 10.
    pub logic: f32,
    pub origin: Origin,
    pub highlighted: bool,
}

const fn row(
    rank: u8,
    name: &'static str,
    accuracy: u8,
    legacy_bias: u8,
    safety: u8,
    logic: f32,
    origin: Origin,
) -> LeaderboardRow {
    LeaderboardRow {
        rank,
        name,
        accuracy,
        legacy_bias,
        safety,
        logic,
        origin,
        highlighted: rank == 1,
    }
}

pub const LEADERBOARD: [LeaderboardRow; 8] = [
    row(1, "Olac Krutrim", 92, 5, 97, 7.8, Origin::Indic),
    row(2, "Sarvam 2B", 88, 8, 95, 7.2, Origin::Indic),
    row(3, "GPT-4o", 65, 32, 99, 9.6, Origin::Global),
    row(4, "Claude 3", 62, 35, 98, 9.4, Origin::Global),
    row(5, "Gemini 1.5", 58, 38, 94, 8.9, Origin::Global),
    row(6, "Mistral", 55, 40, 92, 8.5, Origin::Global),
    row(7, "Qwen 2.5", 48, 45, 88, 8.1, Origin::Global),
    row(8, "Llama-3", 42, 52, 85, 8.0, Origin::Global),
];

/// Total benchmark queries behind the published figures.
pub const TOTAL_BENCHMARKS: u32 = 1_024;

/// Headline legacy inertia of Western models, percent.
pub const KEY_INSIGHT_BIAS: u8 = 32;

pub const KEY_INSIGHT_TEXT: &str = "Average Legacy Inertia across Western models (GPT, Claude, Llama). They struggle to \"unlearn\" 160 years of IPC data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsightCard {
    pub title: &'static str,
    pub text: &'static str,
    pub evidence: &'static str,
}

pub const INSIGHTS: [InsightCard; 3] = [
    InsightCard {
        title: "The 160-Year Bias",
        text: "Parametric Inertia prevents models from unlearning high-frequency tokens associated with the 1860 IPC.",
        evidence: "Ex: Predicted 'Section 302' (IPC Murder) with 94% confidence, ignoring BNS prompts.",
    },
    InsightCard {
        title: "The RAG Trap",
        text: "Google Custom Search fails to distinguish between 'legacy' and 'repealed' law without specific date-filtering metadata.",
        evidence: "Ex: Retrieved 'Indian Kanoon 2018' articles instead of 'Official Gazette 2023'.",
    },
    InsightCard {
        title: "Sovereign Advantage",
        text: "Indigenous models (Krutrim/Sarvam) show 40% better recall on BNS-specific nomenclature due to local training curation.",
        evidence: "Ex: Correctly identified 'Snatching' as a distinct BNS offense (Section 304).",
    },
];

/// Aggregates over the rows of one origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OriginSummary {
    pub origin: Origin,
    pub models: usize,
    pub mean_accuracy: f64,
    pub mean_legacy_bias: f64,
}

/// Mean accuracy and bias for `origin`, or `None` if no row matches.
pub fn summarize(rows: &[LeaderboardRow], origin: Origin) -> Option<OriginSummary> {
    let matching: Vec<&LeaderboardRow> = rows.iter().filter(|r| r.origin == origin).collect();
    if matching.is_empty() {
        return None;
    }
    let n = matching.len() as f64;
    let mean = |f: fn(&LeaderboardRow) -> u8| {
        matching.iter().map(|r| f64::from(f(r))).sum::<f64>() / n
    };
    Some(OriginSummary {
        origin,
        models: matching.len(),
        mean_accuracy: mean(|r| r.accuracy),
        mean_legacy_bias: mean(|r| r.legacy_bias),
    })
}

/// Indic mean accuracy minus Global mean accuracy, in percentage points.
pub fn accuracy_gap(rows: &[LeaderboardRow]) -> Option<f64> {
    let indic = summarize(rows, Origin::Indic)?;
    let global = summarize(rows, Origin::Global)?;
    Some(indic.mean_accuracy - global.mean_accuracy)
}

/// Rows sorted by a key, best first. Ties keep published rank order.
pub fn ranked_by(rows: &[LeaderboardRow], key: fn(&LeaderboardRow) -> f32) -> Vec<LeaderboardRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)).then(a.rank.cmp(&b.rank)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_sequential() {
        for (i, row) in LEADERBOARD.iter().enumerate() {
            assert_eq!(usize::from(row.rank), i + 1);
        }
        assert_eq!(LEADERBOARD.iter().filter(|r| r.highlighted).count(), 1);
        assert_eq!(LEADERBOARD[0].name, "Olac Krutrim");
    }

    #[test]
    fn test_origin_means() {
        let indic = summarize(&LEADERBOARD, Origin::Indic).expect("indic rows");
        assert_eq!(indic.models, 2);
        assert_eq!(indic.mean_accuracy, 90.0);
        assert_eq!(indic.mean_legacy_bias, 6.5);

        let global = summarize(&LEADERBOARD, Origin::Global).expect("global rows");
        assert_eq!(global.models, 6);
        assert_eq!(global.mean_accuracy, 55.0);
        assert!(global.mean_legacy_bias > indic.mean_legacy_bias);
    }

    #[test]
    fn test_accuracy_gap() {
        assert_eq!(accuracy_gap(&LEADERBOARD), Some(35.0));
        assert_eq!(accuracy_gap(&LEADERBOARD[2..]), None);
    }

    #[test]
    fn test_ranked_by_logic() {
        let by_logic = ranked_by(&LEADERBOARD, |r| r.logic);
        assert_eq!(by_logic[0].name, "GPT-4o");
        assert_eq!(by_logic[7].name, "Sarvam 2B");
    }
}
