//! The built-in scenario table.
//!
//! Three teaching scenarios, each answered by the full model roster. Every
//! response carries a three-line rubric and the judge script printed while
//! grading it.

use std::collections::BTreeMap;

use super::catalog::{
    Catalog, GroundTruth, JudgeLogLine, LogLevel, ModelId, RubricItem, Response, Scenario,
    ScenarioId, Score, Verdict,
};

const GAZETTE: &str = "Official Gazette (Act 45 of 2023)";

const CRIT_CODE: &str = "Cites the BNS, not the repealed IPC";
const CRIT_SECTION: &str = "Section matches the Official Gazette";
const CRIT_SUBSTANCE: &str = "Punishment or scope stated correctly";

/// What the judge script found when it cross-checked the cited section.
enum Finding<'a> {
    /// The citation matches the ground truth.
    Exact,
    /// The citation resolves in the IPC 1860 database.
    Legacy { cited: &'a str },
    /// The citation resolves in the pre-enactment draft bill.
    Draft { cited: &'a str },
    /// The section matches but the substance does not.
    Substance { detail: &'a str },
}

fn judge_script(ground_section: &str, cited: &str, finding: Finding<'_>) -> Vec<JudgeLogLine> {
    let mut lines = vec![
        JudgeLogLine::new(LogLevel::Info, "Initializing Independent Verification Protocol..."),
        JudgeLogLine::new(LogLevel::Action, "load_ground_truth(BNS_2023)"),
        JudgeLogLine::new(
            LogLevel::Success,
            format!("Ground Truth Loaded: {ground_section}"),
        ),
        JudgeLogLine::new(LogLevel::Action, "scan_response_entities(response_text)"),
        JudgeLogLine::new(LogLevel::Info, format!("Found Citation: \"{cited}\"")),
    ];
    match finding {
        Finding::Exact => {
            lines.push(JudgeLogLine::new(LogLevel::Success, "Reference Check: EXACT MATCH"));
            lines.push(JudgeLogLine::new(
                LogLevel::Success,
                "Reasoning Check: Valid definitions found",
            ));
            lines.push(JudgeLogLine::new(LogLevel::Success, "VERDICT: ROBUST PASS"));
        }
        Finding::Legacy { cited } => {
            lines.push(JudgeLogLine::new(
                LogLevel::Warn,
                format!("Reference Check: {cited} != {ground_section}"),
            ));
            lines.push(JudgeLogLine::new(LogLevel::Action, "query_legacy_db(IPC_1860)"));
            lines.push(JudgeLogLine::new(
                LogLevel::Error,
                format!("MATCH FOUND in Legacy Database: IPC {cited}"),
            ));
            lines.push(JudgeLogLine::new(LogLevel::Fatal, "VERDICT: LEGACY ERROR DETECTED"));
        }
        Finding::Draft { cited } => {
            lines.push(JudgeLogLine::new(
                LogLevel::Warn,
                format!("Reference Check: {cited} != {ground_section}"),
            ));
            lines.push(JudgeLogLine::new(LogLevel::Action, "query_legislative_history()"));
            lines.push(JudgeLogLine::new(
                LogLevel::Error,
                "MATCH FOUND: BNS Draft Bill (Pre-Enactment)",
            ));
            lines.push(JudgeLogLine::new(LogLevel::Fatal, "VERDICT: DRAFT ERROR DETECTED"));
        }
        Finding::Substance { detail } => {
            lines.push(JudgeLogLine::new(LogLevel::Success, "Reference Check: EXACT MATCH"));
            lines.push(JudgeLogLine::new(LogLevel::Action, "compare_provision_text()"));
            lines.push(JudgeLogLine::new(LogLevel::Warn, format!("Substance Check: {detail}")));
            lines.push(JudgeLogLine::new(LogLevel::Error, "VERDICT: MISATTRIBUTION DETECTED"));
        }
    }
    lines
}

struct Canned<'a> {
    text: &'a str,
    verdict: Verdict,
    score: u8,
    search_triggered: bool,
    rubric: [RubricItem; 3],
    judge_log: Vec<JudgeLogLine>,
    summary: &'a str,
}

fn response(canned: Canned<'_>) -> Response {
    Response {
        text: canned.text.to_string(),
        verdict: canned.verdict,
        score: Score::clamped(canned.score),
        search_triggered: canned.search_triggered,
        rubric: canned.rubric.into_iter().collect(),
        judge_log: canned.judge_log,
        summary: canned.summary.to_string(),
    }
}

fn murder() -> Scenario {
    let section = "Section 103(1)";
    let mut responses = BTreeMap::new();
    responses.insert(
        ModelId::Gpt4o,
        response(Canned {
            text: "Under the new Bharatiya Nyaya Sanhita, murder is punishable under Section 302. \
                   The punishment remains death or imprisonment for life.",
            verdict: Verdict::LegacyError,
            score: 0,
            search_triggered: false,
            rubric: [
                RubricItem::fail(CRIT_CODE, "Section 302 is the repealed IPC 1860 provision"),
                RubricItem::fail(CRIT_SECTION, "Expected Section 103(1)"),
                RubricItem::pass(CRIT_SUBSTANCE, "Death or imprisonment for life"),
            ],
            judge_log: judge_script(section, "Section 302", Finding::Legacy { cited: "Section 302" }),
            summary: "Model cited repealed IPC law (Sec 302) instead of BNS.",
        }),
    );
    responses.insert(
        ModelId::Llama3,
        response(Canned {
            text: "Murder is punishable under Section 101 of the Bharatiya Nyaya Sanhita with \
                   death or imprisonment for life.",
            verdict: Verdict::Misattribution,
            score: 1,
            search_triggered: false,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the Bharatiya Nyaya Sanhita"),
                RubricItem::fail(CRIT_SECTION, "Section 101 defines murder; 103(1) punishes it"),
                RubricItem::pass(CRIT_SUBSTANCE, "Death or imprisonment for life"),
            ],
            judge_log: judge_script(
                section,
                "Section 101",
                Finding::Substance {
                    detail: "Section 101 is the definition, not the penalty clause",
                },
            ),
            summary: "Model cited the BNS definition clause instead of the punishment section.",
        }),
    );
    responses.insert(
        ModelId::Krutrim,
        response(Canned {
            text: "Under the BNS, murder is punishable under Section 103(1) with death or \
                   imprisonment for life, and the offender is also liable to fine.",
            verdict: Verdict::Verified,
            score: 3,
            search_triggered: false,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the Bharatiya Nyaya Sanhita"),
                RubricItem::pass(CRIT_SECTION, "Section 103(1)"),
                RubricItem::pass(CRIT_SUBSTANCE, "Includes liability to fine"),
            ],
            judge_log: judge_script(section, "Section 103(1)", Finding::Exact),
            summary: "Model correctly identified the BNS punishment for murder.",
        }),
    );
    Scenario {
        id: ScenarioId::Murder,
        title: "Murder vs. Culpable Homicide".to_string(),
        query: "What is the punishment for Murder under the new BNS laws?".to_string(),
        ground_truth: GroundTruth {
            source: GAZETTE.to_string(),
            section: section.to_string(),
            text: "Punishment for Murder: Death or imprisonment for life, and liable to fine."
                .to_string(),
        },
        responses,
    }
}

fn suicide() -> Scenario {
    let section = "Section 226";
    let mut responses = BTreeMap::new();
    responses.insert(
        ModelId::Gpt4o,
        response(Canned {
            text: "Attempted suicide is dealt with under Section 309, which the Mental Healthcare \
                   Act, 2017 effectively decriminalised. The BNS carries that position forward.",
            verdict: Verdict::LegacyError,
            score: 0,
            search_triggered: false,
            rubric: [
                RubricItem::fail(CRIT_CODE, "Section 309 belongs to the IPC 1860"),
                RubricItem::fail(CRIT_SECTION, "Expected Section 226"),
                RubricItem::fail(CRIT_SUBSTANCE, "Misses the public-servant restraint offence"),
            ],
            judge_log: judge_script(section, "Section 309", Finding::Legacy { cited: "Section 309" }),
            summary: "Model answered from the repealed IPC (Sec 309) framework.",
        }),
    );
    responses.insert(
        ModelId::Llama3,
        response(Canned {
            text: "The BNS Draft Bill 2023 proposes Section 224 for attempted suicide, focusing \
                   on community service rather than imprisonment.",
            verdict: Verdict::DraftError,
            score: 0,
            search_triggered: true,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the BNS lineage"),
                RubricItem::fail(CRIT_SECTION, "Section 224 is the draft numbering"),
                RubricItem::fail(CRIT_SUBSTANCE, "Community service clause changed before enactment"),
            ],
            judge_log: judge_script(section, "Section 224", Finding::Draft { cited: "Section 224" }),
            summary: "Model cited a Draft Bill provision that changed in the final Act.",
        }),
    );
    responses.insert(
        ModelId::Krutrim,
        response(Canned {
            text: "The BNS has no general offence of attempted suicide. Section 226 punishes an \
                   attempt to commit suicide made to compel or restrain a public servant.",
            verdict: Verdict::Verified,
            score: 3,
            search_triggered: false,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the Bharatiya Nyaya Sanhita"),
                RubricItem::pass(CRIT_SECTION, "Section 226"),
                RubricItem::pass(CRIT_SUBSTANCE, "Scoped to restraining a public servant"),
            ],
            judge_log: judge_script(section, "Section 226", Finding::Exact),
            summary: "Model correctly scoped the narrowed BNS offence.",
        }),
    );
    Scenario {
        id: ScenarioId::Suicide,
        title: "Attempted Suicide".to_string(),
        query: "Is attempted suicide punishable under BNS?".to_string(),
        ground_truth: GroundTruth {
            source: GAZETTE.to_string(),
            section: section.to_string(),
            text: "Attempt to commit suicide... with intent to restrain public servant... is \
                   punishable."
                .to_string(),
        },
        responses,
    }
}

fn lynching() -> Scenario {
    let section = "Section 103(2)";
    let mut responses = BTreeMap::new();
    responses.insert(
        ModelId::Gpt4o,
        response(Canned {
            text: "There is no separate offence of mob lynching. Such cases are prosecuted as \
                   murder under Section 302 read with Section 149 for unlawful assembly.",
            verdict: Verdict::LegacyError,
            score: 0,
            search_triggered: true,
            rubric: [
                RubricItem::fail(CRIT_CODE, "Sections 302 and 149 are IPC 1860"),
                RubricItem::fail(CRIT_SECTION, "Expected Section 103(2)"),
                RubricItem::fail(CRIT_SUBSTANCE, "Denies the new group-murder offence"),
            ],
            judge_log: judge_script(section, "Section 302", Finding::Legacy { cited: "Section 302" }),
            summary: "Retrieved legacy commentary and missed the new BNS provision.",
        }),
    );
    responses.insert(
        ModelId::Llama3,
        response(Canned {
            text: "Yes. Section 103(2) of the BNS covers murder by a group of five or more \
                   persons on grounds such as race or caste, punishable with up to seven years.",
            verdict: Verdict::Misattribution,
            score: 2,
            search_triggered: false,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the Bharatiya Nyaya Sanhita"),
                RubricItem::pass(CRIT_SECTION, "Section 103(2)"),
                RubricItem::fail(CRIT_SUBSTANCE, "Punishment is death or life, not seven years"),
            ],
            judge_log: judge_script(
                section,
                "Section 103(2)",
                Finding::Substance {
                    detail: "stated punishment does not match the Gazette",
                },
            ),
            summary: "Model found the right section but misstated the punishment.",
        }),
    );
    responses.insert(
        ModelId::Krutrim,
        response(Canned {
            text: "Yes, the BNS introduces a specific provision for Mob Lynching under Section \
                   103(2), punishable by death or life imprisonment.",
            verdict: Verdict::Verified,
            score: 3,
            search_triggered: true,
            rubric: [
                RubricItem::pass(CRIT_CODE, "Refers to the Bharatiya Nyaya Sanhita"),
                RubricItem::pass(CRIT_SECTION, "Section 103(2)"),
                RubricItem::pass(CRIT_SUBSTANCE, "Death or imprisonment for life"),
            ],
            judge_log: judge_script(section, "Section 103(2)", Finding::Exact),
            summary: "Model correctly identified the new BNS provision.",
        }),
    );
    Scenario {
        id: ScenarioId::Lynching,
        title: "Mob Lynching".to_string(),
        query: "Does BNS have a specific section for Mob Lynching?".to_string(),
        ground_truth: GroundTruth {
            source: GAZETTE.to_string(),
            section: section.to_string(),
            text: "When a group of five or more persons acting in concert commits murder... \
                   ground of race, caste..."
                .to_string(),
        },
        responses,
    }
}

impl Catalog {
    /// The canonical built-in table: every scenario against the full roster.
    pub fn builtin() -> Self {
        Catalog::new([murder(), suicide(), lynching()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_full_roster() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), ScenarioId::ALL.len());
        for scenario in ScenarioId::ALL {
            for model in ModelId::ALL {
                assert!(
                    catalog.response(scenario, model).is_ok(),
                    "missing {scenario}/{model}"
                );
            }
        }
        assert_eq!(catalog.pairs().len(), 9);
    }

    #[test]
    fn test_builtin_is_valid() {
        Catalog::builtin().validate().expect("builtin catalog validates");
    }

    #[test]
    fn test_murder_gpt4o_is_legacy_fail_zero() {
        let catalog = Catalog::builtin();
        let r = catalog
            .response(ScenarioId::Murder, ModelId::Gpt4o)
            .expect("pair present");
        assert_eq!(r.verdict, Verdict::LegacyError);
        assert_eq!(r.verdict.stamp(), "FAIL");
        assert_eq!(r.score.value(), 0);
        assert!(r.text.contains("Section 302"));
        assert_eq!(r.judge_log.last().map(|l| l.level), Some(LogLevel::Fatal));
    }

    #[test]
    fn test_pass_verdicts_have_clean_rubric() {
        let catalog = Catalog::builtin();
        for scenario in catalog.scenarios() {
            for response in scenario.responses.values() {
                if response.verdict.is_pass() {
                    assert!(response.rubric.iter().all(RubricItem::passed));
                    assert_eq!(response.score.value(), Score::MAX);
                }
            }
        }
    }

    #[test]
    fn test_builtin_survives_json_roundtrip_through_loader() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).expect("serialize");
        let loaded = Catalog::from_json_str(&json).expect("load");
        assert_eq!(catalog, loaded);
    }

    #[test]
    fn test_text_has_no_layout_whitespace() {
        let catalog = Catalog::builtin();
        for scenario in catalog.scenarios() {
            for response in scenario.responses.values() {
                assert!(!response.text.contains("  "), "{}", response.text);
            }
        }
    }
}
