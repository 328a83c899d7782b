//! Static page copy: navigation, hero, problem cards, methodology, schema
//! table, contributors and footer.

use serde::Serialize;

/// Anchors of the single page, in scroll order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Home,
    Simulator,
    Methodology,
    Analytics,
    Team,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Simulator,
        Section::Methodology,
        Section::Analytics,
        Section::Team,
    ];

    pub fn anchor(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Simulator => "simulator",
            Section::Methodology => "methodology",
            Section::Analytics => "analytics",
            Section::Team => "team",
        }
    }

    /// Navigation label; the simulator is advertised as "Benchmark".
    pub fn label(&self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Simulator => "Benchmark",
            Section::Methodology => "Methodology",
            Section::Analytics => "Analytics",
            Section::Team => "Team",
        }
    }

    pub fn from_anchor(anchor: &str) -> Option<Section> {
        Self::ALL.into_iter().find(|s| s.anchor() == anchor)
    }
}

pub const BRAND: &str = "INDOLEGAL-100";
pub const REPOSITORY_URL: &str = "https://github.com/HarshalPatel1972/ipc-v-bns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeCard {
    pub name: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hero {
    pub headline: &'static str,
    pub tagline: &'static str,
    pub legacy: CodeCard,
    pub current: CodeCard,
    pub call_to_action: &'static str,
}

pub const HERO: Hero = Hero {
    headline: "Can AI Unlearn 160 Years of Law?",
    tagline: "Benchmarking LLM Hallucinations in the IPC to BNS Transition.",
    legacy: CodeCard {
        name: "IPC 1860",
        status: "Legacy Code \u{2022} Deprecated",
    },
    current: CodeCard {
        name: "BNS 2023",
        status: "Active Provision \u{2022} Enforced",
    },
    call_to_action: "RUN THE SIMULATION",
};

/// A titled paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub text: &'static str,
}

pub const FAILURES_HEADING: &str = "SYSTEM_FAILURES";

pub const PROBLEMS: [Card; 3] = [
    Card {
        title: "Parametric Inertia",
        text: "Models cling to old IPC data embedded deep in their weights, refusing to update to the new BNS framework.",
    },
    Card {
        title: "The Zombie Error",
        text: "Citing dead laws as active provisions. The model hallucinates that repealed acts are still enforceable.",
    },
    Card {
        title: "RAG Confusion",
        text: "Retrieval Augmented Generation fails to filter legacy noise from the open web, polluting the context window.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodStep {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

pub const METHODOLOGY: [MethodStep; 3] = [
    MethodStep {
        number: 1,
        title: "Data Extraction",
        description: "Mining 100 high-impact legal scenarios where IPC and BNS differ significantly.",
        example: "Query: 'Punishment for Mob Lynching' (New in BNS vs. undefined in IPC).",
    },
    MethodStep {
        number: 2,
        title: "Triangulation",
        description: "Direct Query + Reverse Lookup + Adversarial Trap to test robustness.",
        example: "Trap: 'Cite the IPC section for Organized Crime' (Should fail as it's BNS-only).",
    },
    MethodStep {
        number: 3,
        title: "Automated Judging",
        description: "LLM-as-a-Judge grading responses on a strict 0-3 rubric for hallucination.",
        example: "Score 0/3: Logic holds but cites repealed 'Section 124A'.",
    },
];

/// One column of the benchmark record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaColumn {
    pub column: &'static str,
    pub description: &'static str,
    pub rationale: &'static str,
    pub example: &'static str,
}

const fn col(
    column: &'static str,
    description: &'static str,
    rationale: &'static str,
    example: &'static str,
) -> SchemaColumn {
    SchemaColumn {
        column,
        description,
        rationale,
        example,
    }
}

pub const SCHEMA: [SchemaColumn; 10] = [
    col("id", "Unique Record Identifier", "Traceability", "SEQ_001"),
    col("model_name", "Target LLM", "To compare bias across architectures", "GPT-4o / Llama-3"),
    col("category", "Legal Domain", "Identify weak spots (e.g. Women's Safety)", "Crimes Against Body"),
    col("complexity", "Cognitive Load (L1-L3)", "Does model fail on simple vs complex?", "L2 (Reasoning)"),
    col("query_method", "Prompt Strategy", "Test robustness of prompting", "Zero-Shot / Chain-of-Thought"),
    col("question_text", "Input Prompt", "The actual test vector", "'Punishment for Mob Lynching?'"),
    col("ground_truth", "BNS 2023 Provision", "The Gold Standard for grading", "Section 103(2) BNS"),
    col("trap_ref", "Adversarial Trigger", "Does it fall for the IPC bait?", "Mentioning 'Section 302 IPC'"),
    col("web_search", "RAG Usage Flag", "Did it cheat by searching online?", "TRUE / FALSE"),
    col("error_class", "Hallucination Type", "Taxonomy of failure", "ZOMBIE_ERROR (Repealed Law)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub name: &'static str,
    pub role: &'static str,
    pub tags: [&'static str; 2],
}

pub const TEAM: [Contributor; 4] = [
    Contributor {
        name: "Harshal Patel",
        role: "Lead Developer",
        tags: ["Full Stack", "AI Agents"],
    },
    Contributor {
        name: "Aniruddh Agrahari",
        role: "Legal Analyst",
        tags: ["IPC/BNS", "Research"],
    },
    Contributor {
        name: "Priya Karn",
        role: "Data Scientist",
        tags: ["Python", "Evaluation"],
    },
    Contributor {
        name: "Aryan",
        role: "UX Designer",
        tags: ["Framer", "UI/UX"],
    },
];

pub const FOOTER_CREDIT: &str = "Built with React & Tailwind for University Project";
pub const FOOTER_COPYRIGHT: &str = "\u{a9} 2026 IndoLegal-100 Research Group. All rights reserved.";
