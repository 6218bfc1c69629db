//! Static NSW Science 7-10 (2023) reference data: the topic catalogue and the
//! full NESA outcome table. Read-only; never persisted.

use crate::domain::{Difficulty, Topic};

/// All browsable topics, Stage 4 first. Ids double as URL/query values.
pub const TOPICS: &[Topic] = &[
    // Stage 4 (Years 7-8)
    Topic {
        id: "observing-universe",
        title: "Observing the Universe",
        description: "Explore how scientific observations increase knowledge of the Universe",
        stage: 4,
        difficulty: Difficulty::Beginner,
        outcomes: &["SC4-OTU-01", "SC4-WS-01", "SC4-WS-02"],
    },
    Topic {
        id: "forces",
        title: "Forces",
        description: "Describe contact and non-contact forces, force diagrams and simple machines",
        stage: 4,
        difficulty: Difficulty::Intermediate,
        outcomes: &["SC4-FOR-01", "SC4-WS-03", "SC4-WS-05"],
    },
    Topic {
        id: "cells-classification",
        title: "Cells and Classification",
        description: "Cell structures and classification of organisms using scientific conventions",
        stage: 4,
        difficulty: Difficulty::Beginner,
        outcomes: &["SC4-CLS-01", "SC4-WS-01", "SC4-WS-06"],
    },
    Topic {
        id: "solutions-mixtures",
        title: "Solutions and Mixtures",
        description: "Properties of substances and separation techniques",
        stage: 4,
        difficulty: Difficulty::Beginner,
        outcomes: &["SC4-SOL-01", "SC4-WS-02", "SC4-WS-04"],
    },
    Topic {
        id: "living-systems",
        title: "Living Systems",
        description: "Body systems, plant systems and ecosystems",
        stage: 4,
        difficulty: Difficulty::Intermediate,
        outcomes: &["SC4-LIV-01", "SC4-WS-03", "SC4-WS-04"],
    },
    Topic {
        id: "periodic-table",
        title: "Periodic Table & Atomic Structure",
        description: "Elements, compounds and atomic models",
        stage: 4,
        difficulty: Difficulty::Intermediate,
        outcomes: &["SC4-PRT-01", "SC4-WS-01", "SC4-WS-07"],
    },
    Topic {
        id: "change",
        title: "Change",
        description: "Energy causes geological and chemical change",
        stage: 4,
        difficulty: Difficulty::Intermediate,
        outcomes: &["SC4-CHG-01", "SC4-WS-04", "SC4-WS-05"],
    },
    Topic {
        id: "data-science-1",
        title: "Data Science 1",
        description: "Using data to model and predict phenomena",
        stage: 4,
        difficulty: Difficulty::Beginner,
        outcomes: &["SC4-DA1-01", "SC4-WS-04", "SC4-WS-07"],
    },
    // Stage 5 (Years 9-10)
    Topic {
        id: "energy",
        title: "Energy",
        description: "Energy sources, conservation of energy and electrical circuits",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-EGY-01", "SC5-WS-04", "SC5-WS-06"],
    },
    Topic {
        id: "disease",
        title: "Disease",
        description: "Causes of disease, prevention and management",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-DIS-01", "SC5-WS-04", "SC5-WS-06"],
    },
    Topic {
        id: "materials",
        title: "Materials",
        description: "Chemical properties, bonding and polymers",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-MAT-01", "SC5-WS-02", "SC5-WS-03"],
    },
    Topic {
        id: "environmental-sustainability",
        title: "Environmental Sustainability",
        description: "Climate science, human impacts and recycling",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-ENV-01", "SC5-WS-05", "SC5-WS-06"],
    },
    Topic {
        id: "genetics",
        title: "Genetics & Evolutionary Change",
        description: "DNA, inheritance and natural selection",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-GEV-01", "SC5-GEV-02", "SC5-WS-05"],
    },
    Topic {
        id: "reactions",
        title: "Reactions",
        description: "Conservation of mass, chemical and nuclear reactions",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-RXN-01", "SC5-RXN-02", "SC5-WS-03"],
    },
    Topic {
        id: "waves-motion",
        title: "Waves and Motion",
        description: "Wave properties, sound, light and Newton's laws",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-WAM-01", "SC5-WAM-02", "SC5-WS-04"],
    },
    Topic {
        id: "data-science-2",
        title: "Data Science 2",
        description: "Scientific claims, large datasets and statistical analysis",
        stage: 5,
        difficulty: Difficulty::Advanced,
        outcomes: &["SC5-DA2-01", "SC5-WS-05", "SC5-WS-07"],
    },
];

/// NESA outcome table: (code, name). Order is Stage 4 then Stage 5,
/// Working Scientifically before content focus areas.
pub const NESA_OUTCOMES: &[(&str, &str)] = &[
    // Stage 4 Working Scientifically
    ("SC4-WS-01", "Questioning and predicting"),
    ("SC4-WS-02", "Planning investigations"),
    ("SC4-WS-03", "Conducting investigations"),
    ("SC4-WS-04", "Processing data and information"),
    ("SC4-WS-05", "Analysing data and information"),
    ("SC4-WS-06", "Problem-solving"),
    ("SC4-WS-07", "Communicating"),
    ("SC4-WS-08", "Working collaboratively"),
    // Stage 4 content
    ("SC4-OTU-01", "Observing the Universe"),
    ("SC4-FOR-01", "Forces"),
    ("SC4-CLS-01", "Cells and Classification"),
    ("SC4-SOL-01", "Solutions and Mixtures"),
    ("SC4-LIV-01", "Living Systems"),
    ("SC4-PRT-01", "Periodic Table and Atomic Structure"),
    ("SC4-CHG-01", "Change"),
    ("SC4-DA1-01", "Data Science 1"),
    // Stage 5 Working Scientifically
    ("SC5-WS-01", "Questioning and predicting"),
    ("SC5-WS-02", "Planning investigations"),
    ("SC5-WS-03", "Conducting investigations"),
    ("SC5-WS-04", "Processing data and information"),
    ("SC5-WS-05", "Analysing data and information"),
    ("SC5-WS-06", "Problem-solving"),
    ("SC5-WS-07", "Communicating"),
    ("SC5-WS-08", "Working collaboratively"),
    // Stage 5 content
    ("SC5-EGY-01", "Energy"),
    ("SC5-DIS-01", "Disease"),
    ("SC5-MAT-01", "Materials"),
    ("SC5-ENV-01", "Environmental Sustainability"),
    ("SC5-GEV-01", "Genetics and Evolutionary Change 1"),
    ("SC5-GEV-02", "Genetics and Evolutionary Change 2"),
    ("SC5-RXN-01", "Reactions 1"),
    ("SC5-RXN-02", "Reactions 2"),
    ("SC5-WAM-01", "Waves and Motion 1"),
    ("SC5-WAM-02", "Waves and Motion 2"),
    ("SC5-DA2-01", "Data Science 2"),
];

/// Look up a topic by id.
pub fn topic_by_id(id: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.id == id)
}

/// "Stage 4 (Years 7-8)" / "Stage 5 (Years 9-10)" label used in prompts.
pub fn stage_label(stage: u8) -> String {
    let years = if stage == 4 { "7-8" } else { "9-10" };
    format!("Stage {} (Years {})", stage, years)
}
