//! Health tips catalogue
//!
//! The tips are bundled with the application and never stored remotely.

use serde::{Deserialize, Serialize};

/// Category of a health tip
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TipCategory {
    Nutrition,
    Fitness,
    Sleep,
    MentalHealth,
    Hydration,
    Prevention,
}

impl TipCategory {
    /// Get all categories for iteration
    pub fn all() -> &'static [TipCategory] {
        &[
            TipCategory::Nutrition,
            TipCategory::Fitness,
            TipCategory::Sleep,
            TipCategory::MentalHealth,
            TipCategory::Hydration,
            TipCategory::Prevention,
        ]
    }

    /// Tag used in markup and on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            TipCategory::Nutrition => "nutrition",
            TipCategory::Fitness => "fitness",
            TipCategory::Sleep => "sleep",
            TipCategory::MentalHealth => "mental-health",
            TipCategory::Hydration => "hydration",
            TipCategory::Prevention => "prevention",
        }
    }

    /// Label shown on the tip card
    pub fn label(&self) -> String {
        self.slug().replace('-', " ")
    }
}

impl std::fmt::Display for TipCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Which tips to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipFilter {
    All,
    Category(TipCategory),
}

impl TipFilter {
    pub fn matches(&self, tip: &HealthTip) -> bool {
        match self {
            TipFilter::All => true,
            TipFilter::Category(category) => tip.category == *category,
        }
    }
}

impl std::str::FromStr for TipFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(TipFilter::All);
        }
        TipCategory::all()
            .iter()
            .copied()
            .find(|category| category.slug() == s)
            .map(TipFilter::Category)
            .ok_or_else(|| format!("unknown tip category: {}", s))
    }
}

/// A single health tip
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthTip {
    pub id: u32,
    pub category: TipCategory,
    pub glyph: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

static HEALTH_TIPS: [HealthTip; 10] = [
    HealthTip {
        id: 1,
        category: TipCategory::Nutrition,
        glyph: "🥗",
        title: "Balanced Eating Habits",
        body: "Incorporate whole grains, lean proteins, and a variety of colourful vegetables into every meal for sustained energy and long-term wellbeing.",
    },
    HealthTip {
        id: 2,
        category: TipCategory::Fitness,
        glyph: "🏃",
        title: "30-Minute Daily Movement",
        body: "Just 30 minutes of moderate exercise daily can reduce heart disease risk by up to 35%, improve mood, and boost energy levels significantly.",
    },
    HealthTip {
        id: 3,
        category: TipCategory::Sleep,
        glyph: "😴",
        title: "Quality Sleep Matters",
        body: "Aim for 7–9 hours of quality sleep each night. Maintain a consistent schedule and limit blue light exposure before bed for better rest.",
    },
    HealthTip {
        id: 4,
        category: TipCategory::MentalHealth,
        glyph: "🧘",
        title: "Mindfulness & Meditation",
        body: "Practising mindfulness for just 10 minutes a day can reduce stress hormones, improve focus, and enhance your overall emotional wellbeing.",
    },
    HealthTip {
        id: 5,
        category: TipCategory::Hydration,
        glyph: "💧",
        title: "Stay Hydrated Daily",
        body: "Drink at least 2 litres of water per day. Proper hydration supports digestion, clear skin, cognitive function, and physical performance.",
    },
    HealthTip {
        id: 6,
        category: TipCategory::Prevention,
        glyph: "🩺",
        title: "Regular Health Check-ups",
        body: "Schedule routine check-ups every 6–12 months. Early detection is the most effective strategy for preventing and managing health conditions.",
    },
    HealthTip {
        id: 7,
        category: TipCategory::Nutrition,
        glyph: "🍎",
        title: "Reduce Processed Sugar",
        body: "Cutting back on processed sugars can lower inflammation, improve dental health, stabilise energy levels, and reduce the risk of type 2 diabetes.",
    },
    HealthTip {
        id: 8,
        category: TipCategory::Fitness,
        glyph: "🚶",
        title: "Walk After Meals",
        body: "A short 10–15 minute walk after eating aids digestion, helps regulate blood sugar levels, and contributes to your daily movement goals.",
    },
    HealthTip {
        id: 9,
        category: TipCategory::Sleep,
        glyph: "🌙",
        title: "Create a Sleep Routine",
        body: "Establish a calming pre-sleep routine: dim the lights, avoid caffeine after 2pm, and keep your bedroom cool and quiet for optimal rest.",
    },
    HealthTip {
        id: 10,
        category: TipCategory::MentalHealth,
        glyph: "📝",
        title: "Journaling for Wellbeing",
        body: "Writing down thoughts and feelings for just 5 minutes daily can improve mental clarity, reduce anxiety, and help process emotions constructively.",
    },
];

/// The full catalogue in display order
pub fn health_tips() -> &'static [HealthTip] {
    &HEALTH_TIPS
}

/// Tips matching `filter`, in catalogue order
pub fn filter_tips(filter: TipFilter) -> Vec<&'static HealthTip> {
    health_tips().iter().filter(|tip| filter.matches(tip)).collect()
}
