//! Lesson, badge and roadmap catalog
//!
//! The catalog is static configuration data. A built-in catalog ships with
//! the binary; a TOML file with the same shape can replace it.
//!
//! ```toml
//! [[lessons]]
//! id = 1
//! title = "The Headline"
//! # ...
//!
//! [[badges]]
//! id = "b1"
//! # ...
//! ```

use crate::models::{Badge, LeaderboardEntry, Lesson, RoadmapStage, RoadmapStatus};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Ordered lessons plus badge and roadmap records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub lessons: Vec<Lesson>,
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapStage>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Self {
        Self {
            lessons: builtin_lessons(),
            badges: builtin_badges(),
            roadmap: builtin_roadmap(),
        }
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            lessons = catalog.lessons.len(),
            badges = catalog.badges.len(),
            "Loaded lesson catalog"
        );
        Ok(catalog)
    }

    /// Check structural rules
    ///
    /// - at least one lesson
    /// - lesson and badge ids are unique
    /// - every badge reward names a known badge
    pub fn validate(&self) -> Result<()> {
        if self.lessons.is_empty() {
            return Err(Error::InvalidCatalog("catalog has no lessons".to_string()));
        }

        let mut lesson_ids = HashSet::new();
        for lesson in &self.lessons {
            if !lesson_ids.insert(lesson.id) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate lesson id {}",
                    lesson.id
                )));
            }
        }

        let mut badge_ids = HashSet::new();
        for badge in &self.badges {
            if !badge_ids.insert(badge.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate badge id {}",
                    badge.id
                )));
            }
        }

        for lesson in &self.lessons {
            if let Some(badge_id) = &lesson.badge_reward {
                if !badge_ids.contains(badge_id.as_str()) {
                    return Err(Error::InvalidCatalog(format!(
                        "lesson {} rewards unknown badge {}",
                        lesson.id, badge_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Lesson at `index` in catalog order
    pub fn lesson(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Position of the lesson with `id`
    pub fn position_of(&self, id: u32) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == id)
    }

    /// Whether `index` is the final lesson
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.lessons.len()
    }

    /// Badge with `id`
    pub fn badge(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Static leaderboard with the learner's row merged in, highest xp first
pub fn leaderboard(learner_xp: u32) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&str, u32, bool)> = vec![
        ("You", learner_xp, true),
        ("CodeNinja", 2400, false),
        ("ReactQueen", 1850, false),
        ("BugSlayer", 1200, false),
    ];
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, xp, me))| LeaderboardEntry {
            rank: i + 1,
            name: name.to_string(),
            xp,
            me,
        })
        .collect()
}

fn builtin_lessons() -> Vec<Lesson> {
    vec![
        Lesson {
            id: 1,
            title: "The Headline".to_string(),
            objective: "Create an <h1> tag with your name or nickname inside it.".to_string(),
            initial_code: "<!-- Delete this and start cooking! -->\n".to_string(),
            validation_criteria: "Code must contain a valid <h1> tag with some text content."
                .to_string(),
            validation_token: "<h1".to_string(),
            xp_reward: 100,
            badge_reward: Some("b1".to_string()),
            why: "The <h1> tag is the most important title on your page. Search engines use it \
                  to understand what your website is about."
                .to_string(),
        },
        Lesson {
            id: 2,
            title: "The Bio".to_string(),
            objective: "Add a <p> tag below the header to describe your vibe.".to_string(),
            initial_code: "<h1>My Vibe</h1>\n".to_string(),
            validation_criteria: "Code must contain a <p> tag with text, after the <h1>."
                .to_string(),
            validation_token: "<p".to_string(),
            xp_reward: 150,
            badge_reward: Some("b2".to_string()),
            why: "Paragraphs (<p>) organize your text so it's readable. Nobody likes reading a \
                  messy wall of text!"
                .to_string(),
        },
        Lesson {
            id: 3,
            title: "Interaction".to_string(),
            objective: "Add a <button> tag that says 'Click Me'.".to_string(),
            initial_code: "<h1>My Vibe</h1>\n<p>Just coding things.</p>\n".to_string(),
            validation_criteria: "Code must contain a <button> element with text content."
                .to_string(),
            validation_token: "<button".to_string(),
            xp_reward: 200,
            badge_reward: Some("b3".to_string()),
            why: "Buttons are how users take action: buying, subscribing, or liking. They turn \
                  a document into an app."
                .to_string(),
        },
    ]
}

fn builtin_badges() -> Vec<Badge> {
    let badge = |id: &str, name: &str, icon: &str, description: &str| Badge {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        unlocked: false,
    };

    vec![
        badge("b1", "HTML Rookie", "🐣", "Wrote your first tag"),
        badge("b2", "Tag Master", "🏷️", "Mastered the basics"),
        badge("b3", "Vibe Coder", "✨", "Completed Level 3"),
        badge("b4", "Full Stack Future", "🚀", "Ready for the big leagues"),
    ]
}

fn builtin_roadmap() -> Vec<RoadmapStage> {
    let stage = |id: &str,
                 title: &str,
                 description: &str,
                 duration: &str,
                 status: RoadmapStatus,
                 topics: &[&str]| RoadmapStage {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        duration: duration.to_string(),
        status,
        topics: topics.iter().map(|t| t.to_string()).collect(),
    };

    vec![
        stage(
            "html",
            "HTML: The Skeleton",
            "Structure your content so the world can see it.",
            "1 Week",
            RoadmapStatus::Active,
            &["Tags", "Forms", "SEO Basics"],
        ),
        stage(
            "css",
            "CSS: The Drip",
            "Make it look fire. Colors, layouts, animations.",
            "2 Weeks",
            RoadmapStatus::Locked,
            &["Flexbox", "Grid", "Responsive"],
        ),
        stage(
            "js",
            "JS: The Brains",
            "Make it interactive. Logic, data, and magic.",
            "3 Weeks",
            RoadmapStatus::Locked,
            &["Variables", "Functions", "DOM"],
        ),
        stage(
            "react",
            "React: The Power",
            "Build massive apps like a pro.",
            "4 Weeks",
            RoadmapStatus::Locked,
            &["Components", "Hooks", "State"],
        ),
        stage(
            "backend",
            "Backend: The Soul",
            "Databases, servers, and real user data.",
            "4 Weeks",
            RoadmapStatus::Locked,
            &["Node.js", "SQL", "API"],
        ),
    ]
}
