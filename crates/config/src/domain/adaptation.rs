//! Personalization tables: tips and follow-up suggestions

use serde::{Deserialize, Serialize};

use super::vocabulary::{lookup, NamedTerms};
use super::{strings, LevelTable};

/// A single piece of text keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedText {
    pub name: String,
    pub text: String,
}

/// Tables driving answer personalization and the tips catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Short tip appended to answers for a favorite tool
    pub tool_tips: Vec<NamedText>,
    /// Next-step tip appended to answers for each level
    pub level_tips: LevelTable<String>,
    /// Search suggestions per interest
    pub interest_suggestions: Vec<NamedTerms>,
    /// Search suggestions per favorite tool
    pub tool_suggestions: Vec<NamedTerms>,
    /// Tips catalog per level
    pub level_tip_catalog: LevelTable<Vec<String>>,
    /// Tips catalog per tool
    pub tool_tip_catalog: Vec<NamedTerms>,
    /// Tips catalog per interest
    pub interest_tip_catalog: Vec<NamedTerms>,
    /// Used when the profile yields fewer than three tips
    pub general_tips: Vec<String>,
    /// Closing tip appended to every generated answer
    pub closing_tip: String,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        let text = |name: &str, text: &str| NamedText {
            name: name.to_string(),
            text: text.to_string(),
        };
        let terms = |name: &str, terms: &[&str]| NamedTerms {
            name: name.to_string(),
            terms: strings(terms),
        };

        Self {
            tool_tips: vec![
                text("Figma", "💡 **Figma tip:** Use Auto Layout for responsive components"),
                text("Sketch", "💡 **Sketch tip:** Organize with Symbols and shared Libraries"),
                text(
                    "Adobe XD",
                    "💡 **Adobe XD tip:** Use Voice Prototyping for conversational UX",
                ),
            ],
            level_tips: LevelTable {
                beginner: "🌱 **Next step:** Practice with small projects and ask for feedback often".to_string(),
                intermediate: "🚀 **Recommendation:** Consider building a personal design system to consolidate what you know".to_string(),
                expert: "⭐ **Challenge:** Mentor other designers and contribute to the community".to_string(),
            },
            interest_suggestions: vec![
                terms(
                    "UX Research",
                    &["user interviews", "usability testing", "personas", "journey mapping"],
                ),
                terms(
                    "UI Design",
                    &["design patterns", "components library", "color theory", "typography"],
                ),
                terms(
                    "Design Systems",
                    &["atomic design", "design tokens", "style guide", "component library"],
                ),
                terms(
                    "Prototyping",
                    &["interaction design", "micro animations", "user flow", "wireframing"],
                ),
            ],
            tool_suggestions: vec![
                terms("Figma", &["figma components", "figma auto layout", "figma plugins"]),
                terms("Sketch", &["sketch symbols", "sketch libraries", "sketch plugins"]),
                terms("Adobe XD", &["xd prototyping", "xd voice design", "xd collaboration"]),
            ],
            level_tip_catalog: LevelTable {
                beginner: strings(&[
                    "🌱 **For beginners:** Start with UX/UI fundamentals",
                    "📚 Study the basic principles of visual design",
                    "👥 Learn user research step by step",
                    "🎨 Get comfortable with tools like Figma",
                    "📱 Practice with small projects and get feedback",
                ]),
                intermediate: strings(&[
                    "🚀 **For intermediates:** Go deeper into specific methodologies",
                    "📊 Learn to measure and validate your designs",
                    "🎯 Build your first personal design system",
                    "🔄 Master iteration and prototyping processes",
                    "💼 Build a solid portfolio with case studies",
                ]),
                expert: strings(&[
                    "⭐ **For experts:** Focus on leadership and strategy",
                    "📈 Connect design with business metrics",
                    "👥 Mentor other designers",
                    "🏗️ Design scalable systems and architectures",
                    "🌍 Contribute to the design community",
                ]),
            },
            tool_tip_catalog: vec![
                terms(
                    "Figma",
                    &[
                        "💡 **Figma:** Use Auto Layout for responsive components",
                        "🔧 Set up design tokens for consistency",
                        "📚 Create shared libraries for your team",
                        "🎨 Use plugins to automate repetitive tasks",
                    ],
                ),
                terms(
                    "Sketch",
                    &[
                        "💡 **Sketch:** Organize with Symbols and Libraries",
                        "🔄 Use Sketch Cloud for collaboration",
                        "📐 Set up consistent grids and guides",
                        "🎨 Explore plugins for advanced features",
                    ],
                ),
                terms(
                    "Adobe XD",
                    &[
                        "💡 **Adobe XD:** Take advantage of Voice Prototyping",
                        "🔗 Use components for systematic design",
                        "📱 Prototype mobile flows with advanced gestures",
                        "☁️ Collaborate in real time with Creative Cloud",
                    ],
                ),
            ],
            interest_tip_catalog: vec![
                terms(
                    "UX Research",
                    &[
                        "🔬 **UX Research:** Combine qualitative and quantitative methods",
                        "👥 Interview users regularly",
                        "📊 Validate hypotheses with A/B tests",
                        "📝 Document insights systematically",
                    ],
                ),
                terms(
                    "Design Systems",
                    &[
                        "🎯 **Design Systems:** Start with atomic design",
                        "📏 Define tokens before components",
                        "📚 Document patterns and decisions",
                        "🔄 Iterate based on team feedback",
                    ],
                ),
            ],
            general_tips: strings(&[
                "💫 **General:** Constant practice is key in design",
                "🔍 **Explore:** Use search to discover new resources",
            ]),
            closing_tip: "💡 **Professional tip:** Always validate your design decisions with real users and usability data.".to_string(),
        }
    }
}

impl AdaptationConfig {
    pub fn tool_tip(&self, tool: &str) -> Option<&str> {
        self.tool_tips
            .iter()
            .find(|t| t.name == tool)
            .map(|t| t.text.as_str())
    }

    pub fn interest_suggestions_of(&self, interest: &str) -> Option<&[String]> {
        lookup(&self.interest_suggestions, interest)
    }

    pub fn tool_suggestions_of(&self, tool: &str) -> Option<&[String]> {
        lookup(&self.tool_suggestions, tool)
    }

    pub fn tool_tip_catalog_of(&self, tool: &str) -> Option<&[String]> {
        lookup(&self.tool_tip_catalog, tool)
    }

    pub fn interest_tip_catalog_of(&self, interest: &str) -> Option<&[String]> {
        lookup(&self.interest_tip_catalog, interest)
    }
}
