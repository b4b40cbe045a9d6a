use crate::models::{Category, DeclaredCategory};

/// Declared manifest categories that map directly onto a drawer category.
///
/// `Undefined` and `Accessibility` are absent on purpose: they fall through
/// to the package-name heuristics.
pub static DECLARED_CATEGORY_TABLE: &[(DeclaredCategory, Category)] = &[
    (DeclaredCategory::Game, Category::Entertainment),
    (DeclaredCategory::Audio, Category::Music),
    (DeclaredCategory::Video, Category::Entertainment),
    (DeclaredCategory::Image, Category::Photography),
    (DeclaredCategory::Social, Category::Social),
    (DeclaredCategory::News, Category::News),
    (DeclaredCategory::Maps, Category::Travel),
    (DeclaredCategory::Productivity, Category::Productivity),
];

/// A substring test against a lower-cased package identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Contains(&'static str),
    /// Matches `needle` only when `unless` is absent.
    ContainsUnless {
        needle: &'static str,
        unless: &'static str,
    },
}

impl Matcher {
    fn matches(self, package_lower: &str) -> bool {
        match self {
            Matcher::Contains(needle) => package_lower.contains(needle),
            Matcher::ContainsUnless { needle, unless } => {
                package_lower.contains(needle) && !package_lower.contains(unless)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeuristicRule {
    pub category: Category,
    pub matchers: &'static [Matcher],
}

impl HeuristicRule {
    fn matches(&self, package_lower: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(package_lower))
    }
}

use Matcher::Contains;

/// Fallback rule groups. Evaluated top to bottom; the first group with any
/// matching substring wins, so list order is the tie-break.
pub static HEURISTIC_RULES: &[HeuristicRule] = &[
    HeuristicRule {
        category: Category::Social,
        matchers: &[
            Contains("facebook"),
            Contains("instagram"),
            Contains("twitter"),
            Contains("snapchat"),
            Contains("tiktok"),
            Contains("linkedin"),
            Contains("reddit"),
            Contains("pinterest"),
            Contains("tumblr"),
            Contains("mastodon"),
        ],
    },
    HeuristicRule {
        category: Category::Communication,
        matchers: &[
            Contains("whatsapp"),
            Contains("telegram"),
            Contains("messenger"),
            Contains("signal"),
            Contains("viber"),
            Contains("skype"),
            Contains("discord"),
            Contains("slack"),
            Contains("zoom"),
            Contains("teams"),
            Contains("wechat"),
            Contains("messaging"),
            Contains("dialer"),
            Contains("contacts"),
        ],
    },
    HeuristicRule {
        category: Category::Productivity,
        matchers: &[
            Contains("docs"),
            Contains("sheets"),
            Contains("slides"),
            Contains("office"),
            Contains("notion"),
            Contains("evernote"),
            Contains("todoist"),
            Contains("calendar"),
            Contains("drive"),
            Contains("keep"),
            Contains("trello"),
            Contains("onenote"),
            Contains("asana"),
        ],
    },
    HeuristicRule {
        category: Category::Entertainment,
        matchers: &[
            Contains("netflix"),
            Contains("youtube"),
            Contains("hulu"),
            Contains("disney"),
            Contains("primevideo"),
            Contains("twitch"),
            Contains("hbo"),
            Contains("crunchyroll"),
            Contains("video"),
            Contains("game"),
        ],
    },
    HeuristicRule {
        category: Category::Music,
        matchers: &[
            Contains("spotify"),
            Contains("music"),
            Contains("soundcloud"),
            Contains("deezer"),
            Contains("pandora"),
            Contains("shazam"),
            Contains("audible"),
            Contains("podcast"),
            Contains("tidal"),
            Contains("radio"),
        ],
    },
    HeuristicRule {
        category: Category::Shopping,
        matchers: &[
            Matcher::ContainsUnless {
                needle: "amazon",
                unless: "video",
            },
            Contains("ebay"),
            Contains("etsy"),
            Contains("walmart"),
            Contains("aliexpress"),
            Contains("shein"),
            Contains("temu"),
            Contains("shop"),
        ],
    },
    HeuristicRule {
        category: Category::Finance,
        matchers: &[
            Contains("bank"),
            Contains("paypal"),
            Contains("venmo"),
            Contains("cashapp"),
            Contains("wallet"),
            Contains("finance"),
            Contains("coinbase"),
            Contains("robinhood"),
            Contains("revolut"),
            Contains("crypto"),
            Contains("invest"),
        ],
    },
    HeuristicRule {
        category: Category::Health,
        matchers: &[
            Contains("fitness"),
            Contains("health"),
            Contains("workout"),
            Contains("strava"),
            Contains("myfitnesspal"),
            Contains("headspace"),
            Contains("calm"),
            Contains("meditat"),
        ],
    },
    HeuristicRule {
        category: Category::Travel,
        matchers: &[
            Contains("maps"),
            Contains("uber"),
            Contains("lyft"),
            Contains("airbnb"),
            Contains("booking"),
            Contains("expedia"),
            Contains("tripadvisor"),
            Contains("travel"),
            Contains("waze"),
            Contains("flight"),
            Contains("transit"),
        ],
    },
    HeuristicRule {
        category: Category::Photography,
        matchers: &[
            Contains("camera"),
            Contains("photo"),
            Contains("gallery"),
            Contains("snapseed"),
            Contains("lightroom"),
            Contains("vsco"),
        ],
    },
    HeuristicRule {
        category: Category::News,
        matchers: &[
            Contains("news"),
            Contains("nytimes"),
            Contains("bbc"),
            Contains("cnn"),
            Contains("guardian"),
            Contains("reuters"),
            Contains("flipboard"),
        ],
    },
    HeuristicRule {
        category: Category::Education,
        matchers: &[
            Contains("duolingo"),
            Contains("khanacademy"),
            Contains("coursera"),
            Contains("udemy"),
            Contains("quizlet"),
            Contains("education"),
            Contains("classroom"),
            Contains("learn"),
        ],
    },
    HeuristicRule {
        category: Category::Communication,
        matchers: &[
            Contains("mail"),
            Contains("outlook"),
            Contains("inbox"),
        ],
    },
    HeuristicRule {
        category: Category::Utilities,
        matchers: &[
            Contains("browser"),
            Contains("chrome"),
            Contains("firefox"),
            Contains("opera"),
            Contains("brave"),
            Contains("duckduckgo"),
        ],
    },
];

/// Which step of the lookup produced a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Declared,
    /// Index into the rule list that matched.
    Heuristic(usize),
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<HeuristicRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::with_rules(HEURISTIC_RULES.to_vec())
    }
}

impl Categorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<HeuristicRule>) -> Self {
        Self { rules }
    }

    pub fn categorize(&self, package_id: &str, declared: Option<DeclaredCategory>) -> Category {
        self.classify(package_id, declared).0
    }

    /// Like [`Categorizer::categorize`], also reporting which step matched.
    pub fn classify(&self, package_id: &str, declared: Option<DeclaredCategory>) -> (Category, MatchSource) {
        if let Some(category) = declared.and_then(Self::declared_mapping) {
            return (category, MatchSource::Declared);
        }

        let package_lower = package_id.to_lowercase();
        self.rules
            .iter()
            .position(|rule| rule.matches(&package_lower))
            .and_then(|idx| self.rules.get(idx).map(|rule| (rule.category, MatchSource::Heuristic(idx))))
            .unwrap_or((Category::Other, MatchSource::Fallback))
    }

    fn declared_mapping(declared: DeclaredCategory) -> Option<Category> {
        DECLARED_CATEGORY_TABLE
            .iter()
            .find(|(code, _)| *code == declared)
            .map(|(_, category)| *category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_package_is_other() {
        let categorizer = Categorizer::new();
        assert_eq!(categorizer.categorize("com.example.unknownapp", None), Category::Other);
    }

    #[test]
    fn test_declared_category_wins_over_heuristics() {
        let categorizer = Categorizer::new();
        assert_eq!(
            categorizer.categorize("com.facebook.games", Some(DeclaredCategory::Productivity)),
            Category::Productivity
        );
    }

    #[test]
    fn test_declared_game_is_entertainment() {
        let categorizer = Categorizer::new();
        let (category, source) = categorizer.classify("com.example.game", Some(DeclaredCategory::Game));
        assert_eq!(category, Category::Entertainment);
        assert_eq!(source, MatchSource::Declared);
    }

    #[test]
    fn test_declared_table_mappings() {
        let categorizer = Categorizer::new();
        let cases = [
            (DeclaredCategory::Audio, Category::Music),
            (DeclaredCategory::Video, Category::Entertainment),
            (DeclaredCategory::Image, Category::Photography),
            (DeclaredCategory::Social, Category::Social),
            (DeclaredCategory::News, Category::News),
            (DeclaredCategory::Maps, Category::Travel),
        ];
        for (declared, expected) in cases {
            assert_eq!(categorizer.categorize("com.example.unknownapp", Some(declared)), expected);
        }
    }

    #[test]
    fn test_unmapped_declared_category_falls_through() {
        let categorizer = Categorizer::new();
        assert_eq!(
            categorizer.categorize("com.whatsapp", Some(DeclaredCategory::Accessibility)),
            Category::Communication
        );
        assert_eq!(
            categorizer.categorize("com.example.unknownapp", Some(DeclaredCategory::Undefined)),
            Category::Other
        );
    }

    #[test]
    fn test_heuristics_are_case_insensitive() {
        let categorizer = Categorizer::new();
        assert_eq!(categorizer.categorize("com.FACEBOOK.app", None), Category::Social);
        assert_eq!(categorizer.categorize("com.facebook.app", None), Category::Social);
    }

    #[test]
    fn test_whatsapp_is_communication() {
        let categorizer = Categorizer::new();
        assert_eq!(categorizer.categorize("com.whatsapp", None), Category::Communication);
    }

    #[test]
    fn test_earlier_group_wins_tie() {
        let categorizer = Categorizer::new();
        // Matches both Social ("facebook") and Entertainment ("game").
        assert_eq!(categorizer.categorize("com.facebook.games", None), Category::Social);
    }

    #[test]
    fn test_amazon_shopping_excludes_video() {
        let categorizer = Categorizer::new();
        assert_eq!(categorizer.categorize("com.amazon.mShop.android.shopping", None), Category::Shopping);
        assert_eq!(categorizer.categorize("com.amazon.avod.video", None), Category::Entertainment);
    }

    #[test]
    fn test_amazon_exclusion_in_isolation() {
        static SHOPPING_ONLY: &[HeuristicRule] = &[HeuristicRule {
            category: Category::Shopping,
            matchers: &[Matcher::ContainsUnless {
                needle: "amazon",
                unless: "video",
            }],
        }];
        let categorizer = Categorizer::with_rules(SHOPPING_ONLY.to_vec());
        assert_eq!(categorizer.categorize("com.amazon.store", None), Category::Shopping);
        assert_eq!(categorizer.categorize("com.amazon.video", None), Category::Other);
    }

    #[test]
    fn test_rule_order_is_the_tie_break() {
        static GAME_FIRST: &[HeuristicRule] = &[
            HeuristicRule {
                category: Category::Entertainment,
                matchers: &[Contains("game")],
            },
            HeuristicRule {
                category: Category::Shopping,
                matchers: &[Contains("play")],
            },
        ];
        let forward = Categorizer::with_rules(GAME_FIRST.to_vec());
        assert_eq!(forward.classify("com.playgames", None), (Category::Entertainment, MatchSource::Heuristic(0)));

        let mut reversed_rules = GAME_FIRST.to_vec();
        reversed_rules.reverse();
        let reversed = Categorizer::with_rules(reversed_rules);
        assert_eq!(reversed.classify("com.playgames", None), (Category::Shopping, MatchSource::Heuristic(0)));
    }

    #[test]
    fn test_second_communication_group_catches_mail() {
        let categorizer = Categorizer::new();
        let (category, source) = categorizer.classify("com.google.android.gmail", None);
        assert_eq!(category, Category::Communication);
        assert_eq!(source, MatchSource::Heuristic(12));
    }

    #[test]
    fn test_browsers_are_utilities() {
        let categorizer = Categorizer::new();
        assert_eq!(categorizer.categorize("com.android.chrome", None), Category::Utilities);
        assert_eq!(categorizer.categorize("org.mozilla.firefox", None), Category::Utilities);
    }

    #[test]
    fn test_every_input_resolves_to_a_member() {
        let categorizer = Categorizer::new();
        let inputs = ["", ".", "COM", "com.spotify.music", "org.videolan.vlc", "\u{00e9}t\u{00e9}"];
        for input in inputs {
            let category = categorizer.categorize(input, None);
            assert!(Category::ALL.contains(&category));
        }
    }

    #[test]
    fn test_empty_rule_list_always_falls_back() {
        let categorizer = Categorizer::with_rules(Vec::new());
        assert_eq!(categorizer.classify("com.whatsapp", None), (Category::Other, MatchSource::Fallback));
    }
}
