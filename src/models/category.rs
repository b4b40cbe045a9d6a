use serde::{Deserialize, Serialize};

/// Drawer category. Every app resolves to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Productivity,
    Social,
    Entertainment,
    Utilities,
    Finance,
    Health,
    Shopping,
    Communication,
    Travel,
    Education,
    Photography,
    Music,
    News,
    Tools,
    Other,
}

impl Category {
    /// All members in declaration order, which is also drawer group order.
    pub const ALL: [Category; 15] = [
        Category::Productivity,
        Category::Social,
        Category::Entertainment,
        Category::Utilities,
        Category::Finance,
        Category::Health,
        Category::Shopping,
        Category::Communication,
        Category::Travel,
        Category::Education,
        Category::Photography,
        Category::Music,
        Category::News,
        Category::Tools,
        Category::Other,
    ];

    /// Storage key, as written to the `app_preferences.category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Productivity => "PRODUCTIVITY",
            Category::Social => "SOCIAL",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Utilities => "UTILITIES",
            Category::Finance => "FINANCE",
            Category::Health => "HEALTH",
            Category::Shopping => "SHOPPING",
            Category::Communication => "COMMUNICATION",
            Category::Travel => "TRAVEL",
            Category::Education => "EDUCATION",
            Category::Photography => "PHOTOGRAPHY",
            Category::Music => "MUSIC",
            Category::News => "NEWS",
            Category::Tools => "TOOLS",
            Category::Other => "OTHER",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Productivity => "Productivity",
            Category::Social => "Social",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Finance => "Finance",
            Category::Health => "Health",
            Category::Shopping => "Shopping",
            Category::Communication => "Communication",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Photography => "Photography",
            Category::Music => "Music",
            Category::News => "News",
            Category::Tools => "Tools",
            Category::Other => "Other",
        }
    }

    /// Parse a storage key or display name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

/// Category hint a package may declare in its manifest.
///
/// Codes follow the platform's `ApplicationInfo.category` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredCategory {
    Undefined,
    Game,
    Audio,
    Video,
    Image,
    Social,
    News,
    Maps,
    Productivity,
    Accessibility,
}

impl DeclaredCategory {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Undefined),
            0 => Some(Self::Game),
            1 => Some(Self::Audio),
            2 => Some(Self::Video),
            3 => Some(Self::Image),
            4 => Some(Self::Social),
            5 => Some(Self::News),
            6 => Some(Self::Maps),
            7 => Some(Self::Productivity),
            8 => Some(Self::Accessibility),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Undefined => -1,
            Self::Game => 0,
            Self::Audio => 1,
            Self::Video => 2,
            Self::Image => 3,
            Self::Social => 4,
            Self::News => 5,
            Self::Maps => 6,
            Self::Productivity => 7,
            Self::Accessibility => 8,
        }
    }
}
