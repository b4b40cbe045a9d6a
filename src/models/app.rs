use super::{Category, DeclaredCategory, PreferenceRecord};
use serde::Serialize;

/// An installed, launchable app as seen in one recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRecord {
    pub package_id: String,
    pub label: String,
    pub icon: Option<String>,
    pub declared_category: Option<DeclaredCategory>,
    pub is_system: bool,
    /// Foreground time in the trailing usage window, in milliseconds.
    pub usage_ms: u64,
    /// Unix millis of the last foreground use, if known.
    pub last_used: Option<i64>,
}

/// An app after persisted preferences have been overlaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveApp {
    #[serde(flatten)]
    pub app: AppRecord,
    pub category: Category,
    pub locked: bool,
    pub pinned: bool,
    pub force_color: bool,
}

impl EffectiveApp {
    /// Overlay `pref` on `app`. Returns `None` when the app is hidden.
    pub fn resolve(app: AppRecord, default_category: Category, pref: Option<&PreferenceRecord>) -> Option<Self> {
        let Some(pref) = pref else {
            return Some(Self {
                app,
                category: default_category,
                locked: false,
                pinned: false,
                force_color: false,
            });
        };

        if pref.hidden {
            return None;
        }

        Some(Self {
            app,
            category: pref.category_override.unwrap_or(default_category),
            locked: pref.locked,
            pinned: pref.pinned,
            force_color: pref.force_color,
        })
    }

    pub fn package_id(&self) -> &str {
        &self.app.package_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(package_id: &str) -> AppRecord {
        AppRecord {
            package_id: package_id.to_string(),
            label: "Label".to_string(),
            icon: None,
            declared_category: None,
            is_system: false,
            usage_ms: 0,
            last_used: None,
        }
    }

    #[test]
    fn test_resolve_without_preference_uses_defaults() {
        let effective = EffectiveApp::resolve(app("com.a"), Category::Music, None).unwrap();
        assert_eq!(effective.category, Category::Music);
        assert!(!effective.locked && !effective.pinned && !effective.force_color);
    }

    #[test]
    fn test_resolve_applies_override_and_flags() {
        let mut pref = PreferenceRecord::new("com.a");
        pref.category_override = Some(Category::Tools);
        pref.locked = true;
        pref.force_color = true;

        let effective = EffectiveApp::resolve(app("com.a"), Category::Music, Some(&pref)).unwrap();
        assert_eq!(effective.category, Category::Tools);
        assert!(effective.locked);
        assert!(effective.force_color);
        assert!(!effective.pinned);
    }

    #[test]
    fn test_resolve_keeps_default_when_override_absent() {
        let mut pref = PreferenceRecord::new("com.a");
        pref.pinned = true;

        let effective = EffectiveApp::resolve(app("com.a"), Category::News, Some(&pref)).unwrap();
        assert_eq!(effective.category, Category::News);
        assert!(effective.pinned);
    }

    #[test]
    fn test_resolve_drops_hidden() {
        let mut pref = PreferenceRecord::new("com.a");
        pref.hidden = true;
        pref.pinned = true;
        assert!(EffectiveApp::resolve(app("com.a"), Category::Other, Some(&pref)).is_none());
    }
}
