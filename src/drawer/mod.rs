pub mod service;

pub use service::{DrawerEvent, DrawerService, DrawerSubscription, PackageChangeKind, RefreshHandle};

use crate::categorizer::Categorizer;
use crate::config::DrawerConfig;
use crate::error::AppError;
use crate::models::{AppRecord, Category, EffectiveApp};
use crate::platform::{AppRegistry, UsageStatsSource};
use crate::store::PreferenceStore;
use crate::validation::validate_package_id;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// The drawer as of one recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawerSnapshot {
    /// Non-empty groups in category order, each sorted by label.
    pub groups: BTreeMap<Category, Vec<EffectiveApp>>,
    /// Pinned apps in label order, capped at the configured maximum.
    pub pinned: Vec<EffectiveApp>,
}

impl DrawerSnapshot {
    /// Every visible app in label order.
    pub fn apps(&self) -> Vec<&EffectiveApp> {
        let mut apps: Vec<&EffectiveApp> = self.groups.values().flatten().collect();
        apps.sort_by_cached_key(|a| sort_key(a));
        apps
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.groups
            .values()
            .flatten()
            .any(|a| a.package_id() == package_id)
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

fn sort_key(app: &EffectiveApp) -> (String, String) {
    (app.app.label.to_lowercase(), app.app.package_id.clone())
}

/// Merges the OS app list with persisted preferences.
pub struct AppDrawer {
    registry: Arc<dyn AppRegistry>,
    usage: Arc<dyn UsageStatsSource>,
    store: Arc<PreferenceStore>,
    categorizer: Categorizer,
    config: DrawerConfig,
}

impl AppDrawer {
    pub fn new(
        registry: Arc<dyn AppRegistry>,
        usage: Arc<dyn UsageStatsSource>,
        store: Arc<PreferenceStore>,
        config: DrawerConfig,
    ) -> Self {
        Self {
            registry,
            usage,
            store,
            categorizer: Categorizer::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.store
    }

    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    /// Full re-fetch and re-merge of the app list and preference set.
    pub fn compute(&self) -> Result<DrawerSnapshot, AppError> {
        let prefs = self.store.all()?;
        let installed = self.installed_apps()?;

        let mut visible: Vec<EffectiveApp> = installed
            .into_iter()
            .filter_map(|app| {
                let default_category = self.categorizer.categorize(&app.package_id, app.declared_category);
                let pref = prefs.get(&app.package_id);
                EffectiveApp::resolve(app, default_category, pref)
            })
            .collect();
        visible.sort_by_cached_key(sort_key);

        let pinned = visible
            .iter()
            .filter(|a| a.pinned)
            .take(self.config.max_pinned_apps)
            .cloned()
            .collect();

        let mut groups: BTreeMap<Category, Vec<EffectiveApp>> = BTreeMap::new();
        for app in visible {
            groups.entry(app.category).or_default().push(app);
        }

        Ok(DrawerSnapshot { groups, pinned })
    }

    /// Launchable apps enriched with usage. Entries that fail to resolve are
    /// dropped; a failed listing fails the whole compute.
    fn installed_apps(&self) -> Result<Vec<AppRecord>, AppError> {
        let packages = self.registry.launchable_packages()?;
        let usage = self.usage.usage_in_window(self.config.usage_window);

        let mut seen = HashSet::new();
        let apps = packages
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| match self.registry.app_info(id) {
                Ok(info) => {
                    let summary = usage.get(id).copied().unwrap_or_default();
                    Some(AppRecord {
                        package_id: info.package_id,
                        label: info.label,
                        icon: info.icon,
                        declared_category: info.declared_category,
                        is_system: info.is_system,
                        usage_ms: summary.foreground_ms,
                        last_used: summary.last_used,
                    })
                }
                Err(e) => {
                    debug!("Dropping {id} from drawer: {e}");
                    None
                }
            })
            .collect();
        Ok(apps)
    }

    /// Set or clear (`None`) the category override.
    pub fn set_category(&self, package_id: &str, category: Option<Category>) -> Result<(), AppError> {
        let package_id = validate_package_id(package_id)?;
        self.store.update(package_id, |r| r.category_override = category)?;
        Ok(())
    }

    pub fn set_hidden(&self, package_id: &str, hidden: bool) -> Result<(), AppError> {
        let package_id = validate_package_id(package_id)?;
        self.store.update(package_id, |r| r.hidden = hidden)?;
        Ok(())
    }

    pub fn set_locked(&self, package_id: &str, locked: bool) -> Result<(), AppError> {
        let package_id = validate_package_id(package_id)?;
        self.store.update(package_id, |r| r.locked = locked)?;
        Ok(())
    }

    pub fn set_pinned(&self, package_id: &str, pinned: bool) -> Result<(), AppError> {
        let package_id = validate_package_id(package_id)?;
        self.store.update(package_id, |r| r.pinned = pinned)?;
        Ok(())
    }

    pub fn set_force_color(&self, package_id: &str, force_color: bool) -> Result<(), AppError> {
        let package_id = validate_package_id(package_id)?;
        self.store.update(package_id, |r| r.force_color = force_color)?;
        Ok(())
    }

    /// Launch an app. A locked app is only started when `authorized` is set.
    pub fn launch(&self, package_id: &str, authorized: bool) -> Result<bool, AppError> {
        let package_id = validate_package_id(package_id)?;
        let locked = self.store.get(package_id)?.is_some_and(|r| r.locked);
        if locked && !authorized {
            return Err(AppError::Locked {
                package: package_id.to_string(),
            });
        }

        let launched = self.registry.launch(package_id);
        if launched {
            info!("Launched {package_id}");
        } else {
            warn!("Launch of {package_id} was not accepted");
        }
        Ok(launched)
    }

    /// Delete preference records for packages the registry no longer lists.
    ///
    /// Never runs implicitly. Requires a successful full listing so that a
    /// transient registry failure cannot wipe customizations.
    pub fn prune_orphaned_preferences(&self) -> Result<usize, AppError> {
        let keep: HashSet<String> = self.registry.launchable_packages()?.into_iter().collect();
        self.store.prune(&keep)
    }
}
