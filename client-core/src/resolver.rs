use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::context::{AppContext, Surface, UnionId};
use crate::error::ClientError;

/// One union the caller belongs to, in server query order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnionSummary {
    pub id: UnionId,
    pub name: String,
}

/// Server-side membership lookup: every union whose member set contains the
/// given identity.
#[async_trait]
pub trait MembershipDirectory {
    async fn unions_for(&self, user_id: Uuid) -> Result<Vec<UnionSummary>, ClientError>;
}

/// Durable local preference for the active union (device-local storage).
pub trait PreferenceStore {
    fn load_active_union(&self) -> Option<UnionId>;
    fn store_active_union(&mut self, id: &UnionId);
}

/// Navigation the shell must perform after a resolver pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    ToOnboarding,
    ToDashboardRoot,
}

/// Side effects of an explicit union switch, returned as data for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEffect {
    RefreshAllData,
    Navigate(Navigation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOutcome {
    pub memberships: Vec<UnionSummary>,
    pub navigation: Option<Navigation>,
}

pub struct MembershipResolver;

impl MembershipResolver {
    /// Run once the identity is known (app load, or after auth completes).
    ///
    /// Selection policy: the persisted preference wins if it is still in the
    /// membership set; otherwise the first result in query order is selected
    /// and the stale preference is overwritten. Zero memberships route to
    /// onboarding, unless the shell is already there (no redirect loop).
    /// A fetch error is logged and resolves to "no union selected".
    pub async fn resolve<D, P>(
        directory: &D,
        prefs: &mut P,
        ctx: &mut AppContext,
    ) -> ResolveOutcome
    where
        D: MembershipDirectory + Sync,
        P: PreferenceStore,
    {
        let memberships = match directory.unions_for(ctx.identity.user_id).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "membership fetch failed; no union selected");
                ctx.active_union = None;
                return ResolveOutcome {
                    memberships: Vec::new(),
                    navigation: None,
                };
            }
        };

        if memberships.is_empty() {
            ctx.active_union = None;
            let navigation = if ctx.surface == Surface::Onboarding {
                None
            } else {
                Some(Navigation::ToOnboarding)
            };
            return ResolveOutcome {
                memberships,
                navigation,
            };
        }

        let preferred = prefs.load_active_union();
        let selected = preferred
            .as_ref()
            .and_then(|id| memberships.iter().find(|u| &u.id == id))
            .unwrap_or(&memberships[0]);

        // Overwrite a stale preference so the next load agrees with this one.
        if preferred.as_ref() != Some(&selected.id) {
            prefs.store_active_union(&selected.id);
        }
        ctx.active_union = Some(selected.id.clone());

        ResolveOutcome {
            memberships,
            navigation: None,
        }
    }

    /// Explicit user action: switch the active union.
    ///
    /// The target must be in the known membership set. On success the new
    /// preference is persisted and the shell is told to drop every cache and
    /// navigate back to the dashboard root.
    pub fn switch_union<P>(
        target: &UnionId,
        memberships: &[UnionSummary],
        prefs: &mut P,
        ctx: &mut AppContext,
    ) -> Result<Vec<SwitchEffect>, ClientError>
    where
        P: PreferenceStore,
    {
        if !memberships.iter().any(|u| &u.id == target) {
            return Err(ClientError::UnknownUnion(target.to_string()));
        }

        prefs.store_active_union(target);
        ctx.active_union = Some(target.clone());

        Ok(vec![
            SwitchEffect::RefreshAllData,
            SwitchEffect::Navigate(Navigation::ToDashboardRoot),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Identity;
    use std::collections::HashMap;

    struct FakeDirectory {
        result: Result<Vec<UnionSummary>, String>,
    }

    #[async_trait]
    impl MembershipDirectory for FakeDirectory {
        async fn unions_for(&self, _user_id: Uuid) -> Result<Vec<UnionSummary>, ClientError> {
            self.result
                .clone()
                .map_err(ClientError::Directory)
        }
    }

    #[derive(Default)]
    struct MemoryPrefs {
        map: HashMap<&'static str, UnionId>,
    }

    impl PreferenceStore for MemoryPrefs {
        fn load_active_union(&self) -> Option<UnionId> {
            self.map.get("active").cloned()
        }
        fn store_active_union(&mut self, id: &UnionId) {
            self.map.insert("active", id.clone());
        }
    }

    fn ctx() -> AppContext {
        AppContext::start(Identity {
            user_id: Uuid::new_v4(),
            display_name: "U1".into(),
        })
    }

    fn summaries(ids: &[&str]) -> Vec<UnionSummary> {
        ids.iter()
            .map(|id| UnionSummary {
                id: UnionId::new(*id),
                name: id.to_uppercase(),
            })
            .collect()
    }

    #[tokio::test]
    async fn stale_preference_falls_back_to_first_and_overwrites() {
        let directory = FakeDirectory {
            result: Ok(summaries(&["org-A", "org-B"])),
        };
        let mut prefs = MemoryPrefs::default();
        prefs.store_active_union(&UnionId::new("org-stale"));
        let mut ctx = ctx();

        let outcome = MembershipResolver::resolve(&directory, &mut prefs, &mut ctx).await;

        assert_eq!(ctx.active_union, Some(UnionId::new("org-A")));
        assert_eq!(prefs.load_active_union(), Some(UnionId::new("org-A")));
        assert!(outcome.navigation.is_none());
    }

    #[tokio::test]
    async fn persisted_preference_wins_when_still_member() {
        let directory = FakeDirectory {
            result: Ok(summaries(&["org-A", "org-B"])),
        };
        let mut prefs = MemoryPrefs::default();
        prefs.store_active_union(&UnionId::new("org-B"));
        let mut ctx = ctx();

        MembershipResolver::resolve(&directory, &mut prefs, &mut ctx).await;

        assert_eq!(ctx.active_union, Some(UnionId::new("org-B")));
    }

    #[tokio::test]
    async fn zero_memberships_route_to_onboarding_without_looping() {
        let directory = FakeDirectory { result: Ok(vec![]) };
        let mut prefs = MemoryPrefs::default();
        let mut ctx = ctx();

        let outcome = MembershipResolver::resolve(&directory, &mut prefs, &mut ctx).await;
        assert_eq!(outcome.navigation, Some(Navigation::ToOnboarding));

        // Second pass while already on the onboarding surface: no redirect.
        ctx.set_surface(Surface::Onboarding);
        let outcome = MembershipResolver::resolve(&directory, &mut prefs, &mut ctx).await;
        assert_eq!(outcome.navigation, None);
    }

    #[tokio::test]
    async fn fetch_error_means_no_selection_not_a_panic() {
        let directory = FakeDirectory {
            result: Err("503 from directory".into()),
        };
        let mut prefs = MemoryPrefs::default();
        let mut ctx = ctx();

        let outcome = MembershipResolver::resolve(&directory, &mut prefs, &mut ctx).await;

        assert!(ctx.active_union.is_none());
        assert!(outcome.memberships.is_empty());
        assert!(outcome.navigation.is_none());
    }

    #[test]
    fn switch_rejects_unknown_target() {
        let memberships = summaries(&["org-A"]);
        let mut prefs = MemoryPrefs::default();
        let mut ctx = ctx();

        let err = MembershipResolver::switch_union(
            &UnionId::new("org-Z"),
            &memberships,
            &mut prefs,
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::UnknownUnion(_)));
        assert!(ctx.active_union.is_none());
    }

    #[test]
    fn switch_persists_and_orders_effects() {
        let memberships = summaries(&["org-A", "org-B"]);
        let mut prefs = MemoryPrefs::default();
        let mut ctx = ctx();

        let effects = MembershipResolver::switch_union(
            &UnionId::new("org-B"),
            &memberships,
            &mut prefs,
            &mut ctx,
        )
        .unwrap();

        assert_eq!(prefs.load_active_union(), Some(UnionId::new("org-B")));
        assert_eq!(
            effects,
            vec![
                SwitchEffect::RefreshAllData,
                SwitchEffect::Navigate(Navigation::ToDashboardRoot),
            ]
        );
    }
}
