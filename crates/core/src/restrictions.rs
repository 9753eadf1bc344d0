use crate::models::{
    AgeTier, BlockedEvent, CategoryAccess, CompanionSession, ContentCategory, DashboardView,
    RestrictionsView, ToggleKind, ToggleView,
};

pub fn access_policy(age: u8) -> Vec<CategoryAccess> {
    ContentCategory::ALL
        .into_iter()
        .map(|category| {
            let allowed = age >= category.minimum_age();
            CategoryAccess {
                category,
                label: category.label().to_string(),
                allowed,
                percentage: if allowed { category.base_percentage() } else { 0 },
            }
        })
        .collect()
}

pub fn restrictions_for_age(age: u8) -> RestrictionsView {
    let tier = AgeTier::for_age(age);

    RestrictionsView {
        age,
        tier,
        group_label: tier.group_label().to_string(),
        protection_label: tier.protection_label().to_string(),
        categories: access_policy(age),
        recent_blocks: recent_blocks(),
    }
}

// Demo data: the reference dashboard shows fabricated activity, not real
// filtering results.
pub fn recent_blocks() -> Vec<BlockedEvent> {
    vec![
        BlockedEvent {
            site: "inappropriate-site.com".to_string(),
            reason: "Age restriction".to_string(),
            noted: "2 hours ago".to_string(),
        },
        BlockedEvent {
            site: "violent-game.com".to_string(),
            reason: "Content filter".to_string(),
            noted: "5 hours ago".to_string(),
        },
        BlockedEvent {
            site: "mature-content.net".to_string(),
            reason: "Age verification failed".to_string(),
            noted: "1 day ago".to_string(),
        },
    ]
}

pub fn dashboard_view(session: &CompanionSession) -> DashboardView {
    DashboardView {
        display_name: session.display_name.clone(),
        age: session.age,
        tier: AgeTier::for_age(session.age),
        threats_blocked: 247,
        safe_interactions: 12,
        safety_score: 98,
        toggles: vec![
            ToggleView {
                toggle: ToggleKind::WebProtection,
                title: "Website Security".to_string(),
                description: "Block harmful and unverified websites".to_string(),
                enabled: session.web_protection,
                blocked_today: 23,
                stat_label: "Unsafe sites".to_string(),
            },
            ToggleView {
                toggle: ToggleKind::AppProtection,
                title: "App Protection".to_string(),
                description: "Prevent unauthorized app installations".to_string(),
                enabled: session.app_protection,
                blocked_today: 5,
                stat_label: "Blocked apps".to_string(),
            },
        ],
    }
}
