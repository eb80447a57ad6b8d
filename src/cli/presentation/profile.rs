//! Profile presentation. Tokens are never printed in full.

use super::shared::{heading, or_dash, table};
use crate::config::{BnsConfig, Profile};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProfileView<'a> {
    pub name: &'a str,
    pub default: bool,
    pub token: String,
    pub organization: Option<&'a str>,
    pub project: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub component: Option<&'a str>,
}

impl<'a> ProfileView<'a> {
    pub fn new(name: &'a str, profile: &'a Profile, default: bool) -> Self {
        Self {
            name,
            default,
            token: mask_token(&profile.token),
            organization: profile.organization.as_deref(),
            project: profile.project.as_deref(),
            environment: profile.environment.as_deref(),
            component: profile.component.as_deref(),
        }
    }
}

pub fn profile_views(config: &BnsConfig) -> Vec<ProfileView<'_>> {
    config
        .profiles
        .iter()
        .map(|(name, profile)| {
            let default = config.default_profile.as_deref() == Some(name.as_str());
            ProfileView::new(name, profile, default)
        })
        .collect()
}

pub fn format_profiles_text(views: &[ProfileView<'_>]) -> String {
    if views.is_empty() {
        return "No profiles configured.\n\nUse 'bns configure profiles add' to add one."
            .to_string();
    }
    let mut table = table(&["", "Name", "Token", "Organization", "Project", "Environment", "Component"]);
    for view in views {
        table.add_row(vec![
            (if view.default { "*" } else { "" }).to_string(),
            view.name.to_string(),
            view.token.clone(),
            or_dash(view.organization).to_string(),
            or_dash(view.project).to_string(),
            or_dash(view.environment).to_string(),
            or_dash(view.component).to_string(),
        ]);
    }
    format!("{}\n\n{}", heading("Profiles"), table)
}

/// Keep the last four characters visible.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
