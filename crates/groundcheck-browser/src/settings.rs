use std::time::Duration;

use groundcheck_core::{AppConfig, ExistenceCode};

/// Fixed waits after UI-mutating actions, plus the navigation bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub navigation_timeout: Duration,
    pub after_navigation: Duration,
    pub after_click: Duration,
    pub after_input: Duration,
    pub login_poll: Duration,
}

impl Timings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            after_navigation: Duration::from_millis(config.settle_navigation_ms),
            after_click: Duration::from_millis(config.settle_click_ms),
            after_input: Duration::from_millis(config.settle_input_ms),
            login_poll: Duration::from_millis(config.login_poll_ms),
        }
    }

    /// No settle delays at all; for scripted sessions in tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(5),
            after_navigation: Duration::ZERO,
            after_click: Duration::ZERO,
            after_input: Duration::ZERO,
            login_poll: Duration::ZERO,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            after_navigation: Duration::from_secs(3),
            after_click: Duration::from_secs(3),
            after_input: Duration::from_secs(2),
            login_poll: Duration::from_secs(1),
        }
    }
}

pub(crate) async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Visible strings and attribute fragments the target app's UI is matched by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiVocabulary {
    /// All of these must appear in the listing menu entry.
    pub menu_keywords: &'static [&'static str],
    /// Any of these identifies the search/filter toggle.
    pub filter_labels: &'static [&'static str],
    pub id_placeholder_hints: &'static [&'static str],
    /// Matched against the lowercased input `name`.
    pub id_name_hint: &'static str,
    pub latitude_hint: &'static str,
    pub longitude_hint: &'static str,
    /// Matched against the lowercased select `name` or `id`.
    pub classification_hint: &'static str,
    pub submit_labels: &'static [&'static str],
    pub found_option: &'static str,
    pub closed_option: &'static str,
    pub duplicate_option: &'static str,
}

impl UiVocabulary {
    /// Option text in the target app for a classification code.
    #[must_use]
    pub fn option_label(&self, code: &ExistenceCode) -> Option<&'static str> {
        match code {
            ExistenceCode::Found => Some(self.found_option),
            ExistenceCode::Closed => Some(self.closed_option),
            ExistenceCode::Duplicate => Some(self.duplicate_option),
            ExistenceCode::Invalid(_) => None,
        }
    }
}

impl Default for UiVocabulary {
    fn default() -> Self {
        Self {
            menu_keywords: &["Ground Check", "Direktori"],
            filter_labels: &["Pencarian", "Filter"],
            id_placeholder_hints: &["15439505", "IDSBR"],
            id_name_hint: "idsbr",
            latitude_hint: "latitude",
            longitude_hint: "longitude",
            classification_hint: "keberadaan",
            submit_labels: &["TANDAI", "Tandai", "DICEK", "Simpan", "Submit"],
            found_option: "Ditemukan",
            closed_option: "Tutup",
            duplicate_option: "Ganda",
        }
    }
}

/// Everything the per-record workflow needs besides the session itself.
#[derive(Debug, Clone)]
pub struct AutomationSettings {
    pub target_url: String,
    pub listing_path: String,
    pub login_timeout_ticks: u32,
    pub timings: Timings,
    pub vocabulary: UiVocabulary,
}

impl AutomationSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            target_url: config.target_url.clone(),
            listing_path: config.listing_path.clone(),
            login_timeout_ticks: config.login_timeout_ticks,
            timings: Timings::from_app_config(config),
            vocabulary: UiVocabulary::default(),
        }
    }

    #[must_use]
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.target_url, self.listing_path)
    }

    /// Host of the target app, used to tell whether the tab is already on it.
    /// Falls back to the whole URL when it does not parse.
    #[must_use]
    pub fn target_host(&self) -> String {
        reqwest::Url::parse(&self.target_url)
            .ok()
            .and_then(|u| u.host_str().map(ToOwned::to_owned))
            .unwrap_or_else(|| self.target_url.clone())
    }
}
