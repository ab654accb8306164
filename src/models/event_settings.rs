//! Event settings model
//!
//! One row, keyed by a fixed id, holds the branding and copy of the active
//! event edition. Missing values are filled from [`SettingsContent`]'s
//! canonical defaults at render time only; defaults are never written back.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Editable content of the settings row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_main_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_highlight_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solidarity_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solidarity_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_box_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_box_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_hero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_solidarity: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_vip_card: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_solidarity_card: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_schedule: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_footer: Option<bool>,
}

/// The settings row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    pub id: String,
    #[serde(flatten)]
    pub content: SettingsContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Update payload for the settings row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(flatten)]
    pub content: SettingsContent,
    pub updated_at: DateTime<Utc>,
}

/// Which page sections are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionVisibility {
    pub hero: bool,
    pub solidarity: bool,
    pub vip_card: bool,
    pub solidarity_card: bool,
    pub schedule: bool,
    pub footer: bool,
}

/// Settings with every optional value filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub edition: String,
    pub year_label: String,
    pub hero_image_url: Option<String>,
    pub event_date: String,
    pub subtitle: String,
    pub about_text: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub title_main_color: String,
    pub title_highlight_color: String,
    pub title_main: String,
    pub title_highlight: String,
    pub hero_cta_text: String,
    pub solidarity_title: String,
    pub solidarity_description: String,
    pub vip_box_title: String,
    pub vip_box_description: String,
    pub schedule_title: String,
    pub footer_address: String,
    pub footer_instagram: String,
    pub footer_phone: String,
    pub footer_copyright: String,
    pub sections: SectionVisibility,
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

impl SettingsContent {
    /// Fill every missing value with the canonical default
    pub fn resolved(&self) -> ResolvedSettings {
        ResolvedSettings {
            edition: or_default(&self.edition, "Bloco dos Mauricinhos"),
            year_label: or_default(&self.year_label, "Ano IV"),
            hero_image_url: self.hero_image_url.clone().filter(|url| !url.trim().is_empty()),
            event_date: or_default(&self.event_date, ""),
            subtitle: or_default(&self.subtitle, ""),
            about_text: or_default(
                &self.about_text,
                "Aprendizado que forma líderes, transforma histórias e faz o futuro desfilar com conhecimento, inovação e a energia vibrante do Carnaval da UNINASSAU.",
            ),
            primary_color: or_default(&self.primary_color, "#002D5B"),
            secondary_color: or_default(&self.secondary_color, "#FFD100"),
            accent_color: or_default(&self.accent_color, "#E63946"),
            title_main_color: or_default(&self.title_main_color, "#FFFFFF"),
            title_highlight_color: or_default(&self.title_highlight_color, "#FFD100"),
            title_main: or_default(&self.title_main, "Bloco dos"),
            title_highlight: or_default(&self.title_highlight, "Mauricinhos"),
            hero_cta_text: or_default(&self.hero_cta_text, "Garantir Inscrição"),
            solidarity_title: or_default(&self.solidarity_title, "Alegria & Solidariedade"),
            solidarity_description: or_default(
                &self.solidarity_description,
                "Leve 1kg de alimento não perecível a um dos pontos de retirada.",
            ),
            vip_box_title: or_default(&self.vip_box_title, "Entrada Solidária & Pulseira"),
            vip_box_description: or_default(
                &self.vip_box_description,
                "Troque sua doação pela pulseira oficial do bloco.",
            ),
            schedule_title: or_default(&self.schedule_title, "Programação Oficial"),
            footer_address: or_default(
                &self.footer_address,
                "R. Fernando Lopes, 752 - Graças\nRecife - PE, 52011-220",
            ),
            footer_instagram: or_default(&self.footer_instagram, "@uninassau"),
            footer_phone: or_default(&self.footer_phone, "(81) 3413-4611"),
            footer_copyright: or_default(
                &self.footer_copyright,
                "© 2026 UNINASSAU | Compromisso com a Educação e Cultura",
            ),
            sections: SectionVisibility {
                hero: self.show_hero.unwrap_or(true),
                solidarity: self.show_solidarity.unwrap_or(true),
                vip_card: self.show_vip_card.unwrap_or(true),
                solidarity_card: self.show_solidarity_card.unwrap_or(true),
                schedule: self.show_schedule.unwrap_or(true),
                footer: self.show_footer.unwrap_or(true),
            },
        }
    }
}

impl EventSettings {
    pub fn resolved(&self) -> ResolvedSettings {
        self.content.resolved()
    }
}

impl ResolvedSettings {
    /// Instagram profile link derived from the handle
    pub fn instagram_url(&self) -> String {
        format!("https://www.instagram.com/{}/", self.footer_instagram.trim_start_matches('@'))
    }

    /// `tel:` link with digits only
    pub fn phone_link(&self) -> String {
        format!("tel:{}", crate::utils::helpers::digits_only(&self.footer_phone))
    }
}
