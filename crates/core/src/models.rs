use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeTier {
    EarlyChildhood,
    Elementary,
    Teen,
    Adult,
}

impl AgeTier {
    pub fn for_age(age: u8) -> Self {
        match age {
            0..=7 => Self::EarlyChildhood,
            8..=12 => Self::Elementary,
            13..=17 => Self::Teen,
            _ => Self::Adult,
        }
    }

    pub fn group_label(self) -> &'static str {
        match self {
            Self::EarlyChildhood => "Early Childhood",
            Self::Elementary => "Elementary",
            Self::Teen => "Teen",
            Self::Adult => "Adult",
        }
    }

    pub fn protection_label(self) -> &'static str {
        match self {
            Self::EarlyChildhood => "High Protection",
            Self::Elementary => "Moderate Protection",
            Self::Teen => "Guided Protection",
            Self::Adult => "Personal Choice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Educational,
    Entertainment,
    SocialMedia,
    News,
    Gaming,
}

impl ContentCategory {
    pub const ALL: [Self; 5] = [
        Self::Educational,
        Self::Entertainment,
        Self::SocialMedia,
        Self::News,
        Self::Gaming,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Educational => "Educational Content",
            Self::Entertainment => "Entertainment (Age-Appropriate)",
            Self::SocialMedia => "Social Media",
            Self::News => "News & Current Events",
            Self::Gaming => "Gaming Content",
        }
    }

    pub fn minimum_age(self) -> u8 {
        match self {
            Self::Educational | Self::Entertainment => 0,
            Self::SocialMedia => 13,
            Self::News => 10,
            Self::Gaming => 8,
        }
    }

    pub fn base_percentage(self) -> u8 {
        match self {
            Self::Educational => 100,
            Self::Entertainment => 85,
            Self::SocialMedia => 60,
            Self::News => 40,
            Self::Gaming => 70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleKind {
    WebProtection,
    AppProtection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub from_user: bool,
    pub created_at: DateTime<Utc>,
    pub sentiment: Option<SentimentLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionSession {
    pub session_id: String,
    pub display_name: String,
    pub age: u8,
    pub started_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub web_protection: bool,
    pub app_protection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub password: String,
    pub age: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub session_id: String,
    pub user_message: ChatMessage,
    pub reply: Option<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    pub session_id: String,
    pub display_name: String,
    pub age: u8,
    pub greeting: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAccess {
    pub category: ContentCategory,
    pub label: String,
    pub allowed: bool,
    pub percentage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedEvent {
    pub site: String,
    pub reason: String,
    pub noted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionsView {
    pub age: u8,
    pub tier: AgeTier,
    pub group_label: String,
    pub protection_label: String,
    pub categories: Vec<CategoryAccess>,
    pub recent_blocks: Vec<BlockedEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleView {
    pub toggle: ToggleKind,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub blocked_today: u32,
    pub stat_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub display_name: String,
    pub age: u8,
    pub tier: AgeTier,
    pub threats_blocked: u32,
    pub safe_interactions: u32,
    pub safety_score: u8,
    pub toggles: Vec<ToggleView>,
}
