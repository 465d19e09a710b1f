//! # Record Types
//!
//! Fixed-shape records persisted in the data file, plus the views returned to
//! API callers. Field names are camelCase on the wire to match the browser
//! client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Accounts ---

/// The role an account plays in a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Elderly,
    Child,
    Parent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Elderly => "elderly",
            Role::Child => "child",
            Role::Parent => "parent",
        };
        f.write_str(s)
    }
}

/// A registered account as persisted in the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub phone: String,
    pub name: String,
    /// Stored as entered. Never serialized into API responses; see [`AccountView`].
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub bound_phones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_sample_url: Option<String>,
    #[serde(
        rename = "did_voice_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub did_voice_id: Option<String>,
    #[serde(
        rename = "did_image_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub did_image_url: Option<String>,
}

/// An account as returned to API callers, without the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub role: Role,
    pub bound_phones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_sample_url: Option<String>,
    #[serde(
        rename = "did_voice_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub did_voice_id: Option<String>,
    #[serde(
        rename = "did_image_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub did_image_url: Option<String>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            phone: account.phone.clone(),
            name: account.name.clone(),
            role: account.role,
            bound_phones: account.bound_phones.clone(),
            avatar_url: account.avatar_url.clone(),
            voice_sample_url: account.voice_sample_url.clone(),
            did_voice_id: account.did_voice_id.clone(),
            did_image_url: account.did_image_url.clone(),
        }
    }
}

/// The short form of an account used when listing bound family members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub phone: String,
    pub name: String,
    pub role: Role,
}

// --- Schedules ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Life,
    Medication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    Completed,
}

/// A life task or medication reminder owned by one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    /// Phone of the owning account.
    pub user_id: String,
    pub title: String,
    /// Time of day as entered by the client, e.g. `08:30`.
    pub time: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    #[serde(default)]
    pub status: ScheduleStatus,
    /// Phone of the account that created the item.
    pub created_by: String,
}

// --- Health logs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    BloodPressure,
    HeartRate,
    BloodSugar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLog {
    pub id: String,
    /// Phone of the subject.
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: HealthMetric,
    /// The reading as entered, e.g. `120/80`.
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

// --- Messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Pending,
    Delivered,
}

/// A care message from a parent, relayed by the avatar on the recipient's next session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from_user_id: String,
    pub target_phone: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
}

// --- Sentiment reports ---

/// The mood label of a report. The four score axes plus a neutral fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happiness,
    Sadness,
    Anger,
    Fear,
    Neutral,
}

/// A four-axis emotion score vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EmotionScores {
    #[serde(default)]
    pub happiness: f64,
    #[serde(default)]
    pub sadness: f64,
    #[serde(default)]
    pub anger: f64,
    #[serde(default)]
    pub fear: f64,
}

impl EmotionScores {
    pub fn new(happiness: f64, sadness: f64, anger: f64, fear: f64) -> Self {
        Self {
            happiness,
            sadness,
            anger,
            fear,
        }
    }

    /// The axes in tie-breaking order.
    pub fn axes(&self) -> [(Mood, f64); 4] {
        [
            (Mood::Happiness, self.happiness),
            (Mood::Sadness, self.sadness),
            (Mood::Anger, self.anger),
            (Mood::Fear, self.fear),
        ]
    }

    pub fn accumulate(&mut self, other: &EmotionScores) {
        self.happiness += other.happiness;
        self.sadness += other.sadness;
        self.anger += other.anger;
        self.fear += other.fear;
    }

    /// Coordinate-wise mean over `samples`, each axis rounded half away from zero.
    /// Zero samples leave the totals untouched.
    pub fn rounded_mean(&self, samples: usize) -> EmotionScores {
        if samples == 0 {
            return *self;
        }
        let n = samples as f64;
        EmotionScores {
            happiness: (self.happiness / n).round(),
            sadness: (self.sadness / n).round(),
            anger: (self.anger / n).round(),
            fear: (self.fear / n).round(),
        }
    }

    /// The axis with the greatest positive score; the later axis wins ties.
    /// A vector with no positive score is `Neutral`.
    pub fn dominant(&self) -> Mood {
        let mut best = (Mood::Neutral, 0.0);
        for (mood, score) in self.axes() {
            if score > 0.0 && score >= best.1 {
                best = (mood, score);
            }
        }
        best.0
    }
}

/// A per-account, per-day summary produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: Role,
    pub date: NaiveDate,
    pub overall_mood: Mood,
    pub trend: String,
    pub summary: String,
    pub details: EmotionScores,
    pub suggestions: String,
    pub interaction_count: usize,
}

// --- The document ---

/// The whole persisted state: five record collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub users: Vec<Account>,
    #[serde(default)]
    pub reports: Vec<SentimentReport>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub schedules: Vec<ScheduleItem>,
    #[serde(default)]
    pub health_logs: Vec<HealthLog>,
}

impl Database {
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn account_by_phone(&self, phone: &str) -> Option<&Account> {
        self.users.iter().find(|u| u.phone == phone)
    }
}
