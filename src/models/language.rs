use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ENGLISH_ID: Uuid = Uuid::from_u128(0x5c1d8e2a_7b34_4f0e_9a61_0d3e2f1a0e01);
pub const SPANISH_ID: Uuid = Uuid::from_u128(0x5c1d8e2a_7b34_4f0e_9a61_0d3e2f1a0e02);
pub const FRENCH_ID: Uuid = Uuid::from_u128(0x5c1d8e2a_7b34_4f0e_9a61_0d3e2f1a0e03);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl Language {
    fn builtin(id: Uuid, name: &str, code: &str, flag: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            code: code.to_string(),
            flag: Some(flag.to_string()),
            is_active: true,
        }
    }

    /// Minimal language set seeded into a fresh store and used by editors when
    /// the language list cannot be fetched. Ordered by name.
    pub fn defaults() -> Vec<Language> {
        vec![
            Self::builtin(ENGLISH_ID, "English", "en", "🇺🇸"),
            Self::builtin(FRENCH_ID, "French", "fr", "🇫🇷"),
            Self::builtin(SPANISH_ID, "Spanish", "es", "🇪🇸"),
        ]
    }

    pub fn label(&self) -> String {
        match &self.flag {
            Some(flag) => format!("{} {}", flag, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageToggle {
    pub is_active: Option<bool>,
}
