//! Voice catalog entry

use serde::Serialize;

/// Static catalog entry describing one narration voice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub id: &'static str,
    /// Localized display name
    pub name: &'static str,
    pub name_en: &'static str,
    pub gender: &'static str,
    pub style: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<&'static str>,
    pub is_default: bool,
    /// Voice identifier understood by the speech backend
    #[serde(skip)]
    pub backend_voice: &'static str,
}
