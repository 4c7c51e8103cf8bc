//! Static voice catalog
//!
//! Maps abstract voice ids to display metadata and speech-backend voice ids.
//! Exactly one entry is the default; unknown ids resolve to it.

use crate::models::Voice;

/// Id of the default voice
pub const DEFAULT_VOICE_ID: &str = "professional";

static VOICES: [Voice; 4] = [
    Voice {
        id: "professional",
        name: "专业风格",
        name_en: "Professional",
        gender: "neutral",
        style: "formal",
        preview_url: Some("/audio/samples/professional.mp3"),
        is_default: true,
        backend_voice: "onyx",
    },
    Voice {
        id: "friendly",
        name: "友好风格",
        name_en: "Friendly",
        gender: "neutral",
        style: "casual",
        preview_url: Some("/audio/samples/friendly.mp3"),
        is_default: false,
        backend_voice: "nova",
    },
    Voice {
        id: "energetic",
        name: "活力风格",
        name_en: "Energetic",
        gender: "neutral",
        style: "energetic",
        preview_url: Some("/audio/samples/energetic.mp3"),
        is_default: false,
        backend_voice: "shimmer",
    },
    Voice {
        id: "calm",
        name: "沉稳风格",
        name_en: "Calm",
        gender: "neutral",
        style: "calm",
        preview_url: Some("/audio/samples/calm.mp3"),
        is_default: false,
        backend_voice: "echo",
    },
];

/// All catalog entries in display order
pub fn all() -> &'static [Voice] {
    &VOICES
}

/// Look up a voice by id
pub fn find(voice_id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id == voice_id)
}

/// The catalog's default entry
pub fn default_voice() -> &'static Voice {
    VOICES
        .iter()
        .find(|v| v.is_default)
        .unwrap_or(&VOICES[0])
}

/// Backend voice for `voice_id`, falling back to the default entry's mapping
pub fn backend_voice_for(voice_id: &str) -> &'static str {
    find(voice_id).unwrap_or_else(default_voice).backend_voice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_default() {
        assert_eq!(all().iter().filter(|v| v.is_default).count(), 1);
        assert_eq!(default_voice().id, DEFAULT_VOICE_ID);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = all().iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_backend_mapping() {
        assert_eq!(backend_voice_for("professional"), "onyx");
        assert_eq!(backend_voice_for("friendly"), "nova");
        assert_eq!(backend_voice_for("energetic"), "shimmer");
        assert_eq!(backend_voice_for("calm"), "echo");
    }

    #[test]
    fn test_unknown_voice_uses_default_mapping() {
        assert_eq!(backend_voice_for("whisper"), "onyx");
        assert_eq!(backend_voice_for(""), "onyx");
        assert!(find("whisper").is_none());
    }

    #[test]
    fn test_backend_voice_not_serialized() {
        let value = serde_json::to_value(find("calm").unwrap()).unwrap();
        assert!(value.get("backendVoice").is_none());
        assert_eq!(value["nameEn"], "Calm");
        assert_eq!(value["isDefault"], false);
    }
}
