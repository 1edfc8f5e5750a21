use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Literal clients send to clear a reference instead of setting one.
pub const UNASSIGN_SENTINEL: &str = "empty";

/// Strips surrounding whitespace, so length checks see the value that is stored.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Parses an optional id where blank strings and [`UNASSIGN_SENTINEL`] mean
/// `None`, wrapping the value in a typed id.
pub fn deserialize_assignable_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Uuid>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case(UNASSIGN_SENTINEL) => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(|id| Some(T::from(id)))
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Slot {
        #[serde(default, deserialize_with = "deserialize_assignable_id")]
        teacher: Option<Uuid>,
    }

    #[test]
    fn test_sentinel_and_blank_mean_unassigned() {
        for raw in [r#"{"teacher":"empty"}"#, r#"{"teacher":""}"#, r#"{"teacher":null}"#, "{}"] {
            let slot: Slot = serde_json::from_str(raw).unwrap();
            assert!(slot.teacher.is_none(), "{raw}");
        }
    }

    #[test]
    fn test_uuid_is_parsed() {
        let id = Uuid::new_v4();
        let slot: Slot = serde_json::from_str(&format!(r#"{{"teacher":"{id}"}}"#)).unwrap();
        assert_eq!(slot.teacher, Some(id));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Slot>(r#"{"teacher":"nope"}"#).is_err());
    }

    #[derive(Deserialize)]
    struct Label {
        #[serde(deserialize_with = "deserialize_trimmed")]
        year: String,
    }

    #[test]
    fn test_labels_are_trimmed() {
        let label: Label = serde_json::from_str(r#"{"year":"  2024/2025 "}"#).unwrap();
        assert_eq!(label.year, "2024/2025");

        let blank: Label = serde_json::from_str(r#"{"year":"        "}"#).unwrap();
        assert!(blank.year.is_empty());
    }
}
