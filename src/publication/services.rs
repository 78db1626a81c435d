use crate::coders::template_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecRequirements {
    pub audio: &'static [&'static str],
    pub video: &'static [&'static str],
}

/// What an output of the service must look like
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirements {
    pub protocols: &'static [&'static str],
    pub formats: &'static [&'static str],
    pub codecs: CodecRequirements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub category: &'static str,
    pub stream_key_link: &'static str,
    pub requires: Requirements,
}

pub const FACEBOOK: ServiceInfo = ServiceInfo {
    id: "facebook",
    name: "Facebook Live",
    version: "1.0",
    category: "platform",
    stream_key_link: "https://www.facebook.com/live/producer?ref=datarhei/restreamer",
    requires: Requirements {
        protocols: &["rtmps"],
        formats: &["flv"],
        codecs: CodecRequirements {
            audio: &["aac"],
            video: &["h264"],
        },
    },
};

pub const SERVICES: &[ServiceInfo] = &[FACEBOOK];

/// Ids of all registered services, the default egress filter
pub fn service_ids() -> Vec<String> {
    SERVICES.iter().map(|s| s.id.to_string()).collect()
}

pub fn find(id: &str) -> Option<&'static ServiceInfo> {
    SERVICES.iter().find(|s| s.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookSettings {
    pub stream_key_primary: String,
    pub stream_key_backup: String,
    pub rtmp_primary: bool,
    pub rtmp_backup: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for FacebookSettings {
    fn default() -> Self {
        Self {
            stream_key_primary: String::new(),
            stream_key_backup: String::new(),
            rtmp_primary: true,
            rtmp_backup: false,
            extra: BTreeMap::new(),
        }
    }
}

impl FacebookSettings {
    /// Shallow merge over the defaults, caller wins
    pub fn init(partial: &Value) -> Self {
        let mut settings = Self::default();

        if let Value::Object(fields) = partial {
            for (key, value) in fields {
                match key.as_str() {
                    "stream_key_primary" => settings.stream_key_primary = template_string(value),
                    "stream_key_backup" => settings.stream_key_backup = template_string(value),
                    "rtmp_primary" => settings.rtmp_primary = truthy(value),
                    "rtmp_backup" => settings.rtmp_backup = truthy(value),
                    _ => {
                        settings.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        settings
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Live video object returned when a broadcast is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStream {
    pub id: String,
    #[serde(default)]
    pub secure_stream_url: Option<String>,
}

/// One ffmpeg output target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub address: String,
    pub options: Vec<String>,
}

/// Take the stream key from the live video's ingest URL and build the
/// outputs for it. Updates `settings.stream_key_primary` in place.
pub fn outputs_for_live(live: &LiveStream, settings: &mut FacebookSettings) -> Vec<Output> {
    let url = live.secure_stream_url.as_deref().unwrap_or_default();
    settings.stream_key_primary = url.rsplit('/').next().unwrap_or_default().to_string();

    let mut outputs = Vec::new();
    if !settings.stream_key_primary.is_empty() && settings.rtmp_primary {
        outputs.push(Output {
            address: url.to_string(),
            options: vec!["-f".to_string(), "flv".to_string()],
        });
    }

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_matches_js() {
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!([])));
        assert!(!truthy(&Value::Null));
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(service_ids(), vec!["facebook"]);
        assert_eq!(find("facebook").map(|s| s.name), Some("Facebook Live"));
        assert!(find("twitch").is_none());
    }
}
