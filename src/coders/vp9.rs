use super::{parse_int, template_string, Coder, CoderInfo, CoderKind, CommandMapping};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const GOP_AUTO: &str = "auto";
pub const FPS_MODE_PASSTHROUGH: &str = "passthrough";
pub const FPS_MODE_CFR: &str = "cfr";

const INFO: CoderInfo = CoderInfo {
    coder: "libvpx-vp9",
    name: "VP9 (libvpx-vp9)",
    codec: "vp9",
    kind: CoderKind::Video,
    hwaccel: false,
};

/// Form values as submitted, all strings. Unknown fields such as `preset`
/// and `profile` are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vp9Settings {
    /// kbit/s
    pub bitrate: String,
    pub fps: String,
    /// Seconds between keyframes, or "auto"
    pub gop: String,
    pub fps_mode: String,
    /// Fields owned by other parts of the panel, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Vp9Settings {
    fn default() -> Self {
        Self {
            bitrate: "4096".to_string(),
            fps: "25".to_string(),
            gop: "2".to_string(),
            fps_mode: FPS_MODE_PASSTHROUGH.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Vp9Settings {
    fn field(&self, name: &str) -> String {
        self.extra
            .get(name)
            .map(template_string)
            .unwrap_or_else(|| "undefined".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vp9;

impl Coder for Vp9 {
    type Settings = Vp9Settings;

    fn info(&self) -> &CoderInfo {
        &INFO
    }

    fn init(&self, partial: &Value) -> Vp9Settings {
        let mut settings = Vp9Settings::default();

        if let Value::Object(fields) = partial {
            for (key, value) in fields {
                match key.as_str() {
                    "bitrate" => settings.bitrate = template_string(value),
                    "fps" => settings.fps = template_string(value),
                    "gop" => settings.gop = template_string(value),
                    "fps_mode" => settings.fps_mode = template_string(value),
                    _ => {
                        settings.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        settings
    }

    fn create_mapping(&self, settings: &Vp9Settings) -> CommandMapping {
        let bitrate = format!("{}k", settings.bitrate);

        let mut local: Vec<String> = vec![
            "-codec:v".into(),
            INFO.coder.into(),
            "-b:v".into(),
            bitrate.clone(),
            "-maxrate:v".into(),
            bitrate.clone(),
            "-bufsize:v".into(),
            bitrate,
            "-r".into(),
            settings.fps.clone(),
            "-sc_threshold".into(),
            "0".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ];

        if settings.gop != GOP_AUTO {
            let frames = keyframe_interval(&settings.fps, &settings.gop);
            local.extend(["-g".to_string(), frames.clone(), "-keyint_min".to_string(), frames]);
        }

        if settings.fps_mode != FPS_MODE_PASSTHROUGH {
            local.extend(["-fps_mode".to_string(), settings.fps_mode.clone()]);
        }

        CommandMapping::new(Vec::new(), local)
    }

    fn summarize(&self, settings: &Vp9Settings) -> String {
        format!(
            "{}, {} kbit/s, {} FPS, Preset: {}, Profile: {}",
            INFO.name,
            settings.bitrate,
            settings.fps,
            settings.field("preset"),
            settings.field("profile"),
        )
    }
}

/// GOP size in frames: `round(parseInt(fps) * parseInt(gop))`, zero decimals
fn keyframe_interval(fps: &str, gop: &str) -> String {
    match (parse_int(fps), parse_int(gop)) {
        (Some(fps), Some(gop)) => {
            let frames = (fps * gop).round();
            if frames == 0.0 {
                "0".to_string()
            } else if frames.is_infinite() {
                if frames > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
            } else if frames.abs() >= 1e21 {
                // Beyond 1e21 fixed notation turns into shortest exponent form
                format!("{:e}", frames).replacen('e', "e+", 1)
            } else {
                format!("{:.0}", frames)
            }
        }
        _ => "NaN".to_string(),
    }
}
