use restream_panel::publication::services::{self, outputs_for_live, FacebookSettings, LiveStream, FACEBOOK};
use serde_json::json;

fn live(url: Option<&str>) -> LiveStream {
    LiveStream {
        id: "live-1".to_string(),
        secure_stream_url: url.map(str::to_string),
    }
}

#[test]
fn test_settings_defaults() {
    let settings = FacebookSettings::init(&json!({}));

    assert_eq!(settings.stream_key_primary, "");
    assert_eq!(settings.stream_key_backup, "");
    assert!(settings.rtmp_primary);
    assert!(!settings.rtmp_backup);
}

#[test]
fn test_settings_caller_wins() {
    let settings = FacebookSettings::init(&json!({"rtmp_primary": false, "stream_key_backup": "bk", "title": "Show"}));

    assert!(!settings.rtmp_primary);
    assert_eq!(settings.stream_key_backup, "bk");
    assert_eq!(settings.extra.get("title"), Some(&json!("Show")));
}

#[test]
fn test_output_from_live_stream_url() {
    let mut settings = FacebookSettings::default();
    let outputs = outputs_for_live(
        &live(Some("rtmps://live-api-s.facebook.com:443/rtmp/FB-123-0-abc")),
        &mut settings,
    );

    assert_eq!(settings.stream_key_primary, "FB-123-0-abc");
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].address, "rtmps://live-api-s.facebook.com:443/rtmp/FB-123-0-abc");
    assert_eq!(outputs[0].options, vec!["-f", "flv"]);
}

#[test]
fn test_no_output_when_primary_disabled() {
    let mut settings = FacebookSettings::init(&json!({"rtmp_primary": false}));
    let outputs = outputs_for_live(&live(Some("rtmps://host/rtmp/key")), &mut settings);

    assert_eq!(settings.stream_key_primary, "key");
    assert!(outputs.is_empty());
}

#[test]
fn test_no_output_without_stream_key() {
    let mut settings = FacebookSettings::default();

    assert!(outputs_for_live(&live(None), &mut settings).is_empty());
    assert!(outputs_for_live(&live(Some("rtmps://host/rtmp/")), &mut settings).is_empty());
    assert_eq!(settings.stream_key_primary, "");
}

#[test]
fn test_facebook_service_requirements() {
    assert_eq!(FACEBOOK.id, "facebook");
    assert_eq!(FACEBOOK.requires.protocols, &["rtmps"]);
    assert_eq!(FACEBOOK.requires.formats, &["flv"]);
    assert_eq!(FACEBOOK.requires.codecs.video, &["h264"]);
    assert_eq!(FACEBOOK.requires.codecs.audio, &["aac"]);
    assert_eq!(services::service_ids(), vec!["facebook"]);
}
