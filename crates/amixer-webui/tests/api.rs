//! End-to-end tests of the HTTP surface against a scripted amixer.

use std::sync::Arc;

use amixer_webui::{router, WebState};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use mixconf::MixerToolConfig;
use mixctl::{CommandOutput, MixerService, ScriptedRunner};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const CARDS: &str = "\
 0 [PCH            ]: HDA-Intel - HDA Intel PCH
                      HDA Intel PCH at 0xf7f10000 irq 33
 2 [Headset        ]: USB-Audio - USB Headset
                      Logitech USB Headset at usb-0000:00:14.0-3, full speed
";

const PCH_INFO: &str = "\
Card hw:0 'PCH'/'HDA Intel PCH at 0xf7f10000 irq 33'
  Mixer name\t: 'Realtek ALC892'
";

const CARD_CONTROLS: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pvolume-joined pswitch pswitch-joined
  Playback channels: Mono
  Limits: Playback 0 - 87
  Mono: Playback 64 [74%] [-17.25dB] [on]
Simple mixer control 'Capture',0
  Capabilities: cvolume cswitch
  Capture channels: Front Left - Front Right
  Limits: Capture 0 - 63
  Front Left: Capture 39 [62%] [12.00dB] [on]
  Front Right: Capture 39 [62%] [12.00dB] [on]
Simple mixer control 'Auto-Mute Mode',0
  Capabilities: enum
  Items: 'Disabled' 'Enabled'
  Item0: 'Enabled'
";

const BANDS: &str = "\
Simple mixer control '00. 31 Hz',0
  Capabilities: volume
  Playback channels: Front Left - Front Right
  Capture channels: Front Left - Front Right
  Limits: 0 - 100
  Front Left: 66 [66%]
  Front Right: 60 [60%]
Simple mixer control '01. 63 Hz',0
  Capabilities: volume
  Playback channels: Front Left - Front Right
  Capture channels: Front Left - Front Right
  Limits: 0 - 100
  Front Left: 50 [50%]
  Front Right: 50 [50%]
";

struct Fixture {
    app: Router,
    runner: Arc<ScriptedRunner>,
    _dir: TempDir,
}

fn fixture(persist: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("cards");
    std::fs::write(&registry, CARDS).unwrap();

    let runner = Arc::new(ScriptedRunner::new());
    runner
        .on(&["-c", "0", "info"], CommandOutput::ok(PCH_INFO))
        .on(&["-c", "2", "info"], CommandOutput::failed(1, "Invalid card number."))
        .on(&["-D", "pulse", "info"], CommandOutput::ok("Card default 'pulse'/'PulseAudio'\n"))
        .on(&["-D", "equal", "scontents"], CommandOutput::ok(BANDS))
        .on(&["scontents"], CommandOutput::ok(CARD_CONTROLS));

    let config = MixerToolConfig {
        card_registry: registry,
        ..MixerToolConfig::default()
    };
    let service = MixerService::new(&config, runner.clone()).with_persistence(persist);

    Fixture {
        app: router(WebState::new(service)),
        runner,
        _dir: dir,
    }
}

async fn request(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = request(app, Method::GET, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {} failed: {}", uri, body);
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn test_cards_listing() {
    let fx = fixture(false);

    let cards = get_json(&fx.app, "/cards/").await;
    assert_eq!(
        cards,
        json!({
            "0": "Realtek ALC892",
            "2": "Headset",
            "99999": "PulseAudio",
        })
    );
}

#[tokio::test]
async fn test_controls_follow_selected_card() {
    let fx = fixture(false);

    request(&fx.app, Method::PUT, "/card/2/").await;
    let controls = get_json(&fx.app, "/controls/").await;

    assert_eq!(controls.as_array().unwrap().len(), 3);
    assert_eq!(
        controls[1],
        json!({
            "id": 1,
            "iface": "MIXER",
            "name": "Capture",
            "type": "INTEGER",
            "access": "rw------",
            "min": 0,
            "max": 63,
            "step": 0,
            "channels": ["Front Left", "Front Right"],
            "values": ["62", "62"],
        })
    );
    assert_eq!(controls[2]["items"], json!({"0": "Disabled", "1": "Enabled"}));
    assert_eq!(controls[2]["values"], json!([1]));

    assert_eq!(fx.runner.call_lines(), vec!["amixer -c 2 scontents -M"]);
}

#[tokio::test]
async fn test_writes_with_persistence() {
    let fx = fixture(true);
    get_json(&fx.app, "/controls/").await;

    let (status, body) = request(&fx.app, Method::PUT, "/source/2/0/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, _) = request(&fx.app, Method::PUT, "/volume/1/30/40/").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        fx.runner.call_lines()[1..],
        [
            "amixer set 'Auto-Mute Mode' 0",
            "alsactl store",
            "amixer set Capture 30%,40% -M",
            "alsactl store",
        ]
    );
}

#[tokio::test]
async fn test_equalizer_roundtrip() {
    let fx = fixture(false);
    request(&fx.app, Method::PUT, "/card/0/").await;

    let bands = get_json(&fx.app, "/equalizer/").await;
    assert_eq!(bands.as_array().unwrap().len(), 2);
    assert_eq!(bands[1]["name"], "01. 63 Hz");

    let (status, _) = request(&fx.app, Method::PUT, "/equalizer/1/70/65").await;
    assert_eq!(status, StatusCode::OK);

    // Standard ids still resolve against the card after the equalizer write
    get_json(&fx.app, "/controls/").await;
    let (status, _) = request(&fx.app, Method::PUT, "/control/1/0/").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        fx.runner.call_lines(),
        vec![
            "amixer -c 0 -D equal scontents -M",
            "amixer -D equal set '01. 63 Hz' 70%,65% -M",
            "amixer -c 0 scontents -M",
            "amixer -c 0 set Capture off",
        ]
    );
    assert_eq!(get_json(&fx.app, "/card/").await, json!(0));
}

#[tokio::test]
async fn test_rejected_requests() {
    let fx = fixture(false);
    get_json(&fx.app, "/controls/").await;

    let cases = [
        ("/control/0/1/", StatusCode::BAD_REQUEST),
        ("/control/1/5/", StatusCode::BAD_REQUEST),
        ("/control/7/1/", StatusCode::NOT_FOUND),
        ("/source/-1/0/", StatusCode::BAD_REQUEST),
        ("/source/2/-4/", StatusCode::BAD_REQUEST),
        ("/volume/0/loud/", StatusCode::BAD_REQUEST),
        ("/equalizer/0/50/", StatusCode::NOT_FOUND),
        ("/control/abc/1/", StatusCode::BAD_REQUEST),
    ];
    for (uri, expected) in cases {
        let (status, body) = request(&fx.app, Method::PUT, uri).await;
        assert_eq!(status, expected, "PUT {} -> {}", uri, body);
    }

    // Only the initial listing reached amixer
    assert_eq!(fx.runner.calls().len(), 1);
}
