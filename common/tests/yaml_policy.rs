use common::yaml::{validate, YamlVerdict};

const SECRET_WIFI: &str = "wifi:\n  ssid: !secret wifi_ssid\n  password: !secret wifi_password\n";

#[test]
fn ordinary_configs_raise_no_flags() {
    let samples = [
        "esphome:\n  name: test\n",
        "esphome:\n  name: plug\nesp32:\n  board: esp32dev\nlogger:\n",
        "switch:\n  - platform: gpio\n    pin: GPIO04\n    name: Relay\n",
        "sensor:\n  - platform: dht\n    temperature:\n      name: Temp\n",
    ];
    for text in samples {
        assert_eq!(validate(text), YamlVerdict::default(), "{text}");
    }
}

#[test]
fn include_anywhere_in_the_text_is_flagged() {
    for text in [
        "packages:\n  base: !include base.yaml\n",
        "esphome:\n  name: \"!include\"\n",
        "# !include common.yaml\nesphome:\n  name: test\n",
        "esphome: [unclosed !include",
    ] {
        assert!(validate(text).has_include, "{text}");
    }
}

#[test]
fn secret_wifi_block_is_valid() {
    let verdict = validate(SECRET_WIFI);
    assert!(verdict.has_wifi);
    assert!(verdict.wifi_valid);
    assert!(verdict.is_accepted());
}

#[test]
fn wifi_block_rules() {
    let extra_key = format!("{SECRET_WIFI}  fast_connect: true\n");
    let invalid = [
        "wifi:\n  ssid: myssid\n  password: mypass\n",
        "wifi:\n  ssid: !secret wifi_ssid\n  password: mypass\n",
        "wifi:\n  ssid: myssid\n  password: !secret wifi_password\n",
        "wifi:\n  ssid: !secret wifi_ssid\n",
        extra_key.as_str(),
    ];
    for text in invalid {
        let verdict = validate(text);
        assert!(verdict.has_wifi, "{text}");
        assert!(!verdict.wifi_valid, "{text}");
        assert!(verdict.rejection().unwrap().contains("!secret"));
    }
}

#[test]
fn external_components_are_rejected() {
    let verdict = validate("external_components:\n  - source: github://someone/thing\n");
    assert!(verdict.has_external_components);
    assert_eq!(
        verdict.rejection().as_deref(),
        Some("external_components are not allowed")
    );
}

#[test]
fn malformed_yaml_reports_a_parse_error() {
    let verdict = validate("esphome:\n  name: [test\n");
    assert!(verdict.parse_error.is_some());
    assert!(verdict.rejection().unwrap().starts_with("Invalid YAML:"));
}

#[test]
fn validation_is_idempotent() {
    for text in [SECRET_WIFI, "esphome: {", "a: !include b.yaml\n", ""] {
        assert_eq!(validate(text), validate(text));
    }
}

#[test]
fn merge_keys_cannot_smuggle_external_components() {
    let anchored = "base: &base\n  external_components:\n    - source: github://someone/thing\n<<: *base\n";
    let inline = "<<:\n  external_components:\n    - source: github://someone/thing\nesphome:\n  name: test\n";
    for text in [anchored, inline] {
        let verdict = validate(text);
        assert!(verdict.parse_error.is_none(), "{text}");
        assert!(verdict.has_external_components, "{text}");
        assert!(!verdict.is_accepted());
    }
}

#[test]
fn merged_wifi_block_is_policed() {
    let text = "defaults: &net\n  wifi:\n    ssid: myssid\n    password: mypass\n<<: *net\nesphome:\n  name: test\n";
    let verdict = validate(text);
    assert!(verdict.has_wifi);
    assert!(!verdict.wifi_valid);
    assert!(!verdict.is_accepted());
}

#[test]
fn non_mapping_roots_are_accepted() {
    for text in ["just a string\n", "!secret foo\n", "- one\n- two\n", "42\n"] {
        assert_eq!(validate(text), YamlVerdict::default(), "{text}");
    }
}
