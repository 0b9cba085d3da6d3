use speedgate_config::load_toml;

fn base_toml() -> String {
    r#"
[pins]
bit_one = 2
bit_zero = 3
start = 4
indicator = 17

[gates]
gate1_channel = 0
gate2_channel = 1
gate1_threshold_cv = 230
gate2_threshold_cv = 230

[timer]
tick_us = 100
"#
    .to_string()
}

#[test]
fn accepts_minimal_valid_config() {
    let cfg = load_toml(&base_toml()).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.timer.tick_us, 100);
    assert_eq!(cfg.gates.gate1_threshold_cv, 230);
}

#[test]
fn defaults_apply_when_sections_missing() {
    let toml = r#"
[pins]
bit_one = 2
bit_zero = 3
start = 4
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.gates.gate1_threshold_cv, 230);
    assert_eq!(cfg.gates.gate2_threshold_cv, 230);
    assert_eq!(cfg.timer.tick_us, 100);
    assert_eq!(cfg.watchdog.arm_timeout_ms, 0);
    assert!(cfg.pins.indicator.is_none());
}

#[test]
fn rejects_equal_gate_channels() {
    let toml = base_toml().replace("gate2_channel = 1", "gate2_channel = 0");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject equal channels");
    assert!(format!("{err}").contains("must differ"));
}

#[test]
fn rejects_threshold_above_full_scale() {
    let toml = base_toml().replace("gate1_threshold_cv = 230", "gate1_threshold_cv = 501");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject threshold > 500");
    assert!(format!("{err}").contains("gate1_threshold_cv"));
}

#[test]
fn rejects_unserviceable_tick_interval() {
    let toml = base_toml().replace("tick_us = 100", "tick_us = 1");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject tick_us = 1");
    assert!(format!("{err}").contains("timer.tick_us"));
}

#[test]
fn rejects_shared_button_pins() {
    let toml = base_toml().replace("bit_zero = 3", "bit_zero = 2");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject duplicate pins");
    assert!(format!("{err}").contains("distinct"));
}

#[test]
fn rejects_partial_lcd_wiring() {
    let partial = base_toml().replace(
        "indicator = 17",
        "indicator = 17\nlcd_rs = 22\nlcd_en = 23",
    );
    let cfg = load_toml(&partial).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject partial lcd wiring");
    assert!(format!("{err}").contains("lcd"));
}

#[test]
fn bit_policy_parses_kebab_case() {
    let toml = format!("{}\n[decoder]\nbit_policy = \"prefer-zero\"\n", base_toml());
    let cfg = load_toml(&toml).expect("parse TOML");
    assert_eq!(cfg.decoder.bit_policy, speedgate_config::BitPolicy::PreferZero);
}
