#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and gate-threshold calibration for the speed trap.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The calibration CSV records measured ambient/occluded sensor readings
//!   per gate; thresholds are derived from the midpoint instead of inheriting
//!   a magic literal.
use serde::Deserialize;

/// Calibration CSV schema.
///
/// Expected headers:
/// gate,ambient_cv,blocked_cv
///
/// Readings are in hundredths of a volt (0-500). Example:
/// gate,ambient_cv,blocked_cv
/// 1,48,440
/// 2,51,435
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub gate: u8,
    pub ambient_cv: u16,
    pub blocked_cv: u16,
}

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub bit_one: u8,
    pub bit_zero: u8,
    pub start: u8,
    /// Timing indicator LED, lit between the two gate trips; omit to run
    /// without one.
    pub indicator: Option<u8>,
    /// LCD wiring (hardware backend only).
    pub lcd_rs: Option<u8>,
    pub lcd_en: Option<u8>,
    pub lcd_data: Option<[u8; 4]>,
    /// MCP3008 bit-banged SPI wiring (hardware backend only).
    pub adc_clk: Option<u8>,
    pub adc_mosi: Option<u8>,
    pub adc_miso: Option<u8>,
    pub adc_cs: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Gates {
    pub gate1_channel: u8,
    pub gate2_channel: u8,
    /// Occlusion thresholds in hundredths of a volt. Depends on the LED and
    /// phototransistor pairing; a calibration CSV can replace these with
    /// measured values.
    pub gate1_threshold_cv: u16,
    pub gate2_threshold_cv: u16,
}

impl Default for Gates {
    fn default() -> Self {
        Self {
            gate1_channel: 0,
            gate2_channel: 1,
            gate1_threshold_cv: 230,
            gate2_threshold_cv: 230,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timer {
    /// Tick interval in microseconds (one tick = 0.1 ms by default).
    pub tick_us: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self { tick_us: 100 }
    }
}

/// Policy when both bit-entry lines assert in the same debounced event.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BitPolicy {
    #[default]
    PreferOne,
    PreferZero,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Decoder {
    pub bit_policy: BitPolicy,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Watchdog {
    /// Abort a trial if a gate stays untripped this long (ms). 0 disables
    /// the timeout and an armed gate waits indefinitely.
    pub arm_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub gates: Gates,
    #[serde(default)]
    pub timer: Timer,
    #[serde(default)]
    pub decoder: Decoder,
    #[serde(default)]
    pub watchdog: Watchdog,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Gates
        if self.gates.gate1_channel == self.gates.gate2_channel {
            eyre::bail!("gates.gate1_channel and gates.gate2_channel must differ");
        }
        if self.gates.gate1_threshold_cv == 0 || self.gates.gate1_threshold_cv > 500 {
            eyre::bail!("gates.gate1_threshold_cv must be in (0, 500]");
        }
        if self.gates.gate2_threshold_cv == 0 || self.gates.gate2_threshold_cv > 500 {
            eyre::bail!("gates.gate2_threshold_cv must be in (0, 500]");
        }

        // Timer: the display budget is 6 tick digits (~100 s at 100 us), so
        // the interval must stay sub-millisecond-ish to be useful, and
        // anything below 10 us cannot be serviced from userspace.
        if !(10..=10_000).contains(&self.timer.tick_us) {
            eyre::bail!("timer.tick_us must be in [10, 10000]");
        }

        // Pins: the three buttons must be distinct lines.
        let b = &self.pins;
        if b.bit_one == b.bit_zero || b.bit_one == b.start || b.bit_zero == b.start {
            eyre::bail!("pins.bit_one, pins.bit_zero and pins.start must be distinct");
        }

        // LCD wiring is all-or-nothing.
        let lcd_parts = [
            b.lcd_rs.is_some(),
            b.lcd_en.is_some(),
            b.lcd_data.is_some(),
        ];
        if lcd_parts.iter().any(|&p| p) && !lcd_parts.iter().all(|&p| p) {
            eyre::bail!("pins: lcd_rs, lcd_en and lcd_data must be given together");
        }

        // ADC wiring is all-or-nothing too.
        let adc_parts = [
            b.adc_clk.is_some(),
            b.adc_mosi.is_some(),
            b.adc_miso.is_some(),
            b.adc_cs.is_some(),
        ];
        if adc_parts.iter().any(|&p| p) && !adc_parts.iter().all(|&p| p) {
            eyre::bail!("pins: adc_clk, adc_mosi, adc_miso and adc_cs must be given together");
        }
        if adc_parts.iter().all(|&p| p)
            && (self.gates.gate1_channel > 7 || self.gates.gate2_channel > 7)
        {
            eyre::bail!("gates channels must be in [0, 7] for the MCP3008 backend");
        }

        Ok(())
    }
}

/// Thresholds derived from a calibration CSV, hundredths of a volt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateThresholds {
    pub gate1_cv: u16,
    pub gate2_cv: u16,
}

/// Minimum contrast between ambient and occluded readings for a usable gate.
const MIN_CONTRAST_CV: u16 = 20;

impl GateThresholds {
    /// Derive per-gate thresholds as the midpoint of the averaged ambient and
    /// occluded readings. Multiple rows per gate are averaged; each gate must
    /// appear at least once, and every row must show real contrast.
    pub fn from_rows(rows: &[CalibrationRow]) -> eyre::Result<Self> {
        let mut sums = [(0u32, 0u32, 0u32); 2]; // (ambient, blocked, count)
        for (idx, row) in rows.iter().enumerate() {
            let slot = match row.gate {
                1 => 0,
                2 => 1,
                other => eyre::bail!("row {}: gate must be 1 or 2, got {other}", idx + 2),
            };
            if row.ambient_cv > 500 || row.blocked_cv > 500 {
                eyre::bail!("row {}: readings must be in [0, 500]", idx + 2);
            }
            if row.blocked_cv < row.ambient_cv + MIN_CONTRAST_CV {
                eyre::bail!(
                    "row {}: blocked reading {} too close to ambient {} (need >= {} cv contrast)",
                    idx + 2,
                    row.blocked_cv,
                    row.ambient_cv,
                    MIN_CONTRAST_CV
                );
            }
            sums[slot].0 += u32::from(row.ambient_cv);
            sums[slot].1 += u32::from(row.blocked_cv);
            sums[slot].2 += 1;
        }

        let midpoint = |(ambient, blocked, n): (u32, u32, u32), gate: u8| -> eyre::Result<u16> {
            if n == 0 {
                eyre::bail!("calibration has no rows for gate {gate}");
            }
            let avg_ambient = ambient / n;
            let avg_blocked = blocked / n;
            Ok(((avg_ambient + avg_blocked) / 2) as u16)
        };

        Ok(Self {
            gate1_cv: midpoint(sums[0], 1)?,
            gate2_cv: midpoint(sums[1], 2)?,
        })
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<GateThresholds> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["gate", "ambient_cv", "blocked_cv"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'gate,ambient_cv,blocked_cv', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    GateThresholds::from_rows(&rows)
}
