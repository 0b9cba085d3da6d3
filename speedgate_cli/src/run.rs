//! Trial wiring: config mapping, rig assembly, and run execution.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use speedgate_core::panel;
use speedgate_core::{
    DecoderConfig, DistanceConfig, GateConfig, RunSummary, TimerConfig, TrialBuilder,
    WatchdogConfig, decode_distance, run_trials,
};
use speedgate_traits::{AnalogSampler, BitEntry, DigitalOutput, Display, StartButton};

use crate::cli::RtLock;
use crate::rt::setup_rt_once;

/// Everything a run needs beyond the physical rig.
pub struct TrapParams {
    pub distance: Option<DistanceConfig>,
    pub gates: GateConfig,
    pub timer: TimerConfig,
    pub decoder: DecoderConfig,
    pub watchdog: WatchdogConfig,
    pub trials: u32,
}

pub struct RunOutcome {
    pub distance: DistanceConfig,
    pub summary: RunSummary,
}

/// Map the file config plus CLI overrides into core parameters.
pub fn build_params(
    cfg: &speedgate_config::Config,
    thresholds: Option<&speedgate_config::GateThresholds>,
    distance: Option<DistanceConfig>,
    threshold_cv_override: Option<u16>,
    arm_timeout_ms_override: Option<u64>,
    trials: u32,
) -> TrapParams {
    let mut gates = GateConfig::from(&cfg.gates);
    if let Some(t) = thresholds {
        gates.gate1_threshold_cv = t.gate1_cv;
        gates.gate2_threshold_cv = t.gate2_cv;
    }
    if let Some(cv) = threshold_cv_override {
        gates.gate1_threshold_cv = cv;
        gates.gate2_threshold_cv = cv;
    }
    let mut watchdog = WatchdogConfig::from(&cfg.watchdog);
    if let Some(ms) = arm_timeout_ms_override {
        watchdog.arm_timeout_ms = ms.min(u64::from(u32::MAX)) as u32;
    }
    TrapParams {
        distance,
        gates,
        timer: TimerConfig::from(&cfg.timer),
        decoder: DecoderConfig::from(&cfg.decoder),
        watchdog,
        trials,
    }
}

/// Resolve the distance, assemble the trial, and run it to completion.
///
/// `controls` is one object because on real hardware the bit pad and the
/// start button share the same debounced GPIO block.
fn trap_run<A, D, K>(
    sampler: A,
    mut display: D,
    controls: &mut K,
    indicator: Option<(Box<dyn DigitalOutput>, u8)>,
    params: TrapParams,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<RunOutcome>
where
    A: AnalogSampler,
    D: Display,
    K: BitEntry + StartButton,
{
    display
        .init()
        .map_err(|e| eyre::eyre!("display init failed: {e}"))?;

    let distance = match params.distance {
        Some(d) => d,
        None => {
            panel::prompt_distance(&mut display)?;
            decode_distance(controls, &mut display, params.decoder.bit_policy)?
        }
    };
    panel::show_distance(&mut display, distance.distance_fixed())?;

    let mut builder = TrialBuilder::new()
        .sampler(sampler)
        .display(display)
        .distance(distance)
        .gates(params.gates)
        .timer(params.timer)
        .watchdog(params.watchdog);
    if let Some((output, pin)) = indicator {
        builder = builder.indicator(output, pin);
    }
    let mut trial = builder.build().wrap_err("trial assembly failed")?;

    let summary = run_trials(&mut trial, controls, params.trials, shutdown)?;
    Ok(RunOutcome { distance, summary })
}

#[cfg(not(feature = "hardware"))]
mod rig {
    use super::*;
    use std::time::Duration;

    use speedgate_hardware::{AutoStart, PassProfile, ScriptedBitPad, SimulatedGates, SimulatedPin};
    use speedgate_traits::{BitPress, BoxedError, MonotonicClock};

    /// Bit pad and start button fused into one object, matching the shape
    /// of the debounced GPIO block on real hardware.
    pub struct SimControls {
        pad: ScriptedBitPad,
        start: AutoStart<MonotonicClock>,
    }

    impl BitEntry for SimControls {
        fn next_press(&mut self) -> Result<BitPress, BoxedError> {
            self.pad.next_press()
        }
    }

    impl StartButton for SimControls {
        fn wait_press(&mut self) -> Result<(), BoxedError> {
            self.start.wait_press()
        }
    }

    pub fn run(
        cfg: &speedgate_config::Config,
        params: TrapParams,
        shutdown: &Arc<AtomicBool>,
    ) -> eyre::Result<RunOutcome> {
        tracing::info!("using simulated rig");
        let sampler = SimulatedGates::new(
            cfg.gates.gate1_channel,
            cfg.gates.gate2_channel,
            PassProfile::default(),
            MonotonicClock,
        );
        // Echo the panel to stdout unless JSON output was requested.
        let echo = !crate::cli::JSON_MODE.get().copied().unwrap_or(false);
        let display = speedgate_hardware::ConsoleDisplay::new(echo);
        // Without flags the sim still needs a distance; replay a one-foot
        // entry so the run is self-contained.
        let byte = params.distance.map_or(0x60, |d| d.byte());
        let mut controls = SimControls {
            pad: ScriptedBitPad::from_byte(byte),
            start: AutoStart::new(Duration::from_millis(50), MonotonicClock),
        };
        let indicator = cfg
            .pins
            .indicator
            .map(|pin| (Box::new(SimulatedPin::new()) as Box<dyn DigitalOutput>, pin));
        trap_run(sampler, display, &mut controls, indicator, params, shutdown)
    }

    pub fn self_check(cfg: &speedgate_config::Config) -> eyre::Result<()> {
        let mut sampler = SimulatedGates::new(
            cfg.gates.gate1_channel,
            cfg.gates.gate2_channel,
            PassProfile::default(),
            MonotonicClock,
        );
        for channel in [cfg.gates.gate1_channel, cfg.gates.gate2_channel] {
            let raw = sampler
                .sample(channel)
                .map_err(|e| eyre::eyre!("sampler check failed: {e}"))?;
            tracing::info!(channel, raw, "gate sample ok");
        }
        let mut display = speedgate_hardware::ConsoleDisplay::new(false);
        display
            .init()
            .map_err(|e| eyre::eyre!("display check failed: {e}"))?;
        Ok(())
    }
}

#[cfg(feature = "hardware")]
mod rig {
    use super::*;

    use speedgate_hardware::buttons::{ButtonPins, DebouncedPad};
    use speedgate_hardware::gpio::{GpioInputs, GpioOutputs};
    use speedgate_hardware::lcd::Lcd4Bit;
    use speedgate_hardware::mcp3008::Mcp3008;
    use speedgate_traits::MonotonicClock;

    fn wiring_error(what: &str) -> eyre::Report {
        eyre::eyre!("hardware backend requires {what} in [pins]")
    }

    pub fn run(
        cfg: &speedgate_config::Config,
        params: TrapParams,
        shutdown: &Arc<AtomicBool>,
    ) -> eyre::Result<RunOutcome> {
        tracing::info!("using GPIO rig");
        let gpio = speedgate_hardware::rppal::gpio::Gpio::new().wrap_err("open GPIO")?;

        let (rs, en, data) = match (cfg.pins.lcd_rs, cfg.pins.lcd_en, cfg.pins.lcd_data) {
            (Some(rs), Some(en), Some(data)) => (rs, en, data),
            _ => return Err(wiring_error("lcd_rs, lcd_en, lcd_data")),
        };
        let display = Lcd4Bit::new(&gpio, rs, en, data).wrap_err("open LCD pins")?;

        let (clk, mosi, miso, cs) = match (
            cfg.pins.adc_clk,
            cfg.pins.adc_mosi,
            cfg.pins.adc_miso,
            cfg.pins.adc_cs,
        ) {
            (Some(clk), Some(mosi), Some(miso), Some(cs)) => (clk, mosi, miso, cs),
            _ => return Err(wiring_error("adc_clk, adc_mosi, adc_miso, adc_cs")),
        };
        let sampler = Mcp3008::new(&gpio, clk, mosi, miso, cs).wrap_err("open ADC pins")?;

        let button_pins = ButtonPins {
            bit_one: cfg.pins.bit_one,
            bit_zero: cfg.pins.bit_zero,
            start: cfg.pins.start,
        };
        let inputs = GpioInputs::open(
            &gpio,
            &[cfg.pins.bit_one, cfg.pins.bit_zero, cfg.pins.start],
        )
        .wrap_err("open button pins")?;
        let mut controls = DebouncedPad::new(inputs, MonotonicClock, button_pins, true);

        let indicator = match cfg.pins.indicator {
            Some(pin) => {
                let out = GpioOutputs::open(&gpio, &[pin]).wrap_err("open indicator pin")?;
                Some((Box::new(out) as Box<dyn DigitalOutput>, pin))
            }
            None => None,
        };

        trap_run(sampler, display, &mut controls, indicator, params, shutdown)
    }

    pub fn self_check(cfg: &speedgate_config::Config) -> eyre::Result<()> {
        let gpio = speedgate_hardware::rppal::gpio::Gpio::new().wrap_err("open GPIO")?;
        GpioInputs::open(
            &gpio,
            &[cfg.pins.bit_one, cfg.pins.bit_zero, cfg.pins.start],
        )
        .wrap_err("open button pins")?;
        tracing::info!("GPIO present, button pins claimable");
        Ok(())
    }
}

/// Execute the run against whichever rig this binary was built for.
pub fn run_with_rt(
    cfg: &speedgate_config::Config,
    params: TrapParams,
    rt: bool,
    rt_prio: Option<i32>,
    rt_lock: Option<RtLock>,
    rt_cpu: Option<usize>,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<RunOutcome> {
    setup_rt_once(rt, rt_prio, rt_lock.unwrap_or(RtLock::os_default()), rt_cpu);
    rig::run(cfg, params, shutdown)
}

pub fn self_check(cfg: &speedgate_config::Config) -> eyre::Result<()> {
    rig::self_check(cfg)
}
