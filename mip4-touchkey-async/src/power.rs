//! Power domain control for the sensor.
//!
//! A device is powered either from named regulators or from discrete
//! enable lines; the path is fixed when the configuration is resolved and
//! never changes afterwards. Transitions are idempotent: asking for the
//! current state succeeds without touching the supply.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

/// Post-power-on settle time. The sensor needs boot time before it accepts
/// transport I/O.
pub const POWER_ON_SETTLE_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// The named regulator could not be acquired.
    SupplyUnavailable(&'static str),
    /// A regulator or enable line refused the requested state.
    ControlFailed,
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerError::SupplyUnavailable(name) => write!(f, "regulator {name} unavailable"),
            PowerError::ControlFailed => write!(f, "supply control failed"),
        }
    }
}

/// Access to the platform regulator framework.
///
/// Handles are acquired per transition and handed back with
/// [`Regulators::put`]; the driver never keeps one open.
pub trait Regulators {
    type Handle;
    type Error: fmt::Debug;

    fn get(&mut self, name: &'static str) -> Result<Self::Handle, Self::Error>;
    fn enable(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error>;
    fn disable(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error>;
    fn is_enabled(&mut self, handle: &Self::Handle) -> bool;
    fn put(&mut self, handle: Self::Handle);
}

/// Provider for boards without regulator-supplied rails. Only fits the
/// [`Supply::Switched`] path, which never calls into it.
pub struct NoRegulators;

impl Regulators for NoRegulators {
    type Handle = core::convert::Infallible;
    type Error = &'static str;

    fn get(&mut self, _name: &'static str) -> Result<Self::Handle, Self::Error> {
        Err("no regulator framework")
    }

    fn enable(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error> {
        match *handle {}
    }

    fn disable(&mut self, handle: &mut Self::Handle) -> Result<(), Self::Error> {
        match *handle {}
    }

    fn is_enabled(&mut self, handle: &Self::Handle) -> bool {
        match *handle {}
    }

    fn put(&mut self, handle: Self::Handle) {
        match handle {}
    }
}

/// One side of a power transition, regardless of path.
pub trait PowerSupply {
    fn set_power(&mut self, enable: bool) -> Result<(), PowerError>;
}

/// The supply path selected at configuration-resolution time.
pub enum Supply<R: Regulators, O: OutputPin> {
    /// Rails come from named regulators; either name may be absent.
    Regulated {
        regs: R,
        power_name: Option<&'static str>,
        bus_name: Option<&'static str>,
    },
    /// Rails are switched by discrete enable lines; an absent line is
    /// skipped, not an error.
    Switched { power: Option<O>, bus: Option<O> },
}

impl<R: Regulators, O: OutputPin> PowerSupply for Supply<R, O> {
    fn set_power(&mut self, enable: bool) -> Result<(), PowerError> {
        match self {
            Supply::Regulated {
                regs,
                power_name,
                bus_name,
            } => {
                for name in [*power_name, *bus_name].into_iter().flatten() {
                    set_regulator(regs, name, enable)?;
                }
                Ok(())
            }
            Supply::Switched { power, bus } => {
                for pin in [power.as_mut(), bus.as_mut()].into_iter().flatten() {
                    pin.set_state(enable.into()).map_err(|err| {
                        log::error!("enable line set failed: {err:?}");
                        PowerError::ControlFailed
                    })?;
                }
                Ok(())
            }
        }
    }
}

fn set_regulator<R: Regulators>(
    regs: &mut R,
    name: &'static str,
    enable: bool,
) -> Result<(), PowerError> {
    let mut handle = regs.get(name).map_err(|err| {
        log::error!("regulator {name} unavailable: {err:?}");
        PowerError::SupplyUnavailable(name)
    })?;

    let result = if enable {
        if regs.is_enabled(&handle) {
            Ok(())
        } else {
            regs.enable(&mut handle)
        }
    } else if regs.is_enabled(&handle) {
        regs.disable(&mut handle)
    } else {
        Ok(())
    };
    // The handle goes back even when the control call failed.
    regs.put(handle);

    result.map_err(|err| {
        log::error!("regulator {name} control failed: {err:?}");
        PowerError::ControlFailed
    })
}

/// Latched per-instance power state with idempotent transitions.
///
/// Errors leave the latch unchanged, so the caller can simply retry.
pub struct PowerController<S, D> {
    supply: S,
    delay: D,
    on: bool,
}

impl<S: PowerSupply, D: DelayNs> PowerController<S, D> {
    pub fn new(supply: S, delay: D) -> Self {
        Self {
            supply,
            delay,
            on: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Powers the sensor up and waits out its boot time.
    ///
    /// A redundant call is a successful no-op and skips the settle delay.
    pub async fn power_on(&mut self) -> Result<(), PowerError> {
        if self.on {
            log::info!("power already on - skip");
            return Ok(());
        }
        log::info!("power on");
        self.supply.set_power(true)?;
        self.on = true;
        self.delay.delay_ms(POWER_ON_SETTLE_MS).await;
        Ok(())
    }

    /// Powers the sensor down. A redundant call is a successful no-op.
    pub fn power_off(&mut self) -> Result<(), PowerError> {
        if !self.on {
            log::info!("power already off - skip");
            return Ok(());
        }
        log::info!("power off");
        self.supply.set_power(false)?;
        self.on = false;
        Ok(())
    }
}
