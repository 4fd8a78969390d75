//! Platform configuration resolution and pin ownership.
//!
//! Platform data arrives pre-parsed as a [`RawConfig`] in which absence is a
//! legitimate value. Resolution validates it, substitutes defaults, requests
//! ownership of the GPIO lines the device uses and fixes the power path.
//! Nothing partial escapes a failed resolution.

use core::fmt;

use embedded_hal::digital::OutputPin;

use crate::event::EventFormat;
use crate::keymap::{KeyCode, KeyMap};
use crate::power::{Regulators, Supply};

/// Identifies one line on the platform GPIO controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioLine(pub u32);

/// Access to the platform GPIO controller.
pub trait Gpios {
    type Input;
    type Output: OutputPin;
    /// Identifier the transport layer needs to register its interrupt
    /// handler.
    type Irq;
    type Error: fmt::Debug;

    fn request_input(&mut self, line: GpioLine) -> Result<Self::Input, Self::Error>;
    /// Requests an output line pre-driven to `initial_high`.
    fn request_output(&mut self, line: GpioLine, initial_high: bool)
        -> Result<Self::Output, Self::Error>;
    /// IRQ source behind a requested input line.
    fn irq_source(&mut self, pin: &Self::Input) -> Self::Irq;
}

/// Externally-parsed platform data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawConfig {
    /// Key codes in wire-ID order. `None` selects the built-in layout.
    pub key_codes: Option<&'static [KeyCode]>,
    pub power_reg_name: Option<&'static str>,
    pub bus_reg_name: Option<&'static str>,
    pub irq_gpio: Option<GpioLine>,
    pub power_gpio: Option<GpioLine>,
    pub bus_gpio: Option<GpioLine>,
    /// Format code from the controller's information registers.
    pub event_format: u8,
    /// Record stride in bytes; 0 selects the format's minimum.
    pub event_size: u8,
}

/// Fatal configuration failures; no device is constructed after one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No usable interrupt line was configured.
    MissingInterruptLine,
    /// The GPIO controller refused ownership of a line.
    GpioRequestFailed(GpioLine),
    /// The controller reported a format code this driver does not speak.
    UnknownEventFormat(u8),
    /// The configured stride cannot carry a record of the given format.
    RecordSizeMismatch {
        format: EventFormat,
        record_size: u8,
    },
    /// More key codes than the controller supports.
    TooManyKeys(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingInterruptLine => write!(f, "no interrupt line configured"),
            ConfigError::GpioRequestFailed(line) => {
                write!(f, "gpio line {} request failed", line.0)
            }
            ConfigError::UnknownEventFormat(raw) => write!(f, "unknown event format {raw}"),
            ConfigError::RecordSizeMismatch {
                format,
                record_size,
            } => write!(f, "record size {record_size} too small for {format:?}"),
            ConfigError::TooManyKeys(count) => write!(f, "{count} key codes configured"),
        }
    }
}

/// Power path selected by [`resolve`], before a regulator provider is
/// attached.
pub enum ResolvedSupply<O: OutputPin> {
    Regulated {
        power_name: Option<&'static str>,
        bus_name: Option<&'static str>,
    },
    Switched {
        power: Option<O>,
        bus: Option<O>,
    },
}

impl<O: OutputPin> ResolvedSupply<O> {
    /// Attaches the platform regulator provider, producing the live supply.
    ///
    /// A `Switched` path never calls into the provider;
    /// [`crate::power::NoRegulators`] fits there.
    pub fn with_regulators<R: Regulators>(self, regs: R) -> Supply<R, O> {
        match self {
            ResolvedSupply::Regulated {
                power_name,
                bus_name,
            } => Supply::Regulated {
                regs,
                power_name,
                bus_name,
            },
            ResolvedSupply::Switched { power, bus } => Supply::Switched { power, bus },
        }
    }

    pub fn is_regulated(&self) -> bool {
        matches!(self, ResolvedSupply::Regulated { .. })
    }
}

/// Validated device configuration with owned pins.
pub struct ResolvedDevice<B: Gpios> {
    pub key_map: KeyMap,
    pub format: EventFormat,
    pub record_size: u8,
    /// Interrupt line, requested as an input and owned for the device's
    /// lifetime.
    pub irq_pin: B::Input,
    /// Source id for transport-side interrupt registration.
    pub irq: B::Irq,
    pub supply: ResolvedSupply<B::Output>,
}

/// Merges platform data into the ready-to-use configuration.
///
/// The interrupt line is mandatory; key codes, regulator names and enable
/// lines are optional. Either regulator name selects the regulated power
/// path, otherwise the configured enable lines are requested as outputs
/// driven low.
pub fn resolve<B: Gpios>(raw: &RawConfig, gpios: &mut B) -> Result<ResolvedDevice<B>, ConfigError> {
    let format = EventFormat::from_raw(raw.event_format)
        .ok_or(ConfigError::UnknownEventFormat(raw.event_format))?;
    let record_size = match raw.event_size {
        0 => format.min_record_size(),
        size if size < format.min_record_size() => {
            return Err(ConfigError::RecordSizeMismatch {
                format,
                record_size: size,
            })
        }
        size => size,
    };

    let key_map = match raw.key_codes {
        Some(codes) => KeyMap::new(codes).ok_or(ConfigError::TooManyKeys(codes.len()))?,
        None => {
            log::info!("no key codes configured, using default layout");
            KeyMap::default_layout()
        }
    };

    let irq_line = raw.irq_gpio.ok_or(ConfigError::MissingInterruptLine)?;
    let irq_pin = gpios.request_input(irq_line).map_err(|err| {
        log::error!("irq gpio {} request failed: {err:?}", irq_line.0);
        ConfigError::GpioRequestFailed(irq_line)
    })?;
    let irq = gpios.irq_source(&irq_pin);

    let supply = if raw.power_reg_name.is_some() || raw.bus_reg_name.is_some() {
        ResolvedSupply::Regulated {
            power_name: raw.power_reg_name,
            bus_name: raw.bus_reg_name,
        }
    } else {
        ResolvedSupply::Switched {
            power: request_enable_line(gpios, raw.power_gpio)?,
            bus: request_enable_line(gpios, raw.bus_gpio)?,
        }
    };

    Ok(ResolvedDevice {
        key_map,
        format,
        record_size,
        irq_pin,
        irq,
        supply,
    })
}

fn request_enable_line<B: Gpios>(
    gpios: &mut B,
    line: Option<GpioLine>,
) -> Result<Option<B::Output>, ConfigError> {
    let Some(line) = line else {
        return Ok(None);
    };
    gpios.request_output(line, false).map(Some).map_err(|err| {
        log::error!("enable gpio {} request failed: {err:?}", line.0);
        ConfigError::GpioRequestFailed(line)
    })
}
