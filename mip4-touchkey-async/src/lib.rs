//! A `no_std` driver core for the MELFAS MIP4 touchkey controller.
//!
//! The crate decodes the controller's interrupt-driven event stream into
//! key and grip events for an injected input sink, and manages the sensor's
//! power domain across the two supported board topologies: regulator
//! supplied rails or discrete GPIO enable lines, with an optional shared
//! bus-enable line either way.
//!
//! Bus transport, interrupt dispatch and the OS input subsystem stay
//! outside: the platform hands raw payload bytes to
//! [`TouchKeyController::handle_packet`] and implements the [`Gpios`],
//! [`Regulators`] and [`InputSink`] seams.
//!
//! # Usage
//!
//! ```ignore
//! use mip4_touchkey_async::{resolve, GpioLine, RawConfig, TouchKeyController};
//!
//! let raw = RawConfig {
//!     irq_gpio: Some(GpioLine(17)),
//!     power_gpio: Some(GpioLine(21)),
//!     event_format: 4,
//!     ..Default::default()
//! };
//! let device = resolve(&raw, &mut platform_gpios)?;
//! let (mut touchkey, irq) = TouchKeyController::new(device, platform_regulators, delay);
//!
//! transport.register_irq(irq);
//! touchkey.power_on().await?;
//! loop {
//!     let payload = transport.wait_for_payload().await?;
//!     touchkey.handle_packet(&payload, &mut sink);
//! }
//! ```
//!
//! A complete host-runnable wiring with stub platform bindings lives in
//! `examples/simple_touchkey.rs`.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod event;
pub mod keymap;
pub mod power;
pub mod report;
pub mod touchkey;

pub use config::{resolve, ConfigError, GpioLine, Gpios, RawConfig, ResolvedDevice, ResolvedSupply};
pub use event::{DecodeError, EventFormat, EventKind, EventPackets, EventRecord};
pub use keymap::{KeyCode, KeyMap, KEY_BACK, KEY_RECENT, MAX_KEYS};
pub use power::{
    NoRegulators, PowerController, PowerError, PowerSupply, Regulators, Supply,
    POWER_ON_SETTLE_MS,
};
pub use report::{clear_keys, report_packets, InputSink};
pub use touchkey::{
    Capabilities, ChargerListener, ChargerStatus, NoListener, TouchKeyController,
};
