//! The touchkey device controller.
//!
//! Ties the decoder, the reporter and the power controller together behind
//! one device-instance struct, the shape probe/suspend/resume callers work
//! with.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::config::{Gpios, ResolvedDevice};
use crate::event::{EventFormat, EventPackets};
use crate::keymap::{KeyCode, KeyMap};
use crate::power::{PowerController, PowerError, PowerSupply, Regulators, Supply};
use crate::report::{clear_keys, report_packets, InputSink};

/// Charger connection state forwarded by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargerStatus {
    Disconnected,
    Connected,
}

/// Receives charger-status updates from the device instance.
pub trait ChargerListener {
    fn charger_status(&mut self, status: ChargerStatus);
}

/// Stand-in for devices with no registered charger listener.
pub struct NoListener;

impl ChargerListener for NoListener {
    fn charger_status(&mut self, _status: ChargerStatus) {}
}

/// Input capabilities the sink should register for this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities<'a> {
    pub keys: &'a [KeyCode],
    /// The device drives a misc LED (the `led` cargo feature).
    pub led: bool,
}

/// Driver instance for one MIP4 touchkey controller.
pub struct TouchKeyController<I, S, D, L = NoListener> {
    key_map: KeyMap,
    format: EventFormat,
    record_size: u8,
    irq_pin: I,
    power: PowerController<S, D>,
    listener: Option<L>,
}

impl<I, R, O, D> TouchKeyController<I, Supply<R, O>, D>
where
    R: Regulators,
    O: OutputPin,
    D: DelayNs,
{
    /// Builds the controller from a resolved configuration, handing back the
    /// IRQ source for transport-side registration.
    pub fn new<B>(device: ResolvedDevice<B>, regs: R, delay: D) -> (Self, B::Irq)
    where
        B: Gpios<Input = I, Output = O>,
    {
        let ResolvedDevice {
            key_map,
            format,
            record_size,
            irq_pin,
            irq,
            supply,
        } = device;
        let controller = Self {
            key_map,
            format,
            record_size,
            irq_pin,
            power: PowerController::new(supply.with_regulators(regs), delay),
            listener: None,
        };
        (controller, irq)
    }
}

impl<I, S, D> TouchKeyController<I, S, D, NoListener> {
    /// Registers the zero-or-one charger-status listener.
    pub fn with_charger_listener<L: ChargerListener>(
        self,
        listener: L,
    ) -> TouchKeyController<I, S, D, L> {
        TouchKeyController {
            key_map: self.key_map,
            format: self.format,
            record_size: self.record_size,
            irq_pin: self.irq_pin,
            power: self.power,
            listener: Some(listener),
        }
    }
}

impl<I, S, D, L> TouchKeyController<I, S, D, L> {
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn capabilities(&self) -> Capabilities<'_> {
        Capabilities {
            keys: self.key_map.codes(),
            led: cfg!(feature = "led"),
        }
    }

    /// Decodes one interrupt payload and reports it as a single batch.
    pub fn handle_packet<K: InputSink>(&self, buf: &[u8], sink: &mut K) {
        let records = EventPackets::new(buf, self.format, self.record_size, self.key_map.key_count());
        report_packets(records, &self.key_map, sink);
    }

    /// Releases every configured key. Call when the event stream is stale.
    pub fn clear_input<K: InputSink>(&self, sink: &mut K) {
        clear_keys(&self.key_map, sink);
    }
}

impl<I, S: PowerSupply, D: DelayNs, L> TouchKeyController<I, S, D, L> {
    pub fn is_powered(&self) -> bool {
        self.power.is_on()
    }

    pub async fn power_on(&mut self) -> Result<(), PowerError> {
        self.power.power_on().await
    }

    pub fn power_off(&mut self) -> Result<(), PowerError> {
        self.power.power_off()
    }

    /// Powers the sensor down for system sleep.
    pub fn suspend(&mut self) -> Result<(), PowerError> {
        self.power.power_off()
    }

    /// Powers the sensor back up and clears any key latched across the
    /// power cycle.
    pub async fn resume<K: InputSink>(&mut self, sink: &mut K) -> Result<(), PowerError> {
        self.power.power_on().await?;
        clear_keys(&self.key_map, sink);
        Ok(())
    }
}

impl<I: InputPin, S, D, L> TouchKeyController<I, S, D, L> {
    /// True while the interrupt line is asserted (active low).
    pub fn irq_pending(&mut self) -> bool {
        self.irq_pin.is_low().unwrap_or(false)
    }
}

impl<I, S, D, L: ChargerListener> TouchKeyController<I, S, D, L> {
    /// Forwards a charger-status update to the registered listener.
    pub fn charger_event(&mut self, status: ChargerStatus) {
        log::info!("charger status: {status:?}");
        if let Some(listener) = self.listener.as_mut() {
            listener.charger_status(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MockGpios;
    use crate::config::{resolve, GpioLine, RawConfig};
    use crate::keymap::{KEY_BACK, KEY_RECENT};
    use crate::power::NoRegulators;
    use crate::report::tests::{RecordingSink, SinkCall};
    use embassy_futures::block_on;

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn controller() -> TouchKeyController<GpioLine, Supply<NoRegulators, crate::config::tests::StubPin>, NoDelay>
    {
        let raw = RawConfig {
            irq_gpio: Some(GpioLine(7)),
            power_gpio: Some(GpioLine(8)),
            event_format: 4,
            ..Default::default()
        };
        let mut gpios = MockGpios::default();
        let device = resolve(&raw, &mut gpios).unwrap();
        let (controller, irq) = TouchKeyController::new(device, NoRegulators, NoDelay);
        assert_eq!(irq, 107);
        controller
    }

    #[test]
    fn interrupt_payload_becomes_one_batch() {
        let ctl = controller();
        let mut sink = RecordingSink::default();

        // press key 1, release key 2
        ctl.handle_packet(&[0x81, 0x40, 0x02, 0x00], &mut sink);

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Key(KEY_RECENT, true),
                SinkCall::Key(KEY_BACK, false),
                SinkCall::Sync,
            ]
        );
    }

    #[test]
    fn resume_powers_up_and_clears_keys() {
        let mut ctl = controller();
        let mut sink = RecordingSink::default();

        block_on(ctl.resume(&mut sink)).unwrap();

        assert!(ctl.is_powered());
        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Key(KEY_RECENT, false),
                SinkCall::Key(KEY_BACK, false),
                SinkCall::Sync,
            ]
        );
    }

    #[test]
    fn suspend_then_resume_round_trip() {
        let mut ctl = controller();
        let mut sink = RecordingSink::default();

        block_on(ctl.power_on()).unwrap();
        ctl.suspend().unwrap();
        assert!(!ctl.is_powered());
        block_on(ctl.resume(&mut sink)).unwrap();
        assert!(ctl.is_powered());
    }

    #[test]
    fn capabilities_expose_key_table() {
        let ctl = controller();
        let caps = ctl.capabilities();

        assert_eq!(caps.keys, &[KEY_RECENT, KEY_BACK]);
        assert_eq!(caps.led, cfg!(feature = "led"));
    }

    #[derive(Default)]
    struct RecordingListener {
        seen: Vec<ChargerStatus>,
    }

    impl ChargerListener for RecordingListener {
        fn charger_status(&mut self, status: ChargerStatus) {
            self.seen.push(status);
        }
    }

    #[test]
    fn charger_events_reach_the_listener() {
        let mut ctl = controller().with_charger_listener(RecordingListener::default());

        ctl.charger_event(ChargerStatus::Connected);
        ctl.charger_event(ChargerStatus::Disconnected);

        assert_eq!(
            ctl.listener.as_ref().unwrap().seen,
            vec![ChargerStatus::Connected, ChargerStatus::Disconnected]
        );
    }

    #[test]
    fn charger_events_without_listener_are_harmless() {
        let mut ctl = controller();
        ctl.charger_event(ChargerStatus::Connected);
    }
}
