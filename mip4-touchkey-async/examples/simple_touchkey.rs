//! Runs the touchkey core against stub platform bindings on the host,
//! decoding a canned interrupt payload. On real hardware the `Gpios`,
//! `Regulators` and `InputSink` implementations come from the platform and
//! the payload bytes from the bus transport.

use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use mip4_touchkey_async::{
    resolve, ChargerStatus, GpioLine, Gpios, InputSink, KeyCode, NoRegulators, RawConfig,
    TouchKeyController,
};

struct HostPin {
    line: GpioLine,
}

impl ErrorType for HostPin {
    type Error = Infallible;
}

impl OutputPin for HostPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        println!("gpio {} -> low", self.line.0);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        println!("gpio {} -> high", self.line.0);
        Ok(())
    }
}

impl InputPin for HostPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }
}

struct HostGpios;

impl Gpios for HostGpios {
    type Input = HostPin;
    type Output = HostPin;
    type Irq = u32;
    type Error = Infallible;

    fn request_input(&mut self, line: GpioLine) -> Result<HostPin, Infallible> {
        println!("gpio {} requested as input", line.0);
        Ok(HostPin { line })
    }

    fn request_output(&mut self, line: GpioLine, initial_high: bool) -> Result<HostPin, Infallible> {
        println!("gpio {} requested as output ({})", line.0, initial_high);
        Ok(HostPin { line })
    }

    fn irq_source(&mut self, pin: &HostPin) -> u32 {
        pin.line.0
    }
}

struct HostDelay;

impl DelayNs for HostDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }
}

struct PrintSink;

impl InputSink for PrintSink {
    fn key_event(&mut self, code: KeyCode, pressed: bool) {
        println!("key {} {}", code.0, if pressed { "pressed" } else { "released" });
    }

    fn grip_event(&mut self, id: u8, pressed: bool, strength: u16) {
        println!("grip {id} pressed={pressed} strength={strength}");
    }

    fn sync(&mut self) {
        println!("-- sync --");
    }
}

fn main() {
    let raw = RawConfig {
        irq_gpio: Some(GpioLine(17)),
        power_gpio: Some(GpioLine(21)),
        event_format: 4,
        ..Default::default()
    };

    embassy_futures::block_on(async {
        let device = resolve(&raw, &mut HostGpios).expect("config resolution");
        let (mut touchkey, irq) = TouchKeyController::new(device, NoRegulators, HostDelay);
        println!("irq source: {irq}");

        touchkey.power_on().await.expect("power on");
        println!("irq pending: {}", touchkey.irq_pending());

        let mut sink = PrintSink;
        // Press "recent", press grip channel 1, release "back".
        touchkey.handle_packet(&[0x81, 0x30, 0xC1, 0x55, 0x02, 0x00], &mut sink);

        touchkey.charger_event(ChargerStatus::Connected);

        touchkey.suspend().expect("suspend");
        touchkey.resume(&mut sink).await.expect("resume");
    });
}
