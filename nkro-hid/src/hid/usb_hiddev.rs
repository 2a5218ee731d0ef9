use nkro_hid_lib::leds::Leds;
use nkro_hid_lib::report::REPORT_LEN;
use usb_device::bus::{UsbBus, UsbBusAllocator};
use usb_device::device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid};
use usb_device::prelude::BuilderError;
use usb_device::UsbError;
use usbd_hid::hid_class::HIDClass;

use crate::hid::descriptor::REPORT_DESCRIPTOR;
use crate::transmit::{ReportId, Transmit};

/// Largest report body plus its report id.
const MAX_FRAME: usize = REPORT_LEN + 1;

#[derive(Debug, Copy, Clone)]
pub struct UsbIdentity {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub serial_number: &'static str,
    /// Interrupt endpoint polling interval
    pub poll_ms: u8,
}

impl UsbIdentity {
    /// pid.codes test ids, don't ship with these.
    pub const TEST: Self = Self {
        vid: 0x16c0,
        pid: 0x27da,
        manufacturer: "nkro-hid",
        product: "NKRO Keyboard",
        serial_number: "1",
        poll_ms: 1,
    };
}

/// Composite keyboard/mouse HID device on top of a `usb-device` bus.
pub struct UsbHiddev<'a, B: UsbBus> {
    hid: HIDClass<'a, B>,
    dev: UsbDevice<'a, B>,
}

impl<'a, B: UsbBus> UsbHiddev<'a, B> {
    /// # Errors
    /// The identity strings or descriptor sizes were refused by the device builder
    pub fn new(
        allocator: &'a UsbBusAllocator<B>,
        identity: &UsbIdentity,
    ) -> Result<Self, BuilderError> {
        // Ordering here is extremely important, class before device.
        let hid = HIDClass::new(allocator, REPORT_DESCRIPTOR, identity.poll_ms);
        let dev = UsbDeviceBuilder::new(allocator, UsbVidPid(identity.vid, identity.pid))
            .strings(&[StringDescriptors::default()
                .manufacturer(identity.manufacturer)
                .product(identity.product)
                .serial_number(identity.serial_number)])?
            .device_class(0)
            .build();
        Ok(Self { hid, dev })
    }

    /// Has to be called at least every 10ms, or from the USB interrupt.
    #[inline]
    pub fn poll(&mut self) -> bool {
        self.dev.poll(&mut [&mut self.hid])
    }

    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.dev.state() == UsbDeviceState::Configured
    }

    /// Latest LED state written by the host, if there's a new one.
    pub fn read_leds(&mut self) -> Option<Leds> {
        let mut buf = [0u8; 8];
        let read = self.hid.pull_raw_output(&mut buf).ok()?;
        Leds::from_output_report(&buf[..read], ReportId::NkroKeyboard.byte())
    }
}

impl<B: UsbBus> Transmit for UsbHiddev<'_, B> {
    type Error = UsbError;

    fn transmit(&mut self, report_id: ReportId, payload: &[u8]) -> Result<(), Self::Error> {
        let mut buf = [0u8; MAX_FRAME];
        let frame = buf
            .get_mut(..=payload.len())
            .ok_or(UsbError::BufferOverflow)?;
        frame[0] = report_id.byte();
        frame[1..].copy_from_slice(payload);
        let written = self.hid.push_raw_input(frame)?;
        if written == frame.len() {
            Ok(())
        } else {
            Err(UsbError::BufferOverflow)
        }
    }
}
