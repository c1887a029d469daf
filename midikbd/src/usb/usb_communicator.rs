use usb_device::{
    class_prelude::{UsbBus, UsbBusAllocator},
    device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid},
    LangID, UsbError,
};
use usbd_hid::{descriptor::SerializedDescriptor, hid_class::HIDClass};

use crate::keyboard::{ExternalCommunicator, Report};

use super::HidKeyboardReport;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub manufacturer: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub product_name: &'static str,
    pub serial_number: &'static str,
}

/// The device-side USB transport: one HID keyboard class on the given bus.
/// The host cannot tell this apart from an ordinary keyboard.
pub struct UsbCommunicator<'a, B: UsbBus> {
    usb_device: UsbDevice<'a, B>,
    keyboard_hid: HIDClass<'a, B>,
}

impl<'a, B: UsbBus> UsbCommunicator<'a, B> {
    pub fn new(
        device_info: DeviceInfo,
        usb_bus_alloc: &'a UsbBusAllocator<B>,
    ) -> UsbCommunicator<'a, B> {
        let keyboard_hid = HIDClass::new(usb_bus_alloc, HidKeyboardReport::desc(), 10);
        let descriptors = StringDescriptors::new(LangID::EN_US)
            .manufacturer(device_info.manufacturer)
            .serial_number(device_info.serial_number)
            .product(device_info.product_name);
        let usb_device = UsbDeviceBuilder::new(
            usb_bus_alloc,
            UsbVidPid(device_info.vendor_id, device_info.product_id),
        )
        .strings(&[descriptors])
        .expect("Failed to create string descriptors")
        .device_class(0)
        .build();

        UsbCommunicator {
            usb_device,
            keyboard_hid,
        }
    }

    pub fn poll(&mut self) {
        self.usb_device.poll(&mut [&mut self.keyboard_hid]);
    }

    pub fn state(&self) -> UsbDeviceState {
        self.usb_device.state()
    }
}

impl<'a, B: UsbBus> ExternalCommunicator for UsbCommunicator<'a, B> {
    type Error = UsbError;

    fn is_ready(&self) -> bool {
        self.usb_device.state() == UsbDeviceState::Configured
    }

    fn send_report(&self, report: &Report) -> Result<(), UsbError> {
        self.keyboard_hid
            .push_input(&HidKeyboardReport::from(report))?;
        Ok(())
    }
}
