mod hid_report;
mod usb_communicator;

pub use hid_report::HidKeyboardReport;
pub use usb_communicator::{DeviceInfo, UsbCommunicator};
