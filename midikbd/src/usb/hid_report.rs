use usbd_hid::descriptor::generator_prelude::*;
use usbd_hid_macros::gen_hid_descriptor;

use crate::keyboard::Report;

/// Boot-compatible keyboard report: modifier bits, one reserved byte, six
/// key-code slots.
#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = GENERIC_DESKTOP, usage = KEYBOARD) = {
        (usage_page = KEYBOARD, usage_min = 0xe0, usage_max = 0xe7) = {
            #[packed_bits 8] #[item_settings data,variable,absolute] modifier=input;
        };
        (usage_min = 0x00, usage_max = 0xff) = {
            #[item_settings constant,variable,absolute] reserved=input;
        };
        (usage_page = KEYBOARD, usage_min = 0x00, usage_max = 0xdd) = {
            #[item_settings data,array,absolute] key_codes=input;
        };
    }
)]
#[repr(C)]
pub struct HidKeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub key_codes: [u8; 6],
}

impl From<&Report> for HidKeyboardReport {
    fn from(report: &Report) -> Self {
        HidKeyboardReport {
            modifier: report.modifier,
            reserved: 0,
            key_codes: report.key_codes,
        }
    }
}
