mod clock;
mod controller;
mod external_communicator;
mod fast_press;
mod key;
mod key_mapping;
mod pressed_keys;
mod profile;
mod profiles;
mod report;

pub use clock::Clock;
pub use controller::{Controller, MAX_MIDI_SOURCES};
pub use external_communicator::ExternalCommunicator;
pub use fast_press::{FastPressTimer, FastPressTimers};
pub use key::Key;
pub use key_mapping::KeyMapping;
pub use pressed_keys::PressedKeys;
pub use profile::{Profile, NOTE_COUNT, PROFILE_NAME_LEN};
pub use profiles::{Profiles, MAX_PROFILES};
pub use report::{batch, Report, NUM_ROLLOVER};
