//! In-memory stand-ins for the hardware collaborators, for unit tests and
//! host-side experiments. Enabled under `cfg(test)` or the `test-utils`
//! feature.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use heapless::Vec;

use crate::keyboard::{Clock, ExternalCommunicator, Report};
use crate::midi::{MidiEvent, MidiSource};
use crate::storage::{FileSource, Storage};

/// Fixed clock advanced by hand from the test body.
#[derive(Debug, Default)]
pub struct TestClock {
    now_ms: Cell<u64>,
}

impl TestClock {
    pub fn new() -> Self {
        TestClock::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Records every report "sent to the host" for later inspection.
#[derive(Debug)]
pub struct ReportSink {
    reports: RefCell<Vec<Report, 32>>,
    ready: Cell<bool>,
}

impl ReportSink {
    pub fn new() -> Self {
        ReportSink {
            reports: RefCell::new(Vec::new()),
            ready: Cell::new(true),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    /// Hands over everything recorded so far and starts fresh.
    pub fn take(&self) -> Vec<Report, 32> {
        core::mem::take(&mut *self.reports.borrow_mut())
    }
}

impl Default for ReportSink {
    fn default() -> Self {
        ReportSink::new()
    }
}

impl ExternalCommunicator for ReportSink {
    type Error = Infallible;

    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn send_report(&self, report: &Report) -> Result<(), Infallible> {
        self.reports
            .borrow_mut()
            .push(*report)
            .expect("test sink overflow: take() the reports between phases");
        Ok(())
    }
}

/// Plays back a fixed event list, one event per poll.
#[derive(Debug)]
pub struct ScriptedMidi {
    events: Vec<MidiEvent, 16>,
    next: usize,
}

impl ScriptedMidi {
    pub fn new(events: &[MidiEvent]) -> Self {
        let mut owned = Vec::new();
        for event in events {
            owned.push(*event).expect("script longer than 16 events");
        }
        ScriptedMidi {
            events: owned,
            next: 0,
        }
    }
}

impl MidiSource for ScriptedMidi {
    fn poll(&mut self) -> Option<MidiEvent> {
        let event = self.events.get(self.next).copied();
        if event.is_some() {
            self.next += 1;
        }
        event
    }
}

/// A file made of borrowed bytes.
#[derive(Debug)]
pub struct MemFile<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> MemFile<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        MemFile { bytes, pos: 0 }
    }
}

impl FileSource for MemFile<'_> {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let remaining = &self.bytes[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// A root directory of (name, contents) pairs, listed in declaration order.
#[derive(Debug)]
pub struct MemStorage<'a> {
    files: &'a [(&'a str, &'a str)],
}

/// The one way `MemStorage` can fail: asking for a name it does not hold.
#[derive(Debug)]
pub struct NotFound;

impl<'a> MemStorage<'a> {
    pub fn new(files: &'a [(&'a str, &'a str)]) -> Self {
        MemStorage { files }
    }
}

impl<'a> Storage for MemStorage<'a> {
    type Error = NotFound;
    type File = MemFile<'a>;

    fn list_root<F: FnMut(&str)>(&mut self, mut visit: F) -> Result<(), NotFound> {
        for (name, _) in self.files {
            visit(name);
        }
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<MemFile<'a>, NotFound> {
        self.files
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, contents)| MemFile::new(contents.as_bytes()))
            .ok_or(NotFound)
    }
}

/// Raw serial bytes behind the embedded-hal 0.2 `serial::Read` trait; runs
/// dry with `WouldBlock` like an idle UART.
#[derive(Debug)]
pub struct ByteStream<'a> {
    bytes: &'a [u8],
    next: usize,
}

impl<'a> ByteStream<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteStream { bytes, next: 0 }
    }
}

impl embedded_hal_0_2::serial::Read<u8> for ByteStream<'_> {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        let Some(&byte) = self.bytes.get(self.next) else {
            return Err(nb::Error::WouldBlock);
        };
        self.next += 1;
        Ok(byte)
    }
}
