use core::fmt::Debug;

use super::Report;

/// Outgoing side of the translation: whatever carries finished keyboard
/// reports to the host. Each `send_report` call must leave the flushed state
/// observable before the next one.
pub trait ExternalCommunicator {
    type Error: Debug;

    fn is_ready(&self) -> bool;

    fn send_report(&self, report: &Report) -> Result<(), Self::Error>;
}

impl<C: ExternalCommunicator + ?Sized> ExternalCommunicator for &C {
    type Error = C::Error;

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn send_report(&self, report: &Report) -> Result<(), Self::Error> {
        (**self).send_report(report)
    }
}
