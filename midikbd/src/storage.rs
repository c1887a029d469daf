use core::fmt::Debug;

mod line_reader;

pub use line_reader::{LineReader, LINE_BUFFER_LEN};

/// Byte-oriented read access to one open file. `Ok(0)` means end of file.
pub trait FileSource {
    type Error: Debug;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// The card (or whatever holds the config): a flat root listing plus
/// open-by-name. Directories are the collaborator's problem; only file
/// names reach the visitor.
pub trait Storage {
    type Error: Debug;
    type File: FileSource;

    fn list_root<F: FnMut(&str)>(&mut self, visit: F) -> Result<(), Self::Error>;

    fn open(&mut self, name: &str) -> Result<Self::File, Self::Error>;
}
