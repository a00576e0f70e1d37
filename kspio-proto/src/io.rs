//! Byte-level I/O seams between the framing code and the serial port.
//!
//! Both traits are non-blocking on the read side: the decoder asks how many
//! bytes are waiting and never reads past that.

/// Non-blocking byte input.
pub trait ByteSource {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> usize;

    /// Read one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Byte output. Writes are assumed to eventually succeed.
pub trait ByteSink {
    type Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn bytes_available(&mut self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(bytes)
    }
}

/// Adapter from `embedded-io` reader/writer to [`ByteSource`]/[`ByteSink`].
///
/// The reader side needs `ReadReady` so that polling never blocks; a port
/// that only reports readiness (not a count) is treated as having one byte.
#[cfg(feature = "embedded-io")]
pub struct IoPort<T> {
    inner: T,
}

#[cfg(feature = "embedded-io")]
impl<T> IoPort<T> {
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(feature = "embedded-io")]
impl<T: embedded_io::Read + embedded_io::ReadReady> ByteSource for IoPort<T> {
    fn bytes_available(&mut self) -> usize {
        match self.inner.read_ready() {
            Ok(true) => 1,
            _ => 0,
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.bytes_available() == 0 {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

#[cfg(feature = "embedded-io")]
impl<T: embedded_io::Write> ByteSink for IoPort<T> {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.inner.write_all(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(bytes)
    }
}
