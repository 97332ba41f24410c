//! Writer storage: growth policies and the providers that lease buffers.
//!
//! A provider hands out a `Vec<U>` whose *length* is the usable capacity (the
//! writer fills it by index and tracks its own write position). Growing
//! always goes through the provider so pooled storage is returned to its pool
//! and thread-local storage stays with its thread.

mod growth;
#[cfg(feature = "std")]
mod local;
#[cfg(feature = "std")]
mod pool;

use alloc::{vec, vec::Vec};

pub use growth::{DoublingGrowth, FactorGrowth, Growth, GrowthStrategy};
#[cfg(feature = "std")]
pub use local::{ThreadLocalProvider, ThreadLocalUnit};
#[cfg(feature = "std")]
pub use pool::{BufferPool, PooledProvider, PooledUnit};

use crate::{error::CapacityError, options::WriterOptions, unit::CodeUnit};

/// Leases, grows, and takes back writer storage.
pub trait BufferProvider<U: CodeUnit> {
    /// A buffer of at least the configured initial size.
    fn initial_buffer(&mut self) -> Vec<U>;

    /// Makes `buffer` hold at least `additional` more units than its current
    /// length, carrying over the first `used` units. If the storage is
    /// replaced, the old storage goes back to the provider.
    ///
    /// # Errors
    ///
    /// [`CapacityError`] when the configured maximum cannot accommodate the
    /// request. `buffer` is left untouched.
    fn grow_buffer(
        &mut self,
        buffer: &mut Vec<U>,
        used: usize,
        additional: usize,
    ) -> Result<(), CapacityError>;

    /// Takes back a buffer that is no longer used. Empty buffers are ignored.
    fn release(&mut self, buffer: Vec<U>);
}

pub(crate) fn next_size(
    options: &WriterOptions,
    current: usize,
    additional: usize,
) -> Result<usize, CapacityError> {
    let size = options
        .growth
        .next_size(current, additional, options.maximum_capacity)?;
    log::debug!("growing writer buffer from {current} to {size} units");
    Ok(size)
}

/// Plain heap allocation without any reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapProvider {
    options: WriterOptions,
}

impl HeapProvider {
    #[must_use]
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }
}

impl<U: CodeUnit> BufferProvider<U> for HeapProvider {
    fn initial_buffer(&mut self) -> Vec<U> {
        vec![U::default(); self.options.effective_initial_capacity()]
    }

    fn grow_buffer(
        &mut self,
        buffer: &mut Vec<U>,
        used: usize,
        additional: usize,
    ) -> Result<(), CapacityError> {
        let size = next_size(&self.options, buffer.len(), additional)?;
        let mut grown = vec![U::default(); size];
        grown[..used].copy_from_slice(&buffer[..used]);
        *buffer = grown;
        Ok(())
    }

    fn release(&mut self, _buffer: Vec<U>) {}
}
