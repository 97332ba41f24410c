use core::cell::RefCell;

use alloc::vec::Vec;

use super::{BufferProvider, next_size};
use crate::{error::CapacityError, options::WriterOptions, unit::CodeUnit};

std::thread_local! {
    static BYTES: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
    static UNITS: RefCell<Vec<u16>> = const { RefCell::new(Vec::new()) };
}

/// Units that have a persistent per-thread buffer.
pub trait ThreadLocalUnit: CodeUnit {
    /// Runs `f` with this thread's buffer slot.
    fn with_slot<R>(f: impl FnOnce(&mut Vec<Self>) -> R) -> R;
}

impl ThreadLocalUnit for u8 {
    fn with_slot<R>(f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        BYTES.with(|slot| f(&mut slot.borrow_mut()))
    }
}

impl ThreadLocalUnit for u16 {
    fn with_slot<R>(f: impl FnOnce(&mut Vec<u16>) -> R) -> R {
        UNITS.with(|slot| f(&mut slot.borrow_mut()))
    }
}

/// Keeps one buffer per thread alive for the lifetime of the thread.
///
/// A writer takes the thread's buffer out of its slot and puts it back on
/// release, so nested writers on the same thread simply allocate a second
/// buffer; the larger of the two is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalProvider {
    options: WriterOptions,
}

impl ThreadLocalProvider {
    #[must_use]
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }
}

impl<U: ThreadLocalUnit> BufferProvider<U> for ThreadLocalProvider {
    fn initial_buffer(&mut self) -> Vec<U> {
        let initial = self.options.effective_initial_capacity();
        let mut buffer = U::with_slot(core::mem::take);
        if buffer.len() < initial {
            buffer.resize(initial, U::default());
        }
        buffer
    }

    fn grow_buffer(
        &mut self,
        buffer: &mut Vec<U>,
        _used: usize,
        additional: usize,
    ) -> Result<(), CapacityError> {
        let size = next_size(&self.options, buffer.len(), additional)?;
        buffer.resize(size, U::default());
        Ok(())
    }

    fn release(&mut self, buffer: Vec<U>) {
        U::with_slot(|slot| {
            if buffer.len() > slot.len() {
                *slot = buffer;
            }
        });
    }
}
