use std::sync::{Arc, LazyLock};

use alloc::{vec, vec::Vec};

use parking_lot::Mutex;

use super::{BufferProvider, next_size};
use crate::{error::CapacityError, options::WriterOptions, unit::CodeUnit};

/// A thread-safe pool of reusable buffers.
///
/// Rented buffers are exclusively owned by the renter until they are given
/// back; only the list of idle buffers is shared.
#[derive(Debug)]
pub struct BufferPool<U> {
    idle: Mutex<Vec<Vec<U>>>,
    max_idle: usize,
}

impl<U: CodeUnit> BufferPool<U> {
    pub const DEFAULT_MAX_IDLE: usize = 32;

    #[must_use]
    pub fn new() -> Self {
        Self::with_max_idle(Self::DEFAULT_MAX_IDLE)
    }

    /// A pool that keeps at most `max_idle` returned buffers around.
    #[must_use]
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Takes an idle buffer of at least `minimum` units, or allocates one.
    #[must_use]
    pub fn rent(&self, minimum: usize) -> Vec<U> {
        let reused = {
            let mut idle = self.idle.lock();
            let index = idle.iter().position(|buffer| buffer.len() >= minimum);
            index.map(|index| idle.swap_remove(index))
        };
        match reused {
            Some(buffer) => {
                log::trace!("reusing pooled buffer of {} units", buffer.len());
                buffer
            }
            None => vec![U::default(); minimum],
        }
    }

    /// Returns a buffer to the pool. Empty buffers and buffers beyond the
    /// idle limit are dropped.
    pub fn give_back(&self, buffer: Vec<U>) {
        if buffer.is_empty() {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            log::trace!("returning buffer of {} units to pool", buffer.len());
            idle.push(buffer);
        }
    }

    /// Number of idle buffers currently held.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

impl<U: CodeUnit> Default for BufferPool<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Units that have a process-wide shared pool.
pub trait PooledUnit: CodeUnit + Send {
    fn shared_pool() -> Arc<BufferPool<Self>>;
}

static SHARED_BYTES: LazyLock<Arc<BufferPool<u8>>> = LazyLock::new(Arc::default);
static SHARED_UNITS: LazyLock<Arc<BufferPool<u16>>> = LazyLock::new(Arc::default);

impl PooledUnit for u8 {
    fn shared_pool() -> Arc<BufferPool<u8>> {
        Arc::clone(&SHARED_BYTES)
    }
}

impl PooledUnit for u16 {
    fn shared_pool() -> Arc<BufferPool<u16>> {
        Arc::clone(&SHARED_UNITS)
    }
}

/// Rents writer storage from a [`BufferPool`].
#[derive(Debug, Clone)]
pub struct PooledProvider<U> {
    pool: Arc<BufferPool<U>>,
    options: WriterOptions,
}

impl<U: CodeUnit> PooledProvider<U> {
    #[must_use]
    pub fn new(pool: Arc<BufferPool<U>>, options: WriterOptions) -> Self {
        Self { pool, options }
    }
}

impl<U: PooledUnit> PooledProvider<U> {
    /// A provider backed by the process-wide pool for `U`.
    #[must_use]
    pub fn shared(options: WriterOptions) -> Self {
        Self::new(U::shared_pool(), options)
    }
}

impl<U: CodeUnit> BufferProvider<U> for PooledProvider<U> {
    fn initial_buffer(&mut self) -> Vec<U> {
        self.pool.rent(self.options.effective_initial_capacity())
    }

    fn grow_buffer(
        &mut self,
        buffer: &mut Vec<U>,
        used: usize,
        additional: usize,
    ) -> Result<(), CapacityError> {
        let size = next_size(&self.options, buffer.len(), additional)?;
        let mut grown = self.pool.rent(size);
        grown[..used].copy_from_slice(&buffer[..used]);
        self.pool.give_back(core::mem::replace(buffer, grown));
        Ok(())
    }

    fn release(&mut self, buffer: Vec<U>) {
        self.pool.give_back(buffer);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn options(initial_capacity: usize) -> WriterOptions {
        WriterOptions {
            initial_capacity,
            ..WriterOptions::default()
        }
    }

    #[test]
    fn released_buffers_are_reused() {
        let pool = Arc::new(BufferPool::<u8>::new());
        let mut provider = PooledProvider::new(Arc::clone(&pool), options(16));

        let buffer = provider.initial_buffer();
        let address = buffer.as_ptr();
        provider.release(buffer);
        assert_eq!(pool.idle_count(), 1);

        let again = provider.initial_buffer();
        assert_eq!(again.as_ptr(), address);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn growing_returns_old_buffer_to_pool() {
        let pool = Arc::new(BufferPool::<u16>::new());
        let mut provider = PooledProvider::new(Arc::clone(&pool), options(4));
        let mut buffer = provider.initial_buffer();
        buffer[..2].copy_from_slice(&[1, 2]);

        provider.grow_buffer(&mut buffer, 2, 10).unwrap();
        assert!(buffer.len() >= 14);
        assert_eq!(&buffer[..2], &[1, 2]);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn small_idle_buffers_are_skipped() {
        let pool = BufferPool::<u8>::new();
        pool.give_back(vec![0; 8]);
        let rented = pool.rent(64);
        assert_eq!(rented.len(), 64);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn idle_limit_is_enforced() {
        let pool = BufferPool::<u8>::with_max_idle(1);
        pool.give_back(vec![0; 8]);
        pool.give_back(vec![0; 8]);
        pool.give_back(Vec::new());
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn concurrent_rent_and_return() {
        let pool = Arc::new(BufferPool::<u8>::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let buffer = pool.rent(32);
                        assert!(buffer.len() >= 32);
                        pool.give_back(buffer);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.idle_count() <= 8);
    }
}
