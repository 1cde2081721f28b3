//! Per-session input pipeline: a lock-free SPSC byte ring plus
//! edge-triggered XON/XOFF flow control.
//!
//! The teacher moves PTY bytes to its terminal state through an
//! `mpsc::channel` read by a dedicated reader thread (`pty/reader.rs`).
//! This core has no thread of its own to read on — `update()` is the only
//! consumer, invoked cooperatively on whatever thread owns the `Terminal`
//! — so host bytes arrive by writing directly into a ring sized and
//! indexed the way the spec describes: atomic head/tail, relaxed loads
//! for the watermark/size estimate used by `update()`, acquire/release at
//! the actual producer/consumer handoff.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Minimum ring capacity (spec: "≥64 KiB, power-of-two").
pub const MIN_PIPELINE_CAPACITY: usize = 64 * 1024;

/// Single-producer/single-consumer byte ring. `push` is the producer side
/// (called by the embedder feeding host bytes in); `pop`/`peek` are the
/// consumer side (called only from `update()`). The backing buffer sits
/// behind `UnsafeCell` because both sides hold only `&self`: `push` writes
/// cells from `tail` up to (but never touching) `head`, `pop` reads cells
/// from `head` up to `tail`, and the `Acquire`/`Release` ops on the indices
/// are what make each side's writes visible to the other before it reads
/// them — the two index ranges never overlap at a given instant.
pub struct PipelineRing {
    buf: UnsafeCell<Box<[u8]>>,
    mask: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// SAFETY: see the struct's SPSC discipline above; the single producer and
// single consumer never touch the same index concurrently.
unsafe impl Sync for PipelineRing {}

impl PipelineRing {
    /// `capacity` is rounded up to the next power of two. Callers wanting
    /// the spec-default size should pass [`MIN_PIPELINE_CAPACITY`]; this
    /// constructor doesn't enforce a floor itself so tests can exercise
    /// small rings.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            buf: UnsafeCell::new(vec![0u8; capacity].into_boxed_slice()),
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Bytes currently queued. Uses a relaxed load on both indices: an
    /// approximate read is fine for watermark/usage estimates, never for
    /// correctness-critical slicing.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        tail.wrapping_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fraction of capacity in use, in `[0.0, 1.0]`, for the XON/XOFF
    /// watermark check.
    pub fn usage(&self) -> f32 {
        self.len() as f32 / self.capacity() as f32
    }

    /// Append bytes, dropping whatever doesn't fit. Returns the number of
    /// bytes actually written.
    pub fn push(&self, bytes: &[u8]) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Relaxed);
        let free = self.capacity() - tail.wrapping_sub(head);
        let n = bytes.len().min(free);

        for (i, &b) in bytes[..n].iter().enumerate() {
            let idx = (tail.wrapping_add(i)) & self.mask;
            // SAFETY: single producer, index only ever written by us and
            // only ever read after the Release store below publishes it.
            unsafe {
                let ptr = (*self.buf.get()).as_mut_ptr().add(idx);
                ptr.write(b);
            }
        }

        self.tail.store(tail.wrapping_add(n), Ordering::Release);
        n
    }

    /// Drain up to `max` bytes into `out`, consuming them from the ring.
    /// Returns the number of bytes drained.
    pub fn pop(&self, out: &mut Vec<u8>, max: usize) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Relaxed);
        let available = tail.wrapping_sub(head);
        let n = available.min(max);

        out.reserve(n);
        for i in 0..n {
            let idx = (head.wrapping_add(i)) & self.mask;
            // SAFETY: single consumer, index only ever read by us and only
            // ever within bytes already published by the producer's
            // Release store above.
            let b = unsafe { (*self.buf.get())[idx] };
            out.push(b);
        }

        self.head.store(head.wrapping_add(n), Ordering::Release);
        n
    }
}

/// Edge-triggered XON/XOFF watermark tracker. Spec: usage >75% emits one
/// XOFF, usage <25% emits one XON; no repeats while usage stays on the
/// same side of the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Normal,
    Suspended,
}

pub const XOFF_BYTE: u8 = 0x13;
pub const XON_BYTE: u8 = 0x11;

#[derive(Debug)]
pub struct FlowControl {
    state: FlowState,
}

impl Default for FlowControl {
    fn default() -> Self {
        Self {
            state: FlowState::Normal,
        }
    }
}

impl FlowControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `usage` against the watermarks and return the byte to emit,
    /// if this call crosses an edge. Must be called once per `update()`
    /// only when DECXRLM is enabled.
    pub fn check(&mut self, usage: f32) -> Option<u8> {
        match self.state {
            FlowState::Normal if usage > 0.75 => {
                self.state = FlowState::Suspended;
                Some(XOFF_BYTE)
            }
            FlowState::Suspended if usage < 0.25 => {
                self.state = FlowState::Normal;
                Some(XON_BYTE)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trip() {
        let ring = PipelineRing::new(MIN_PIPELINE_CAPACITY);
        assert_eq!(ring.push(b"hello"), 5);
        let mut out = Vec::new();
        assert_eq!(ring.pop(&mut out, 1024), 5);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn push_drops_when_full() {
        let ring = PipelineRing::new(8);
        let filler = vec![1u8; 8];
        assert_eq!(ring.push(&filler), 8);
        assert_eq!(ring.push(&[9]), 0, "full ring drops excess bytes");
    }

    #[test]
    fn flow_control_is_edge_triggered() {
        let mut flow = FlowControl::new();
        assert_eq!(flow.check(0.5), None);
        assert_eq!(flow.check(0.8), Some(XOFF_BYTE));
        assert_eq!(flow.check(0.8), None, "no repeat while still suspended");
        assert_eq!(flow.check(0.5), None, "not below low watermark yet");
        assert_eq!(flow.check(0.1), Some(XON_BYTE));
        assert_eq!(flow.check(0.1), None, "no repeat while still normal");
    }
}
