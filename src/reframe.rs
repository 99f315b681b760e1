//! Stages that change chunk sizes without looking at the bytes.
//!
//! [`Reducer`] turns any upstream into an "at most" producer, which makes
//! it safe to frame fixed-width values on top of it. [`Expander`] turns any
//! producer into an "exact" one.

use tracing::{trace, warn};

use crate::error::{ConvertError, reserve_total};
use crate::stage::Producer;

/// Size of each upstream pull made by a [`Reducer`].
pub const UPSTREAM_CHUNK: usize = 64 * 1024;

/// Never returns more than was asked for.
///
/// Holds one upstream chunk and slices it across calls, pulling the next
/// chunk only when the current one is used up.
pub struct Reducer<P> {
    upstream: P,
    chunk: Vec<u8>,
    offset: usize,
    exhausted: bool,
}

impl<P: Producer> Reducer<P> {
    pub fn new(upstream: P) -> Self {
        Self {
            upstream,
            chunk: Vec::new(),
            offset: 0,
            exhausted: false,
        }
    }
}

impl<P: Producer> Producer for Reducer<P> {
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError> {
        // Empty upstream chunks carry nothing to slice, so skip past them.
        while self.offset >= self.chunk.len() {
            if self.exhausted {
                return Ok(None);
            }
            match self.upstream.pull(UPSTREAM_CHUNK)? {
                Some(bytes) => {
                    self.chunk.clear();
                    reserve_total(&mut self.chunk, bytes.len())?;
                    self.chunk.extend_from_slice(bytes);
                    self.offset = 0;
                }
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        }

        let start = self.offset;
        let count = (self.chunk.len() - start).min(size);
        self.offset += count;
        trace!(size, count, "reducer");
        Ok(Some(&self.chunk[start..start + count]))
    }

    fn name(&self) -> &str {
        "REDUCE"
    }
}

/// What an [`Expander`] does when input ends inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Pad the frame with zero bytes and carry on.
    #[default]
    ZeroFill,
    /// Fail with [`ConvertError::TruncatedInput`].
    Reject,
}

/// Returns exactly the requested size whenever any data remains.
///
/// Short upstream chunks are gathered until the frame is full; bytes past
/// the end of a frame are held for the next one. Only a pull that starts
/// with nothing held and whose first upstream request hits the end reports
/// the end.
pub struct Expander<P> {
    upstream: P,
    buffer: Vec<u8>,
    surplus: Vec<u8>,
    policy: TruncationPolicy,
}

impl<P: Producer> Expander<P> {
    pub fn new(upstream: P) -> Self {
        Self::with_policy(upstream, TruncationPolicy::default())
    }

    pub fn with_policy(upstream: P, policy: TruncationPolicy) -> Self {
        Self {
            upstream,
            buffer: Vec::new(),
            surplus: Vec::new(),
            policy,
        }
    }
}

impl<P: Producer> Producer for Expander<P> {
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError> {
        // The buffer keeps its capacity, so it only ever grows.
        self.buffer.clear();
        reserve_total(&mut self.buffer, size)?;

        let carried = self.surplus.len().min(size);
        self.buffer.extend_from_slice(&self.surplus[..carried]);
        self.surplus.drain(..carried);

        if self.buffer.is_empty() {
            let Some(first) = self.upstream.pull(size)? else {
                return Ok(None);
            };
            fill(&mut self.buffer, &mut self.surplus, first, size)?;
        }

        while self.buffer.len() < size {
            let wanted = size - self.buffer.len();
            match self.upstream.pull(wanted)? {
                Some(more) => fill(&mut self.buffer, &mut self.surplus, more, size)?,
                None => {
                    let got = self.buffer.len();
                    match self.policy {
                        TruncationPolicy::ZeroFill => {
                            warn!(expected = size, got, "input ended mid-value, padding with zeros");
                            self.buffer.resize(size, 0);
                        }
                        TruncationPolicy::Reject => {
                            return Err(ConvertError::TruncatedInput {
                                expected: size,
                                got,
                            });
                        }
                    }
                }
            }
        }

        trace!(size, held = self.surplus.len(), "expander");
        Ok(Some(&self.buffer))
    }

    fn name(&self) -> &str {
        "EXPAND"
    }
}

/// Top `frame` up to `size` from `chunk`, holding back whatever is left.
fn fill(
    frame: &mut Vec<u8>,
    surplus: &mut Vec<u8>,
    chunk: &[u8],
    size: usize,
) -> Result<(), ConvertError> {
    let take = chunk.len().min(size - frame.len());
    frame.extend_from_slice(&chunk[..take]);
    let rest = &chunk[take..];
    if !rest.is_empty() {
        reserve_total(surplus, surplus.len() + rest.len())?;
        surplus.extend_from_slice(rest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ArgumentSource;
    use crate::stage::tests::{Chunks, drain};

    fn concat(chunks: &[Vec<u8>]) -> Vec<u8> {
        chunks.iter().flatten().copied().collect()
    }

    #[test]
    fn test_reducer_never_over_delivers() {
        let upstream = ["abcdefghij", "", "k", "lmnopqrstuvwxyz"];
        for size in 1..=12 {
            let mut reducer = Reducer::new(Chunks::new(upstream));
            let out = drain(&mut reducer, size);
            assert!(out.iter().all(|c| c.len() <= size), "size {size}");
            assert_eq!(concat(&out), b"abcdefghijklmnopqrstuvwxyz".to_vec());
        }
    }

    #[test]
    fn test_reducer_does_not_cross_chunks() {
        let mut reducer = Reducer::new(Chunks::new(["abc", "de"]));
        assert_eq!(reducer.pull(4).unwrap(), Some(&b"abc"[..]));
        assert_eq!(reducer.pull(4).unwrap(), Some(&b"de"[..]));
        assert_eq!(reducer.pull(4).unwrap(), None);
    }

    #[test]
    fn test_reducer_pulls_lazily() {
        let mut reducer = Reducer::new(Chunks::new(["abcd", "ef"]));
        reducer.pull(2).unwrap();
        reducer.pull(2).unwrap();
        assert_eq!(reducer.upstream.pulls, 1);
    }

    #[test]
    fn test_reducer_stays_exhausted() {
        let mut reducer = Reducer::new(Chunks::new(["a"]));
        assert!(reducer.pull(8).unwrap().is_some());
        assert_eq!(reducer.pull(8).unwrap(), None);
        assert_eq!(reducer.pull(8).unwrap(), None);
        assert_eq!(reducer.upstream.pulls, 2);
    }

    #[test]
    fn test_expander_exact_frames() {
        let upstream = Reducer::new(Chunks::new(["ab", "cde", "f", "gh"]));
        let mut expander = Expander::new(upstream);
        assert_eq!(
            drain(&mut expander, 4),
            vec![b"abcd".to_vec(), b"efgh".to_vec()]
        );
    }

    #[test]
    fn test_expander_pads_final_frame() {
        for size in 1..=9 {
            let upstream = Reducer::new(Chunks::new(["abc", "defg"]));
            let mut expander = Expander::new(upstream);
            let out = drain(&mut expander, size);
            assert!(out.iter().all(|c| c.len() == size), "size {size}");
            let mut expected = b"abcdefg".to_vec();
            expected.resize(out.len() * size, 0);
            assert_eq!(concat(&out), expected);
        }
    }

    #[test]
    fn test_expander_end_on_first_pull() {
        let mut expander = Expander::new(Reducer::new(Chunks::new(Vec::<&str>::new())));
        assert_eq!(expander.pull(4).unwrap(), None);
    }

    #[test]
    fn test_expander_reject_policy() {
        let upstream = Reducer::new(Chunks::new(["abcdef"]));
        let mut expander = Expander::with_policy(upstream, TruncationPolicy::Reject);
        assert_eq!(expander.pull(4).unwrap(), Some(&b"abcd"[..]));
        let err = expander.pull(4).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::TruncatedInput {
                expected: 4,
                got: 2
            }
        ));
    }

    #[test]
    fn test_expander_buffer_grows() {
        let upstream = Reducer::new(Chunks::new(["a", "b"]));
        let mut expander = Expander::new(upstream);
        expander.pull(16).unwrap();
        assert!(expander.buffer.capacity() >= 16);
        expander.pull(2).unwrap();
        assert!(expander.buffer.capacity() >= 16);
    }

    #[test]
    fn test_expander_holds_over_delivery() {
        let upstream = ArgumentSource::new(["12345678", "ab", "cdefgh"]);
        let mut expander = Expander::new(upstream);
        assert_eq!(
            drain(&mut expander, 4),
            vec![
                b"1234".to_vec(),
                b"5678".to_vec(),
                b"abcd".to_vec(),
                b"efgh".to_vec(),
            ]
        );
    }

    #[test]
    fn test_expander_pads_after_held_bytes() {
        let mut expander = Expander::new(Chunks::new(["abcdef"]));
        assert_eq!(expander.pull(4).unwrap(), Some(&b"abcd"[..]));
        assert_eq!(expander.pull(4).unwrap(), Some(&b"ef\0\0"[..]));
        assert_eq!(expander.pull(4).unwrap(), None);
    }
}
