//! The pull-stage trait every link of a conversion chain implements.
//!
//! A chain is a linear list of producers, each owning the one upstream of
//! it. The sink drives the whole chain by calling [`Producer::pull`] on the
//! last stage; nothing runs ahead of that demand.

use crate::error::ConvertError;

/// A stage that yields byte chunks on demand.
///
/// `pull(size)` returns `Ok(None)` once the stage is exhausted. That is
/// distinct from a zero-length chunk, which is an ordinary (empty) value.
///
/// How closely the chunk length follows `size` depends on the stage:
/// - exact: always `size` bytes while data remains (expander, encoder and
///   decoder for fixed-width types)
/// - at most: never more than `size` bytes (reducer, raw file source)
/// - possibly more: may exceed `size` (argument source, which hands out
///   whole arguments)
///
/// Callers must not assume one discipline of an arbitrary producer.
pub trait Producer {
    /// Pull the next chunk, borrowed until the next call.
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError>;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError> {
        (**self).pull(size)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Replays fixed chunks regardless of the requested size.
    pub(crate) struct Chunks {
        chunks: std::collections::VecDeque<Vec<u8>>,
        current: Vec<u8>,
        pub(crate) pulls: usize,
    }

    impl Chunks {
        pub(crate) fn new<I, C>(chunks: I) -> Self
        where
            I: IntoIterator<Item = C>,
            C: AsRef<[u8]>,
        {
            Self {
                chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
                current: Vec::new(),
                pulls: 0,
            }
        }
    }

    impl Producer for Chunks {
        fn pull(&mut self, _size: usize) -> Result<Option<&[u8]>, ConvertError> {
            self.pulls += 1;
            match self.chunks.pop_front() {
                Some(chunk) => {
                    self.current = chunk;
                    Ok(Some(&self.current))
                }
                None => Ok(None),
            }
        }

        fn name(&self) -> &str {
            "CHUNKS"
        }
    }

    /// Collect every chunk a producer yields at one request size.
    pub(crate) fn drain(producer: &mut impl Producer, size: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(chunk) = producer.pull(size).unwrap() {
            out.push(chunk.to_vec());
        }
        out
    }

    #[test]
    fn test_boxed_producer_delegates() {
        let mut boxed: Box<dyn Producer> = Box::new(Chunks::new(["ab", "c"]));
        assert_eq!(boxed.name(), "CHUNKS");
        assert_eq!(drain(&mut boxed, 1), vec![b"ab".to_vec(), b"c".to_vec()]);
    }
}
