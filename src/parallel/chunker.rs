use crate::error::{PipelineError, Result};
use std::fmt;
use std::str::Utf8Error;

/// One input record, kept as raw bytes until a worker decodes it
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Candidate(Vec<u8>);

impl Candidate {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_str(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidate({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Vec<u8>> for Candidate {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// A contiguous group of candidates handed to one worker as a unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in the input sequence
    pub id: usize,
    pub candidates: Vec<Candidate>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Split `candidates` into chunks of `size` items, preserving order.
///
/// The last chunk may be shorter than `size`. An empty input yields no chunks.
pub fn chunk<I>(candidates: I, size: usize) -> Result<Vec<Chunk>>
where
    I: IntoIterator<Item = Candidate>,
{
    if size < 1 {
        return Err(PipelineError::InvalidArgument(
            "chunk_size must be at least 1".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current = Vec::with_capacity(size);

    for candidate in candidates {
        current.push(candidate);
        if current.len() == size {
            let id = chunks.len();
            chunks.push(Chunk {
                id,
                candidates: std::mem::replace(&mut current, Vec::with_capacity(size)),
            });
        }
    }

    if !current.is_empty() {
        let id = chunks.len();
        chunks.push(Chunk {
            id,
            candidates: current,
        });
    }

    Ok(chunks)
}
