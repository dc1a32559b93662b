#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Deterministic KAT Random Source
//!
//! A reproducible byte stream built on Bernstein's SURF mixer, the same
//! generator the SUPERCOP and pqm4 known-answer test programs link in place
//! of `randombytes`. Two instances built from the same seed table produce the
//! same bytes on every platform, for any sequence of request lengths.
//!
//! # Stream layout
//!
//! - A 4-word counter (the low words of the 12-word input register) is
//!   incremented with carry each time the output register runs dry.
//! - `surf` mixes the input register with the seed table and fills an
//!   8-word output register.
//! - Output words are consumed from index 7 down to 0, one byte per word
//!   (the low byte), so transcripts match other SURF-based KAT programs.
//!
//! # Security
//!
//! **Not a CSPRNG.** The seed is a public constant. [`SurfRng`] implements
//! [`CryptoRng`] only so it can drive scheme implementations under test
//! through their `CryptoRngCore` entry points.

use rand_core::{CryptoRng, RngCore};

/// Words in the seed table.
pub const SEED_WORDS: usize = 32;

/// Digits of pi, the conventional SURF KAT seed.
pub const DEFAULT_SEED: [u32; SEED_WORDS] = [
    3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9, 3, 2, 3, 8, 4, 6, 2, 6, 4, 3, 3, 8, 3, 2, 7, 9, 5,
];

const INPUT_WORDS: usize = 12;
const OUTPUT_WORDS: usize = 8;
const COUNTER_WORDS: usize = 4;
const ROUNDS: usize = 16;
const PASSES: usize = 2;
const DELTA: u32 = 0x9e37_79b9;
const ROTATIONS: [u32; 4] = [5, 7, 9, 13];

/// Deterministic byte stream for reproducible known-answer tests.
#[derive(Clone, PartialEq, Eq)]
pub struct SurfRng {
    seed: [u32; SEED_WORDS],
    input: [u32; INPUT_WORDS],
    output: [u32; OUTPUT_WORDS],
    remaining: usize,
}

impl std::fmt::Debug for SurfRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfRng")
            .field("counter", &self.counter())
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl Default for SurfRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfRng {
    /// Creates a generator seeded with [`DEFAULT_SEED`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_seed_table(DEFAULT_SEED)
    }

    /// Creates a generator from an explicit seed table.
    #[must_use]
    pub fn from_seed_table(seed: [u32; SEED_WORDS]) -> Self {
        Self { seed, input: [0; INPUT_WORDS], output: [0; OUTPUT_WORDS], remaining: 0 }
    }

    /// Fills `dest` with the next `dest.len()` bytes of the stream.
    pub fn fill(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            if self.remaining == 0 {
                self.advance_counter();
                self.surf();
                self.remaining = OUTPUT_WORDS;
            }
            self.remaining -= 1;
            let [low, ..] = self.output[self.remaining].to_le_bytes();
            *byte = low;
        }
    }

    /// Returns `len` fresh bytes from the stream.
    #[must_use]
    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.fill(&mut out);
        out
    }

    /// Current value of the 4-word block counter, least significant word first.
    #[must_use]
    pub fn counter(&self) -> [u32; COUNTER_WORDS] {
        [self.input[0], self.input[1], self.input[2], self.input[3]]
    }

    fn advance_counter(&mut self) {
        for word in self.input.iter_mut().take(COUNTER_WORDS) {
            *word = word.wrapping_add(1);
            if *word != 0 {
                break;
            }
        }
    }

    fn surf(&mut self) {
        let mut t = [0u32; INPUT_WORDS];
        for (i, lane) in t.iter_mut().enumerate() {
            *lane = self.input[i] ^ self.seed[INPUT_WORDS + i];
        }
        for (i, word) in self.output.iter_mut().enumerate() {
            *word = self.seed[2 * INPUT_WORDS + i];
        }

        let mut x = t[INPUT_WORDS - 1];
        let mut sum: u32 = 0;
        for _ in 0..PASSES {
            for _ in 0..ROUNDS {
                sum = sum.wrapping_add(DELTA);
                for (i, lane) in t.iter_mut().enumerate() {
                    let mixed = (x ^ self.seed[i]).wrapping_add(sum)
                        ^ x.rotate_left(ROTATIONS[i % ROTATIONS.len()]);
                    *lane = lane.wrapping_add(mixed);
                    x = *lane;
                }
            }
            for (i, word) in self.output.iter_mut().enumerate() {
                *word ^= t[i + 4];
            }
        }
    }
}

impl RngCore for SurfRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

impl CryptoRng for SurfRng {}
