//! Deterministic random streams for Monte-Carlo iterations.
//!
//! Every iteration derives its own streams from the user seed and its
//! iteration index, so iterations can run in any order (or in parallel) and
//! still reproduce identical results.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::Sha256;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha8Rng> {
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Stream used by a simulation layer.
pub type SimRng = CountingRng<ChaCha8Rng>;

/// Independent RNG streams segregated by simulation domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    parameters: SimRng,
    play: SimRng,
    tiebreak: SimRng,
}

impl RngBundle {
    /// Streams for a single (non-batched) run.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self::for_iteration(seed, 0)
    }

    /// Streams for Monte-Carlo iteration `iteration` of a batch seeded with `seed`.
    #[must_use]
    pub fn for_iteration(seed: u64, iteration: usize) -> Self {
        let iteration = u64::try_from(iteration).unwrap_or(u64::MAX);
        Self {
            parameters: SimRng::from_seed_u64(derive_stream_seed(seed, iteration, b"parameters")),
            play: SimRng::from_seed_u64(derive_stream_seed(seed, iteration, b"play")),
            tiebreak: SimRng::from_seed_u64(derive_stream_seed(seed, iteration, b"tiebreak")),
        }
    }

    /// Stream used to resample posterior rows.
    pub fn parameters(&mut self) -> &mut SimRng {
        &mut self.parameters
    }

    /// Stream used for coin flips and survival draws inside games.
    pub fn play(&mut self) -> &mut SimRng {
        &mut self.play
    }

    /// Stream used to break tied games.
    pub fn tiebreak(&mut self) -> &mut SimRng {
        &mut self.tiebreak
    }

    /// Total draws across all streams.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.parameters
            .draws()
            .saturating_add(self.play.draws())
            .saturating_add(self.tiebreak.draws())
    }
}

fn derive_stream_seed(user_seed: u64, iteration: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ iteration.rotate_left(32);
    };
    mac.update(&iteration.to_le_bytes());
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
