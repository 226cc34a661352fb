use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::cell::UnsafeCell;

thread_local! {
    static RNG: UnsafeCell<ChaCha20Rng> = UnsafeCell::new(ChaCha20Rng::from_seed(OsRng.gen()));
}

/// Thread-local ChaCha20 CSPRNG seeded from the operating system. Guardian keypairs are drawn
/// from this generator.
pub struct SecureRng;

impl SecureRng {
    pub fn next_u128() -> u128 {
        RNG.with(|rng| {
            // Only one thread accesses this RNG so this is safe
            let rng_ref = unsafe { &mut *rng.get() };
            let mut bytes = [0u8; 16];
            rand_chacha::rand_core::RngCore::fill_bytes(rng_ref, &mut bytes);
            u128::from_le_bytes(bytes)
        })
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        RNG.with(|rng| unsafe { rand_chacha::rand_core::RngCore::next_u32(&mut *rng.get()) })
    }

    fn next_u64(&mut self) -> u64 {
        RNG.with(|rng| unsafe { rand_chacha::rand_core::RngCore::next_u64(&mut *rng.get()) })
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        RNG.with(|rng| unsafe {
            rand_chacha::rand_core::RngCore::fill_bytes(&mut *rng.get(), dest)
        })
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        // try_fill_bytes is infallible for ChaCha20Rng
        RNG.with(|rng| unsafe {
            let _ = (*rng.get()).try_fill_bytes(dest);
        });
        Ok(())
    }
}

impl CryptoRng for SecureRng {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_values_differ() {
        let a = SecureRng::next_u128();
        let b = SecureRng::next_u128();

        assert_ne!(a, b);
    }

    #[test]
    fn fill_bytes_writes_whole_buffer() {
        let mut rng = SecureRng;
        let mut first = [0u8; 64];
        let mut second = [0u8; 64];

        rng.fill_bytes(&mut first);
        rng.fill_bytes(&mut second);

        assert_ne!(first, second);
        assert!(first.iter().any(|b| *b != 0));
    }

    #[test]
    fn separate_threads_get_separate_streams() {
        let here = SecureRng::next_u128();
        let there = std::thread::spawn(SecureRng::next_u128).join().unwrap();

        assert_ne!(here, there);
    }
}
