use crate::core::{hasher, Block};
use crate::error::{LedgerError, Result};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A SHA-256 hex digest has 64 characters, so no larger prefix can be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// Deadline used when no explicit mining bound is configured.
pub const DEFAULT_MINING_TIMEOUT: Duration = Duration::from_secs(30);

// The clock and the cancel flag are polled once per batch of attempts.
const CHECK_INTERVAL: u64 = 1024;

/// Bounds on a single nonce search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningLimits {
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u64>,
}

impl Default for MiningLimits {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_MINING_TIMEOUT),
            max_attempts: None,
        }
    }
}

impl MiningLimits {
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            max_attempts: None,
        }
    }
}

/// Outcome of a successful seal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningStats {
    pub nonce: u64,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl MiningStats {
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty: u32,
    limits: MiningLimits,
    cancel: Option<Arc<AtomicBool>>,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Result<ProofOfWork> {
        Self::validate_difficulty(difficulty)?;
        Ok(ProofOfWork {
            difficulty,
            limits: MiningLimits::default(),
            cancel: None,
        })
    }

    pub fn with_limits(mut self, limits: MiningLimits) -> ProofOfWork {
        self.limits = limits;
        self
    }

    /// Setting the flag from another thread stops an in-progress seal.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> ProofOfWork {
        self.cancel = Some(flag);
        self
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_limits(&self) -> MiningLimits {
        self.limits
    }

    pub fn validate_difficulty(difficulty: u32) -> Result<()> {
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidDifficulty {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(())
    }

    /// True when `hash` starts with `difficulty` hex zeros.
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let prefix = difficulty as usize;
        hash.len() >= prefix && hash.bytes().take(prefix).all(|b| b == b'0')
    }

    /// Validate proof-of-work for a block: stored hash matches its fields and the prefix.
    pub fn validate(block: &Block, difficulty: u32) -> bool {
        block.calculate_hash() == block.get_hash()
            && Self::meets_difficulty(block.get_hash(), difficulty)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Search nonces upward from the block's current nonce until its hash
    /// meets the difficulty. The block is only written on success.
    pub fn seal(&self, block: &mut Block) -> Result<MiningStats> {
        let started = Instant::now();
        let deadline = self
            .limits
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut nonce = block.get_nonce();
        let mut attempts: u64 = 0;

        debug!(
            "Mining block {} with difficulty {} (limits: {:?})",
            block.get_index(),
            self.difficulty,
            self.limits
        );

        if self.is_cancelled() {
            warn!("Mining of block {} cancelled before start", block.get_index());
            return Err(LedgerError::MiningCancelled { attempts });
        }

        loop {
            let hash = hasher::calculate_hash(
                block.get_index(),
                block.get_timestamp(),
                block.get_data(),
                block.get_previous_hash(),
                nonce,
            );
            attempts += 1;

            if Self::meets_difficulty(&hash, self.difficulty) {
                let stats = MiningStats {
                    nonce,
                    attempts,
                    elapsed: started.elapsed(),
                };
                info!(
                    "Proof-of-work completed for block {}: {hash} (nonce: {nonce}, attempts: {attempts}, {:?})",
                    block.get_index(),
                    stats.elapsed
                );
                block.set_seal(nonce, hash);
                return Ok(stats);
            }

            if self.limits.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(self.timed_out(block, attempts, started));
            }

            if attempts % CHECK_INTERVAL == 0 {
                if self.is_cancelled() {
                    warn!(
                        "Mining of block {} cancelled after {attempts} attempts",
                        block.get_index()
                    );
                    return Err(LedgerError::MiningCancelled { attempts });
                }
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    return Err(self.timed_out(block, attempts, started));
                }
            }

            nonce = nonce
                .checked_add(1)
                .ok_or_else(|| LedgerError::Mining("Nonce space exhausted".to_string()))?;
        }
    }

    fn timed_out(&self, block: &Block, attempts: u64, started: Instant) -> LedgerError {
        let elapsed_ms = started.elapsed().as_millis();
        warn!(
            "Mining of block {} gave up after {attempts} attempts ({elapsed_ms} ms, difficulty {})",
            block.get_index(),
            self.difficulty
        );
        LedgerError::MiningTimeout {
            attempts,
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;

    fn create_test_block() -> Block {
        Block::new(
            1,
            1700000001.25,
            Record::new().with("sensor", "temp").with("valor", 22.5),
            "0".repeat(64),
        )
    }

    #[test]
    fn test_difficulty_zero_stops_at_first_nonce() {
        let mut block = create_test_block();
        let unsealed_hash = block.get_hash().to_string();

        let stats = ProofOfWork::new(0).unwrap().seal(&mut block).unwrap();

        assert_eq!(stats.nonce, 0);
        assert_eq!(stats.attempts, 1);
        assert_eq!(block.get_hash(), unsealed_hash);
    }

    #[test]
    fn test_seal_matches_known_nonces() {
        let mut block = create_test_block();
        ProofOfWork::new(2).unwrap().seal(&mut block).unwrap();
        assert_eq!(block.get_nonce(), 382);
        assert_eq!(
            block.get_hash(),
            "00840ba0b33742f3e57e709d90318dac25051f2c5786d8057177b258b5e557c0"
        );

        let mut block = create_test_block();
        let stats = ProofOfWork::new(3).unwrap().seal(&mut block).unwrap();
        assert_eq!(stats.nonce, 503);
        assert_eq!(stats.attempts, 504);
        assert_eq!(
            block.get_hash(),
            "0009332d0492adc04f5ec72fe41d45ac7d4f51ac73af3c54071187335e00b00b"
        );
    }

    #[test]
    fn test_sealed_hash_has_difficulty_prefix() {
        for difficulty in 0..=3 {
            let mut block = Block::new(7, 42.0, format!("reading {difficulty}"), "abc");
            ProofOfWork::new(difficulty).unwrap().seal(&mut block).unwrap();

            let prefix = "0".repeat(difficulty as usize);
            assert!(block.get_hash().starts_with(&prefix));
            assert!(ProofOfWork::validate(&block, difficulty));
        }
    }

    #[test]
    fn test_attempt_cap_returns_timeout_and_leaves_block() {
        let mut block = create_test_block();
        let original = block.clone();
        let pow = ProofOfWork::new(MAX_DIFFICULTY)
            .unwrap()
            .with_limits(MiningLimits {
                timeout: None,
                max_attempts: Some(50),
            });

        let err = pow.seal(&mut block).unwrap_err();

        assert!(matches!(err, LedgerError::MiningTimeout { attempts: 50, .. }));
        assert_eq!(block, original);
    }

    #[test]
    fn test_deadline_returns_timeout() {
        let mut block = create_test_block();
        let pow = ProofOfWork::new(MAX_DIFFICULTY)
            .unwrap()
            .with_limits(MiningLimits {
                timeout: Some(Duration::from_millis(20)),
                max_attempts: None,
            });

        let err = pow.seal(&mut block).unwrap_err();
        assert!(matches!(err, LedgerError::MiningTimeout { .. }));
        assert_eq!(block.get_nonce(), 0);
    }

    #[test]
    fn test_cancel_flag_stops_mining() {
        let flag = Arc::new(AtomicBool::new(true));
        let pow = ProofOfWork::new(MAX_DIFFICULTY)
            .unwrap()
            .with_limits(MiningLimits::unbounded())
            .with_cancel_flag(flag);

        let mut block = create_test_block();
        let err = pow.seal(&mut block).unwrap_err();
        assert_eq!(err, LedgerError::MiningCancelled { attempts: 0 });
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let pow = ProofOfWork::new(MAX_DIFFICULTY)
            .unwrap()
            .with_limits(MiningLimits::unbounded())
            .with_cancel_flag(flag.clone());

        let handle = std::thread::spawn(move || {
            let mut block = create_test_block();
            pow.seal(&mut block)
        });
        std::thread::sleep(Duration::from_millis(20));
        flag.store(true, Ordering::Relaxed);

        let result = handle.join().unwrap();
        assert!(matches!(result, Err(LedgerError::MiningCancelled { .. })));
    }

    #[test]
    fn test_rejects_unreachable_difficulty() {
        assert!(ProofOfWork::new(MAX_DIFFICULTY).is_ok());
        assert_eq!(
            ProofOfWork::new(65).unwrap_err(),
            LedgerError::InvalidDifficulty {
                difficulty: 65,
                max: 64
            }
        );
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(ProofOfWork::meets_difficulty("00ab", 2));
        assert!(!ProofOfWork::meets_difficulty("0a0b", 2));
        assert!(ProofOfWork::meets_difficulty("anything", 0));
        assert!(!ProofOfWork::meets_difficulty("00", 3));
    }
}
