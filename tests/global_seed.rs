//! Process-wide seeding through `configure_seed` / `clear_seed`.
//!
//! Kept in its own test binary: the master stream is global, and unit tests
//! elsewhere construct generators concurrently.

use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use u_anneal::random::{clear_seed, configure_seed, SplittableRng};
use u_anneal::sa::{ModifiedLam, SimulatedAnnealing};
use u_anneal::search::{Initializer, MutationOperator, Problem, RunsFixedLength};

static GLOBAL_SEED: Mutex<()> = Mutex::new(());

fn take(rng: &mut SplittableRng, n: usize) -> Vec<u64> {
    (0..n).map(|_| rng.next_u64()).collect()
}

#[test]
fn test_same_seed_same_generators() {
    let _guard = GLOBAL_SEED.lock();
    configure_seed(7);
    let mut a = SplittableRng::new();
    configure_seed(7);
    let mut b = SplittableRng::new();
    clear_seed();
    assert_eq!(take(&mut a, 32), take(&mut b, 32));
}

#[test]
fn test_seeded_generator_is_split_of_master() {
    let _guard = GLOBAL_SEED.lock();
    configure_seed(11);
    let first = SplittableRng::new();
    let second = SplittableRng::new();
    clear_seed();
    let mut master = SplittableRng::seed_from_u64(11);
    assert_eq!(first, master.split());
    assert_eq!(second, master.split());
    assert_ne!(first, second);
}

#[test]
fn test_earlier_generators_unaffected() {
    let _guard = GLOBAL_SEED.lock();
    configure_seed(1);
    let mut before = SplittableRng::new();
    configure_seed(2);
    let _after = SplittableRng::new();
    clear_seed();
    let mut expected = SplittableRng::seed_from_u64(1).split();
    assert_eq!(take(&mut before, 16), take(&mut expected, 16));
}

#[test]
fn test_clear_seed_restores_entropy() {
    let _guard = GLOBAL_SEED.lock();
    configure_seed(7);
    clear_seed();
    let a = SplittableRng::new();
    let b = SplittableRng::new();
    assert_ne!(a, b);
    assert_ne!(a, SplittableRng::seed_from_u64(7).split());
}

struct OneMax;

impl Problem<Vec<bool>> for OneMax {
    type Cost = i64;

    fn cost(&self, bits: &Vec<bool>) -> i64 {
        bits.iter().filter(|&&b| b).count() as i64
    }

    fn min_cost(&self) -> i64 {
        0
    }
}

struct BitFlip;

impl MutationOperator<Vec<bool>> for BitFlip {
    fn mutate(&mut self, bits: &mut Vec<bool>, rng: &mut SplittableRng) {
        let i = rng.random_range(0..bits.len());
        bits[i] = !bits[i];
    }

    fn split(&self) -> Self {
        BitFlip
    }
}

struct RandomBits;

impl Initializer<Vec<bool>> for RandomBits {
    fn create_candidate(&mut self, rng: &mut SplittableRng) -> Vec<bool> {
        (0..64).map(|_| rng.random_bool(0.5)).collect()
    }

    fn split(&self) -> Self {
        RandomBits
    }
}

fn build() -> SimulatedAnnealing<Vec<bool>, OneMax, BitFlip, RandomBits, ModifiedLam> {
    SimulatedAnnealing::new(Arc::new(OneMax), BitFlip, RandomBits, ModifiedLam::new())
}

#[test]
fn test_engines_built_after_seeding_repeat_runs() {
    let _guard = GLOBAL_SEED.lock();
    configure_seed(42);
    let mut a = build();
    configure_seed(42);
    let mut b = build();
    clear_seed();

    let ra = a.optimize(2_000).unwrap();
    let rb = b.optimize(2_000).unwrap();
    assert_eq!(ra.solution(), rb.solution());
    assert_eq!(ra.cost(), rb.cost());
    assert_eq!(a.last_run(), b.last_run());
}
