//! Ambient random source for seed collections.
//!
//! [`Seeds::random`](super::Seeds::random) and
//! [`Seeds::shuffle`](super::Seeds::shuffle) draw from a per-thread generator.
//! A seeded shuffle swaps in a generator for the duration of the call and
//! puts the previous one back afterwards, so seeding never leaks into later
//! draws.

use std::cell::RefCell;

use rand::SeedableRng;
use rand::rngs::StdRng;

thread_local! {
	static AMBIENT_RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Runs `f` with the ambient generator of the current thread.
///
/// `f` must not call back into this module.
pub fn with_ambient<F, R>(f: F) -> R
where
	F: FnOnce(&mut StdRng) -> R,
{
	AMBIENT_RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Runs `f` with the ambient generator temporarily seeded from `seed`, then
/// restores the generator that was active before.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use reinhardt_factory::seeds::random::{with_ambient, with_seed};
///
/// let a: u64 = with_seed(7, || with_ambient(|rng| rng.r#gen()));
/// let b: u64 = with_seed(7, || with_ambient(|rng| rng.r#gen()));
/// assert_eq!(a, b);
/// ```
pub fn with_seed<F, R>(seed: u64, f: F) -> R
where
	F: FnOnce() -> R,
{
	let prev = AMBIENT_RNG.with(|rng| rng.replace(StdRng::seed_from_u64(seed)));
	let result = f();
	AMBIENT_RNG.with(|rng| *rng.borrow_mut() = prev);
	result
}

/// Reseeds the ambient generator of the current thread for good.
pub fn seed_ambient(seed: u64) {
	AMBIENT_RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(seed));
}
