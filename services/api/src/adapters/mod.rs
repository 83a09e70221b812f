pub mod rng;

pub use rng::StdRandom;
