use rand::rngs::ThreadRng;
use rand::Rng;

use dns_wire::protocol::query::IdSource;

/// Query ids drawn from the thread-local random number generator, so
/// that responses to earlier queries are unlikely to be mistaken for
/// responses to this one.
#[derive(Debug, Clone, Default)]
pub struct RandomIds {
    rng: ThreadRng,
}

impl IdSource for RandomIds {
    fn next_id(&mut self) -> u16 {
        self.rng.random()
    }
}
