//! I/O utilities shared by the server and its tests.

mod relay;

pub use relay::{Direction, NoOpMetrics, RelayMetrics, RelayOutcome, relay_until_closed};
