pub mod bo;
pub mod grid;
pub mod hyperband;
pub mod random;

pub use bo::BoManager;
pub use grid::GridManager;
pub use hyperband::HyperbandManager;
pub use random::RandomManager;
