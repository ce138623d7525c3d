pub mod ai;
pub mod router;

pub use router::ProviderRouter;
