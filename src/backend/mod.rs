// Backend adapters: concrete implementations of MipBackend

mod lp_builder;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_backend;
pub mod factory;
#[cfg(feature = "highs")]
pub mod highs_backend;
pub mod microlp_backend;

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_backend::CoinCbcBackend;
pub use factory::BackendFactory;
#[cfg(feature = "highs")]
pub use highs_backend::HighsBackend;
pub use microlp_backend::MicrolpBackend;
