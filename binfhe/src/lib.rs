pub mod acc;
pub mod context;
pub mod error;
pub mod keys;
pub mod lwe;
pub mod params;
pub mod rgsw;
pub mod rlwe;
pub mod scheme;
pub mod test_vector;

pub use context::BinFheContext;
pub use error::{BinFheError, Result};
pub use keys::{BootstrapKey, BootstrapKeyMap};
pub use lwe::{LweCiphertext, LweSecretKey};
pub use params::{BinFheParams, BinGate, KeygenMode};
pub use scheme::{BinFheScheme, LutClass, check_input_function};
