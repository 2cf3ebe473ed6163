mod error;
pub use error::ArithError;

mod biguint_ext;
pub use biguint_ext::BigUintExt;

mod prime;
pub use prime::PrimeSearch;
