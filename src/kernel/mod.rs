//! Kernels: similarity functions, index-addressed kernels and their combination

pub mod combined;
pub mod config;
pub mod linear;
pub mod list;
pub mod polynomial;
pub mod rbf;
pub mod sparse;
pub mod traits;

pub use self::combined::*;
pub use self::config::*;
pub use self::linear::*;
pub use self::list::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::sparse::*;
pub use self::traits::*;
