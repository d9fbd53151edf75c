pub mod filing;
pub mod transaction;
pub mod summary;

pub use filing::*;
pub use transaction::*;
pub use summary::*;
