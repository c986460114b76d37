pub mod song;
pub mod album;
pub mod discography;

pub use song::*;
pub use album::*;
pub use discography::*;
