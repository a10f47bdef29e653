//! Repository traits for metadata operations.

pub mod about;
pub mod assets;
pub mod posts;

pub use about::AboutRepo;
pub use assets::AssetRepo;
pub use posts::PostRepo;
