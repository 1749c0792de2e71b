pub mod file;
pub mod file_hits;
pub mod package;
pub mod package_version;

pub use file::Entity as FileEntity;
pub use file_hits::Entity as FileHitsEntity;
pub use package::Entity as PackageEntity;
pub use package_version::Entity as PackageVersionEntity;
