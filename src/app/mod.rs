pub mod migrate_use_case;
pub mod ports;

pub use migrate_use_case::{inspect_package, MigrateOptions, MigrateUseCase, MigrationReport, PackageInspection};
