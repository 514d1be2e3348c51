mod loader;

pub use loader::{
    glob_match, read_structured, AnalysisOptions, Config, DeletionConfig, InterfaceConfig,
    MarkerConfig, ModuleConfig,
};
