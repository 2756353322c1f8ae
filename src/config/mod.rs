pub mod proc_loader;
pub mod proc_validator;
pub mod regions;
pub mod service;
pub mod settings;
