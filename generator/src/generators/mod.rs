mod common;

#[cfg(feature = "generator-rust")]
mod rust;

#[cfg(not(feature = "generator-rust"))]
compile_error!("At least one generator must be enabled");

use clap::ValueEnum;
use fhir_xsd::TypeTemplate;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-rust")]
    Rust,
}

impl Generator {
    pub fn generate(&self, templates: &[TypeTemplate]) -> String {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(templates),
        }
    }
}
