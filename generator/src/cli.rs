use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use fhir_xsd::{constants, DuplicateTypeAction};

use crate::generators::Generator;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DuplicateTypes {
    Deny,
    Warn,
    Allow,
}

impl From<DuplicateTypes> for DuplicateTypeAction {
    fn from(value: DuplicateTypes) -> Self {
        match value {
            DuplicateTypes::Deny => DuplicateTypeAction::Deny,
            DuplicateTypes::Warn => DuplicateTypeAction::Warn,
            DuplicateTypes::Allow => DuplicateTypeAction::Allow,
        }
    }
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "XSD directory, single XSD file, or http(s) URL")]
    pub input: String,

    #[clap(short, long, help = "Write the generated code to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[clap(long, value_enum, default_value = "rust")]
    pub generator: Generator,

    #[clap(long, default_value = constants::DEFAULT_ROOT_NAMESPACE, help = "Root module of all generated types")]
    pub root_namespace: String,

    #[clap(long, default_value = constants::DEFAULT_CLASS_PREFIX, help = "Prefix of every generated class name")]
    pub class_prefix: String,

    #[clap(long, value_enum, default_value = "warn", help = "What to do with types defined in more than one file")]
    pub duplicate_types: DuplicateTypes,

    #[clap(long, help = "Skip types whose parent or property types cannot be resolved")]
    pub skip_unresolved: bool,

    #[clap(short, long, default_value_t = 1, help = "Number of threads building type templates")]
    pub jobs: usize,

    #[clap(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[clap(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["fhir-codegen", "schemas/"]);
        assert_eq!(cli.input, "schemas/");
        assert_eq!(cli.root_namespace, "fhir");
        assert_eq!(cli.class_prefix, "FHIR");
        assert_eq!(cli.jobs, 1);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.duplicate_types, DuplicateTypes::Warn));
        assert!(!cli.skip_unresolved);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "fhir-codegen",
            "https://hl7.org/fhir/fhir-all-xsd.zip",
            "--duplicate-types",
            "deny",
            "-j",
            "4",
            "-vv",
            "--output",
            "model.rs",
        ]);
        assert!(matches!(cli.duplicate_types, DuplicateTypes::Deny));
        assert_eq!(cli.jobs, 4);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(PathBuf::from("model.rs")));
    }
}
