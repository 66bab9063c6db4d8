use std::{fmt, path::PathBuf};

use fhir_xsd::{naming, XsdError, XsdMapOptions};

use crate::{cli::Cli, generators::Generator};

/// Where the schema set comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Directory(PathBuf),
    File(PathBuf),
    Url(String),
}

impl Input {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Input::Url(input.to_string())
        } else {
            let path = PathBuf::from(input);
            if path.is_dir() {
                Input::Directory(path)
            } else {
                Input::File(path)
            }
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Directory(path) | Input::File(path) => write!(f, "{}", path.display()),
            Input::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub input: Input,
    pub output: Option<PathBuf>,
    pub generator: Generator,
    pub map: XsdMapOptions,
    pub skip_unresolved: bool,
    pub jobs: usize,
    pub allow_dtd: bool,
}

impl GeneratorConfig {
    /// Validates the command line. The namespace and class prefix are checked here so a typo
    /// fails before any schema is read.
    pub fn from_cli(cli: Cli) -> Result<Self, XsdError> {
        let root_namespace = naming::normalize_namespace(&cli.root_namespace)?;
        if !cli.class_prefix.is_empty() && !naming::is_identifier(&cli.class_prefix) {
            return Err(XsdError::InvalidClassName(cli.class_prefix));
        }
        Ok(Self {
            input: Input::parse(&cli.input),
            output: cli.output,
            generator: cli.generator,
            map: XsdMapOptions {
                root_namespace,
                class_prefix: cli.class_prefix,
                duplicate_types: cli.duplicate_types.into(),
            },
            skip_unresolved: cli.skip_unresolved,
            jobs: cli.jobs.max(1),
            allow_dtd: cli.allow_dtd,
        })
    }
}
