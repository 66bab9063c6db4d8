use std::{collections::HashSet, fs, io, path::PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use fhir_xsd::{
    build_class_template, schema, BuildContext, PropertyGenerator, SchemaSource, TypeTemplate,
    UseStatement, XsPrimitives, XsdError, XsdMap, XsdMapEntry,
};

use crate::config::{GeneratorConfig, Input};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Xsd(#[from] XsdError),
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start the worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("no schema types found in {0}")]
    Empty(String),
}

fn fetch(url: &str) -> Result<SchemaSource, GenerateError> {
    let fetch_error = |source| GenerateError::Fetch {
        url: url.to_string(),
        source,
    };
    let bytes = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(fetch_error)?;
    let file_name = url.rsplit('/').find(|s| !s.is_empty()).unwrap_or(url);
    Ok(SchemaSource::from_bytes(file_name, &bytes))
}

pub fn load_sources(input: &Input) -> Result<Vec<SchemaSource>, GenerateError> {
    let sources = match input {
        Input::Directory(dir) => schema::read_dir(dir)?,
        Input::File(path) => vec![SchemaSource::read(path)?],
        Input::Url(url) => vec![fetch(url)?],
    };
    tracing::info!(files = sources.len(), %input, "loaded schema files");
    Ok(sources)
}

/// Builds one template per registered type, in registration order. With `jobs > 1` the builds
/// run on a dedicated rayon pool. When unresolved types are skipped, every type that refers to a
/// skipped type is skipped too.
pub fn build_templates(
    map: &XsdMap,
    ctx: &BuildContext,
    jobs: usize,
    skip_unresolved: bool,
) -> Result<Vec<TypeTemplate>, GenerateError> {
    let build = |entry: &XsdMapEntry| build_class_template(ctx, &entry.definition);
    let results: Vec<Result<TypeTemplate, XsdError>> = if jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(|| map.entries().par_iter().map(build).collect())
    } else {
        map.entries().iter().map(build).collect()
    };

    let mut built = Vec::with_capacity(results.len());
    let mut skipped: HashSet<&UseStatement> = HashSet::new();
    for (entry, result) in map.entries().iter().zip(results) {
        match result {
            Ok(template) => built.push((entry, template)),
            Err(e) if skip_unresolved && e.is_unresolved_reference() => {
                tracing::error!(error = %e, "skipping type");
                skipped.insert(&entry.use_statement);
            }
            Err(e) => return Err(e.into()),
        }
    }

    while !skipped.is_empty() {
        let before = built.len();
        built.retain(|(entry, template)| {
            let entry: &XsdMapEntry = *entry;
            let missing = template.uses().find(|u| skipped.contains(u)).cloned();
            match missing {
                Some(missing) => {
                    tracing::error!(
                        class = template.class_name(),
                        missing = missing.short_name(),
                        "skipping type that refers to a skipped type"
                    );
                    skipped.insert(&entry.use_statement);
                    false
                }
                None => true,
            }
        });
        if built.len() == before {
            break;
        }
    }

    tracing::info!(
        templates = built.len(),
        skipped = skipped.len(),
        "built type templates"
    );
    Ok(built.into_iter().map(|(_, template)| template).collect())
}

/// Runs every stage up to code emission and returns the generated code.
pub fn generate(config: &GeneratorConfig) -> Result<String, GenerateError> {
    let sources = load_sources(&config.input)?;
    let documents = schema::parse_all(&sources, config.allow_dtd)?;
    let map = XsdMap::build(&documents, &config.map)?;
    if map.is_empty() {
        return Err(GenerateError::Empty(config.input.to_string()));
    }

    let ctx = BuildContext::new(&map, &XsPrimitives, &PropertyGenerator);
    let templates = build_templates(&map, &ctx, config.jobs, config.skip_unresolved)?;
    let code = config.generator.generate(&templates);
    tracing::info!(bytes = code.len(), "generated code");
    Ok(code)
}

pub fn run(config: &GeneratorConfig) -> Result<(), GenerateError> {
    let code = generate(config)?;
    match &config.output {
        Some(path) => fs::write(path, code).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        }),
        None => {
            print!("{code}");
            Ok(())
        }
    }
}
