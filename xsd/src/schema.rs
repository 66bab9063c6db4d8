use std::{
    fs,
    path::{Path, PathBuf},
};

use roxmltree::{Document, Node};

use crate::{
    constants::{
        FHIR_BASE_XSD, SKIP_ATOM_XSD_PREFIX, SKIP_FHIR_XSD_PREFIX, SKIP_TOMBSTONE_XSD,
        SKIP_XHTML_XSD, SKIP_XML_XSD, XS_NAMESPACE,
    },
    construct::xs_children,
    error::XsdError,
    xstypes::QName,
};

/// The text of one schema file.
#[derive(Clone, Debug)]
pub struct SchemaSource {
    pub path: PathBuf,
    pub text: String,
}

impl SchemaSource {
    /// Decodes raw file contents as UTF-8, stripping a byte order mark.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        let path = path.into();
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        if had_errors {
            tracing::warn!(path = %path.display(), "replaced malformed UTF-8 sequences");
        }
        Self {
            path,
            text: text.into_owned(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, XsdError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| XsdError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, &bytes))
    }
}

/// Whether a schema file only aggregates or supports other files and never contributes
/// generated types.
pub fn is_skipped(file_name: &str) -> bool {
    match file_name {
        SKIP_XML_XSD | SKIP_XHTML_XSD | SKIP_TOMBSTONE_XSD => true,
        FHIR_BASE_XSD => false,
        _ => {
            file_name.starts_with(SKIP_ATOM_XSD_PREFIX)
                || file_name.starts_with(SKIP_FHIR_XSD_PREFIX)
        }
    }
}

/// Reads every `*.xsd` file of a directory that is not on the skip list, sorted by file name.
pub fn read_dir(dir: impl AsRef<Path>) -> Result<Vec<SchemaSource>, XsdError> {
    let dir = dir.as_ref();
    let io_error = |source| XsdError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("xsd") {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_skipped(file_name) {
            tracing::debug!(file_name, "skipping schema file");
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    paths.iter().map(SchemaSource::read).collect()
}

/// A parsed schema document.
pub struct SchemaDocument<'input> {
    pub path: &'input Path,
    pub document: Document<'input>,
    pub target_namespace: Option<String>,
}

impl<'input> SchemaDocument<'input> {
    pub fn parse(source: &'input SchemaSource, allow_dtd: bool) -> Result<Self, XsdError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd,
            ..Default::default()
        };
        let document = Document::parse_with_options(&source.text, options).map_err(|e| {
            XsdError::Xml {
                path: source.path.clone(),
                source: e,
            }
        })?;

        let root = document.root_element();
        if root.tag_name().namespace() != Some(XS_NAMESPACE) || root.tag_name().name() != "schema"
        {
            return Err(XsdError::NotASchema {
                path: source.path.clone(),
            });
        }
        let target_namespace = root.attribute("targetNamespace").map(str::to_string);

        Ok(Self {
            path: &source.path,
            document,
            target_namespace,
        })
    }

    pub fn schema_node(&self) -> Node<'_, 'input> {
        self.document.root_element()
    }

    /// Named top-level `complexType` and `simpleType` definitions, in document order.
    pub fn type_definitions(&self) -> impl Iterator<Item = (QName, Node<'_, 'input>)> {
        xs_children(self.schema_node())
            .filter(|node| matches!(node.tag_name().name(), "complexType" | "simpleType"))
            .filter_map(|node| {
                let name = node.attribute("name")?;
                let object_name =
                    QName::with_optional_namespace(self.target_namespace.as_deref(), name);
                Some((object_name, node))
            })
    }
}

pub fn parse_all(
    sources: &[SchemaSource],
    allow_dtd: bool,
) -> Result<Vec<SchemaDocument<'_>>, XsdError> {
    sources
        .iter()
        .map(|source| SchemaDocument::parse(source, allow_dtd))
        .collect()
}
