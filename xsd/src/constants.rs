use lazy_static::lazy_static;
use regex::Regex;

// Namespaces (XSD pt. 1, §1.3.1; FHIR; XHTML)
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Lexical form of the narrative element FHIR references from `Narrative`
pub const XHTML_DIV: &str = "xhtml:div";

// Schema files that never contribute generated types
pub const SKIP_XML_XSD: &str = "xml.xsd";
pub const SKIP_XHTML_XSD: &str = "fhir-xhtml.xsd";
pub const SKIP_TOMBSTONE_XSD: &str = "tombstone.xsd";
pub const SKIP_ATOM_XSD_PREFIX: &str = "fhir-atom";
/// `fhir-all.xsd`, `fhir-single.xsd` and friends only aggregate the per-resource files
pub const SKIP_FHIR_XSD_PREFIX: &str = "fhir-";
pub const FHIR_BASE_XSD: &str = "fhir-base.xsd";

pub const DEFAULT_ROOT_NAMESPACE: &str = "fhir";
pub const DEFAULT_CLASS_PREFIX: &str = "FHIR";

/// Characters stripped from both ends of a configured namespace
pub const NAMESPACE_TRIM_CUTSET: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0b', '\\', '/'];

/// Crate holding the primitive wrapper types generated code refers to
pub const BUILTINS_CRATE: &str = "fhir_builtins";

lazy_static! {
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}
