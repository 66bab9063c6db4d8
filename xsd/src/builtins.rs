use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{constants::BUILTINS_CRATE, error::XsdError, template::UseStatement};

/// Maps XSD builtin datatype names to the primitive wrapper types generated code uses.
pub trait PrimitiveCatalogue: Sync {
    /// Looks up a builtin by its local name (`decimal`, `dateTime`, ...).
    fn lookup(&self, name: &str) -> Result<UseStatement, XsdError>;
}

lazy_static! {
    static ref XS_PRIMITIVES: HashMap<&'static str, UseStatement> = fhir_builtins::PRIMITIVES
        .iter()
        .map(|(xs_name, wrapper)| {
            (*xs_name, UseStatement::new(format!("{BUILTINS_CRATE}::{wrapper}")))
        })
        .collect();
}

/// The catalogue backed by the wrappers of the `fhir-builtins` crate.
#[derive(Copy, Clone, Debug, Default)]
pub struct XsPrimitives;

impl PrimitiveCatalogue for XsPrimitives {
    fn lookup(&self, name: &str) -> Result<UseStatement, XsdError> {
        XS_PRIMITIVES
            .get(name)
            .cloned()
            .ok_or_else(|| XsdError::UnknownPrimitive(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_primitives() {
        let decimal = XsPrimitives.lookup("decimal").unwrap();
        assert_eq!(decimal.path(), "fhir_builtins::DecimalPrimitive");
        assert_eq!(decimal.short_name(), "DecimalPrimitive");
        assert_eq!(
            XsPrimitives.lookup("dateTime").unwrap().short_name(),
            "DateTimePrimitive"
        );
        assert_eq!(
            XsPrimitives.lookup("anySimpleType").unwrap().short_name(),
            "AnySimpleType"
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(matches!(
            XsPrimitives.lookup("DateTime"),
            Err(XsdError::UnknownPrimitive(name)) if name == "DateTime"
        ));
        assert!(XsPrimitives.lookup("anyAtomicType").is_err());
    }
}
