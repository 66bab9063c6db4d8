use crate::{
    builtins::PrimitiveCatalogue,
    error::XsdError,
    property::PropertyParser,
    registry::TypeRegistry,
    template::TypeRef,
    xstypes::QName,
};

/// The collaborators a class template build reads from. All of them are frozen before the first
/// build, so one context can be shared across threads.
#[derive(Clone, Copy)]
pub struct BuildContext<'c> {
    pub registry: &'c dyn TypeRegistry,
    pub primitives: &'c dyn PrimitiveCatalogue,
    pub properties: &'c dyn PropertyParser,
}

impl<'c> BuildContext<'c> {
    pub fn new(
        registry: &'c dyn TypeRegistry,
        primitives: &'c dyn PrimitiveCatalogue,
        properties: &'c dyn PropertyParser,
    ) -> Self {
        Self {
            registry,
            primitives,
            properties,
        }
    }

    /// Resolves a type reference: builtin names through the primitive catalogue, everything else
    /// through the registry.
    pub fn resolve_type(&self, name: &QName) -> Result<TypeRef, XsdError> {
        if name.is_builtin() {
            let use_statement = self.primitives.lookup(&name.local_name)?;
            Ok(TypeRef {
                class_name: use_statement.short_name().to_string(),
                use_statement,
                primitive: true,
            })
        } else {
            Ok(TypeRef {
                class_name: self.registry.class_name(name)?.to_string(),
                use_statement: self.registry.use_statement(name)?.clone(),
                primitive: false,
            })
        }
    }
}
