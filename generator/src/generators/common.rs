use std::collections::{BTreeMap, HashSet};

use fhir_xsd::TypeTemplate;

/// Templates grouped by namespace, one node per module segment.
#[derive(Default)]
pub(super) struct ModuleTree<'t> {
    pub(super) templates: Vec<&'t TypeTemplate>,
    pub(super) children: BTreeMap<&'t str, ModuleTree<'t>>,
}

impl<'t> ModuleTree<'t> {
    pub(super) fn from_templates(templates: &'t [TypeTemplate]) -> Self {
        let mut root = Self::default();
        for template in templates {
            let mut module = &mut root;
            for segment in template.namespace().split("::").filter(|s| !s.is_empty()) {
                module = module.children.entry(segment).or_default();
            }
            module.templates.push(template);
        }
        root
    }
}

pub(super) trait TemplateVisitor: Sized {
    type ModuleValue;
    fn visit_module(
        &mut self,
        context: &mut GeneratorContext,
        module: &ModuleTree,
    ) -> Self::ModuleValue;

    type TemplateValue;
    fn visit_template(
        &mut self,
        context: &mut GeneratorContext,
        template: &TypeTemplate,
    ) -> Self::TemplateValue;
}

pub(super) struct GeneratorContext {
    /// Segments of the module currently being generated
    pub(super) module_path: Vec<String>,
    /// Class names already emitted in the current module
    pub(super) emitted_classes: HashSet<String>,
}

impl GeneratorContext {
    pub(super) fn new() -> Self {
        Self {
            module_path: Vec::new(),
            emitted_classes: HashSet::new(),
        }
    }

    /// The current module as it appears in a use statement, e.g. `crate::fhir::element`.
    pub(super) fn module_use_path(&self) -> String {
        std::iter::once("crate")
            .chain(self.module_path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("::")
    }
}
