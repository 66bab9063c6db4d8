use std::collections::{BTreeMap, HashSet};

use syn::{
    Attribute, Field, FieldMutability, Ident, ImplItem, Item, Type, Variant, __private::Span,
    parse_quote,
};

use fhir_xsd::{PropertyDescriptor, PropertyKind, TypeRef, TypeTemplate, UseStatement};

use super::common::{GeneratorContext, ModuleTree, TemplateVisitor};

use check_keyword::CheckKeyword;
use quote::format_ident;
use heck::ToSnakeCase;

/// Width of a doc comment line, not counting the `///` marker.
const DOC_LINE_WIDTH: usize = 80;

/// Splits `line` at word boundaries into lines of at most `width` characters. A single word
/// longer than `width` gets a line of its own.
fn wrap_doc_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Default)]
struct RustVisitor {
    /// Use path of the module being generated
    current_module: String,
    /// Short name → full path of every type imported into the current module
    imports: BTreeMap<String, String>,
    /// Class names declared in the current module
    declared: HashSet<String>,
}

impl RustVisitor {
    fn new() -> Self {
        Self::default()
    }

    fn name_to_ident(name: &str) -> Ident {
        if ["crate", "self", "super", "Self"].contains(&name) {
            // These are keywords that are not allowed as raw identifiers
            Ident::new(&format!("{}_", name), Span::call_site())
        } else if name.is_keyword() {
            Ident::new_raw(name, Span::call_site())
        } else {
            Ident::new(name, Span::call_site())
        }
    }

    fn use_path(use_statement: &UseStatement) -> syn::Path {
        let mut segments = use_statement
            .path()
            .split("::")
            .flat_map(|s| s.split('\\'))
            .filter(|s| !s.is_empty());
        let mut path: syn::Path = match segments.next() {
            Some("crate") => parse_quote!(crate),
            Some(first) => Self::name_to_ident(first).into(),
            None => Self::name_to_ident(use_statement.path()).into(),
        };
        for segment in segments {
            path.segments.push(Self::name_to_ident(segment).into());
        }
        path
    }

    /// The path by which code in the current module names a type: its short name when that is
    /// declared here or imported unambiguously, its full path otherwise.
    fn type_path(&self, use_statement: &UseStatement) -> syn::Path {
        let short_name = use_statement.short_name();
        let local = use_statement.module_path() == self.current_module
            && self.declared.contains(short_name);
        let imported =
            self.imports.get(short_name).map(String::as_str) == Some(use_statement.path());
        if local || imported {
            Self::name_to_ident(short_name).into()
        } else {
            Self::use_path(use_statement)
        }
    }

    /// Sets up the imports of a module. Types of the module itself are never imported, and a
    /// short name claimed by two paths is not imported at all.
    fn enter_module(&mut self, context: &GeneratorContext, module: &ModuleTree) {
        self.current_module = context.module_use_path();
        self.declared = module
            .templates
            .iter()
            .map(|t| t.class_name().to_string())
            .collect();
        self.imports.clear();

        let mut ambiguous = HashSet::new();
        for use_statement in module.templates.iter().flat_map(|t| t.uses()) {
            let short_name = use_statement.short_name();
            if use_statement.module_path() == self.current_module
                || self.declared.contains(short_name)
                || ambiguous.contains(short_name)
            {
                continue;
            }
            match self.imports.get(short_name).cloned() {
                Some(path) if path != use_statement.path() => {
                    tracing::debug!(
                        module = self.current_module.as_str(),
                        short_name,
                        "ambiguous import, using full paths"
                    );
                    self.imports.remove(short_name);
                    ambiguous.insert(short_name.to_string());
                }
                Some(_) => {}
                None => {
                    self.imports
                        .insert(short_name.to_string(), use_statement.path().to_string());
                }
            }
        }
    }

    fn doc_attrs(documentation: Option<&str>) -> Vec<Attribute> {
        documentation
            .into_iter()
            .flat_map(str::lines)
            .flat_map(|line| wrap_doc_line(line, DOC_LINE_WIDTH))
            .map(|line| {
                let line = format!(" {line}");
                parse_quote!(#[doc = #line])
            })
            .collect()
    }

    /// `base`, or `base` with the first free numeric suffix.
    fn unique_name(base: String, taken: &mut HashSet<String>) -> String {
        let mut name = base.clone();
        let mut counter = 2;
        while !taken.insert(name.clone()) {
            name = format!("{base}_{counter}");
            counter += 1;
        }
        name
    }

    fn field_name(xml_name: &str) -> String {
        let name = xml_name.to_snake_case();
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("field_{name}")
        } else {
            name
        }
    }

    fn const_name(property: &PropertyDescriptor, index: usize) -> String {
        let name: String = property
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        let name = name.trim_matches('_');
        if name.is_empty() {
            format!("VALUE_{index}")
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("VALUE_{name}")
        } else {
            name.to_string()
        }
    }

    fn field_type(&self, property: &PropertyDescriptor, value_type: &TypeRef) -> Type {
        let path = self.type_path(&value_type.use_statement);
        let occurrence = property.occurrence;
        match (occurrence.is_repeated(), occurrence.is_optional(), value_type.primitive) {
            (true, _, _) => parse_quote!(Vec<#path>),
            (false, true, true) => parse_quote!(Option<#path>),
            (false, false, true) => parse_quote!(#path),
            (false, true, false) => parse_quote!(Option<Box<#path>>),
            (false, false, false) => parse_quote!(Box<#path>),
        }
    }

    fn field(attrs: Vec<Attribute>, name: &str, ty: Type) -> Field {
        Field {
            attrs,
            vis: parse_quote!(pub),
            mutability: FieldMutability::None,
            ident: Some(Self::name_to_ident(name)),
            colon_token: Some(Default::default()),
            ty,
        }
    }

    /// The companion enum holding the value of a union property.
    fn union_enum(&self, name: &Ident, members: &[TypeRef]) -> Item {
        let mut taken = HashSet::new();
        let variants: Vec<Variant> = members
            .iter()
            .map(|member| {
                let variant = Self::unique_name(member.class_name.clone(), &mut taken);
                let variant = Self::name_to_ident(&variant);
                let path = self.type_path(&member.use_statement);
                parse_quote!(#variant(#path))
            })
            .collect();
        parse_quote! {
            #[derive(Debug, Clone, PartialEq)]
            pub enum #name {
                #(#variants),*
            }
        }
    }
}

impl TemplateVisitor for RustVisitor {
    type ModuleValue = Vec<Item>;
    fn visit_module(&mut self, ctx: &mut GeneratorContext, module: &ModuleTree) -> Vec<Item> {
        self.enter_module(ctx, module);

        let mut items: Vec<Item> = self
            .imports
            .values()
            .map(|path| {
                let path = Self::use_path(&UseStatement::new(path.as_str()));
                parse_quote!(use #path;)
            })
            .collect();

        ctx.emitted_classes.clear();
        for template in &module.templates {
            if !ctx.emitted_classes.insert(template.class_name().to_string()) {
                tracing::warn!(
                    module = self.current_module.as_str(),
                    class = template.class_name(),
                    "class generated twice in one module, skipping the second definition"
                );
                continue;
            }
            items.extend(self.visit_template(ctx, template));
        }

        for (name, child) in &module.children {
            ctx.module_path.push(name.to_string());
            let child_items = self.visit_module(ctx, child);
            ctx.module_path.pop();

            let name = Self::name_to_ident(name);
            items.push(parse_quote! {
                pub mod #name {
                    #(#child_items)*
                }
            });
        }
        items
    }

    type TemplateValue = Vec<Item>;
    fn visit_template(&mut self, _ctx: &mut GeneratorContext, template: &TypeTemplate) -> Vec<Item> {
        let name = Self::name_to_ident(template.class_name());
        let mut items = Vec::new();
        let mut fields = Vec::new();
        let mut taken_fields = HashSet::new();
        let mut constants: Vec<ImplItem> = Vec::new();
        let mut values = Vec::new();
        let mut taken_constants = HashSet::from(["VALUES".to_string()]);
        let mut union_count = 0usize;

        let parent = template.parent().map(|parent| self.type_path(&parent.use_statement));
        if let Some(parent) = &parent {
            taken_fields.insert("base".to_string());
            fields.push(Self::field(Vec::new(), "base", parse_quote!(#parent)));
        }

        for (index, property) in template.properties().iter().enumerate() {
            let docs = Self::doc_attrs(property.documentation.as_deref());
            match (&property.kind, &property.value_type) {
                (PropertyKind::Attribute | PropertyKind::Element, Some(value_type)) => {
                    let field_name =
                        Self::unique_name(Self::field_name(&property.xml_name), &mut taken_fields);
                    let ty = self.field_type(property, value_type);
                    fields.push(Self::field(docs, &field_name, ty));
                }
                (PropertyKind::Attribute | PropertyKind::Element, None) => {
                    tracing::warn!(
                        class = template.class_name(),
                        property = property.xml_name.as_str(),
                        "property without a type"
                    );
                }
                (PropertyKind::Union { members }, _) => {
                    union_count += 1;
                    let enum_name = match union_count {
                        1 => format_ident!("{}Value", name),
                        n => format_ident!("{}Value{}", name, n),
                    };
                    items.push(self.union_enum(&enum_name, members));
                    let field_name =
                        Self::unique_name(Self::field_name(&property.xml_name), &mut taken_fields);
                    fields.push(Self::field(docs, &field_name, parse_quote!(Option<#enum_name>)));
                }
                (PropertyKind::Enumeration { value }, _) => {
                    let const_name =
                        Self::unique_name(Self::const_name(property, index), &mut taken_constants);
                    let const_name = Self::name_to_ident(&const_name);
                    constants.push(parse_quote! {
                        #(#docs)*
                        pub const #const_name: &'static str = #value;
                    });
                    values.push(value.as_str());
                }
            }
        }

        let docs = Self::doc_attrs(template.documentation());
        items.insert(
            0,
            parse_quote! {
                #(#docs)*
                #[derive(Debug, Clone, Default, PartialEq)]
                pub struct #name {
                    #(#fields),*
                }
            },
        );

        if let Some(parent) = parent {
            items.push(parse_quote! {
                impl std::ops::Deref for #name {
                    type Target = #parent;
                    fn deref(&self) -> &Self::Target {
                        &self.base
                    }
                }
            });
            items.push(parse_quote! {
                impl std::ops::DerefMut for #name {
                    fn deref_mut(&mut self) -> &mut Self::Target {
                        &mut self.base
                    }
                }
            });
        }

        if !constants.is_empty() {
            items.push(parse_quote! {
                impl #name {
                    #(#constants)*
                    pub const VALUES: &'static [&'static str] = &[#(#values),*];
                }
            });
        }
        items
    }
}

pub fn generate(templates: &[TypeTemplate]) -> String {
    let tree = ModuleTree::from_templates(templates);
    let mut ctx = GeneratorContext::new();
    let mut visitor = RustVisitor::new();
    let items = visitor.visit_module(&mut ctx, &tree);

    let doc_comment = concat!(
        " Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, unused_imports, non_camel_case_types, non_snake_case)]),
        ],
        items,
    };
    prettyplease::unparse(&root)
}
