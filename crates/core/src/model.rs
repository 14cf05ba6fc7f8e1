//! Program graph as handed over by a [`crate::provider::ProgramProvider`].
//!
//! Symbols are plain serde-friendly values so providers can build them from
//! exported models and tests can build them by hand. The core never mutates a
//! graph after [`ProgramGraph::new`] has normalized it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Superclass reported for classes that declare none.
pub const DEFAULT_SUPERCLASS: &str = "java.lang.Object";

/// A class in the decompiled program, including its nested classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    /// Dotted full name; nested classes use `.` (`com.example.IFoo.Stub`).
    pub full_name: String,
    /// Simple name (`Stub`). Derived from `full_name` when left empty.
    #[serde(default)]
    pub name: String,
    /// Rendered superclass reference; nested owners keep `$` (`com.example.IFoo$Stub`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
    #[serde(default)]
    pub fields: Vec<FieldSymbol>,
    #[serde(default)]
    pub inner_classes: Vec<ClassSymbol>,
    /// Rendered names of symbols that reference this class.
    #[serde(default)]
    pub used_in: Vec<String>,
    /// Reconstructed source, when the exporter captured it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ClassSymbol {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = simple_name(&full_name).to_string();
        Self {
            full_name,
            name,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            inner_classes: Vec::new(),
            used_in: Vec::new(),
            source: None,
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Attach a method; its declaring class is set to this class.
    pub fn with_method(mut self, mut method: MethodSymbol) -> Self {
        method.declaring_class = self.full_name.clone();
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, mut field: FieldSymbol) -> Self {
        field.declaring_class = self.full_name.clone();
        self.fields.push(field);
        self
    }

    pub fn with_inner(mut self, inner: ClassSymbol) -> Self {
        self.inner_classes.push(inner);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Rendered superclass, or `java.lang.Object` when none is declared.
    pub fn superclass_or_default(&self) -> &str {
        self.superclass.as_deref().unwrap_or(DEFAULT_SUPERCLASS)
    }

    /// Canonical rendering of a class symbol: its full name.
    pub fn render_signature(&self) -> String {
        self.full_name.clone()
    }

    pub fn find_method(&self, signature: &str) -> Option<&MethodSymbol> {
        self.methods.iter().find(|m| m.render_signature() == signature)
    }

    pub fn find_field(&self, signature: &str) -> Option<&FieldSymbol> {
        self.fields.iter().find(|f| f.render_signature() == signature)
    }

    // Fill in derived names below this class after deserialization.
    fn normalize(&mut self) {
        if self.name.is_empty() {
            self.name = simple_name(&self.full_name).to_string();
        }
        for method in &mut self.methods {
            method.declaring_class.clone_from(&self.full_name);
        }
        for field in &mut self.fields {
            field.declaring_class.clone_from(&self.full_name);
        }
        for inner in &mut self.inner_classes {
            inner.normalize();
        }
    }

    fn collect_with_inners<'a>(&'a self, out: &mut Vec<&'a ClassSymbol>) {
        out.push(self);
        for inner in &self.inner_classes {
            inner.collect_with_inners(out);
        }
    }
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    /// Parameter types in the source dialect, in declaration order.
    #[serde(default)]
    pub params: Vec<String>,
    pub return_type: String,
    #[serde(default)]
    pub declaring_class: String,
    #[serde(default)]
    pub used_in: Vec<String>,
    /// Rendered signatures of methods this one overrides or is overridden by.
    #[serde(default)]
    pub overrides: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>, params: &[&str], return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            return_type: return_type.into(),
            declaring_class: String::new(),
            used_in: Vec::new(),
            overrides: Vec::new(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// `com.example.Abc.testMethod(java.lang.String, int):void`
    pub fn render_signature(&self) -> String {
        format!(
            "{}.{}({}):{}",
            self.declaring_class,
            self.name,
            self.params.join(", "),
            self.return_type
        )
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub declaring_class: String,
    #[serde(default)]
    pub used_in: Vec<String>,
}

impl FieldSymbol {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            declaring_class: String::new(),
            used_in: Vec::new(),
        }
    }

    /// `com.example.Abc.count :int` (the space before the colon is part of the format).
    pub fn render_signature(&self) -> String {
        format!("{}.{} :{}", self.declaring_class, self.name, self.field_type)
    }
}

/// One loaded program: top-level classes plus load metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramGraph {
    pub classes: Vec<ClassSymbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// Hex SHA-256 over the loaded inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// RFC 3339 load timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

impl ProgramGraph {
    pub fn new(mut classes: Vec<ClassSymbol>, manifest: Option<String>) -> Self {
        for class in &mut classes {
            class.normalize();
        }
        Self { classes, manifest, inputs: Vec::new(), fingerprint: None, loaded_at: None }
    }

    /// Every class including nested ones, each followed by its inners (preorder).
    pub fn classes_with_inners(&self) -> Vec<&ClassSymbol> {
        let mut out = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            class.collect_with_inners(&mut out);
        }
        out
    }

    pub fn class_count(&self) -> usize {
        self.classes_with_inners().len()
    }

    pub fn find_class(&self, full_name: &str) -> Option<&ClassSymbol> {
        self.classes_with_inners().into_iter().find(|c| c.full_name == full_name)
    }
}

fn simple_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}
