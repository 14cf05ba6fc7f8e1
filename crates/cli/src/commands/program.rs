use anyhow::{Context, Result};

use crate::commands::{member_owner, open_instance, print_list, print_value};

/// Summary of the loaded program.
pub fn info_command(input: &str, provider: Option<&str>, json: bool) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let info = instance.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Program Info");
    println!("============");
    println!("Path: {}", info.path);
    println!("Provider: {}", info.provider);
    println!("Classes: {}", info.class_count.unwrap_or(0));
    println!("Fingerprint: {}", info.fingerprint.as_deref().unwrap_or("-"));
    println!("Loaded at: {}", info.loaded_at.as_deref().unwrap_or("-"));
    Ok(())
}

pub fn classes_command(input: &str, provider: Option<&str>, json: bool) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let classes = instance.all_classes()?;
    print_list("Classes", &classes, json)
}

pub fn manifest_command(input: &str, provider: Option<&str>, json: bool) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let manifest = instance.manifest().context("Failed to read the manifest")?;
    print_value(&manifest, json)
}

pub fn class_source_command(
    input: &str,
    provider: Option<&str>,
    class: &str,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let source = instance
        .class_source(class)
        .with_context(|| format!("Failed to get the source of {class}"))?;
    print_value(&source, json)
}

pub fn method_source_command(
    input: &str,
    provider: Option<&str>,
    class: Option<&str>,
    method: &str,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let class = member_owner(class, method)?;
    let source = instance
        .method_source(&class, method)
        .with_context(|| format!("Failed to get the source of {method}"))?;
    print_value(&source, json)
}

pub fn superclass_command(
    input: &str,
    provider: Option<&str>,
    class: &str,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let superclass = instance
        .superclass(class)
        .with_context(|| format!("Failed to get the superclass of {class}"))?;
    print_value(&superclass, json)
}

/// Which per-class list a [`class_list_command`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassListKind {
    Interfaces,
    Methods,
    Fields,
    Callers,
}

impl ClassListKind {
    fn label(self) -> &'static str {
        match self {
            ClassListKind::Interfaces => "Interfaces",
            ClassListKind::Methods => "Methods",
            ClassListKind::Fields => "Fields",
            ClassListKind::Callers => "Callers",
        }
    }
}

pub fn class_list_command(
    input: &str,
    provider: Option<&str>,
    class: &str,
    kind: ClassListKind,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let items = match kind {
        ClassListKind::Interfaces => instance.interfaces(class),
        ClassListKind::Methods => instance.class_methods(class),
        ClassListKind::Fields => instance.class_fields(class),
        ClassListKind::Callers => instance.class_callers(class),
    }
    .with_context(|| format!("Failed to list {} of {class}", kind.label().to_lowercase()))?;
    print_list(kind.label(), &items, json)
}

/// Which per-member list a [`member_list_command`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberListKind {
    MethodCallers,
    MethodOverrides,
    FieldCallers,
}

impl MemberListKind {
    fn label(self) -> &'static str {
        match self {
            MemberListKind::MethodCallers | MemberListKind::FieldCallers => "Callers",
            MemberListKind::MethodOverrides => "Overrides",
        }
    }
}

pub fn member_list_command(
    input: &str,
    provider: Option<&str>,
    class: Option<&str>,
    member: &str,
    kind: MemberListKind,
    json: bool,
) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let class = member_owner(class, member)?;
    let items = match kind {
        MemberListKind::MethodCallers => instance.method_callers(&class, member),
        MemberListKind::MethodOverrides => instance.method_overrides(&class, member),
        MemberListKind::FieldCallers => instance.field_callers(&class, member),
    }
    .with_context(|| format!("Failed to list {} of {member}", kind.label().to_lowercase()))?;
    print_list(kind.label(), &items, json)
}

/// Methods whose reconstructed source contains `text`.
pub fn search_command(input: &str, provider: Option<&str>, text: &str, json: bool) -> Result<()> {
    let instance = open_instance(input, provider)?;
    let hits = instance.search_text(text)?;
    print_list("Matches", &hits, json)
}
