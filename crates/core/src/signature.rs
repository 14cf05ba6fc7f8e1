//! Conversion between the binary descriptor dialect and the source dialect.
//!
//! The binary dialect is the compact encoding used by dex/class files and
//! smali (`Lcom/example/Foo;`, `Lcom/example/Foo;->bar(I)V`). The source
//! dialect is the dotted form the decompiler renders (`com.example.Foo`,
//! `com.example.Foo.bar(int):void`). Renderings here must agree exactly with
//! the decompiler, including its `AnonymousClass<N>` naming and the
//! `name :Type` field form.
//!
//! Every function is pure. Failures come back as [`CoreError`] values and are
//! logged at `warn` level; nothing here panics on bad input.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};

/// Prefix the decompiler uses when it renames numbered nested classes.
const ANONYMOUS_CLASS_PREFIX: &str = ".AnonymousClass";

/// Separator between the owner descriptor and the member in a binary reference.
const MEMBER_ARROW: &str = "->";

/// Which naming dialect a piece of text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Binary,
    Source,
}

/// A symbol reference tagged with its inferred dialect and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Signature {
    BinaryClassDescriptor(String),
    BinaryMethodReference(String),
    BinaryFieldReference(String),
    SourceClassName(String),
    SourceMethodSignature(String),
    SourceFieldSignature(String),
}

impl Signature {
    pub fn dialect(&self) -> Dialect {
        match self {
            Signature::BinaryClassDescriptor(_)
            | Signature::BinaryMethodReference(_)
            | Signature::BinaryFieldReference(_) => Dialect::Binary,
            Signature::SourceClassName(_)
            | Signature::SourceMethodSignature(_)
            | Signature::SourceFieldSignature(_) => Dialect::Source,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Signature::BinaryClassDescriptor(s)
            | Signature::BinaryMethodReference(s)
            | Signature::BinaryFieldReference(s)
            | Signature::SourceClassName(s)
            | Signature::SourceMethodSignature(s)
            | Signature::SourceFieldSignature(s) => s,
        }
    }
}

/// Primitive type codes of the descriptor grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
}

impl Primitive {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'Z' => Some(Primitive::Boolean),
            b'C' => Some(Primitive::Char),
            b'B' => Some(Primitive::Byte),
            b'S' => Some(Primitive::Short),
            b'I' => Some(Primitive::Int),
            b'F' => Some(Primitive::Float),
            b'J' => Some(Primitive::Long),
            b'D' => Some(Primitive::Double),
            _ => None,
        }
    }

    pub fn source_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Long => "long",
            Primitive::Double => "double",
        }
    }
}

/// One parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Void,
    Primitive(Primitive),
    /// Internal name with `/` separators, without the `L`/`;` wrapper.
    Object(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Render in the source dialect, applying anonymous-class normalization to
    /// object names.
    pub fn source_name(&self) -> String {
        match self {
            TypeDescriptor::Void => "void".to_string(),
            TypeDescriptor::Primitive(p) => p.source_name().to_string(),
            TypeDescriptor::Object(internal) => normalize_synthetic_name(&internal.replace('/', ".")),
            TypeDescriptor::Array(element) => format!("{}[]", element.source_name()),
        }
    }
}

/// Parsed `(<params>)<return>` method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}

/// Infer the dialect of `text`.
///
/// Binary if it contains `/`, is wrapped as `L...;`, or starts with `[`.
/// Empty input cannot be classified.
pub fn classify_dialect(text: &str) -> CoreResult<Dialect> {
    if text.is_empty() {
        return Err(CoreError::MalformedReference("empty identifier".to_string()));
    }
    let binary = text.contains('/')
        || (text.starts_with('L') && text.ends_with(';'))
        || text.starts_with('[');
    Ok(if binary { Dialect::Binary } else { Dialect::Source })
}

/// Classify `text` into one of the six tagged signature kinds.
pub fn parse_signature(text: &str) -> CoreResult<Signature> {
    let owned = text.to_string();
    Ok(match classify_dialect(text)? {
        Dialect::Binary => match text.split_once(MEMBER_ARROW) {
            Some((_, member)) if member.contains('(') => Signature::BinaryMethodReference(owned),
            Some(_) => Signature::BinaryFieldReference(owned),
            None => Signature::BinaryClassDescriptor(owned),
        },
        Dialect::Source => {
            if text.contains('(') {
                Signature::SourceMethodSignature(owned)
            } else if text.contains(" :") {
                Signature::SourceFieldSignature(owned)
            } else {
                Signature::SourceClassName(owned)
            }
        }
    })
}

/// Convert any identifier to the source dialect.
///
/// Binary class descriptors, method references and field references are
/// converted; source-dialect text is returned unchanged.
pub fn to_source(text: &str) -> CoreResult<String> {
    match parse_signature(text)? {
        Signature::BinaryClassDescriptor(s) => class_name_to_source(&s),
        Signature::BinaryMethodReference(s) => method_reference_to_source(&s),
        Signature::BinaryFieldReference(s) => field_reference_to_source(&s),
        Signature::SourceClassName(s)
        | Signature::SourceMethodSignature(s)
        | Signature::SourceFieldSignature(s) => Ok(s),
    }
}

/// Parse exactly one type descriptor (`V` allowed).
pub fn parse_type_descriptor(descriptor: &str) -> CoreResult<TypeDescriptor> {
    let (ty, rest) = parse_type(descriptor, true)
        .ok_or_else(|| CoreError::MalformedDescriptor(descriptor.to_string()))?;
    if !rest.is_empty() {
        return Err(CoreError::MalformedDescriptor(descriptor.to_string()));
    }
    Ok(ty)
}

/// Parse a `(<params>)<return>` method descriptor.
pub fn parse_method_descriptor(descriptor: &str) -> CoreResult<MethodDescriptor> {
    let malformed = || CoreError::MalformedDescriptor(descriptor.to_string());

    let mut rest = descriptor.strip_prefix('(').ok_or_else(malformed)?;
    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        let (param, after) = parse_type(rest, false).ok_or_else(malformed)?;
        params.push(param);
        rest = after;
    }

    let (return_type, trailing) = parse_type(rest, true).ok_or_else(malformed)?;
    if !trailing.is_empty() {
        return Err(malformed());
    }
    Ok(MethodDescriptor { params, return_type })
}

// Returns the parsed type and the unconsumed remainder, or `None` when the
// input does not start with a valid descriptor.
fn parse_type(input: &str, allow_void: bool) -> Option<(TypeDescriptor, &str)> {
    let code = *input.as_bytes().first()?;
    match code {
        b'V' if allow_void => Some((TypeDescriptor::Void, &input[1..])),
        b'L' => {
            let end = input.find(';')?;
            let name = &input[1..end];
            if name.is_empty() || name.contains(['(', ')', '[']) {
                return None;
            }
            Some((TypeDescriptor::Object(name.to_string()), &input[end + 1..]))
        }
        b'[' => {
            let (element, rest) = parse_type(&input[1..], false)?;
            Some((TypeDescriptor::Array(Box::new(element)), rest))
        }
        other => Primitive::from_code(other).map(|p| (TypeDescriptor::Primitive(p), &input[1..])),
    }
}

/// Rewrite `Outer$<digits>` as `Outer.AnonymousClass<digits>`.
///
/// Only the segment after the final `$` is considered; named nested classes
/// keep their `$`.
pub fn normalize_synthetic_name(class_name: &str) -> String {
    if let Some(idx) = class_name.rfind('$') {
        let suffix = &class_name[idx + 1..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return format!("{}{}{}", &class_name[..idx], ANONYMOUS_CLASS_PREFIX, suffix);
        }
    }
    class_name.to_string()
}

/// Convert one binary type descriptor to its source name.
///
/// `Lcom/example/Foo;` -> `com.example.Foo`, `[[I` -> `int[][]`,
/// `Lcom/example/Outer$3;` -> `com.example.Outer.AnonymousClass3`.
pub fn class_name_to_source(descriptor: &str) -> CoreResult<String> {
    parse_type_descriptor(descriptor).map(|ty| ty.source_name()).inspect_err(|_| {
        warn!(descriptor, "malformed type descriptor");
    })
}

/// Owning class of a source-dialect member reference.
///
/// `com.example.Foo.bar(int):void` -> `com.example.Foo`,
/// `com.example.Foo.count :int` -> `com.example.Foo`. The text is cut at the
/// parameter list (or at the ` :` of a field signature) before the final
/// `.` segment is stripped. A name without a class qualifier yields `None`.
/// The decompiler's own helper does not cut at ` :`, so it returns
/// `a.B.f :java.lang` for `a.B.f :java.lang.String` where this returns `a.B`.
pub fn extract_class_name_from_reference(reference: &str) -> Option<String> {
    let cut = reference.find('(').or_else(|| reference.find(" :"));
    let head = match cut {
        Some(idx) => &reference[..idx],
        None => reference,
    };
    match head.rfind('.') {
        Some(dot) if dot > 0 => Some(head[..dot].to_string()),
        _ => None,
    }
}

/// Extract the owning class of any identifier, in the source dialect.
///
/// Binary input uses its leading `L...;` descriptor, so a full member
/// reference yields its declaring class.
pub fn extract_class_fqn(identifier: &str) -> CoreResult<String> {
    match classify_dialect(identifier)? {
        Dialect::Binary => {
            let descriptor = leading_class_descriptor(identifier).ok_or_else(|| {
                warn!(identifier, "identifier does not start with a class descriptor");
                CoreError::MalformedDescriptor(identifier.to_string())
            })?;
            class_name_to_source(descriptor)
        }
        Dialect::Source => extract_class_name_from_reference(identifier)
            .ok_or_else(|| CoreError::MalformedReference(identifier.to_string())),
    }
}

/// `Lcom/example/Abc;->testMethod(Ljava/lang/String;I)V` ->
/// `com.example.Abc.testMethod(java.lang.String, int):void`
pub fn method_reference_to_source(reference: &str) -> CoreResult<String> {
    let (class_name, member) = split_member_reference(reference)?;

    let paren = member.find('(').filter(|&idx| idx > 0).ok_or_else(|| {
        warn!(reference, "malformed method reference");
        CoreError::MalformedReference(reference.to_string())
    })?;
    let (name, descriptor) = member.split_at(paren);

    let method = parse_method_descriptor(descriptor).inspect_err(|_| {
        warn!(reference, "malformed method descriptor");
    })?;
    let params: Vec<String> = method.params.iter().map(TypeDescriptor::source_name).collect();

    Ok(format!(
        "{}.{}({}):{}",
        class_name,
        name,
        params.join(", "),
        method.return_type.source_name()
    ))
}

/// `Lcom/example/Abc;->count:I` -> `com.example.Abc.count :int`
pub fn field_reference_to_source(reference: &str) -> CoreResult<String> {
    let (class_name, member) = split_member_reference(reference)?;

    let (name, descriptor) = member
        .split_once(':')
        .filter(|(name, descriptor)| !name.is_empty() && !descriptor.is_empty())
        .ok_or_else(|| {
            warn!(reference, "malformed field reference");
            CoreError::MalformedReference(reference.to_string())
        })?;
    let field_type = class_name_to_source(descriptor)?;

    Ok(format!("{class_name}.{name} :{field_type}"))
}

// Splits `L<path>;-><member>` and converts the owner. The owner must be an
// object descriptor; arrays cannot own members.
fn split_member_reference(reference: &str) -> CoreResult<(String, &str)> {
    let malformed = || {
        warn!(reference, "malformed member reference");
        CoreError::MalformedReference(reference.to_string())
    };
    let owner = leading_class_descriptor(reference).ok_or_else(malformed)?;
    let member = reference[owner.len()..].strip_prefix(MEMBER_ARROW).ok_or_else(malformed)?;
    let class_name = class_name_to_source(owner)?;
    Ok((class_name, member))
}

fn leading_class_descriptor(text: &str) -> Option<&str> {
    if !text.starts_with('L') {
        return None;
    }
    let end = text.find(';')?;
    (end > 1).then(|| &text[..=end])
}
