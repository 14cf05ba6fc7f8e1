use anyhow::{Context, Result};
use dexlens_core::signature::{extract_class_fqn, parse_signature, to_source};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DialectReport {
    pub input: String,
    #[serde(flatten)]
    pub signature: dexlens_core::signature::Signature,
}

/// Convert any identifier to the source dialect.
pub fn convert_command(identifier: &str, json: bool) -> Result<()> {
    let converted =
        to_source(identifier).with_context(|| format!("Failed to convert '{identifier}'"))?;
    super::print_value(&converted, json)
}

/// Print the class that owns `identifier`, in the source dialect.
pub fn class_name_command(identifier: &str, json: bool) -> Result<()> {
    let class = extract_class_fqn(identifier)
        .with_context(|| format!("Failed to extract a class name from '{identifier}'"))?;
    super::print_value(&class, json)
}

/// Report the inferred dialect and kind of `identifier`.
pub fn dialect_command(identifier: &str, json: bool) -> Result<()> {
    let signature = parse_signature(identifier)
        .with_context(|| format!("Failed to classify '{identifier}'"))?;
    let report = DialectReport { input: identifier.to_string(), signature };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let dialect = match report.signature.dialect() {
        dexlens_core::signature::Dialect::Binary => "binary",
        dexlens_core::signature::Dialect::Source => "source",
    };
    println!("Input: {}", report.input);
    println!("Dialect: {dialect}");
    println!("Kind: {}", signature_kind(&report.signature));
    Ok(())
}

fn signature_kind(signature: &dexlens_core::signature::Signature) -> &'static str {
    use dexlens_core::signature::Signature;
    match signature {
        Signature::BinaryClassDescriptor(_) | Signature::SourceClassName(_) => "class",
        Signature::BinaryMethodReference(_) | Signature::SourceMethodSignature(_) => "method",
        Signature::BinaryFieldReference(_) | Signature::SourceFieldSignature(_) => "field",
    }
}
