// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! portable-inspect - Dump a serialized portable object
//!
//! Shows the header, the footer entries and every field value. Field names
//! are resolved from `--type`/`--field` hints; without them only raw field
//! ids are shown.

use clap::Parser;
use colored::*;
use portable::ser::Header;
use portable::{BinaryObject, PortableConfig, PortableMarshaller, Value};
use std::collections::HashMap;
use std::path::PathBuf;

/// Dump a serialized portable object
#[derive(Parser, Debug)]
#[command(name = "portable-inspect")]
#[command(version = "0.1.0")]
#[command(about = "Dump the header, footer and fields of a portable object")]
struct Args {
    /// File holding one serialized object
    file: PathBuf,

    /// Output format: pretty, json
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Accept buffers whose content hash does not match
    #[arg(long)]
    no_verify: bool,

    /// Type name used to resolve field names
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,

    /// Field name to resolve (repeatable, needs --type)
    #[arg(short = 'F', long = "field")]
    fields: Vec<String>,

    /// How many levels of nested objects to expand
    #[arg(short, long, default_value = "1")]
    depth: usize,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.file)?;

    let marshaller = PortableMarshaller::builder()
        .with_config(PortableConfig {
            verify_hash: !args.no_verify,
            ..PortableConfig::default()
        })
        .build()?;

    let names = field_names(&marshaller, args)?;
    let header = Header::parse(&bytes, 0)?;
    let object = marshaller.to_binary(bytes)?;

    match args.format {
        OutputFormat::Pretty => print_pretty(&header, &object, &names, args.depth, 0)?,
        OutputFormat::Json => {
            let doc = to_json(&header, &object, &names, args.depth)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

/// Field id -> name, from the command-line hints.
fn field_names(
    marshaller: &PortableMarshaller,
    args: &Args,
) -> Result<HashMap<u32, String>, Box<dyn std::error::Error>> {
    let mut names = HashMap::new();
    match &args.type_name {
        Some(type_name) => {
            for field in &args.fields {
                names.insert(marshaller.field_id(type_name, field), field.clone());
            }
        }
        None if !args.fields.is_empty() => return Err("--field needs --type".into()),
        None => {}
    }
    Ok(names)
}

fn label(names: &HashMap<u32, String>, field_id: u32) -> String {
    match names.get(&field_id) {
        Some(name) => format!("{} ({:#010x})", name, field_id),
        None => format!("{:#010x}", field_id),
    }
}

fn print_pretty(
    header: &Header,
    object: &BinaryObject,
    names: &HashMap<u32, String>,
    depth: usize,
    indent: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let pad = "  ".repeat(indent);

    println!(
        "{}{} type={:#010x} schema={:#010x} hash={:#010x}",
        pad,
        "object".green().bold(),
        header.type_id,
        header.schema_id,
        header.hash
    );
    println!(
        "{}  {}",
        pad,
        format!(
            "length={} footer@{} flags={:#06x} offset-width={} fields={}",
            header.length,
            header.footer_offset,
            header.flags,
            header.offset_width(),
            header.field_count()
        )
        .dimmed()
    );

    for field_id in object.field_ids()? {
        let key = label(names, field_id);
        match object.value_by_id(field_id)? {
            None => println!("{}  {} = {}", pad, key.cyan(), "null".yellow()),
            Some(Value::Object(nested)) if depth > 0 => {
                println!("{}  {} =", pad, key.cyan());
                let nested_header = Header::parse(nested.bytes(), 0)?;
                print_pretty(&nested_header, &nested, names, depth - 1, indent + 2)?;
            }
            Some(value) => println!(
                "{}  {} = {} {}",
                pad,
                key.cyan(),
                value,
                format!("[{}]", value.type_name()).dimmed()
            ),
        }
    }
    Ok(())
}

fn to_json(
    header: &Header,
    object: &BinaryObject,
    names: &HashMap<u32, String>,
    depth: usize,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut fields = Vec::new();
    for field_id in object.field_ids()? {
        let value = match object.value_by_id(field_id)? {
            None => serde_json::Value::Null,
            Some(Value::Object(nested)) if depth > 0 => {
                let nested_header = Header::parse(nested.bytes(), 0)?;
                to_json(&nested_header, &nested, names, depth - 1)?
            }
            Some(value) => json_value(&value),
        };
        fields.push(serde_json::json!({
            "id": field_id,
            "name": names.get(&field_id),
            "value": value,
        }));
    }

    Ok(serde_json::json!({
        "type_id": header.type_id,
        "schema_id": header.schema_id,
        "hash": header.hash,
        "length": header.length,
        "footer_offset": header.footer_offset,
        "flags": header.flags,
        "fields": fields,
    }))
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => (*v).into(),
        Value::Byte(v) => (*v).into(),
        Value::Short(v) => (*v).into(),
        Value::Int(v) => (*v).into(),
        Value::Long(v) => (*v).into(),
        Value::Float(v) => (*v).into(),
        Value::Double(v) => (*v).into(),
        Value::String(v) => v.as_str().into(),
        Value::ByteArray(v) => v.iter().map(|b| serde_json::Value::from(*b)).collect(),
        other => other.to_string().into(),
    }
}
