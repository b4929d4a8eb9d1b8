//! Simple decoder to inspect XML-RPC documents.

use std::fs;

use xmlrpc_codec::{decode, DecodeOptions, Envelope, Value};

fn format_value(v: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Double(f) => out.push_str(&format!("{:?}", f)),
        Value::FormattedDouble(fd) => out.push_str(&fd.render()),
        Value::Str(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                out.push_str(&format!("\"{}...\"", preview));
            } else {
                out.push_str(&format!("\"{}\"", preview));
            }
        }
        Value::DateTime(dt) => match dt.to_datetime() {
            Ok(parsed) => out.push_str(&format!("DATETIME({}, epoch_us={})", dt, parsed.epoch_micros())),
            Err(_) => out.push_str(&format!("DATETIME({}, unparsed)", dt)),
        },
        Value::Binary(b) => match b.to_bytes() {
            Ok(bytes) => out.push_str(&format!("BASE64[{} bytes]", bytes.len())),
            Err(e) => out.push_str(&format!("BASE64[invalid: {}]", e)),
        },
        Value::Array(items) => {
            out.push_str(&format!("[{} items]", items.len()));
            for item in items {
                out.push_str(&format!("\n{}  - ", pad));
                format_value(item, indent + 2, out);
            }
        }
        Value::Struct(members) => {
            out.push_str(&format!("{{{} members}}", members.len()));
            for (name, member) in members {
                out.push_str(&format!("\n{}  {}: ", pad, name));
                format_value(member, indent + 2, out);
            }
        }
        Value::Foreign(f) => out.push_str(&format!("FOREIGN({})", f.type_name())),
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "request.xml".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let envelope = decode(&data, &DecodeOptions::default()).expect("Failed to decode");
    println!("Kind: {}", envelope.kind().as_str());

    match envelope {
        Envelope::Call(call) => {
            println!("\n=== Method Call ===");
            println!("Method: {}", call.method_name);
            println!("Params: {}", call.params.len());
            for (i, param) in call.params.iter().enumerate() {
                let mut out = String::new();
                format_value(param, 1, &mut out);
                println!("  [{}] {}", i, out);
            }
        }
        Envelope::Response(response) => {
            println!("\n=== Method Response ===");
            let mut out = String::new();
            format_value(&response.param, 0, &mut out);
            println!("{}", out);
        }
        Envelope::Fault(fault) => {
            println!("\n=== Fault ===");
            println!("Code: {}", fault.fault_code);
            println!("String: {}", fault.fault_string);
        }
    }
}
