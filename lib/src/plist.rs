use std::path::Path;

use plist::Value;

use crate::error::{Error, Result};

const ARTIFACT: &str = "launch agent property list";

/// Contents of a launch agent that starts a program at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAgent {
    pub label: String,
    pub program: String,
    pub arguments: Vec<String>,
}

impl LaunchAgent {
    pub fn new(label: &str, program: &Path, arguments: &[String]) -> Result<Self> {
        let program = program.to_str().ok_or_else(|| Error::Template {
            artifact: ARTIFACT,
            reason: format!("program path {} is not valid UTF-8", program.display()),
        })?;
        Ok(LaunchAgent {
            label: label.to_string(),
            program: program.to_string(),
            arguments: arguments.to_vec(),
        })
    }
}

/// Render the agent as an XML property list. The writer escapes markup
/// characters, so arguments round-trip through any plist parser unchanged.
pub fn generate_file(agent: &LaunchAgent) -> Result<String> {
    let mut plist_dict = plist::Dictionary::new();

    plist_dict.insert("Label".to_string(), Value::String(agent.label.clone()));
    plist_dict.insert("Program".to_string(), Value::String(agent.program.clone()));

    // launchd passes ProgramArguments as argv, so the program goes first.
    let mut args = vec![Value::String(agent.program.clone())];
    args.extend(agent.arguments.iter().map(|v| Value::String(v.clone())));
    plist_dict.insert("ProgramArguments".to_string(), Value::Array(args));
    plist_dict.insert("RunAtLoad".to_string(), Value::Boolean(true));

    let plist_value = Value::Dictionary(plist_dict);

    let mut plist_data = Vec::new();
    plist::to_writer_xml(&mut plist_data, &plist_value).map_err(|e| Error::Template {
        artifact: ARTIFACT,
        reason: e.to_string(),
    })?;
    String::from_utf8(plist_data).map_err(|e| Error::Template {
        artifact: ARTIFACT,
        reason: e.to_string(),
    })
}

pub fn parse_plist(content: &[u8]) -> Result<LaunchAgent> {
    let invalid = |reason: String| Error::Template {
        artifact: ARTIFACT,
        reason,
    };
    let plist = Value::from_reader_xml(content).map_err(|e| invalid(e.to_string()))?;
    let dict = plist
        .as_dictionary()
        .ok_or_else(|| invalid("root is not a dictionary".to_string()))?;

    let label = dict
        .get("Label")
        .and_then(Value::as_string)
        .ok_or_else(|| invalid("missing Label".to_string()))?
        .to_string();

    let mut arguments: Vec<String> = dict
        .get("ProgramArguments")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_string)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let program = match dict.get("Program").and_then(Value::as_string) {
        Some(program) => {
            if !arguments.is_empty() {
                arguments.remove(0);
            }
            program.to_string()
        }
        None if !arguments.is_empty() => arguments.remove(0),
        None => return Err(invalid("missing Program or ProgramArguments".to_string())),
    };

    Ok(LaunchAgent {
        label,
        program,
        arguments,
    })
}
