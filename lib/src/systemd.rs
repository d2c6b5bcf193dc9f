use crate::error::{Error, Result};
use crate::Scope;

/// Comment added to generated unit files to indicate they are managed by autostart
pub const MANAGED_BY_COMMENT: &str = "# Managed by autostart";

const ARTIFACT: &str = "systemd unit";

/// The parts of a unit file that autostart writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub description: String,
    pub program: String,
    pub arguments: Vec<String>,
    pub wanted_by: String,
}

/// Install target for a scope: the user manager's default target, or the
/// multi-user target of the system manager.
pub fn wanted_by(scope: Scope) -> &'static str {
    match scope {
        Scope::User => "default.target",
        Scope::System => "multi-user.target",
    }
}

pub fn generate_file(unit: &Unit) -> String {
    let mut unit_content = String::new();
    unit_content.push_str(MANAGED_BY_COMMENT);
    unit_content.push('\n');
    unit_content.push_str("[Unit]\n");
    unit_content.push_str(&format!("Description={}\n", single_line(&unit.description)));

    unit_content.push_str("\n[Service]\n");
    unit_content.push_str("ExecStart=");
    unit_content.push_str(&quote_arg(&unit.program));
    for arg in &unit.arguments {
        unit_content.push(' ');
        unit_content.push_str(&quote_arg(arg));
    }
    unit_content.push('\n');

    unit_content.push_str("\n[Install]\n");
    unit_content.push_str(&format!("WantedBy={}\n", unit.wanted_by));

    unit_content
}

pub fn parse_systemd(contents: &str) -> Result<Unit> {
    let mut description = None;
    let mut command = None;
    let mut wanted_by = None;

    for line in contents.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Description=") {
            description = Some(value.replace("%%", "%"));
        } else if let Some(value) = line.strip_prefix("ExecStart=") {
            command = Some(split_exec_start(value)?);
        } else if let Some(value) = line.strip_prefix("WantedBy=") {
            wanted_by = Some(value.to_string());
        }
    }

    let mut command = command.ok_or_else(|| malformed("missing ExecStart line"))?;
    if command.is_empty() {
        return Err(malformed("ExecStart line is empty"));
    }
    let program = command.remove(0);
    Ok(Unit {
        description: description.unwrap_or_default(),
        program,
        arguments: command,
        wanted_by: wanted_by.unwrap_or_default(),
    })
}

/// Quote one word for `ExecStart=`.
///
/// systemd unquotes C-style escapes inside double quotes, then resolves `%`
/// specifiers and `$` variables on the result, so both are doubled.
pub fn quote_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '%' => quoted.push_str("%%"),
            '$' => quoted.push_str("$$"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Split an `ExecStart=` value into words the way systemd does.
pub fn split_exec_start(value: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut chars = value.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut word = String::new();
        let mut quote: Option<char> = None;
        while let Some(c) = chars.next() {
            match (c, quote) {
                (c, None) if c.is_whitespace() => break,
                ('"' | '\'', None) => quote = Some(c),
                (c, Some(q)) if c == q => quote = None,
                ('\\', _) => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| malformed("trailing backslash in ExecStart"))?;
                    word.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => other,
                    });
                }
                ('%' | '$', _) if chars.peek() == Some(&c) => {
                    chars.next();
                    word.push(c);
                }
                (c, _) => word.push(c),
            }
        }
        if quote.is_some() {
            return Err(malformed("unterminated quote in ExecStart"));
        }
        words.push(word);
    }

    Ok(words)
}

fn single_line(value: &str) -> String {
    value
        .replace(['\r', '\n'], " ")
        .replace('%', "%%")
}

fn malformed(reason: &str) -> Error {
    Error::Template {
        artifact: ARTIFACT,
        reason: reason.to_string(),
    }
}
