//! Scripted scroll sessions for the demo driver.
//!
//! A session is a line-oriented text file replayed against the tracker, one
//! command per line. Blank lines and `#` comments are ignored.
//!
//! ```text
//! scroll 300
//! jump conclusion
//! settle 250
//! resize 64
//! ```

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCROLL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^scroll\s+(-?\d+(?:\.\d+)?)$").unwrap());
static RE_RESIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^resize\s+(\d+(?:\.\d+)?)$").unwrap());
static RE_JUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^jump\s+(\S+)$").unwrap());
static RE_SETTLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^settle\s+(\d+)$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Move the viewport to an absolute document offset.
    Scroll { position: f64 },
    /// Re-supply the reference-line offset, as a window resize would.
    Resize { reference_line: f64 },
    /// Request programmatic navigation to a section id.
    Jump { id: String },
    /// Advance the session clock and deliver a tick.
    Settle { delay_ms: u64 },
}

/// Parse a whole session script, reporting the first bad line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptCommand>> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some(command) => commands.push(command),
            None => bail!("unrecognized script command on line {}: {raw:?}", idx + 1),
        }
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Option<ScriptCommand> {
    if let Some(caps) = RE_SCROLL.captures(line) {
        return Some(ScriptCommand::Scroll {
            position: caps[1].parse().ok()?,
        });
    }
    if let Some(caps) = RE_RESIZE.captures(line) {
        return Some(ScriptCommand::Resize {
            reference_line: caps[1].parse().ok()?,
        });
    }
    if let Some(caps) = RE_JUMP.captures(line) {
        return Some(ScriptCommand::Jump {
            id: caps[1].to_string(),
        });
    }
    if let Some(caps) = RE_SETTLE.captures(line) {
        return Some(ScriptCommand::Settle {
            delay_ms: caps[1].parse().ok()?,
        });
    }
    None
}
