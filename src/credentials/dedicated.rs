use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tracing::debug;

use super::{Credentials, LoadCredentials};

/// Reads the `masterserver_account` block of a dedicated server XML config.
#[derive(Debug, Clone)]
pub struct DedicatedConfigSource {
    pub path: PathBuf,
}

impl DedicatedConfigSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl LoadCredentials for DedicatedConfigSource {
    fn try_load(&self) -> Result<Option<Credentials>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "dedicated config not found");
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
        };
        parse_dedicated_config(&content)
            .with_context(|| format!("parsing {}", self.path.display()))
    }
}

/// Extracts login and password, ignoring anything inside `<!-- -->` comments.
pub fn parse_dedicated_config(content: &str) -> Result<Option<Credentials>> {
    let content = strip_comments(content)?;

    let account_re = Regex::new(r"(?s)<masterserver_account>(.*?)</masterserver_account>")?;
    let Some(account) = account_re.captures(&content).and_then(|c| c.get(1)) else {
        return Ok(None);
    };

    let login = tag_text(account.as_str(), "login")?;
    let password = tag_text(account.as_str(), "password")?;

    match (login, password) {
        (Some(login), Some(password)) if !login.is_empty() => {
            Ok(Some(Credentials::new(login, password)))
        }
        _ => Ok(None),
    }
}

fn strip_comments(content: &str) -> Result<String> {
    let comment_re = Regex::new(r"(?s)<!--.*?-->")?;
    let stripped = comment_re.replace_all(content, "");
    if let Some(at) = stripped.find("<!--") {
        bail!("unterminated comment at byte {}", at);
    }
    Ok(stripped.into_owned())
}

fn tag_text(block: &str, tag: &str) -> Result<Option<String>> {
    let re = Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>"))
        .map_err(|e| anyhow!("tag pattern for '{}': {}", tag, e))?;
    Ok(re
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim())))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
