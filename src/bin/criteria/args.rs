use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// `--order-by` argument: a dotted path with an optional `:asc` / `:desc` suffix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub path: String,
    pub ascending: bool,
}

impl FromStr for OrderSpec {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (path, ascending) = match input.rsplit_once(':') {
            Some((path, dir)) => match dir.to_ascii_lowercase().as_str() {
                "asc" => (path, true),
                "desc" => (path, false),
                other => return Err(format!("sort direction '{other}' must be 'asc' or 'desc'")),
            },
            None => (input, true),
        };
        if path.is_empty() {
            return Err("order-by path cannot be empty".into());
        }
        Ok(Self {
            path: path.to_owned(),
            ascending,
        })
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}:{dir}", self.path)
    }
}
