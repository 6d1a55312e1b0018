//! Operator command parsing
//!
//! Commands are one-character verbs with whitespace-separated operands,
//! parsed into a tagged enum before dispatch. Operator mistakes come back
//! as short messages in the editor's terse `?error` style.

/// One parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `.` — display the cursor, or `.` expr — move it
    Dot(Option<String>),
    /// `a name [start [end]]` — add a partition; missing operands are
    /// prompted for
    Add {
        name: String,
        start: Option<String>,
        end: Option<String>,
    },
    /// `d name` — delete a partition
    Delete { name: String },
    /// `h` or `?` — print the help text
    Help,
    /// `p` — print the partition table, free space included
    Print,
    /// `P` — print the control instructions a write would issue
    CtlPrint,
    /// `w` — reconcile the control table with the layout
    Write,
    /// `q` — quit; warns once if changes are unwritten
    Quit,
}

impl Command {
    /// Parse one operator line; `line` must be non-empty
    pub fn parse(line: &str) -> Result<Command, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(&verb) = fields.first() else {
            return Err("?".to_string());
        };
        if verb.chars().count() != 1 {
            return Err("?".to_string());
        }

        let argc = fields.len();
        match verb {
            "." => match argc {
                1 => Ok(Command::Dot(None)),
                2 => Ok(Command::Dot(Some(fields[1].to_string()))),
                _ => Err("args".to_string()),
            },
            "a" => match argc {
                2..=4 => Ok(Command::Add {
                    name: fields[1].to_string(),
                    start: fields.get(2).map(|s| s.to_string()),
                    end: fields.get(3).map(|s| s.to_string()),
                }),
                _ => Err("args".to_string()),
            },
            "d" => match argc {
                2 => Ok(Command::Delete {
                    name: fields[1].to_string(),
                }),
                _ => Err("args".to_string()),
            },
            "h" | "?" => Ok(Command::Help),
            "p" => match argc {
                1 => Ok(Command::Print),
                _ => Err("args".to_string()),
            },
            "P" => match argc {
                1 => Ok(Command::CtlPrint),
                _ => Err("args".to_string()),
            },
            "w" => match argc {
                1 => Ok(Command::Write),
                _ => Err("args".to_string()),
            },
            "q" => match argc {
                1 => Ok(Command::Quit),
                _ => Err("args".to_string()),
            },
            _ => Err("?".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_forms() {
        assert_eq!(Command::parse(".").unwrap(), Command::Dot(None));
        assert_eq!(
            Command::parse(". 2048").unwrap(),
            Command::Dot(Some("2048".to_string()))
        );
        assert!(Command::parse(". 1 2").is_err());
    }

    #[test]
    fn test_add_operand_arity() {
        assert_eq!(
            Command::parse("a data").unwrap(),
            Command::Add {
                name: "data".to_string(),
                start: None,
                end: None
            }
        );
        assert_eq!(
            Command::parse("a data 0 $").unwrap(),
            Command::Add {
                name: "data".to_string(),
                start: Some("0".to_string()),
                end: Some("$".to_string())
            }
        );
        assert!(Command::parse("a").is_err());
        assert!(Command::parse("a data 0 $ extra").is_err());
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            Command::parse("d swap").unwrap(),
            Command::Delete {
                name: "swap".to_string()
            }
        );
        assert!(Command::parse("d").is_err());
    }

    #[test]
    fn test_bare_verbs() {
        assert_eq!(Command::parse("p").unwrap(), Command::Print);
        assert_eq!(Command::parse("P").unwrap(), Command::CtlPrint);
        assert_eq!(Command::parse("w").unwrap(), Command::Write);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert_eq!(Command::parse("h").unwrap(), Command::Help);
        assert_eq!(Command::parse("?").unwrap(), Command::Help);
        assert!(Command::parse("p junk").is_err());
        assert!(Command::parse("q now").is_err());
    }

    #[test]
    fn test_unknown_and_multichar_verbs() {
        assert_eq!(Command::parse("z").unwrap_err(), "?");
        assert_eq!(Command::parse("add data").unwrap_err(), "?");
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(Command::parse("   p").unwrap(), Command::Print);
    }
}
