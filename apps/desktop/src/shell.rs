//! Line commands accepted by the terminal client.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "e2era", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch to overview, account, projects or fraud.
    Tab { name: String },
    /// Print the current view again.
    Show,
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        email: String,
    },
    Logout,
    /// Reload the project list.
    Projects,
    Create {
        title: String,
        #[arg(long, short, default_value = "")]
        description: String,
    },
    Open { id: i64 },
    Close,
    /// Reload the open project.
    Refresh,
    Upload { path: PathBuf },
    Note {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        words: Vec<String>,
    },
    #[command(subcommand)]
    Agent(AgentAction),
    #[command(subcommand)]
    Fraud(FraudAction),
    /// Query the backend health endpoint.
    Health,
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AgentAction {
    Refresh,
    Run,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FraudAction {
    /// Set one claim field; an empty value clears it.
    Set {
        field: String,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    Submit,
    Reset,
    /// Reload model details.
    Model,
}

/// Parses one input line. Blank lines yield `Ok(None)`; parse failures carry clap's rendered text.
pub fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words)
        .map(|parsed| Some(parsed.action))
        .map_err(|err| err.render().to_string())
}

/// Whitespace splitting with double-quoted groups.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn quoted_title_and_description() {
        let action = parse_line(r#"create "Q3 audit" -d "inpatient claims""#)
            .expect("parse")
            .expect("action");
        assert_eq!(
            action,
            Action::Create {
                title: "Q3 audit".to_string(),
                description: "inpatient claims".to_string(),
            }
        );
    }

    #[test]
    fn note_collects_remaining_words() {
        let action = parse_line("note check DRG 470 outliers")
            .expect("parse")
            .expect("action");
        assert_eq!(
            action,
            Action::Note {
                words: vec![
                    "check".to_string(),
                    "DRG".to_string(),
                    "470".to_string(),
                    "outliers".to_string()
                ]
            }
        );
    }

    #[test]
    fn fraud_set_without_value_clears_the_field() {
        let action = parse_line("fraud set payer").expect("parse").expect("action");
        assert_eq!(
            action,
            Action::Fraud(FraudAction::Set {
                field: "payer".to_string(),
                value: Vec::new(),
            })
        );
    }

    #[test]
    fn empty_quotes_are_an_empty_word() {
        assert_eq!(
            split_words(r#"login alice """#),
            Ok(vec!["login".to_string(), "alice".to_string(), String::new()])
        );
    }

    #[test]
    fn unknown_command_and_open_quote_are_errors() {
        assert!(parse_line("frobnicate").is_err());
        assert_eq!(
            parse_line(r#"create "unfinished"#),
            Err("unterminated quote".to_string())
        );
    }
}
