//! Line commands for the interactive `browse` session.

use postview::models::Id;

pub const HELP: &str = "\
commands:
  select [USER]   show a user's posts (no id selects the default user)
  toggle POST     show or hide a post's comments
  show            print the page as text
  html            print the page as HTML
  users           list users
  help            print this help
  quit            leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// The raw selection value, handed to the page as-is.
    Select(Option<String>),
    Toggle(Id),
    Show,
    Html,
    Users,
    Help,
    Quit,
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<BrowseCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments to '{word}'"));
    }

    let command = match (word.to_lowercase().as_str(), arg) {
        ("select" | "s", value) => BrowseCommand::Select(value.map(str::to_string)),
        ("toggle" | "t", Some(value)) => {
            let id = value
                .parse::<Id>()
                .map_err(|_| format!("'{value}' is not a post id"))?;
            BrowseCommand::Toggle(id)
        }
        ("toggle" | "t", None) => return Err("toggle needs a post id".to_string()),
        ("show", None) => BrowseCommand::Show,
        ("html", None) => BrowseCommand::Html,
        ("users", None) => BrowseCommand::Users,
        ("help" | "?", None) => BrowseCommand::Help,
        ("quit" | "exit" | "q", None) => BrowseCommand::Quit,
        (other, Some(_)) if ["show", "html", "users", "help", "?", "quit", "exit", "q"].contains(&other) => {
            return Err(format!("'{word}' takes no arguments"));
        }
        _ => return Err(format!("unknown command '{word}' (try 'help')")),
    };
    Ok(Some(command))
}
