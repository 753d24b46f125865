use log::debug;
use std::{
    fmt, fs,
    io::{BufRead, Write},
    path::Path,
    str::FromStr,
};

use crate::{console::Console, error::SessionError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Formatter {
    Plain,
    Bold,
    Italic,
    InlineCode,
    Link,
    Header,
    UnorderedList,
    OrderedList,
    NewLine,
}

pub const FORMATTERS: [Formatter; 9] = [
    Formatter::Plain,
    Formatter::Bold,
    Formatter::Italic,
    Formatter::InlineCode,
    Formatter::Link,
    Formatter::Header,
    Formatter::UnorderedList,
    Formatter::OrderedList,
    Formatter::NewLine,
];

pub const COMMANDS: [&str; 2] = ["!help", "!done"];

impl Formatter {
    pub fn name(&self) -> &'static str {
        match self {
            Formatter::Plain => "plain",
            Formatter::Bold => "bold",
            Formatter::Italic => "italic",
            Formatter::InlineCode => "inline-code",
            Formatter::Link => "link",
            Formatter::Header => "header",
            Formatter::UnorderedList => "unordered-list",
            Formatter::OrderedList => "ordered-list",
            Formatter::NewLine => "new-line",
        }
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Formatter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMATTERS
            .iter()
            .copied()
            .find(|formatter| formatter.name() == s)
            .ok_or(())
    }
}

pub fn bold(text: &str) -> String {
    format!("**{}**", text)
}

pub fn italic(text: &str) -> String {
    format!("*{}*", text)
}

pub fn inline_code(text: &str) -> String {
    format!("`{}`", text)
}

pub fn link(label: &str, url: &str) -> String {
    format!("[{}]({})", label, url)
}

pub fn header(level: u8, text: &str) -> String {
    format!("{} {}", "#".repeat(level as usize), text)
}

/// Rows each on their own line, with a line break before and after the list.
pub fn list<S: AsRef<str>>(rows: &[S], ordered: bool) -> String {
    let mut result = String::new();
    for (i, row) in rows.iter().enumerate() {
        result.push('\n');
        if ordered {
            result.push_str(&format!("{}. {}", i + 1, row.as_ref()));
        } else {
            result.push_str(&format!("* {}", row.as_ref()));
        }
    }
    result.push('\n');
    result
}

fn header_level(answer: &str) -> Result<u8, String> {
    match answer.parse::<i64>() {
        Ok(level @ 1..=6) => Ok(level as u8),
        Ok(_) => Err("The level should be within the range of 1 to 6".to_string()),
        Err(_) => Err("The value must be numeric".to_string()),
    }
}

fn row_count(answer: &str) -> Result<usize, String> {
    match answer.parse::<i64>() {
        Ok(count) if count > 0 => Ok(count as usize),
        Ok(_) => Err("The number of rows should be greater than zero".to_string()),
        Err(_) => Err("The value must be numeric".to_string()),
    }
}

/// Builds a document one formatter at a time until `!done`.
pub struct Editor<R, W> {
    console: Console<R, W>,
    document: String,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(console: Console<R, W>) -> Self {
        Self {
            console,
            document: String::new(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Runs until `!done` and returns the finished document.
    pub fn run(&mut self) -> Result<String, SessionError> {
        loop {
            let choice = self.console.ask("Choose a formatter: > ")?;
            match choice.as_str() {
                "!done" => return Ok(self.document.clone()),
                "!help" => self.help()?,
                other => match other.parse::<Formatter>() {
                    Ok(formatter) => {
                        let piece = self.format(formatter)?;
                        debug!("{} adds {:?}", formatter, piece);
                        self.document.push_str(&piece);
                        self.console.say(&self.document)?;
                    }
                    Err(()) => self.console.say("Unknown formatting type or command")?,
                },
            }
        }
    }

    fn help(&mut self) -> Result<(), SessionError> {
        let names: Vec<&str> = FORMATTERS.iter().map(|f| f.name()).collect();
        self.console
            .say(format!("Available formatters: {}", names.join(" ")))?;
        self.console
            .say(format!("Special commands: {}", COMMANDS.join(" ")))
    }

    fn format(&mut self, formatter: Formatter) -> Result<String, SessionError> {
        let piece = match formatter {
            Formatter::Plain => self.console.ask("Text: > ")?,
            Formatter::Bold => bold(&self.console.ask("Text: > ")?),
            Formatter::Italic => italic(&self.console.ask("Text: > ")?),
            Formatter::InlineCode => inline_code(&self.console.ask("Text: > ")?),
            Formatter::Link => {
                let label = self.console.ask("Label: > ")?;
                let url = self.console.ask("URL: > ")?;
                link(&label, &url)
            }
            Formatter::Header => {
                let level = self.console.ask_until("Level: > ", header_level)?;
                header(level, &self.console.ask("Text: > ")?)
            }
            Formatter::UnorderedList | Formatter::OrderedList => {
                let count = self.console.ask_until("Number of rows: > ", row_count)?;
                let mut rows = Vec::with_capacity(count);
                for i in 1..=count {
                    rows.push(self.console.ask(&format!("Row #{}: > ", i))?);
                }
                list(&rows, formatter == Formatter::OrderedList)
            }
            Formatter::NewLine => "\n".to_string(),
        };
        Ok(piece)
    }
}

/// Overwrites `path` with the finished document.
pub fn save(path: &Path, document: &str) -> Result<(), SessionError> {
    fs::write(path, document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{bold, header, inline_code, italic, link, list, save, Editor, Formatter};
    use crate::{console::Console, error::SessionError};
    use test_log::test;

    fn edit(input: &str) -> (Result<String, SessionError>, String) {
        let mut editor = Editor::new(Console::new(input.as_bytes(), Vec::new()));
        let document = editor.run();
        let output = String::from_utf8(editor.into_console().into_output()).unwrap();
        (document, output)
    }

    #[test]
    fn test_formatters() {
        assert_eq!(bold("a"), "**a**");
        assert_eq!(italic("a"), "*a*");
        assert_eq!(inline_code("a"), "`a`");
        assert_eq!(link("site", "https://example.org"), "[site](https://example.org)");
        assert_eq!(header(3, "Title"), "### Title");
        assert_eq!(list(&["a", "b"], true), "\n1. a\n2. b\n");
        assert_eq!(list(&["a", "b"], false), "\n* a\n* b\n");
    }

    #[test]
    fn test_formatter_names() {
        assert_eq!("inline-code".parse::<Formatter>(), Ok(Formatter::InlineCode));
        assert_eq!("new-line".parse::<Formatter>(), Ok(Formatter::NewLine));
        assert_eq!("underline".parse::<Formatter>(), Err(()));
        assert_eq!(Formatter::OrderedList.to_string(), "ordered-list");
    }

    #[test]
    fn test_editor_session() {
        let (document, output) = edit(
            "header\n7\nx\n2\nNotes\nnew-line\nbold\nkey\nplain\n said\nordered-list\n0\n2\none\ntwo\n!done\n",
        );
        assert_eq!(document.unwrap(), "## Notes\n**key** said\n1. one\n2. two\n");
        assert!(output.contains("The level should be within the range of 1 to 6\n"));
        assert!(output.contains("The value must be numeric\n"));
        assert!(output.contains("The number of rows should be greater than zero\n"));
        assert!(output.contains("Row #2: > "));
    }

    #[test]
    fn test_editor_commands() {
        let (document, output) = edit("!help\nstrike\nlink\nDocs\nhttps://docs.rs\n!done\n");
        assert_eq!(document.unwrap(), "[Docs](https://docs.rs)");
        assert!(output.contains(
            "Available formatters: plain bold italic inline-code link header unordered-list ordered-list new-line\n"
        ));
        assert!(output.contains("Special commands: !help !done\n"));
        assert!(output.contains("Unknown formatting type or command\n"));
        assert!(output.contains("[Docs](https://docs.rs)\n"));
    }

    #[test]
    fn test_editor_input_closed() {
        let (document, _) = edit("italic\n");
        assert!(matches!(document, Err(SessionError::InputClosed)));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.md");
        save(&path, "# Title").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title");

        save(&path, "*again*").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "*again*");
    }
}
