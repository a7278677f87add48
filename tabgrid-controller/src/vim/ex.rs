//! Ex command-line parser built on chumsky. Handles `:w`, `:q!`, `:wq`,
//! `:s/foo/bar/g` (with `%` and numeric ranges), `:set k=v`, `:sort` and
//! `:help`; anything else parses into its bare name for the dispatcher to
//! reject as unknown.

use chumsky::prelude::*;
use tabgrid_core::{EditorError, Result};

/// Row range prefix of an Ex command, as typed (line numbers are 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExRange {
    /// `%`
    All,
    /// `.` (also the default when no range is given)
    Current,
    /// `N` or `N,M`
    Lines(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExCommand {
    pub range: Option<ExRange>,
    pub name: String,
    pub bang: bool,
    pub args: Vec<String>,
    pub flags: Vec<String>,
}

/// Parse an Ex command line (leading `:` optional).
pub fn parse(input: &str) -> Result<ExCommand> {
    let input = input.trim_start_matches(':');
    match ex_parser().parse(input).into_result() {
        Ok(command) => Ok(command),
        Err(errors) => {
            let msg = errors
                .iter()
                .map(|e| format!("{:?}", e))
                .collect::<Vec<_>>()
                .join("; ");
            Err(EditorError::InvalidCommand(msg))
        }
    }
}

fn ex_parser<'a>() -> impl Parser<'a, &'a str, ExCommand, extra::Err<Rich<'a, char>>> {
    let range = range_parser().or_not();
    let name = name_parser();
    let bang = just('!').or_not().map(|b| b.is_some());
    let args = args_parser();

    range
        .then(name)
        .then(bang)
        .then(args)
        .map(|(((range, name), bang), (args, flags))| ExCommand {
            range,
            name,
            bang,
            args,
            flags,
        })
}

fn range_parser<'a>() -> impl Parser<'a, &'a str, ExRange, extra::Err<Rich<'a, char>>> {
    let line = text::int(10).from_str().unwrapped().map(|n: usize| n);

    let pair = line
        .clone()
        .then(just(',').ignore_then(line.clone()))
        .map(|(a, b): (usize, usize)| ExRange::Lines(a, b));

    choice((
        just('%').to(ExRange::All),
        just('.').to(ExRange::Current),
        pair,
        line.map(|n: usize| ExRange::Lines(n, n)),
    ))
}

fn name_parser<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> {
    // Longer spellings first so abbreviations do not shadow them.
    let known = choice((
        just("writequit").to("writequit"),
        just("write").to("write"),
        just("wq").to("writequit"),
        just("w").to("write"),
        just("quit").to("quit"),
        just("q").to("quit"),
        just("substitute").to("substitute"),
        just("sort").to("sort"),
        just("set").to("set"),
        just("s").to("substitute"),
        just("help").to("help"),
    ))
    .map(String::from);

    known.or(text::ident().map(String::from))
}

fn args_parser<'a>(
) -> impl Parser<'a, &'a str, (Vec<String>, Vec<String>), extra::Err<Rich<'a, char>>> {
    // `s/pattern/replacement/flags` with both trailing parts optional.
    let substitute_args = just('/')
        .ignore_then(none_of("/").repeated().to_slice())
        .then(
            just('/')
                .ignore_then(none_of("/").repeated().to_slice())
                .or_not(),
        )
        .then(
            just('/')
                .ignore_then(
                    any()
                        .filter(|c: &char| c.is_alphabetic())
                        .repeated()
                        .to_slice(),
                )
                .or_not(),
        )
        .map(
            |((pattern, replacement), flags): ((&str, Option<&str>), Option<&str>)| {
                let mut args = vec![pattern.to_string()];
                if let Some(repl) = replacement {
                    args.push(repl.to_string());
                }
                let flags = flags
                    .map(|f| f.chars().map(|c| c.to_string()).collect())
                    .unwrap_or_default();
                (args, flags)
            },
        );

    // Space-separated tokens; `-x`/`+x` tokens become flags.
    let regular_args = text::whitespace()
        .ignore_then(
            none_of(" \t\n")
                .repeated()
                .at_least(1)
                .to_slice()
                .separated_by(text::whitespace().at_least(1))
                .collect::<Vec<_>>(),
        )
        .or_not()
        .map(|tokens: Option<Vec<&str>>| {
            let mut args = Vec::new();
            let mut flags = Vec::new();
            for token in tokens.unwrap_or_default() {
                if token.starts_with('-') || token.starts_with('+') {
                    flags.push(token.to_string());
                } else {
                    args.push(token.to_string());
                }
            }
            (args, flags)
        });

    substitute_args.or(regular_args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write() {
        let command = parse("w").unwrap();
        assert_eq!(command.name, "write");
        assert!(command.range.is_none());
        assert!(!command.bang);
        assert!(command.args.is_empty());
    }

    #[test]
    fn test_write_with_path() {
        let command = parse(":w out.tsv").unwrap();
        assert_eq!(command.name, "write");
        assert_eq!(command.args, vec!["out.tsv"]);
    }

    #[test]
    fn test_quit_variants() {
        assert_eq!(parse("q").unwrap().name, "quit");
        let forced = parse("q!").unwrap();
        assert_eq!(forced.name, "quit");
        assert!(forced.bang);
        assert_eq!(parse("wq").unwrap().name, "writequit");
    }

    #[test]
    fn test_substitute() {
        let command = parse("s/foo/bar/g").unwrap();
        assert_eq!(command.name, "substitute");
        assert_eq!(command.args, vec!["foo", "bar"]);
        assert_eq!(command.flags, vec!["g"]);
        assert!(command.range.is_none());
    }

    #[test]
    fn test_substitute_whole_document() {
        let command = parse("%s/bar/baz/g").unwrap();
        assert_eq!(command.range, Some(ExRange::All));
        assert_eq!(command.args, vec!["bar", "baz"]);
        assert_eq!(command.flags, vec!["g"]);
    }

    #[test]
    fn test_substitute_without_global_flag() {
        let command = parse("s/foo/bar/").unwrap();
        assert_eq!(command.args, vec!["foo", "bar"]);
        assert!(command.flags.is_empty());

        let command = parse("s/foo/bar").unwrap();
        assert_eq!(command.args, vec!["foo", "bar"]);
    }

    #[test]
    fn test_substitute_empty_replacement() {
        let command = parse("s/foo//g").unwrap();
        assert_eq!(command.args, vec!["foo", ""]);
        assert_eq!(command.flags, vec!["g"]);
    }

    #[test]
    fn test_numeric_ranges() {
        let command = parse("2,5s/a/b/").unwrap();
        assert_eq!(command.range, Some(ExRange::Lines(2, 5)));

        let command = parse("3s/a/b/").unwrap();
        assert_eq!(command.range, Some(ExRange::Lines(3, 3)));

        let command = parse(".s/a/b/").unwrap();
        assert_eq!(command.range, Some(ExRange::Current));
    }

    #[test]
    fn test_set() {
        let command = parse("set case_sensitive_search=on").unwrap();
        assert_eq!(command.name, "set");
        assert_eq!(command.args, vec!["case_sensitive_search=on"]);
    }

    #[test]
    fn test_sort() {
        let command = parse("sort").unwrap();
        assert_eq!(command.name, "sort");
        assert!(!command.bang);

        let command = parse("sort!").unwrap();
        assert!(command.bang);

        let command = parse("sort 2").unwrap();
        assert_eq!(command.args, vec!["2"]);
    }

    #[test]
    fn test_unknown_command_passes_through() {
        let command = parse("frobnicate now").unwrap();
        assert_eq!(command.name, "frobnicate");
        assert_eq!(command.args, vec!["now"]);
    }

    #[test]
    fn test_full_spellings() {
        assert_eq!(parse("write out.tsv").unwrap().name, "write");
        assert_eq!(parse("quit").unwrap().name, "quit");
        assert_eq!(parse("substitute/a/b/").unwrap().name, "substitute");
    }
}
