//! Interactive choice among search candidates.
//!
//! The full candidate list is always shown and the user is always asked, even
//! for a single match. Anything that is not a valid 1-based position selects
//! the first candidate, and the user is told so. Input ending at the prompt
//! selects nothing.

use std::io::{self, BufRead, Write};

use crossterm::style::Color;

use crate::catalog::{artist_name, AlbumRecord};
use crate::console::Console;

/// Listing lines at or past this position are printed without highlight.
const HIGHLIGHTED_ENTRIES: usize = 10;

/// Outcome of parsing the user's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index of a valid choice.
    Index(usize),
    /// Out of range or not a number: use the first candidate.
    Default,
}

/// Parse a 1-based answer against a list of `len` candidates.
pub fn parse_selection(input: &str, len: usize) -> Selection {
    match input.trim().parse::<i64>() {
        Ok(n) if n >= 1 && (n as u64) <= len as u64 => Selection::Index((n - 1) as usize),
        _ => Selection::Default,
    }
}

/// Ask the user which candidate to use. Returns `None` only for an empty
/// list; end of input is an `UnexpectedEof` error.
pub fn choose<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    mut candidates: Vec<AlbumRecord>,
) -> io::Result<Option<AlbumRecord>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    console.info("Multiple albums found:")?;
    for (idx, album) in candidates.iter().enumerate() {
        let line = format!("{}. {} by {}", idx + 1, album.title, artist_name(Some(album)));
        if idx < HIGHLIGHTED_ENTRIES {
            console.colored(Color::Red, &line)?;
        } else {
            console.info(&line)?;
        }
    }

    let Some(answer) = console.prompt("Enter the number of the album you want to select: ")? else {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed at the selection prompt",
        ));
    };

    let index = match parse_selection(&answer, candidates.len()) {
        Selection::Index(i) => i,
        Selection::Default => {
            console.info("Invalid choice. Defaulting to the first album.")?;
            0
        }
    };
    Ok(Some(candidates.swap_remove(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: &Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(console.writer()).into_owned()
    }

    fn candidates() -> Vec<AlbumRecord> {
        vec![
            AlbumRecord::new("Abbey Road").with_artist("The Beatles"),
            AlbumRecord::new("Abbey Road (Super Deluxe)").with_artist("The Beatles"),
            AlbumRecord::new("Abbey Road Revisited"),
        ]
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Selection::Index(0));
        assert_eq!(parse_selection(" 3 ", 3), Selection::Index(2));
        assert_eq!(parse_selection("4", 3), Selection::Default);
        assert_eq!(parse_selection("0", 3), Selection::Default);
        assert_eq!(parse_selection("-1", 3), Selection::Default);
        assert_eq!(parse_selection("two", 3), Selection::Default);
        assert_eq!(parse_selection("", 3), Selection::Default);
        assert_eq!(parse_selection("1.5", 3), Selection::Default);
        assert_eq!(parse_selection("99999999999999999999", 3), Selection::Default);
    }

    #[test]
    fn test_empty_list_returns_none_without_prompting() {
        let mut c = console("1\n");
        assert_eq!(choose(&mut c, Vec::new()).unwrap(), None);
        assert!(output(&c).is_empty());
    }

    #[test]
    fn test_valid_choice() {
        let mut c = console("2\n");
        let chosen = choose(&mut c, candidates()).unwrap().unwrap();
        assert_eq!(chosen.title, "Abbey Road (Super Deluxe)");
        assert!(!output(&c).contains("Defaulting"));
    }

    #[test]
    fn test_listing_shows_ordinals_titles_and_artists() {
        let mut c = console("1\n");
        choose(&mut c, candidates()).unwrap();
        let out = output(&c);
        assert!(out.contains("Multiple albums found:"));
        assert!(out.contains("1. Abbey Road by The Beatles"));
        assert!(out.contains("2. Abbey Road (Super Deluxe) by The Beatles"));
        assert!(out.contains("3. Abbey Road Revisited by Unknown Artist"));
        assert!(out.contains("Enter the number of the album you want to select: "));
    }

    #[test]
    fn test_out_of_range_defaults_to_first() {
        let mut c = console("7\n");
        let chosen = choose(&mut c, candidates()).unwrap().unwrap();
        assert_eq!(chosen.title, "Abbey Road");
        assert!(output(&c).contains("Invalid choice. Defaulting to the first album."));
    }

    #[test]
    fn test_non_numeric_defaults_to_first() {
        let mut c = console("the second one\n");
        let chosen = choose(&mut c, candidates()).unwrap().unwrap();
        assert_eq!(chosen.title, "Abbey Road");
        assert!(output(&c).contains("Invalid choice. Defaulting to the first album."));
    }

    #[test]
    fn test_end_of_input_selects_nothing() {
        let mut c = console("");
        let err = choose(&mut c, candidates()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(!output(&c).contains("Defaulting"));
    }

    #[test]
    fn test_single_candidate_still_prompts() {
        let mut c = console("1\n");
        let chosen = choose(&mut c, vec![AlbumRecord::new("Abbey Road")]).unwrap();
        assert_eq!(chosen.unwrap().title, "Abbey Road");
        assert!(output(&c).contains("Enter the number of the album you want to select: "));
    }

    #[test]
    fn test_last_of_many_is_selectable() {
        let many: Vec<AlbumRecord> = (1..=12)
            .map(|i| AlbumRecord::new(format!("Album {}", i)))
            .collect();
        let mut c = console("12\n");
        let chosen = choose(&mut c, many).unwrap().unwrap();
        assert_eq!(chosen.title, "Album 12");
        assert!(output(&c).contains("12. Album 12 by Unknown Artist"));
    }
}
