//! Write gate for books: the ordered field checks and the duplicate check.
//!
//! Field rules are declared with garde on [`CreateBook`]; here the garde report
//! is reduced to a single reason, so a candidate failing several rules always
//! reports the one that comes first in [`InvalidBook`] order.

use bookshelf_types::genre::allowed_genres_list;
use garde::Validate as _;

use crate::book::CreateBook;

/// Reason why a candidate book was rejected.
///
/// Variants are ordered by precedence, the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, thiserror::Error)]
pub enum InvalidBook {
    #[error("Title and Author must be between 2 and 120 characters long.")]
    TitleOrAuthorLength,
    #[error("Genre must be one of the following: {}.", allowed_genres_list())]
    Genre,
    #[error("Price must be a non-negative value.")]
    NegativePrice,
    #[error("Stock must be a non-negative integer.")]
    NegativeStock,
}

impl InvalidBook {
    fn for_field(field: &str) -> Option<Self> {
        match field {
            "title" | "author" => Some(Self::TitleOrAuthorLength),
            "genre" => Some(Self::Genre),
            "price" => Some(Self::NegativePrice),
            "stock" => Some(Self::NegativeStock),
            _ => None,
        }
    }
}

/// Payloads that must pass a check before they are written.
pub trait Check {
    type Reason;

    fn check(&self) -> Result<(), Self::Reason>;
}

impl Check for CreateBook {
    type Reason = InvalidBook;

    fn check(&self) -> Result<(), InvalidBook> {
        check_book(self)
    }
}

pub fn check_book(book: &CreateBook) -> Result<(), InvalidBook> {
    let Err(report) = book.validate() else {
        return Ok(());
    };
    match report
        .iter()
        .filter_map(|(path, _)| InvalidBook::for_field(&path.to_string()))
        .min()
    {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}

fn dedup_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// True if any of `existing` (title, author) pairs matches the candidate,
/// ignoring case and surrounding whitespace on both sides.
pub fn is_duplicate<'a, I>(title: &str, author: &str, existing: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let title = dedup_key(title);
    let author = dedup_key(author);
    existing
        .into_iter()
        .any(|(t, a)| dedup_key(t) == title && dedup_key(a) == author)
}
