//! Field rules for book submissions.
//!
//! Every field is checked independently and all failures are reported
//! together, so a form can show every problem after one round trip.

use std::num::IntErrorKind;
use std::ops::RangeInclusive;

use bookshelf_http::error::FieldErrors;
use serde_json::Value;
use time::{macros::format_description, Date};

use super::models::{BookSubmission, NewBook};

pub const TITLE_LENGTH: RangeInclusive<usize> = 2..=100;
pub const AUTHOR_LENGTH: RangeInclusive<usize> = 2..=60;
pub const ISBN_DIGITS: usize = 13;
pub const PAGE_RANGE: RangeInclusive<i64> = 1..=5000;

const TITLE_REQUIRED: &str = "Title is required.";
const TITLE_LENGTH_MSG: &str = "Title must be between 2 and 100 characters.";
const AUTHOR_REQUIRED: &str = "Author is required.";
const AUTHOR_LENGTH_MSG: &str = "Author name must be between 2 and 60 characters.";
const ISBN_REQUIRED: &str = "ISBN is required.";
const ISBN_SHAPE: &str = "ISBN must contain exactly 13 numeric digits.";
const DATE_REQUIRED: &str = "Publication Date is required.";
const DATE_FORMAT: &str = "Publication Date must be in YYYY-MM-DD format.";
const DATE_FUTURE: &str = "Publication Date cannot be in the future.";
const PAGES_REQUIRED: &str = "Number of Pages is required.";
const PAGES_NOT_INTEGER: &str = "Number of Pages must be an integer.";
const PAGES_RANGE: &str = "Number of pages must be between 1 and 5000.";

/// Validate `submission` against `today` and produce a storable book.
pub fn validate(submission: &BookSubmission, today: Date) -> Result<NewBook, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = bounded_text(
        &mut errors,
        "title",
        submission.title.as_ref(),
        TITLE_LENGTH,
        TITLE_REQUIRED,
        TITLE_LENGTH_MSG,
    );
    let author = bounded_text(
        &mut errors,
        "author",
        submission.author.as_ref(),
        AUTHOR_LENGTH,
        AUTHOR_REQUIRED,
        AUTHOR_LENGTH_MSG,
    );
    let isbn = isbn_digits(&mut errors, submission.isbn.as_ref());
    let publication_date = calendar_date(&mut errors, submission.publication_date.as_ref(), today);
    let number_of_pages = page_count(&mut errors, submission.number_of_pages.as_ref());

    match (title, author, isbn, publication_date, number_of_pages) {
        (Some(title), Some(author), Some(isbn), Some(publication_date), Some(number_of_pages))
            if errors.is_empty() =>
        {
            Ok(NewBook {
                title,
                author,
                isbn,
                publication_date,
                number_of_pages,
            })
        }
        _ => Err(errors),
    }
}

/// Present, a string, and not only whitespace.
fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

fn bounded_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    length: RangeInclusive<usize>,
    required: &str,
    out_of_range: &str,
) -> Option<String> {
    let Some(raw) = non_blank(value) else {
        errors.push(field, required);
        return None;
    };

    let trimmed = raw.trim();
    if !length.contains(&trimmed.chars().count()) {
        errors.push(field, out_of_range);
        return None;
    }
    Some(trimmed.to_string())
}

fn isbn_digits(errors: &mut FieldErrors, value: Option<&Value>) -> Option<String> {
    let Some(raw) = non_blank(value) else {
        errors.push("isbn", ISBN_REQUIRED);
        return None;
    };

    let digits = raw.trim();
    if digits.len() != ISBN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        errors.push("isbn", ISBN_SHAPE);
        return None;
    }
    Some(digits.to_string())
}

/// The raw string is parsed untrimmed and kept verbatim on success.
fn calendar_date(errors: &mut FieldErrors, value: Option<&Value>, today: Date) -> Option<String> {
    let Some(raw) = non_blank(value) else {
        errors.push("publication_date", DATE_REQUIRED);
        return None;
    };

    let Some(date) = parse_date(raw) else {
        errors.push("publication_date", DATE_FORMAT);
        return None;
    };

    if date > today {
        errors.push("publication_date", DATE_FUTURE);
        return None;
    }
    Some(raw.to_string())
}

/// Parse a strict `YYYY-MM-DD` date: unsigned 4-digit year from 0001,
/// zero-padded month and day. `None` when the text is not such a date.
pub fn parse_date(raw: &str) -> Option<Date> {
    let shape_ok = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .filter(|date| date.year() >= 1)
}

fn page_count(errors: &mut FieldErrors, value: Option<&Value>) -> Option<u32> {
    let Some(value) = value else {
        errors.push("number_of_pages", PAGES_REQUIRED);
        return None;
    };

    let Some(pages) = coerce_integer(value) else {
        errors.push("number_of_pages", PAGES_NOT_INTEGER);
        return None;
    };

    if !PAGE_RANGE.contains(&pages) {
        errors.push("number_of_pages", PAGES_RANGE);
        return None;
    }
    u32::try_from(pages).ok()
}

/// Integer view of a loosely typed JSON value.
///
/// Floats truncate toward zero and numeric strings may carry surrounding
/// whitespace and a sign. Magnitudes beyond `i64` saturate so they still
/// fail the range check rather than the integer check.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                Some(n)
            } else if number.as_u64().is_some() {
                Some(i64::MAX)
            } else {
                // `as` saturates on overflow.
                number.as_f64().map(|f| f.trunc() as i64)
            }
        }
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Some(i64::MAX),
                IntErrorKind::NegOverflow => Some(i64::MIN),
                _ => None,
            },
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn submission(value: Value) -> BookSubmission {
        serde_json::from_value(value).unwrap()
    }

    fn valid() -> Value {
        json!({
            "title": "A Tale of Two Cities",
            "author": "Charles Dickens",
            "isbn": "1234567890123",
            "publication_date": "2024-06-15",
            "number_of_pages": 341
        })
    }

    fn with(field: &str, value: Value) -> BookSubmission {
        let mut body = valid();
        body[field] = value;
        submission(body)
    }

    fn without(field: &str) -> BookSubmission {
        let mut body = valid();
        body.as_object_mut().unwrap().remove(field);
        submission(body)
    }

    fn only_error(sub: BookSubmission, field: &str) -> Vec<String> {
        let errors = validate(&sub, TODAY).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![field]);
        errors.get(field).unwrap().to_vec()
    }

    #[test]
    fn valid_submission_is_normalized() {
        let sub = submission(json!({
            "title": "  A Tale of Two Cities ",
            "author": "\tCharles Dickens",
            "isbn": " 1234567890123 ",
            "publication_date": "2024-06-15",
            "number_of_pages": "341"
        }));

        let book = validate(&sub, TODAY).unwrap();
        assert_eq!(book.title, "A Tale of Two Cities");
        assert_eq!(book.author, "Charles Dickens");
        assert_eq!(book.isbn, "1234567890123");
        assert_eq!(book.publication_date, "2024-06-15");
        assert_eq!(book.number_of_pages, 341);
    }

    #[test]
    fn empty_submission_reports_every_field_as_required() {
        let errors = validate(&BookSubmission::default(), TODAY).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![
                "title",
                "author",
                "isbn",
                "publication_date",
                "number_of_pages"
            ]
        );
        assert_eq!(errors.get("title").unwrap(), &[TITLE_REQUIRED.to_string()]);
        assert_eq!(
            errors.get("number_of_pages").unwrap(),
            &[PAGES_REQUIRED.to_string()]
        );
    }

    #[test]
    fn all_failures_are_collected_together() {
        let sub = submission(json!({
            "title": "A",
            "author": "",
            "isbn": "1234",
            "publication_date": "3000-01-01",
            "number_of_pages": -5
        }));

        let errors = validate(&sub, TODAY).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get("title").unwrap(), &[TITLE_LENGTH_MSG.to_string()]);
        assert_eq!(errors.get("author").unwrap(), &[AUTHOR_REQUIRED.to_string()]);
        assert_eq!(errors.get("isbn").unwrap(), &[ISBN_SHAPE.to_string()]);
        assert_eq!(
            errors.get("publication_date").unwrap(),
            &[DATE_FUTURE.to_string()]
        );
        assert_eq!(
            errors.get("number_of_pages").unwrap(),
            &[PAGES_RANGE.to_string()]
        );
    }

    #[test]
    fn title_rules() {
        assert_eq!(only_error(with("title", json!("   ")), "title"), [TITLE_REQUIRED]);
        assert_eq!(only_error(with("title", json!(42)), "title"), [TITLE_REQUIRED]);
        assert_eq!(only_error(with("title", Value::Null), "title"), [TITLE_REQUIRED]);
        assert_eq!(only_error(with("title", json!(" X ")), "title"), [TITLE_LENGTH_MSG]);
        assert_eq!(
            only_error(with("title", json!("x".repeat(101))), "title"),
            [TITLE_LENGTH_MSG]
        );
        assert!(validate(&with("title", json!("Go")), TODAY).is_ok());
        assert!(validate(&with("title", json!("x".repeat(100))), TODAY).is_ok());
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 50 two-byte characters: 100 bytes but within the 60-character limit.
        let author = "é".repeat(50);
        let book = validate(&with("author", json!(author)), TODAY).unwrap();
        assert_eq!(book.author.chars().count(), 50);
    }

    #[test]
    fn author_rules() {
        assert_eq!(only_error(without("author"), "author"), [AUTHOR_REQUIRED]);
        assert_eq!(only_error(with("author", json!("A")), "author"), [AUTHOR_LENGTH_MSG]);
        assert_eq!(
            only_error(with("author", json!("a".repeat(61))), "author"),
            [AUTHOR_LENGTH_MSG]
        );
        assert!(validate(&with("author", json!("a".repeat(60))), TODAY).is_ok());
    }

    #[test]
    fn isbn_boundaries() {
        assert_eq!(only_error(with("isbn", json!("")), "isbn"), [ISBN_REQUIRED]);
        assert_eq!(only_error(with("isbn", json!(1234567890123_u64)), "isbn"), [ISBN_REQUIRED]);
        for bad in ["123456789012", "12345678901234", "123456789012X", "123-456789012", "abc"] {
            assert_eq!(only_error(with("isbn", json!(bad)), "isbn"), [ISBN_SHAPE], "{bad}");
        }
        // Non-ASCII digits are not decimal digits here.
        assert_eq!(
            only_error(with("isbn", json!("١٢٣٤٥٦٧٨٩٠١٢٣")), "isbn"),
            [ISBN_SHAPE]
        );
        assert!(validate(&with("isbn", json!("0000000000000")), TODAY).is_ok());
    }

    #[test]
    fn publication_date_rules() {
        let field = "publication_date";
        assert_eq!(only_error(with(field, json!("")), field), [DATE_REQUIRED]);
        assert_eq!(only_error(with(field, json!("not-a-date")), field), [DATE_FORMAT]);
        assert_eq!(only_error(with(field, json!("2024-02-30")), field), [DATE_FORMAT]);
        assert_eq!(only_error(with(field, json!("15/06/2024")), field), [DATE_FORMAT]);
        assert_eq!(only_error(with(field, json!(" 2024-06-01")), field), [DATE_FORMAT]);
        let odd_years = [
            "+2024-06-01",
            "-0001-06-01",
            "0000-01-01",
            "02024-06-01",
            "224-06-01",
        ];
        for signed_or_odd_year in odd_years {
            assert_eq!(
                only_error(with(field, json!(signed_or_odd_year)), field),
                [DATE_FORMAT],
                "{signed_or_odd_year}"
            );
        }
        assert_eq!(only_error(with(field, json!("2024-1-5")), field), [DATE_FORMAT]);
        assert_eq!(only_error(with(field, json!("2024-06- 1")), field), [DATE_FORMAT]);
        assert_eq!(only_error(with(field, json!("2024-06-16")), field), [DATE_FUTURE]);
        assert!(validate(&with(field, json!("2024-06-15")), TODAY).is_ok());
        assert!(validate(&with(field, json!("1859-04-30")), TODAY).is_ok());
    }

    #[test]
    fn parse_date_accepts_only_plain_four_digit_years() {
        assert_eq!(parse_date("0001-01-01"), Some(date!(0001 - 01 - 01)));
        assert_eq!(parse_date("2024-06-15"), Some(TODAY));
        assert_eq!(parse_date("+2024-06-15"), None);
        assert_eq!(parse_date("-0001-06-01"), None);
        assert_eq!(parse_date("0000-01-01"), None);
        assert_eq!(parse_date("2024-06-15 "), None);
    }

    #[test]
    fn malformed_date_is_never_checked_for_futurity() {
        let errors = validate(&with("publication_date", json!("3000-13-01")), TODAY).unwrap_err();
        assert_eq!(
            errors.get("publication_date").unwrap(),
            &[DATE_FORMAT.to_string()]
        );
    }

    #[test]
    fn page_boundaries() {
        let field = "number_of_pages";
        assert_eq!(validate(&with(field, json!(1)), TODAY).unwrap().number_of_pages, 1);
        assert_eq!(
            validate(&with(field, json!(5000)), TODAY).unwrap().number_of_pages,
            5000
        );
        assert_eq!(only_error(with(field, json!(0)), field), [PAGES_RANGE]);
        assert_eq!(only_error(with(field, json!(5001)), field), [PAGES_RANGE]);
        assert_eq!(only_error(with(field, json!(u64::MAX)), field), [PAGES_RANGE]);
        assert_eq!(
            only_error(with(field, json!("99999999999999999999")), field),
            [PAGES_RANGE]
        );
    }

    #[test]
    fn page_conversion() {
        let field = "number_of_pages";
        assert_eq!(only_error(with(field, Value::Null), field), [PAGES_REQUIRED]);
        assert_eq!(only_error(with(field, json!("abc")), field), [PAGES_NOT_INTEGER]);
        assert_eq!(only_error(with(field, json!("")), field), [PAGES_NOT_INTEGER]);
        assert_eq!(only_error(with(field, json!("12.5")), field), [PAGES_NOT_INTEGER]);
        assert_eq!(only_error(with(field, json!(true)), field), [PAGES_NOT_INTEGER]);
        assert_eq!(only_error(with(field, json!([10])), field), [PAGES_NOT_INTEGER]);
        assert_eq!(validate(&with(field, json!(12.9)), TODAY).unwrap().number_of_pages, 12);
        assert_eq!(validate(&with(field, json!(" +7 ")), TODAY).unwrap().number_of_pages, 7);
        assert_eq!(only_error(with(field, json!(0.5)), field), [PAGES_RANGE]);
    }

    #[test]
    fn coerce_integer_saturates_large_magnitudes() {
        assert_eq!(coerce_integer(&json!(-3)), Some(-3));
        assert_eq!(coerce_integer(&json!(1e300)), Some(i64::MAX));
        assert_eq!(coerce_integer(&json!("-99999999999999999999")), Some(i64::MIN));
        assert_eq!(coerce_integer(&json!({})), None);
    }
}
