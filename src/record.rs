/// Postal address records parsed from three-line blocks
use crate::config::ReadConfig;
use crate::consts::*;
use crate::error::RecordError;
use crate::source::LineSource;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use tracing::debug;

/// One address entry.
///
/// ## Input layout
///
/// - Line 1 is the recipient, `Surname, Given Names` or `Given Names Surname`
/// - Line 2 starts with the house number, followed by the street
/// - Line 3 is the postcode, separators allowed
///
/// Identity is the triple of surname, postcode and house number. Two records
/// whose raw text differs but whose triples match are the same address, both
/// for [`Ord`]/[`Eq`] and for [`Record::hash`].
#[derive(Debug, Clone)]
pub struct Record {
    /// The three input lines exactly as read
    full_address: String,

    surname: String,

    house_number: i32,

    /// Line 3 reduced to its ASCII alphanumeric characters
    postcode: String,
}

impl Record {
    /// Reads the next address block from `source`.
    ///
    /// Returns `Ok(None)` when fewer than three lines remain. Exactly three
    /// lines are consumed on success.
    pub fn parse<S: LineSource + ?Sized>(
        source: &mut S,
        config: &ReadConfig,
    ) -> Result<Option<Self>, RecordError> {
        let mut lines: [String; LINES_PER_RECORD] = Default::default();
        for (read, line) in lines.iter_mut().enumerate() {
            match source.next_line(config.max_line_len)? {
                Some(next) => *line = next,
                None => {
                    if read > 0 {
                        debug!("dropping incomplete address block of {} lines", read);
                    }
                    return Ok(None);
                }
            }
        }

        let [name, street, postcode] = lines;
        Self::from_lines(&name, &street, &postcode).map(Some)
    }

    /// Builds a record from the raw recipient, street and postcode lines.
    pub fn from_lines(name: &str, street: &str, postcode: &str) -> Result<Self, RecordError> {
        let mut full_address = String::new();
        full_address.try_reserve_exact(name.len() + street.len() + postcode.len())?;
        full_address.push_str(name);
        full_address.push_str(street);
        full_address.push_str(postcode);

        Ok(Self {
            full_address,
            surname: owned(surname_of(name))?,
            house_number: house_number_of(street),
            postcode: postcode_of(postcode)?,
        })
    }

    pub fn full_address(&self) -> &str {
        &self.full_address
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn house_number(&self) -> i32 {
        self.house_number
    }

    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    /// Polynomial hash over `surname ++ postcode ++ house_number`.
    pub fn key_hash(&self) -> u64 {
        let number = self.house_number.to_string();
        self.surname
            .bytes()
            .chain(self.postcode.bytes())
            .chain(number.bytes())
            .fold(0_u64, |hash, byte| {
                u64::from(byte).wrapping_add(HASH_MULTIPLIER.wrapping_mul(hash))
            })
    }

    /// The bucket this record falls into for a table of `modulus` buckets.
    ///
    /// Panics if `modulus` is zero.
    pub fn hash(&self, modulus: usize) -> usize {
        (self.key_hash() % modulus as u64) as usize
    }

    /// Orders by surname, then postcode, then house number.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.surname
            .cmp(&other.surname)
            .then_with(|| self.postcode.cmp(&other.postcode))
            .then_with(|| self.house_number.cmp(&other.house_number))
    }

    /// The printable form: the full address, terminated by exactly one newline
    /// if it was not terminated already.
    pub fn format(&self) -> Cow<'_, str> {
        if self.full_address.ends_with('\n') {
            Cow::Borrowed(&self.full_address)
        } else {
            Cow::Owned(format!("{}\n", self.full_address))
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(self.full_address.as_bytes())?;
        if !self.full_address.ends_with('\n') {
            sink.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.surname.hash(state);
        self.postcode.hash(state);
        self.house_number.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn owned(s: &str) -> Result<String, RecordError> {
    let mut result = String::new();
    result.try_reserve_exact(s.len())?;
    result.push_str(s);
    Ok(result)
}

/// The word before the first comma, or the last word when there is no comma.
///
/// A line opening with a comma falls back to the first word after it, so only
/// a line without words gives an empty surname.
fn surname_of(line: &str) -> &str {
    match line.split_once(',') {
        Some((head, tail)) => head
            .split_whitespace()
            .last()
            .or_else(|| {
                tail.split(|c: char| c == ',' || c.is_whitespace())
                    .find(|word| !word.is_empty())
            })
            .unwrap_or(""),
        None => line.split_whitespace().last().unwrap_or(""),
    }
}

/// Leading integer of the first space or comma delimited token.
///
/// Anything that is not a number yields 0.
fn house_number_of(line: &str) -> i32 {
    let token = line
        .split([' ', ','])
        .find(|token| !token.is_empty())
        .unwrap_or("");
    leading_integer(token)
}

fn leading_integer(token: &str) -> i32 {
    let token = token.trim_start();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });
    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn postcode_of(line: &str) -> Result<String, RecordError> {
    let mut postcode = String::new();
    postcode.try_reserve_exact(line.len())?;
    postcode.extend(line.chars().filter(char::is_ascii_alphanumeric));
    Ok(postcode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::record;

    #[test]
    fn test_parse_comma_name() {
        let mut input: &[u8] = b"Smith, John\n12 High Street\nAB1 2CD\n";
        let record = Record::parse(&mut input, &ReadConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(record.surname(), "Smith");
        assert_eq!(record.house_number(), 12);
        assert_eq!(record.postcode(), "AB12CD");
        assert_eq!(
            record.full_address(),
            "Smith, John\n12 High Street\nAB1 2CD\n"
        );
    }

    #[test]
    fn test_parse_given_names_first() {
        let record = record("John Smith\n", "12 High Street\n", "AB1 2CD\n");
        assert_eq!(record.surname(), "Smith");
        assert_eq!(record, crate::test::smith());
    }

    #[test]
    fn test_surname_before_first_comma() {
        assert_eq!(surname_of("Mary Ann Jones, Dr\n"), "Jones");
        assert_eq!(surname_of("Jones,Mary\n"), "Jones");
        assert_eq!(surname_of("   \n"), "");
        assert_eq!(surname_of(",\n"), "");
        assert_eq!(surname_of("Cher"), "Cher");
    }

    #[test]
    fn test_leading_comma_takes_next_word() {
        assert_eq!(surname_of(", Mary\n"), "Mary");
        assert_eq!(surname_of("  ,, Mary Ann\n"), "Mary");

        let record = record(", Mary\n", "7 Mill Lane\n", "G12 8QQ\n");
        assert!(!record.surname().is_empty());
        assert_eq!(record.surname(), "Mary");
    }

    #[test]
    fn test_house_number_is_lenient() {
        assert_eq!(house_number_of("12 High Street\n"), 12);
        assert_eq!(house_number_of("12,High Street\n"), 12);
        assert_eq!(house_number_of("  7a Mill Lane\n"), 7);
        assert_eq!(house_number_of("Flat 3, Mill Lane\n"), 0);
        assert_eq!(house_number_of("-4 Below Street\n"), -4);
        assert_eq!(house_number_of("\n"), 0);
        assert_eq!(house_number_of(""), 0);
        assert_eq!(house_number_of("99999999999 Long Road\n"), i32::MAX);
    }

    #[test]
    fn test_postcode_keeps_only_alphanumerics() {
        assert_eq!(postcode_of("g12 8qq\n").unwrap(), "g128qq");
        assert_eq!(postcode_of(" AB-1 2.CD\n").unwrap(), "AB12CD");
        assert_eq!(postcode_of("\n").unwrap(), "");
    }

    #[test]
    fn test_end_of_input() {
        let config = ReadConfig::default();

        let mut empty: &[u8] = b"";
        assert!(Record::parse(&mut empty, &config).unwrap().is_none());

        let mut partial: &[u8] = b"Smith, John\n12 High Street\n";
        assert!(Record::parse(&mut partial, &config).unwrap().is_none());
    }

    #[test]
    fn test_parse_consumes_exactly_three_lines() {
        let mut input: &[u8] =
            b"Smith, John\n12 High Street\nAB1 2CD\nAdams, Ann\n3 Low Road\nZZ9 9ZZ\n";
        let config = ReadConfig::default();

        let first = Record::parse(&mut input, &config).unwrap().unwrap();
        let second = Record::parse(&mut input, &config).unwrap().unwrap();

        assert_eq!(first.surname(), "Smith");
        assert_eq!(second.surname(), "Adams");
        assert_eq!(second.house_number(), 3);
        assert!(Record::parse(&mut input, &config).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_stream() {
        let mut input: &[u8] = &[b'A', 0xff, b'\n'];
        let err = Record::parse(&mut input, &ReadConfig::default()).unwrap_err();
        assert!(matches!(err, RecordError::InvalidStream(_)));
    }

    #[test]
    fn test_hash_known_value() {
        let record = record("Ab\n", "1\n", "c\n");
        // "Abc1" = ((65 * 31 + 98) * 31 + 99) * 31 + 49
        let expected: u64 = ((65 * 31 + 98) * 31 + 99) * 31 + 49;
        assert_eq!(record.key_hash(), expected);
        assert_eq!(record.hash(512), (expected % 512) as usize);
        assert_eq!(record.hash(1), 0);
    }

    #[test]
    fn test_hash_ignores_layout() {
        let a = record("Smith, John\n", "12 High Street\n", "AB1 2CD\n");
        let b = record("Dr J.   Smith\n", "12, high st\n", "ab12cd\n");
        let c = record("John Smith\n", "12 Main Road\n", "AB12CD");

        assert_ne!(a, b);
        assert_eq!(a, c);
        for modulus in [1, 2, 7, 512, 1 << 20] {
            assert_eq!(a.hash(modulus), c.hash(modulus));
        }
    }

    #[test]
    fn test_compare_order() {
        let adams = record("Adams, Ann\n", "40 Low Road\n", "ZZ9 9ZZ\n");
        let smith = record("Smith, John\n", "12 High Street\n", "AB1 2CD\n");
        let smith_2 = record("Smith, Jane\n", "2 High Street\n", "AB1 2CD\n");
        let smith_other_postcode = record("Smith, Jo\n", "1 Road\n", "AB1 2CE\n");

        assert_eq!(adams.compare(&smith), Ordering::Less);
        assert_eq!(smith.compare(&adams), Ordering::Greater);
        assert_eq!(smith_2.compare(&smith), Ordering::Less);
        assert_eq!(smith.compare(&smith_other_postcode), Ordering::Less);
        assert_eq!(smith.compare(&smith.clone()), Ordering::Equal);
    }

    #[test]
    fn test_format_terminates_once() {
        let terminated = record("Smith, John\n", "12 High Street\n", "AB1 2CD\n");
        assert!(matches!(terminated.format(), Cow::Borrowed(_)));
        assert_eq!(terminated.to_string(), terminated.full_address());

        let open = record("Smith, John\n", "12 High Street\n", "AB1 2CD");
        assert_eq!(open.format(), "Smith, John\n12 High Street\nAB1 2CD\n");

        let mut sink = Vec::new();
        open.write_to(&mut sink).unwrap();
        terminated.write_to(&mut sink).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "Smith, John\n12 High Street\nAB1 2CD\n".repeat(2)
        );
    }

    #[test]
    fn test_round_trip_through_format() {
        let text = "Jones, Mary\n7 Mill Lane\nG12 8QQ\n";
        let mut input = text.as_bytes();
        let record = Record::parse(&mut input, &ReadConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(record.format(), text);
    }

    #[test]
    fn test_long_lines_are_bounded() {
        let mut input: &[u8] = b"Smith, John\n12 A Very Long Street Name\nAB1 2CD\n";
        let record = Record::parse(&mut input, &ReadConfig { max_line_len: 8 })
            .unwrap()
            .unwrap();

        assert_eq!(record.full_address(), "Smith, J\n12 A Ver\nAB1 2CD\n");
        assert_eq!(record.house_number(), 12);
    }
}
