//! Character-level primitives for locale-aware price parsing.

/// Currency implied by a single-character symbol.
pub(crate) fn symbol_currency(c: char) -> Option<&'static str> {
    match c {
        '€' => Some("EUR"),
        '$' => Some("USD"),
        '£' => Some("GBP"),
        '¥' => Some("JPY"),
        '₹' => Some("INR"),
        _ => None,
    }
}

/// Characters some locales use to group thousands: space, no-break space,
/// narrow no-break space, apostrophe.
pub(crate) fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '\'')
}

/// Split of a raw price into its number and currency marker.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Tokens {
    /// Digits plus `.`/`,` separators, grouping spaces removed.
    pub number: String,
    /// Upper-case ISO code when the text carried a symbol or code.
    pub currency: Option<String>,
}

/// Splits `raw` into exactly one number and at most one currency marker.
///
/// Returns `None` for anything else: words other than a 3-letter code, signs,
/// two separate numbers, or two conflicting currencies.
pub(crate) fn tokenize(raw: &str) -> Option<Tokens> {
    let chars: Vec<char> = raw.trim().chars().collect();
    let mut number = String::new();
    let mut number_closed = false;
    let mut currency: Option<String> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_ascii_digit() || c == '.' || c == ',' {
            if number_closed {
                return None;
            }
            number.push(c);
            i += 1;
        } else if is_group_space(c) {
            let inside_number = !number.is_empty()
                && !number_closed
                && number.ends_with(|d: char| d.is_ascii_digit())
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if !inside_number && !number.is_empty() {
                number_closed = true;
            }
            i += 1;
        } else if let Some(code) = symbol_currency(c) {
            if !set_currency(code.to_owned(), &mut currency) {
                return None;
            }
            if !number.is_empty() {
                number_closed = true;
            }
            i += 1;
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if word.len() != 3 || !word.is_ascii() {
                return None;
            }
            if !set_currency(word.to_ascii_uppercase(), &mut currency) {
                return None;
            }
            if !number.is_empty() {
                number_closed = true;
            }
        } else {
            return None;
        }
    }

    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(Tokens { number, currency })
}

/// Records `code`, refusing a second marker that names a different currency.
fn set_currency(code: String, currency: &mut Option<String>) -> bool {
    match currency {
        Some(existing) if *existing != code => false,
        _ => {
            *currency = Some(code);
            true
        }
    }
}

/// Rewrites a localized number (`1.234,56`, `1,234.56`, `12,5`) into the
/// canonical `1234.56` form accepted by `Decimal::from_str`.
///
/// Rules:
/// - Both `.` and `,` present: the right-most one is the decimal separator.
/// - One kind, repeated: thousands separators.
/// - One kind, once: thousands if followed by exactly three digits and
///   preceded by a non-zero integer part, decimal otherwise.
///
/// Thousands groups must be well formed (`1.234.567`, not `12.34.5`).
pub(crate) fn canonical_number(number: &str) -> Option<String> {
    let dots = number.matches('.').count();
    let commas = number.matches(',').count();

    let (decimal_sep, group_sep) = match (dots, commas) {
        (0, 0) => return Some(number.to_owned()),
        (_, 0) => (resolve_single_kind(number, '.', dots), '.'),
        (0, _) => (resolve_single_kind(number, ',', commas), ','),
        _ => {
            let last_dot = number.rfind('.')?;
            let last_comma = number.rfind(',')?;
            if last_comma > last_dot {
                (Some(','), '.')
            } else {
                (Some('.'), ',')
            }
        }
    };

    let (integer, fraction) = match decimal_sep {
        Some(sep) => {
            let (integer, fraction) = number.rsplit_once(sep)?;
            if fraction.contains(['.', ',']) {
                return None;
            }
            (integer, fraction)
        }
        None => (number, ""),
    };

    let integer_digits = ungroup(integer, group_sep)?;
    let integer_digits = if integer_digits.is_empty() {
        "0".to_owned()
    } else {
        integer_digits
    };

    if fraction.is_empty() {
        Some(integer_digits)
    } else {
        Some(format!("{integer_digits}.{fraction}"))
    }
}

/// Decides whether a lone separator kind marks decimals (`Some(sep)`) or only
/// groups thousands (`None`).
fn resolve_single_kind(number: &str, sep: char, count: usize) -> Option<char> {
    if count > 1 {
        return None;
    }
    let (integer, fraction) = number.split_once(sep)?;
    let looks_grouped = fraction.len() == 3
        && !integer.is_empty()
        && integer.trim_start_matches('0').len() == integer.len();
    if looks_grouped {
        None
    } else {
        Some(sep)
    }
}

/// Removes `group_sep` from an integer part, checking 3-digit grouping.
fn ungroup(integer: &str, group_sep: char) -> Option<String> {
    if !integer.contains(group_sep) {
        return integer
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| integer.to_owned());
    }

    let mut groups = integer.split(group_sep);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = first.to_owned();
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}
