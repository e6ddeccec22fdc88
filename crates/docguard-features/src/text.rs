//! Text-quality heuristics and the written-amount parser.

use rust_decimal::Decimal;

/// OCR text quality, piecewise by length: under 100 characters 0.3, under
/// 500 characters 0.6, otherwise 0.9.
pub fn text_quality(raw_text: &str) -> f64 {
    let len = raw_text.chars().count();
    if len < 100 {
        0.3
    } else if len < 500 {
        0.6
    } else {
        0.9
    }
}

/// Quality of a personal or business name field: fraction of alphabetic
/// characters among non-whitespace, zeroed for very short fields.
pub fn name_quality(name: &str) -> f64 {
    let chars: Vec<char> = name.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.len() < 2 {
        return 0.0;
    }
    let alpha = chars.iter().filter(|c| c.is_alphabetic()).count();
    alpha as f64 / chars.len() as f64
}

/// Quality of a street-address field: letters, digits, and plausible length
/// each contribute.
pub fn address_quality(address: &str) -> f64 {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 0.0;
    if trimmed.chars().any(|c| c.is_alphabetic()) {
        score += 0.5;
    }
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        score += 0.25;
    }
    if trimmed.chars().count() >= 8 {
        score += 0.25;
    }
    score
}

/// Parse an English courtesy line ("One thousand two hundred thirty-four
/// and 56/100 dollars") into a decimal amount.
///
/// Returns `None` when the line contains no recognizable amount words.
/// Unknown filler words ("dollars", "only", "exactly") are skipped.
pub fn parse_written_amount(text: &str) -> Option<Decimal> {
    let mut total: u64 = 0;
    let mut current: u64 = 0;
    let mut cents: Option<u32> = None;
    let mut matched_any = false;

    for raw_token in text.split(|c: char| c.is_whitespace() || c == '-' || c == ',') {
        let token: String = raw_token
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '/')
            .collect::<String>()
            .to_lowercase();
        if token.is_empty() {
            continue;
        }
        if let Some((numerator, denominator)) = token.split_once('/') {
            if let (Ok(n), Ok(d)) = (numerator.parse::<u32>(), denominator.parse::<u32>()) {
                if d == 100 && n < 100 {
                    cents = Some(n);
                    matched_any = true;
                }
            }
            continue;
        }
        match word_value(&token) {
            Some(WordValue::Unit(v)) => {
                current += v;
                matched_any = true;
            }
            Some(WordValue::Hundred) => {
                current = current.max(1) * 100;
                matched_any = true;
            }
            Some(WordValue::Scale(scale)) => {
                total += current.max(1) * scale;
                current = 0;
                matched_any = true;
            }
            None => {}
        }
    }

    if !matched_any {
        return None;
    }
    let dollars = total + current;
    let cents = cents.unwrap_or(0) as u64;
    Some(Decimal::new((dollars * 100 + cents) as i64, 2))
}

enum WordValue {
    Unit(u64),
    Hundred,
    Scale(u64),
}

fn word_value(token: &str) -> Option<WordValue> {
    let unit = match token {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        "hundred" => return Some(WordValue::Hundred),
        "thousand" => return Some(WordValue::Scale(1_000)),
        "million" => return Some(WordValue::Scale(1_000_000)),
        _ => return None,
    };
    Some(WordValue::Unit(unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_text_quality_bands() {
        assert_eq!(text_quality(""), 0.3);
        assert_eq!(text_quality(&"x".repeat(99)), 0.3);
        assert_eq!(text_quality(&"x".repeat(100)), 0.6);
        assert_eq!(text_quality(&"x".repeat(500)), 0.9);
    }

    #[test]
    fn test_parse_simple_amounts() {
        assert_eq!(parse_written_amount("five"), Some(dec!(5.00)));
        assert_eq!(parse_written_amount("twenty-five"), Some(dec!(25.00)));
        assert_eq!(parse_written_amount("one hundred"), Some(dec!(100.00)));
        assert_eq!(
            parse_written_amount("Twelve hundred"),
            Some(dec!(1200.00))
        );
    }

    #[test]
    fn test_parse_compound_amount_with_cents() {
        assert_eq!(
            parse_written_amount("One thousand two hundred thirty-four and 56/100 dollars"),
            Some(dec!(1234.56))
        );
        assert_eq!(
            parse_written_amount("Two hundred fifty and 00/100"),
            Some(dec!(250.00))
        );
    }

    #[test]
    fn test_parse_bare_scales() {
        assert_eq!(parse_written_amount("thousand"), Some(dec!(1000.00)));
        assert_eq!(
            parse_written_amount("one million"),
            Some(dec!(1000000.00))
        );
    }

    #[test]
    fn test_unparseable_lines() {
        assert_eq!(parse_written_amount(""), None);
        assert_eq!(parse_written_amount("pay to the order of"), None);
    }

    #[test]
    fn test_name_quality() {
        assert!(name_quality("John Smith") > 0.99);
        assert!(name_quality("J0hn Sm1th") < 0.9);
        assert_eq!(name_quality("x"), 0.0);
    }

    #[test]
    fn test_address_quality() {
        assert_eq!(address_quality("123 Main Street, Springfield"), 1.0);
        assert_eq!(address_quality(""), 0.0);
        assert!(address_quality("Main St") < 1.0);
    }
}
